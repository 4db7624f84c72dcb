//! One-way governance lock.
//!
//! Ownership transfer (and, by default, fee changes) stays locked until a
//! deadline fixed at genesis. Once the block timestamp reaches the deadline
//! the gate is open for good; nothing can move the deadline.

use crate::errors::{Error, Result};
use crate::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum GateState {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct GovernanceGate {
    deadline: Timestamp,
    fee_setters_timelocked: bool,
}

impl GovernanceGate {
    /// Gate opening `duration` milliseconds after `now`.
    pub fn new(now: Timestamp, duration: Timestamp, fee_setters_timelocked: bool) -> Self {
        Self {
            deadline: now.saturating_add(duration),
            fee_setters_timelocked,
        }
    }

    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub fn fee_setters_timelocked(&self) -> bool {
        self.fee_setters_timelocked
    }

    pub fn state(&self, now: Timestamp) -> GateState {
        if now < self.deadline {
            GateState::Locked
        } else {
            GateState::Unlocked
        }
    }

    pub fn ensure_unlocked(&self, now: Timestamp) -> Result<()> {
        match self.state(now) {
            GateState::Locked => Err(Error::Locked),
            GateState::Unlocked => Ok(()),
        }
    }

    pub fn ensure_fee_change_allowed(&self, now: Timestamp) -> Result<()> {
        if self.fee_setters_timelocked {
            self.ensure_unlocked(now)
        } else {
            Ok(())
        }
    }
}
