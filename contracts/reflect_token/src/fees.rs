//! Five-way split of a transfer amount.
//!
//! ```text
//!   amount ──┬── redistribution  (tax)         amount × tax         / 10 000
//!            ├── community                     amount × community   / 10 000
//!            ├── maintenance                   amount × maintenance / 10 000
//!            ├── liquidity                     amount × liquidity   / 10 000
//!            └── net              amount − Σ fees
//! ```
//!
//! Every fee rounds down and `net` absorbs the remainder, so the five parts
//! always add back up to `amount`. The same rule is applied to the scaled
//! parts: `r_net` is whatever the sender gives up minus the scaled fees.

use crate::constants::{
    COMMUNITY_FEE_CEILING, DEFAULT_COMMUNITY_FEE, DEFAULT_LIQUIDITY_WALLET_FEE,
    DEFAULT_MAINTENANCE_FEE, DEFAULT_TAX_FEE, FEE_DENOMINATOR, LIQUIDITY_WALLET_FEE_CEILING,
    MAINTENANCE_FEE_CEILING, TAX_FEE_CEILING,
};
use crate::errors::{Error, Result};
use crate::rate::Supply;
use crate::Balance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum FeeKind {
    /// Redistributed to every reward-included holder.
    Tax,
    Community,
    Maintenance,
    LiquidityWallet,
}

impl FeeKind {
    pub const fn ceiling(self) -> u16 {
        match self {
            FeeKind::Tax => TAX_FEE_CEILING,
            FeeKind::Community => COMMUNITY_FEE_CEILING,
            FeeKind::Maintenance => MAINTENANCE_FEE_CEILING,
            FeeKind::LiquidityWallet => LIQUIDITY_WALLET_FEE_CEILING,
        }
    }
}

/// Live fee percentages, read by every transfer at call time.
#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct FeeConfig {
    pub tax: u16,
    pub community: u16,
    pub maintenance: u16,
    pub liquidity_wallet: u16,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            tax: DEFAULT_TAX_FEE,
            community: DEFAULT_COMMUNITY_FEE,
            maintenance: DEFAULT_MAINTENANCE_FEE,
            liquidity_wallet: DEFAULT_LIQUIDITY_WALLET_FEE,
        }
    }
}

impl FeeConfig {
    pub fn get(&self, kind: FeeKind) -> u16 {
        match kind {
            FeeKind::Tax => self.tax,
            FeeKind::Community => self.community,
            FeeKind::Maintenance => self.maintenance,
            FeeKind::LiquidityWallet => self.liquidity_wallet,
        }
    }

    /// Overwrite one field, returning the previous value. Callers decide
    /// authorization and timelock first.
    pub fn set(&mut self, kind: FeeKind, value: u16) -> Result<u16> {
        if value > kind.ceiling() {
            return Err(Error::CeilingExceeded);
        }
        let slot = match kind {
            FeeKind::Tax => &mut self.tax,
            FeeKind::Community => &mut self.community,
            FeeKind::Maintenance => &mut self.maintenance,
            FeeKind::LiquidityWallet => &mut self.liquidity_wallet,
        };
        Ok(core::mem::replace(slot, value))
    }
}

/// Interpret a signed fee argument.
pub fn non_negative(value: i32) -> Result<u16> {
    if value < 0 {
        return Err(Error::NegativeValue);
    }
    // anything above u16 is certainly above every ceiling
    u16::try_from(value).map_err(|_| Error::CeilingExceeded)
}

/// A transfer split in t-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSplit {
    pub amount: Balance,
    pub net: Balance,
    pub redistribution: Balance,
    pub community: Balance,
    pub maintenance: Balance,
    pub liquidity: Balance,
}

impl FeeSplit {
    /// `exempt` is true when either side of the transfer is fee-excluded.
    pub fn compute(amount: Balance, fees: &FeeConfig, exempt: bool) -> Result<Self> {
        if amount == 0 {
            return Err(Error::InvalidAmount);
        }
        if exempt {
            return Ok(Self {
                amount,
                net: amount,
                ..Self::default()
            });
        }

        let redistribution = percent_of(amount, fees.tax)?;
        let community = percent_of(amount, fees.community)?;
        let maintenance = percent_of(amount, fees.maintenance)?;
        let liquidity = percent_of(amount, fees.liquidity_wallet)?;

        let mut split = Self {
            amount,
            net: 0,
            redistribution,
            community,
            maintenance,
            liquidity,
        };
        split.net = amount
            .checked_sub(split.total_fee()?)
            .ok_or(Error::Overflow)?;
        Ok(split)
    }

    /// Everything deducted from `amount`, i.e. `amount - net`.
    pub fn total_fee(&self) -> Result<Balance> {
        self.redistribution
            .checked_add(self.community)
            .and_then(|sum| sum.checked_add(self.maintenance))
            .and_then(|sum| sum.checked_add(self.liquidity))
            .ok_or(Error::Overflow)
    }

    pub fn is_taxed(&self) -> bool {
        self.net != self.amount
    }

    /// Map each part to r-units at the current rate, given that the sender
    /// gives up `r_amount`.
    pub fn scale(&self, supply: &Supply, r_amount: Balance) -> Result<ScaledSplit> {
        let redistribution = supply.to_scaled(self.redistribution)?;
        let community = supply.to_scaled(self.community)?;
        let maintenance = supply.to_scaled(self.maintenance)?;
        let liquidity = supply.to_scaled(self.liquidity)?;

        let net = r_amount
            .checked_sub(redistribution)
            .and_then(|rest| rest.checked_sub(community))
            .and_then(|rest| rest.checked_sub(maintenance))
            .and_then(|rest| rest.checked_sub(liquidity))
            .ok_or(Error::Overflow)?;

        Ok(ScaledSplit {
            amount: r_amount,
            net,
            redistribution,
            community,
            maintenance,
            liquidity,
        })
    }
}

/// The same split in r-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScaledSplit {
    pub amount: Balance,
    pub net: Balance,
    pub redistribution: Balance,
    pub community: Balance,
    pub maintenance: Balance,
    pub liquidity: Balance,
}

fn percent_of(amount: Balance, fee: u16) -> Result<Balance> {
    amount
        .checked_mul(Balance::from(fee))
        .ok_or(Error::Overflow)?
        .checked_div(FEE_DENOMINATOR)
        .ok_or(Error::DivisionByZero)
}
