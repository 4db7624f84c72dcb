//! Genesis parameters for the COMFI reflection token.
//!
//! Everything here is fixed at deployment. Fee percentages are the only
//! values that governance may change later, and only within `*_CEILING`.

use crate::Balance;

pub const TOKEN_NAME: &str = "Commander_DeFi";
pub const TOKEN_SYMBOL: &str = "COMFI";
pub const DECIMALS: u8 = 18;

pub const SCALING_FACTOR: Balance = 1_000_000_000_000_000_000;

/// 100 trillion tokens at 18 decimals.
pub const TOTAL_SUPPLY: Balance = 100_000_000_000_000 * SCALING_FACTOR;

/// Denominator for every fee percentage (1% = 100).
pub const FEE_DENOMINATOR: u128 = 10_000;

// ── Default fees ─────────────────────────────────────────────────────────────

/// Redistribution ("reflection") fee: 1%.
pub const DEFAULT_TAX_FEE: u16 = 100;
pub const DEFAULT_COMMUNITY_FEE: u16 = 300;
pub const DEFAULT_MAINTENANCE_FEE: u16 = 300;
pub const DEFAULT_LIQUIDITY_WALLET_FEE: u16 = 300;

// ── Ceilings ─────────────────────────────────────────────────────────────────
//
// Three of the four ceilings sit below their own default, so once lowered the
// owner cannot restore the launch rate. Kept as deployed.

pub const TAX_FEE_CEILING: u16 = 30;
pub const COMMUNITY_FEE_CEILING: u16 = 250;
pub const MAINTENANCE_FEE_CEILING: u16 = 90;
pub const LIQUIDITY_WALLET_FEE_CEILING: u16 = 30;

// ── Limits ───────────────────────────────────────────────────────────────────

/// Largest taxed transfer, in thousandths of the total supply (0.5%).
pub const MAX_TX_PER_MILLE: u16 = 5;

pub const PER_MILLE: u128 = 1_000;

/// Governance timelock measured from the genesis block timestamp (30 days).
pub const TIMELOCK_DURATION_MS: u64 = 30 * 24 * 60 * 60 * 1_000;
