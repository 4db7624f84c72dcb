use displaydoc::Display;

/// Every way a call into the token can fail.
///
/// Errors are returned before any storage write, so a failed call leaves the
/// contract exactly as it was.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    /// Transfer amount must be greater than zero
    InvalidAmount,
    /// Transfer amount exceeds the maxTxAmount
    ExceedsMaxTransaction,
    /// Transfer amount exceeds balance
    InsufficientBalance,
    /// Transfer amount exceeds allowance
    InsufficientAllowance,
    /// Caller is not the owner
    Unauthorized,
    /// Function is timelocked
    Locked,
    /// Cannot set percentage over the fee ceiling
    CeilingExceeded,
    /// Fee percentage must not be negative
    NegativeValue,
    /// Supply state would make the reflection rate zero
    DivisionByZero,
    /// Arithmetic overflow
    Overflow,
    /// Account is already excluded from rewards
    AlreadyExcluded,
    /// Account is not excluded from rewards
    NotExcluded,
    /// The zero account cannot receive ownership
    InvalidAddress,
    /// Amount must be less than supply
    AmountExceedsSupply,
}

pub type Result<T> = core::result::Result<T, Error>;
