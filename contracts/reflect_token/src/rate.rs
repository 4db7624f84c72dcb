//! Conversion between exact token units (t-units) and scaled reflection units
//! (r-units).
//!
//! ```text
//!   R  = r_total   (shrinks by every redistribution fee)
//!   T  = t_total   (fixed at genesis)
//!
//!   circulating:  r_supply = R - Σ r_owned(excluded)
//!                 t_supply = T - Σ t_owned(excluded)
//!
//!   rate       = r_supply / t_supply
//!   to_scaled  = t * r_supply / t_supply
//!   to_exact   = r * t_supply / r_supply
//! ```
//!
//! Reward-excluded holdings are taken out of both sides of the ratio, so a
//! redistribution raises the balance of included holders only. Products are
//! formed in 256 bits and divided once, so the fractional part of the rate
//! is never thrown away.

use primitive_types::U256;

use crate::errors::{Error, Result};
use crate::Balance;
use crate::constants::TOTAL_SUPPLY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rounding {
    Down,
    Up,
}

#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Supply {
    t_total: Balance,
    r_total: Balance,
    excluded_t: Balance,
    excluded_r: Balance,
}

impl Supply {
    /// Genesis supply for [`TOTAL_SUPPLY`].
    pub const fn standard() -> Self {
        Self {
            t_total: TOTAL_SUPPLY,
            r_total: u128::MAX - (u128::MAX % TOTAL_SUPPLY),
            excluded_t: 0,
            excluded_r: 0,
        }
    }

    /// Genesis supply for an arbitrary `t_total`.
    ///
    /// `r_total` is the largest multiple of `t_total` that fits in 128 bits,
    /// so the genesis rate is an exact integer.
    pub fn new(t_total: Balance) -> Result<Self> {
        let remainder = u128::MAX
            .checked_rem(t_total)
            .ok_or(Error::DivisionByZero)?;
        Ok(Self {
            t_total,
            r_total: u128::MAX - remainder,
            excluded_t: 0,
            excluded_r: 0,
        })
    }

    pub fn t_total(&self) -> Balance {
        self.t_total
    }

    pub fn r_total(&self) -> Balance {
        self.r_total
    }

    pub fn excluded_t(&self) -> Balance {
        self.excluded_t
    }

    pub fn excluded_r(&self) -> Balance {
        self.excluded_r
    }

    /// Circulating `(r_supply, t_supply)`, i.e. the holdings that earn
    /// reflection. Falls back to the full totals once nearly everything is
    /// excluded.
    pub fn current(&self) -> (Balance, Balance) {
        let r_supply = self.r_total.saturating_sub(self.excluded_r);
        let t_supply = self.t_total.saturating_sub(self.excluded_t);
        let floor = self.r_total.checked_div(self.t_total).unwrap_or(0);
        if t_supply == 0 || r_supply < floor {
            (self.r_total, self.t_total)
        } else {
            (r_supply, t_supply)
        }
    }

    /// Integer r-units per t-unit.
    pub fn rate(&self) -> Result<Balance> {
        let (r_supply, t_supply) = self.current();
        r_supply.checked_div(t_supply).ok_or(Error::DivisionByZero)
    }

    pub fn to_scaled(&self, t_amount: Balance) -> Result<Balance> {
        let (r_supply, t_supply) = self.current();
        mul_div(t_amount, r_supply, t_supply, Rounding::Down)
    }

    /// Like [`Self::to_scaled`] but rounding up. Reading the result back with
    /// [`Self::to_exact`] then yields `t_amount` rather than `t_amount - 1`.
    pub fn to_scaled_ceil(&self, t_amount: Balance) -> Result<Balance> {
        let (r_supply, t_supply) = self.current();
        mul_div(t_amount, r_supply, t_supply, Rounding::Up)
    }

    pub fn to_exact(&self, r_amount: Balance) -> Result<Balance> {
        let (r_supply, t_supply) = self.current();
        mul_div(r_amount, t_supply, r_supply, Rounding::Down)
    }

    /// Remove `r_fee` from the scaled supply. This is the reflection itself:
    /// included holders keep their `r_owned`, the rate drops, and their exact
    /// balances rise.
    pub fn redistribute(&mut self, r_fee: Balance) -> Result<()> {
        self.shrink(r_fee)
    }

    /// Drop scaled units that no longer back any reported balance.
    pub fn retire(&mut self, r_amount: Balance) -> Result<()> {
        self.shrink(r_amount)
    }

    fn shrink(&mut self, r_amount: Balance) -> Result<()> {
        let r_total = self
            .r_total
            .checked_sub(r_amount)
            .ok_or(Error::DivisionByZero)?;
        // rate must stay >= 1
        if r_total < self.t_total {
            return Err(Error::DivisionByZero);
        }
        self.r_total = r_total;
        Ok(())
    }

    pub(crate) fn add_excluded(&mut self, t_amount: Balance, r_amount: Balance) -> Result<()> {
        self.excluded_t = self
            .excluded_t
            .checked_add(t_amount)
            .ok_or(Error::Overflow)?;
        self.excluded_r = self
            .excluded_r
            .checked_add(r_amount)
            .ok_or(Error::Overflow)?;
        Ok(())
    }

    pub(crate) fn sub_excluded(&mut self, t_amount: Balance, r_amount: Balance) -> Result<()> {
        self.excluded_t = self
            .excluded_t
            .checked_sub(t_amount)
            .ok_or(Error::Overflow)?;
        self.excluded_r = self
            .excluded_r
            .checked_sub(r_amount)
            .ok_or(Error::Overflow)?;
        Ok(())
    }
}

fn mul_div(value: Balance, numerator: Balance, denominator: Balance, rounding: Rounding) -> Result<Balance> {
    if denominator == 0 {
        return Err(Error::DivisionByZero);
    }
    let product = U256::from(value)
        .checked_mul(U256::from(numerator))
        .ok_or(Error::Overflow)?;
    let (quotient, remainder) = product.div_mod(U256::from(denominator));
    let quotient = match rounding {
        Rounding::Up if !remainder.is_zero() => quotient
            .checked_add(U256::one())
            .ok_or(Error::Overflow)?,
        _ => quotient,
    };
    if quotient.bits() > 128 {
        return Err(Error::Overflow);
    }
    Ok(quotient.low_u128())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_rate_is_an_exact_integer() {
        let supply = Supply::standard();
        assert_eq!(supply.r_total() % supply.t_total(), 0);
        assert!(supply.r_total() >= supply.t_total());
        assert_eq!(Supply::new(TOTAL_SUPPLY), Ok(supply));
    }

    #[test]
    fn zero_supply_is_rejected() {
        assert_eq!(Supply::new(0), Err(Error::DivisionByZero));
    }

    #[test]
    fn conversions_round_trip_at_genesis() {
        let supply = Supply::standard();
        let rate = supply.rate().unwrap();
        let r = supply.to_scaled(200).unwrap();
        assert_eq!(r, 200 * rate);
        assert_eq!(supply.to_exact(r), Ok(200));
        assert_eq!(supply.to_scaled_ceil(200), Ok(r));
    }

    #[test]
    fn redistribution_lowers_the_rate() {
        let mut supply = Supply::new(1_000_000).unwrap();
        let held = supply.to_scaled(500_000).unwrap();
        let rate_before = supply.rate().unwrap();

        supply.redistribute(supply.to_scaled(10_000).unwrap()).unwrap();

        assert!(supply.rate().unwrap() < rate_before);
        // 500_000 * 1_000_000 / 990_000
        assert_eq!(supply.to_exact(held), Ok(505_050));
    }

    #[test]
    fn shrinking_below_t_total_is_refused() {
        let mut supply = Supply::new(1_000).unwrap();
        let too_much = supply.r_total() - supply.t_total() + 1;
        assert_eq!(supply.redistribute(too_much), Err(Error::DivisionByZero));
        assert_eq!(supply, Supply::new(1_000).unwrap());
    }

    #[test]
    fn excluded_holdings_leave_the_circulating_supply() {
        let mut supply = Supply::new(1_000).unwrap();
        let r = supply.to_scaled(400).unwrap();
        supply.add_excluded(400, r).unwrap();
        assert_eq!(supply.current(), (supply.r_total() - r, 600));
        supply.sub_excluded(400, r).unwrap();
        assert_eq!(supply.current(), (supply.r_total(), 1_000));
    }

    #[test]
    fn fully_excluded_supply_falls_back_to_totals() {
        let mut supply = Supply::new(1_000).unwrap();
        supply.add_excluded(1_000, supply.r_total()).unwrap();
        assert_eq!(supply.current(), (supply.r_total(), supply.t_total()));
        assert!(supply.rate().unwrap() >= 1);
    }

    #[test]
    fn ceil_rounds_up_only_on_remainder() {
        assert_eq!(mul_div(10, 1, 3, Rounding::Down), Ok(3));
        assert_eq!(mul_div(10, 1, 3, Rounding::Up), Ok(4));
        assert_eq!(mul_div(9, 1, 3, Rounding::Up), Ok(3));
        assert_eq!(mul_div(1, 1, 0, Rounding::Down), Err(Error::DivisionByZero));
    }
}
