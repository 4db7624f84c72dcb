//! Per-holder balance record.
//!
//! An included holder stores only scaled units and reads its balance through
//! the current rate. An excluded holder additionally stores its exact balance,
//! which redistribution never touches.

use crate::errors::{Error, Result};
use crate::rate::Supply;
use crate::Balance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub enum AccountBalance {
    Included { r_owned: Balance },
    Excluded { r_owned: Balance, t_owned: Balance },
}

impl Default for AccountBalance {
    fn default() -> Self {
        AccountBalance::Included { r_owned: 0 }
    }
}

impl AccountBalance {
    pub fn r_owned(&self) -> Balance {
        match *self {
            AccountBalance::Included { r_owned } | AccountBalance::Excluded { r_owned, .. } => {
                r_owned
            }
        }
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, AccountBalance::Excluded { .. })
    }

    pub fn exact_balance(&self, supply: &Supply) -> Result<Balance> {
        match *self {
            AccountBalance::Included { r_owned } => supply.to_exact(r_owned),
            AccountBalance::Excluded { t_owned, .. } => Ok(t_owned),
        }
    }

    /// Remove `t_amount` / `r_amount` from the holder. Excluded holders also
    /// leave the excluded aggregates in `supply`. Nothing is written on error.
    pub fn debit(&mut self, supply: &mut Supply, t_amount: Balance, r_amount: Balance) -> Result<()> {
        match *self {
            AccountBalance::Included { r_owned } => {
                let r_owned = r_owned
                    .checked_sub(r_amount)
                    .ok_or(Error::InsufficientBalance)?;
                *self = AccountBalance::Included { r_owned };
            }
            AccountBalance::Excluded { r_owned, t_owned } => {
                let r_owned = r_owned
                    .checked_sub(r_amount)
                    .ok_or(Error::InsufficientBalance)?;
                let t_owned = t_owned
                    .checked_sub(t_amount)
                    .ok_or(Error::InsufficientBalance)?;
                supply.sub_excluded(t_amount, r_amount)?;
                *self = AccountBalance::Excluded { r_owned, t_owned };
            }
        }
        Ok(())
    }

    pub fn credit(&mut self, supply: &mut Supply, t_amount: Balance, r_amount: Balance) -> Result<()> {
        match *self {
            AccountBalance::Included { r_owned } => {
                let r_owned = r_owned.checked_add(r_amount).ok_or(Error::Overflow)?;
                *self = AccountBalance::Included { r_owned };
            }
            AccountBalance::Excluded { r_owned, t_owned } => {
                let r_owned = r_owned.checked_add(r_amount).ok_or(Error::Overflow)?;
                let t_owned = t_owned.checked_add(t_amount).ok_or(Error::Overflow)?;
                supply.add_excluded(t_amount, r_amount)?;
                *self = AccountBalance::Excluded { r_owned, t_owned };
            }
        }
        Ok(())
    }

    /// Freeze the holder's exact balance at the current rate.
    pub fn exclude(self, supply: &mut Supply) -> Result<Self> {
        let r_owned = match self {
            AccountBalance::Included { r_owned } => r_owned,
            AccountBalance::Excluded { .. } => return Err(Error::AlreadyExcluded),
        };
        let t_owned = supply.to_exact(r_owned)?;
        supply.add_excluded(t_owned, r_owned)?;
        Ok(AccountBalance::Excluded { r_owned, t_owned })
    }

    /// Rejoin redistribution with the same exact balance the holder had while
    /// excluded.
    ///
    /// The stored `r_owned` is stale by every fee redistributed since the
    /// exclusion, so it is replaced by `t_owned` scaled at the rate the
    /// excluded holder was seeing. The surplus is retired from the scaled
    /// supply; `r_total` never grows.
    pub fn include(self, supply: &mut Supply) -> Result<Self> {
        let (r_owned, t_owned) = match self {
            AccountBalance::Excluded { r_owned, t_owned } => (r_owned, t_owned),
            AccountBalance::Included { .. } => return Err(Error::NotExcluded),
        };
        let rescaled = supply.to_scaled_ceil(t_owned)?.min(r_owned);
        supply.sub_excluded(t_owned, r_owned)?;
        let stale = r_owned - rescaled;
        if stale > 0 {
            supply.retire(stale)?;
        }
        Ok(AccountBalance::Included { r_owned: rescaled })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(supply: &Supply, t_amount: Balance) -> AccountBalance {
        AccountBalance::Included {
            r_owned: supply.to_scaled(t_amount).unwrap(),
        }
    }

    #[test]
    fn default_is_an_empty_included_holder() {
        let account = AccountBalance::default();
        assert!(!account.is_excluded());
        assert_eq!(account.exact_balance(&Supply::standard()), Ok(0));
    }

    #[test]
    fn included_debit_and_credit_move_scaled_units() {
        let mut supply = Supply::new(1_000).unwrap();
        let rate = supply.rate().unwrap();
        let mut account = funded(&supply, 100);

        account.debit(&mut supply, 40, 40 * rate).unwrap();
        assert_eq!(account.exact_balance(&supply), Ok(60));
        account.credit(&mut supply, 5, 5 * rate).unwrap();
        assert_eq!(account.exact_balance(&supply), Ok(65));
        assert_eq!(supply.excluded_r(), 0);
    }

    #[test]
    fn overdraw_leaves_the_holder_untouched() {
        let mut supply = Supply::new(1_000).unwrap();
        let mut account = funded(&supply, 10).exclude(&mut supply).unwrap();
        let before = account;
        let r = account.r_owned();

        assert_eq!(
            account.debit(&mut supply, 11, r),
            Err(Error::InsufficientBalance)
        );
        assert_eq!(account, before);
        assert_eq!(supply.excluded_t(), 10);
    }

    #[test]
    fn excluded_balance_ignores_redistribution() {
        let mut supply = Supply::new(1_000).unwrap();
        let account = funded(&supply, 100).exclude(&mut supply).unwrap();
        assert_eq!(supply.excluded_t(), 100);
        assert_eq!(supply.excluded_r(), account.r_owned());

        supply.redistribute(supply.to_scaled(50).unwrap()).unwrap();
        assert_eq!(account.exact_balance(&supply), Ok(100));
    }

    #[test]
    fn double_toggles_are_rejected() {
        let mut supply = Supply::new(1_000).unwrap();
        let included = funded(&supply, 1);
        assert_eq!(included.include(&mut supply), Err(Error::NotExcluded));
        let excluded = included.exclude(&mut supply).unwrap();
        assert_eq!(excluded.exclude(&mut supply), Err(Error::AlreadyExcluded));
    }

    #[test]
    fn exclude_then_include_restores_the_balance() {
        let mut supply = Supply::new(1_000_000).unwrap();
        let other = funded(&supply, 600_000);
        let account = funded(&supply, 400_000);

        let account = account.exclude(&mut supply).unwrap();
        // fees redistributed while excluded only reach `other`
        supply.redistribute(supply.to_scaled(6_000).unwrap()).unwrap();
        // 600_000 * 600_000 / 594_000
        assert_eq!(other.exact_balance(&supply), Ok(606_060));
        let r_total_before = supply.r_total();

        let account = account.include(&mut supply).unwrap();
        assert_eq!(account.exact_balance(&supply), Ok(400_000));
        assert_eq!(other.exact_balance(&supply), Ok(606_060));
        assert!(supply.r_total() < r_total_before);
        assert_eq!(supply.excluded_t(), 0);
        assert_eq!(supply.excluded_r(), 0);
    }
}
