use crate::constants::{MAX_TX_PER_MILLE, PER_MILLE, TIMELOCK_DURATION_MS, TOTAL_SUPPLY};
use crate::errors::{Error, Result};
use crate::{Balance, Timestamp};

/// Deployment parameters. `Default` is the production token.
#[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct GenesisConfig {
    pub total_supply: Balance,
    /// Largest taxed transfer in thousandths of `total_supply`.
    pub max_tx_per_mille: u16,
    pub timelock_duration_ms: Timestamp,
    /// Fee setters wait for the governance deadline too.
    pub fee_setters_timelocked: bool,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            total_supply: TOTAL_SUPPLY,
            max_tx_per_mille: MAX_TX_PER_MILLE,
            timelock_duration_ms: TIMELOCK_DURATION_MS,
            fee_setters_timelocked: true,
        }
    }
}

impl GenesisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.total_supply == 0 {
            return Err(Error::DivisionByZero);
        }
        if self.max_tx_per_mille == 0 || u128::from(self.max_tx_per_mille) > PER_MILLE {
            return Err(Error::InvalidAmount);
        }
        Ok(())
    }

    pub fn max_tx_amount(&self) -> Result<Balance> {
        self.total_supply
            .checked_mul(Balance::from(self.max_tx_per_mille))
            .ok_or(Error::Overflow)?
            .checked_div(PER_MILLE)
            .ok_or(Error::DivisionByZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap_is_half_a_percent() {
        let config = GenesisConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.max_tx_amount(), Ok(TOTAL_SUPPLY / 200));
    }

    #[test]
    fn rejects_degenerate_configs() {
        let zero_supply = GenesisConfig {
            total_supply: 0,
            ..GenesisConfig::default()
        };
        assert_eq!(zero_supply.validate(), Err(Error::DivisionByZero));

        for per_mille in [0, 1_001] {
            let config = GenesisConfig {
                max_tx_per_mille: per_mille,
                ..GenesisConfig::default()
            };
            assert_eq!(config.validate(), Err(Error::InvalidAmount));
        }

        let uncapped = GenesisConfig {
            max_tx_per_mille: 1_000,
            ..GenesisConfig::default()
        };
        assert_eq!(uncapped.max_tx_amount(), Ok(TOTAL_SUPPLY));
    }
}
