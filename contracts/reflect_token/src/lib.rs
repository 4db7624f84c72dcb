#![cfg_attr(not(feature = "std"), no_std, no_main)]

//! COMFI: a fixed-supply token that reflects a share of every taxed transfer
//! back to its holders, with owner governance behind a one-way timelock.

pub mod account;
pub mod config;
pub mod constants;
pub mod errors;
pub mod fees;
pub mod ledger;
pub mod rate;
pub mod timelock;

pub type Balance = u128;
pub type Timestamp = u64;

#[ink::contract]
mod reflect_token {
    use ink::prelude::string::String;
    use ink::storage::Mapping;

    use crate::account::AccountBalance;
    use crate::config::GenesisConfig;
    use crate::constants::{DECIMALS, TOKEN_NAME, TOKEN_SYMBOL};
    use crate::errors::Error;
    use crate::fees::{self, FeeConfig, FeeKind, FeeSplit};
    use crate::ledger::{self, Journal, Parties};
    use crate::rate::Supply;
    use crate::timelock::{GateState, GovernanceGate};

    #[ink(storage)]
    pub struct ReflectToken {
        supply: Supply,
        accounts: Mapping<AccountId, AccountBalance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,
        fee_excluded: Mapping<AccountId, bool>,
        /// Cumulative fees deducted from each sender's outgoing transfers.
        fee_history: Mapping<AccountId, Balance>,
        fees: FeeConfig,
        community: AccountId,
        maintenance: AccountId,
        liquidity_wallet: AccountId,
        owner: AccountId,
        gate: GovernanceGate,
        max_tx_amount: Balance,
        total_redistributed: Balance,
    }

    // ── Events ───────────────────────────────────────────────────────────────

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        value: Balance,
    }

    /// Fee components of one taxed transfer, in exact units.
    #[ink(event)]
    pub struct FeesDeducted {
        #[ink(topic)]
        from: AccountId,
        redistribution: Balance,
        community: Balance,
        maintenance: Balance,
        liquidity: Balance,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous: Option<AccountId>,
        #[ink(topic)]
        new: AccountId,
    }

    #[ink(event)]
    pub struct FeePercentUpdated {
        kind: FeeKind,
        old: u16,
        new: u16,
    }

    #[ink(event)]
    pub struct BeneficiaryUpdated {
        kind: FeeKind,
        #[ink(topic)]
        account: AccountId,
    }

    #[ink(event)]
    pub struct RewardExclusionChanged {
        #[ink(topic)]
        account: AccountId,
        excluded: bool,
    }

    #[ink(event)]
    pub struct FeeExclusionChanged {
        #[ink(topic)]
        account: AccountId,
        excluded: bool,
    }

    impl ReflectToken {
        /// Deploy with the production supply, fees and timelock.
        #[ink(constructor)]
        pub fn new(
            community: AccountId,
            maintenance: AccountId,
            liquidity_wallet: AccountId,
        ) -> Result<Self, Error> {
            Self::with_config(community, maintenance, liquidity_wallet, GenesisConfig::default())
        }

        /// The caller becomes owner and receives the whole supply. Owner and
        /// contract account pay no fees; the beneficiaries earn no reflection.
        #[ink(constructor)]
        pub fn with_config(
            community: AccountId,
            maintenance: AccountId,
            liquidity_wallet: AccountId,
            config: GenesisConfig,
        ) -> Result<Self, Error> {
            config.validate()?;
            let max_tx_amount = config.max_tx_amount()?;
            let caller = Self::env().caller();
            let supply = Supply::new(config.total_supply)?;
            let r_total = supply.r_total();

            let mut journal = Journal::new(supply);
            journal.set_account(caller, AccountBalance::Included { r_owned: r_total });
            let load = |_: AccountId| AccountBalance::default();
            for beneficiary in [community, maintenance, liquidity_wallet] {
                let account = journal.account(beneficiary, &load);
                if !account.is_excluded() {
                    let excluded = account.exclude(journal.supply_mut())?;
                    journal.set_account(beneficiary, excluded);
                }
            }
            let (supply, touched) = journal.into_parts();

            let mut accounts = Mapping::default();
            for (who, balance) in touched {
                accounts.insert(who, &balance);
            }

            let mut fee_excluded = Mapping::default();
            fee_excluded.insert(caller, &true);
            fee_excluded.insert(Self::env().account_id(), &true);

            let now = Self::env().block_timestamp();

            Self::env().emit_event(OwnershipTransferred {
                previous: None,
                new: caller,
            });
            Self::env().emit_event(Transfer {
                from: None,
                to: Some(caller),
                value: config.total_supply,
            });

            Ok(Self {
                supply,
                accounts,
                allowances: Mapping::default(),
                fee_excluded,
                fee_history: Mapping::default(),
                fees: FeeConfig::default(),
                community,
                maintenance,
                liquidity_wallet,
                owner: caller,
                gate: GovernanceGate::new(
                    now,
                    config.timelock_duration_ms,
                    config.fee_setters_timelocked,
                ),
                max_tx_amount,
                total_redistributed: 0,
            })
        }

        // ── Metadata ─────────────────────────────────────────────────────────

        #[ink(message)]
        pub fn name(&self) -> String {
            String::from(TOKEN_NAME)
        }

        #[ink(message)]
        pub fn symbol(&self) -> String {
            String::from(TOKEN_SYMBOL)
        }

        #[ink(message)]
        pub fn decimals(&self) -> u8 {
            DECIMALS
        }

        #[ink(message)]
        pub fn total_supply(&self) -> Balance {
            self.supply.t_total()
        }

        #[ink(message)]
        pub fn total_scaled_supply(&self) -> Balance {
            self.supply.r_total()
        }

        /// Current integer r-units per t-unit.
        #[ink(message)]
        pub fn rate(&self) -> Balance {
            self.supply.rate().unwrap_or_default()
        }

        #[ink(message)]
        pub fn max_tx_amount(&self) -> Balance {
            self.max_tx_amount
        }

        #[ink(message)]
        pub fn total_redistributed(&self) -> Balance {
            self.total_redistributed
        }

        // ── Balances ─────────────────────────────────────────────────────────

        #[ink(message)]
        pub fn balance_of(&self, owner: AccountId) -> Balance {
            self.load(owner)
                .exact_balance(&self.supply)
                .unwrap_or_default()
        }

        #[ink(message)]
        pub fn scaled_balance_of(&self, owner: AccountId) -> Balance {
            self.load(owner).r_owned()
        }

        /// Frozen exact balance; zero for accounts that earn reflection.
        #[ink(message)]
        pub fn exact_balance_of(&self, owner: AccountId) -> Balance {
            match self.load(owner) {
                AccountBalance::Excluded { t_owned, .. } => t_owned,
                AccountBalance::Included { .. } => 0,
            }
        }

        #[ink(message)]
        pub fn total_fees_paid(&self, account: AccountId) -> Balance {
            self.fee_history.get(account).unwrap_or(0)
        }

        #[ink(message)]
        pub fn reflection_from_token(
            &self,
            amount: Balance,
            deduct_fee: bool,
        ) -> Result<Balance, Error> {
            if amount > self.supply.t_total() {
                return Err(Error::AmountExceedsSupply);
            }
            let r_amount = self.supply.to_scaled(amount)?;
            if !deduct_fee || amount == 0 {
                return Ok(r_amount);
            }
            let split = FeeSplit::compute(amount, &self.fees, false)?;
            Ok(split.scale(&self.supply, r_amount)?.net)
        }

        #[ink(message)]
        pub fn token_from_reflection(&self, r_amount: Balance) -> Result<Balance, Error> {
            if r_amount > self.supply.r_total() {
                return Err(Error::AmountExceedsSupply);
            }
            self.supply.to_exact(r_amount)
        }

        // ── Transfers ────────────────────────────────────────────────────────

        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, amount: Balance) -> Result<(), Error> {
            let from = self.env().caller();
            let (journal, split) = self.plan_transfer(from, to, amount)?;
            self.finish_transfer(from, to, journal, split)
        }

        /// Spends `amount` of the caller's allowance, whatever the fees.
        #[ink(message)]
        pub fn transfer_from(
            &mut self,
            from: AccountId,
            to: AccountId,
            amount: Balance,
        ) -> Result<(), Error> {
            let spender = self.env().caller();
            let (journal, split) = self.plan_transfer(from, to, amount)?;
            let allowance = self.allowance(from, spender);
            let remaining = allowance
                .checked_sub(amount)
                .ok_or(Error::InsufficientAllowance)?;
            self.allowances.insert((from, spender), &remaining);
            self.finish_transfer(from, to, journal, split)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<(), Error> {
            let owner = self.env().caller();
            self.write_allowance(owner, spender, value);
            Ok(())
        }

        #[ink(message)]
        pub fn increase_allowance(&mut self, spender: AccountId, added: Balance) -> Result<(), Error> {
            let owner = self.env().caller();
            let value = self
                .allowance(owner, spender)
                .checked_add(added)
                .ok_or(Error::Overflow)?;
            self.write_allowance(owner, spender, value);
            Ok(())
        }

        #[ink(message)]
        pub fn decrease_allowance(
            &mut self,
            spender: AccountId,
            subtracted: Balance,
        ) -> Result<(), Error> {
            let owner = self.env().caller();
            let value = self
                .allowance(owner, spender)
                .checked_sub(subtracted)
                .ok_or(Error::InsufficientAllowance)?;
            self.write_allowance(owner, spender, value);
            Ok(())
        }

        // ── Exemptions ───────────────────────────────────────────────────────

        #[ink(message)]
        pub fn exclude_from_reward(&mut self, account: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            let mut supply = self.supply.clone();
            let updated = self.load(account).exclude(&mut supply)?;
            self.supply = supply;
            self.accounts.insert(account, &updated);
            self.env().emit_event(RewardExclusionChanged { account, excluded: true });
            Ok(())
        }

        #[ink(message)]
        pub fn include_in_reward(&mut self, account: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            let mut supply = self.supply.clone();
            let updated = self.load(account).include(&mut supply)?;
            self.supply = supply;
            self.accounts.insert(account, &updated);
            self.env().emit_event(RewardExclusionChanged { account, excluded: false });
            Ok(())
        }

        #[ink(message)]
        pub fn is_excluded_from_reward(&self, account: AccountId) -> bool {
            self.load(account).is_excluded()
        }

        #[ink(message)]
        pub fn exclude_from_fee(&mut self, account: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.fee_excluded.insert(account, &true);
            self.env().emit_event(FeeExclusionChanged { account, excluded: true });
            Ok(())
        }

        #[ink(message)]
        pub fn include_in_fee(&mut self, account: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.fee_excluded.remove(account);
            self.env().emit_event(FeeExclusionChanged { account, excluded: false });
            Ok(())
        }

        #[ink(message)]
        pub fn is_excluded_from_fee(&self, account: AccountId) -> bool {
            self.fee_excluded.get(account).unwrap_or(false)
        }

        // ── Fees ─────────────────────────────────────────────────────────────

        #[ink(message)]
        pub fn tax_fee(&self) -> u16 {
            self.fees.tax
        }

        #[ink(message)]
        pub fn community_fee(&self) -> u16 {
            self.fees.community
        }

        #[ink(message)]
        pub fn maintenance_fee(&self) -> u16 {
            self.fees.maintenance
        }

        #[ink(message)]
        pub fn liquidity_wallet_fee(&self) -> u16 {
            self.fees.liquidity_wallet
        }

        /// `(tax, community, maintenance, liquidity_wallet)` upper bounds.
        #[ink(message)]
        pub fn fee_ceilings(&self) -> (u16, u16, u16, u16) {
            (
                FeeKind::Tax.ceiling(),
                FeeKind::Community.ceiling(),
                FeeKind::Maintenance.ceiling(),
                FeeKind::LiquidityWallet.ceiling(),
            )
        }

        #[ink(message)]
        pub fn set_tax_fee_percent(&mut self, value: i32) -> Result<(), Error> {
            self.set_fee(FeeKind::Tax, value)
        }

        #[ink(message)]
        pub fn set_community_fee_percent(&mut self, value: i32) -> Result<(), Error> {
            self.set_fee(FeeKind::Community, value)
        }

        #[ink(message)]
        pub fn set_maintenance_fee_percent(&mut self, value: i32) -> Result<(), Error> {
            self.set_fee(FeeKind::Maintenance, value)
        }

        #[ink(message)]
        pub fn set_liquidity_wallet_fee_percent(&mut self, value: i32) -> Result<(), Error> {
            self.set_fee(FeeKind::LiquidityWallet, value)
        }

        // ── Beneficiaries ────────────────────────────────────────────────────

        #[ink(message)]
        pub fn community(&self) -> AccountId {
            self.community
        }

        #[ink(message)]
        pub fn maintenance(&self) -> AccountId {
            self.maintenance
        }

        #[ink(message)]
        pub fn liquidity_wallet(&self) -> AccountId {
            self.liquidity_wallet
        }

        #[ink(message)]
        pub fn set_community_address(&mut self, account: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.community = account;
            self.env().emit_event(BeneficiaryUpdated { kind: FeeKind::Community, account });
            Ok(())
        }

        #[ink(message)]
        pub fn set_maintenance_address(&mut self, account: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.maintenance = account;
            self.env().emit_event(BeneficiaryUpdated { kind: FeeKind::Maintenance, account });
            Ok(())
        }

        #[ink(message)]
        pub fn set_liquidity_wallet_address(&mut self, account: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.liquidity_wallet = account;
            self.env().emit_event(BeneficiaryUpdated {
                kind: FeeKind::LiquidityWallet,
                account,
            });
            Ok(())
        }

        // ── Governance ───────────────────────────────────────────────────────

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner
        }

        /// Timestamp (ms) at which governance unlocks.
        #[ink(message)]
        pub fn timelock(&self) -> Timestamp {
            self.gate.deadline()
        }

        #[ink(message)]
        pub fn governance_state(&self) -> GateState {
            self.gate.state(self.env().block_timestamp())
        }

        #[ink(message)]
        pub fn fee_setters_timelocked(&self) -> bool {
            self.gate.fee_setters_timelocked()
        }

        /// Hand over ownership together with the owner's entire balance.
        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_owner: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.gate.ensure_unlocked(self.env().block_timestamp())?;
            if new_owner == AccountId::from([0u8; 32]) {
                return Err(Error::InvalidAddress);
            }
            let previous = self.owner;
            if new_owner == previous {
                return Ok(());
            }

            let mut journal = Journal::new(self.supply.clone());
            let load = |who: AccountId| self.load(who);
            let moved = ledger::move_all(&mut journal, previous, new_owner, &load)?;
            self.commit(journal);
            self.owner = new_owner;

            if moved > 0 {
                self.env().emit_event(Transfer {
                    from: Some(previous),
                    to: Some(new_owner),
                    value: moved,
                });
            }
            self.env().emit_event(OwnershipTransferred {
                previous: Some(previous),
                new: new_owner,
            });
            Ok(())
        }

        // ── Internals ────────────────────────────────────────────────────────

        fn load(&self, who: AccountId) -> AccountBalance {
            self.accounts.get(who).unwrap_or_default()
        }

        /// Validate and stage a transfer without touching storage.
        fn plan_transfer(
            &self,
            from: AccountId,
            to: AccountId,
            amount: Balance,
        ) -> Result<(Journal<AccountId>, FeeSplit), Error> {
            if amount == 0 {
                return Err(Error::InvalidAmount);
            }
            let exempt = self.is_excluded_from_fee(from) || self.is_excluded_from_fee(to);
            if !exempt && amount > self.max_tx_amount {
                return Err(Error::ExceedsMaxTransaction);
            }
            let split = FeeSplit::compute(amount, &self.fees, exempt)?;

            let parties = Parties {
                sender: from,
                recipient: to,
                community: self.community,
                maintenance: self.maintenance,
                liquidity_wallet: self.liquidity_wallet,
            };
            let mut journal = Journal::new(self.supply.clone());
            let load = |who: AccountId| self.load(who);
            ledger::apply_transfer(&mut journal, &parties, &split, &load)?;
            Ok((journal, split))
        }

        fn finish_transfer(
            &mut self,
            from: AccountId,
            to: AccountId,
            journal: Journal<AccountId>,
            split: FeeSplit,
        ) -> Result<(), Error> {
            let fee_total = split.total_fee()?;
            let paid = self
                .total_fees_paid(from)
                .checked_add(fee_total)
                .ok_or(Error::Overflow)?;
            let redistributed = self
                .total_redistributed
                .checked_add(split.redistribution)
                .ok_or(Error::Overflow)?;

            self.commit(journal);
            if fee_total > 0 {
                self.fee_history.insert(from, &paid);
            }
            self.total_redistributed = redistributed;

            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value: split.net,
            });
            if split.is_taxed() {
                self.env().emit_event(FeesDeducted {
                    from,
                    redistribution: split.redistribution,
                    community: split.community,
                    maintenance: split.maintenance,
                    liquidity: split.liquidity,
                });
            }
            Ok(())
        }

        fn commit(&mut self, journal: Journal<AccountId>) {
            let (supply, touched) = journal.into_parts();
            self.supply = supply;
            for (who, balance) in touched {
                self.accounts.insert(who, &balance);
            }
        }

        fn write_allowance(&mut self, owner: AccountId, spender: AccountId, value: Balance) {
            self.allowances.insert((owner, spender), &value);
            self.env().emit_event(Approval { owner, spender, value });
        }

        /// Negative → owner → timelock → ceiling.
        fn set_fee(&mut self, kind: FeeKind, value: i32) -> Result<(), Error> {
            if value < 0 {
                return Err(Error::NegativeValue);
            }
            self.only_owner()?;
            self.gate
                .ensure_fee_change_allowed(self.env().block_timestamp())?;
            let value = fees::non_negative(value)?;
            let old = self.fees.set(kind, value)?;
            self.env().emit_event(FeePercentUpdated { kind, old, new: value });
            Ok(())
        }

        fn only_owner(&self) -> Result<(), Error> {
            if self.env().caller() != self.owner {
                return Err(Error::Unauthorized);
            }
            Ok(())
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
