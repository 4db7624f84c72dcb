//! Balance movement over a write-back journal.
//!
//! Every fallible step of a transfer runs against a [`Journal`]: a copy of the
//! supply plus the accounts touched so far. The contract persists the journal
//! only once the whole operation has succeeded, so an error anywhere leaves
//! storage untouched. Reading an account through the journal also makes
//! aliased parties (sender == recipient, beneficiary == recipient, ...) see
//! each other's updates.

use ink::prelude::collections::BTreeMap;

use crate::account::AccountBalance;
use crate::errors::{Error, Result};
use crate::fees::{FeeSplit, ScaledSplit};
use crate::rate::Supply;
use crate::Balance;

pub struct Journal<K> {
    supply: Supply,
    accounts: BTreeMap<K, AccountBalance>,
}

impl<K: Ord + Copy> Journal<K> {
    pub fn new(supply: Supply) -> Self {
        Self {
            supply,
            accounts: BTreeMap::new(),
        }
    }

    pub fn supply(&self) -> &Supply {
        &self.supply
    }

    pub fn supply_mut(&mut self) -> &mut Supply {
        &mut self.supply
    }

    /// Current view of `who`, loading it from storage on first use.
    pub fn account<F>(&mut self, who: K, load: &F) -> AccountBalance
    where
        F: Fn(K) -> AccountBalance,
    {
        *self.accounts.entry(who).or_insert_with(|| load(who))
    }

    pub fn set_account(&mut self, who: K, account: AccountBalance) {
        self.accounts.insert(who, account);
    }

    pub fn debit<F>(&mut self, who: K, t_amount: Balance, r_amount: Balance, load: &F) -> Result<()>
    where
        F: Fn(K) -> AccountBalance,
    {
        let account = self.accounts.entry(who).or_insert_with(|| load(who));
        account.debit(&mut self.supply, t_amount, r_amount)
    }

    pub fn credit<F>(&mut self, who: K, t_amount: Balance, r_amount: Balance, load: &F) -> Result<()>
    where
        F: Fn(K) -> AccountBalance,
    {
        let account = self.accounts.entry(who).or_insert_with(|| load(who));
        account.credit(&mut self.supply, t_amount, r_amount)
    }

    pub fn into_parts(self) -> (Supply, BTreeMap<K, AccountBalance>) {
        (self.supply, self.accounts)
    }
}

/// Everyone a taxed transfer can credit.
#[derive(Debug, Clone, Copy)]
pub struct Parties<K> {
    pub sender: K,
    pub recipient: K,
    pub community: K,
    pub maintenance: K,
    pub liquidity_wallet: K,
}

/// Move `split` from sender to recipient and beneficiaries, then redistribute
/// the tax. Amount, fee exemption and max-tx checks are the caller's job.
pub fn apply_transfer<K, F>(
    journal: &mut Journal<K>,
    parties: &Parties<K>,
    split: &FeeSplit,
    load: &F,
) -> Result<ScaledSplit>
where
    K: Ord + Copy,
    F: Fn(K) -> AccountBalance,
{
    let sender = journal.account(parties.sender, load);
    if sender.exact_balance(journal.supply())? < split.amount {
        return Err(Error::InsufficientBalance);
    }

    let r_amount = match sender {
        // draining an excluded holder releases every scaled unit it has
        AccountBalance::Excluded { r_owned, t_owned } if t_owned == split.amount => r_owned,
        _ => journal.supply().to_scaled(split.amount)?.min(sender.r_owned()),
    };
    // every r-value is fixed against the rate before this transfer
    let scaled = split.scale(journal.supply(), r_amount)?;

    journal.debit(parties.sender, split.amount, r_amount, load)?;
    journal.credit(parties.recipient, split.net, scaled.net, load)?;

    let beneficiaries = [
        (parties.community, split.community, scaled.community),
        (parties.maintenance, split.maintenance, scaled.maintenance),
        (parties.liquidity_wallet, split.liquidity, scaled.liquidity),
    ];
    for (who, t_fee, r_fee) in beneficiaries {
        if t_fee > 0 || r_fee > 0 {
            journal.credit(who, t_fee, r_fee, load)?;
        }
    }

    if scaled.redistribution > 0 {
        journal.supply_mut().redistribute(scaled.redistribution)?;
    }
    Ok(scaled)
}

/// Move the entire balance of `from` to `to` without fees. Returns the exact
/// amount moved.
pub fn move_all<K, F>(journal: &mut Journal<K>, from: K, to: K, load: &F) -> Result<Balance>
where
    K: Ord + Copy,
    F: Fn(K) -> AccountBalance,
{
    let source = journal.account(from, load);
    let t_amount = source.exact_balance(journal.supply())?;
    let r_amount = source.r_owned();
    if t_amount == 0 && r_amount == 0 {
        return Ok(0);
    }
    journal.debit(from, t_amount, r_amount, load)?;
    journal.credit(to, t_amount, r_amount, load)?;
    Ok(t_amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::FeeConfig;

    const OWNER: u8 = 0;
    const BOB: u8 = 1;
    const CHARLIE: u8 = 2;
    const COMMUNITY: u8 = 10;
    const MAINTENANCE: u8 = 11;
    const LIQUIDITY: u8 = 12;

    const T_TOTAL: Balance = 1_000_000;

    fn parties(sender: u8, recipient: u8) -> Parties<u8> {
        Parties {
            sender,
            recipient,
            community: COMMUNITY,
            maintenance: MAINTENANCE,
            liquidity_wallet: LIQUIDITY,
        }
    }

    /// Owner holds everything, beneficiaries excluded with nothing.
    fn genesis() -> (Supply, BTreeMap<u8, AccountBalance>) {
        let supply = Supply::new(T_TOTAL).unwrap();
        let mut accounts = BTreeMap::new();
        accounts.insert(
            OWNER,
            AccountBalance::Included {
                r_owned: supply.r_total(),
            },
        );
        for who in [COMMUNITY, MAINTENANCE, LIQUIDITY] {
            accounts.insert(who, AccountBalance::Excluded { r_owned: 0, t_owned: 0 });
        }
        (supply, accounts)
    }

    fn run(
        state: &mut (Supply, BTreeMap<u8, AccountBalance>),
        sender: u8,
        recipient: u8,
        amount: Balance,
        exempt: bool,
    ) -> Result<ScaledSplit> {
        let split = FeeSplit::compute(amount, &FeeConfig::default(), exempt)?;
        let stored = state.1.clone();
        let load = move |who: u8| stored.get(&who).copied().unwrap_or_default();
        let mut journal = Journal::new(state.0.clone());
        let scaled = apply_transfer(&mut journal, &parties(sender, recipient), &split, &load)?;
        let (supply, touched) = journal.into_parts();
        state.0 = supply;
        state.1.extend(touched);
        Ok(scaled)
    }

    fn balance(state: &(Supply, BTreeMap<u8, AccountBalance>), who: u8) -> Balance {
        state
            .1
            .get(&who)
            .copied()
            .unwrap_or_default()
            .exact_balance(&state.0)
            .unwrap()
    }

    fn r_sum(state: &(Supply, BTreeMap<u8, AccountBalance>)) -> Balance {
        state.1.values().map(|a| a.r_owned()).sum()
    }

    #[test]
    fn taxed_transfer_pays_everyone() {
        let mut state = genesis();
        run(&mut state, OWNER, BOB, 1_000, true).unwrap();
        run(&mut state, BOB, CHARLIE, 200, false).unwrap();

        assert_eq!(balance(&state, CHARLIE), 180);
        assert_eq!(balance(&state, BOB), 800);
        assert_eq!(balance(&state, COMMUNITY), 6);
        assert_eq!(balance(&state, MAINTENANCE), 6);
        assert_eq!(balance(&state, LIQUIDITY), 6);
        assert_eq!(r_sum(&state), state.0.r_total());
    }

    #[test]
    fn redistribution_reaches_included_holders() {
        let mut state = genesis();
        run(&mut state, OWNER, BOB, 500_000, true).unwrap();
        run(&mut state, BOB, CHARLIE, 100_000, false).unwrap();

        // 1_000 redistributed over the 900_000 still circulating
        let owner = balance(&state, OWNER);
        let bob = balance(&state, BOB);
        let charlie = balance(&state, CHARLIE);
        assert!(owner > 500_000);
        assert!(bob > 400_000);
        assert!(charlie > 90_000);
        assert!(owner + bob + charlie + 9_000 <= T_TOTAL);
        assert_eq!(r_sum(&state), state.0.r_total());
    }

    #[test]
    fn failed_transfer_leaves_state_untouched() {
        let mut state = genesis();
        run(&mut state, OWNER, BOB, 100, true).unwrap();
        let before = state.clone();

        assert_eq!(
            run(&mut state, BOB, CHARLIE, 101, false),
            Err(Error::InsufficientBalance)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn self_transfer_only_costs_fees() {
        let mut state = genesis();
        run(&mut state, OWNER, BOB, 1_000, true).unwrap();
        run(&mut state, BOB, BOB, 200, false).unwrap();
        // 20 in fees, bob gets back a share of the 2 redistributed
        let bob = balance(&state, BOB);
        assert!(bob >= 980 && bob <= 982);
        assert_eq!(r_sum(&state), state.0.r_total());
    }

    #[test]
    fn beneficiary_as_recipient_is_credited_twice() {
        let mut state = genesis();
        run(&mut state, OWNER, BOB, 1_000, true).unwrap();
        run(&mut state, BOB, COMMUNITY, 200, false).unwrap();
        assert_eq!(balance(&state, COMMUNITY), 186);
        assert_eq!(state.0.excluded_t(), 198);
    }

    #[test]
    fn draining_an_excluded_sender_zeroes_both_units() {
        let mut state = genesis();
        run(&mut state, OWNER, BOB, 1_000, true).unwrap();
        run(&mut state, BOB, CHARLIE, 500, false).unwrap();
        let community = balance(&state, COMMUNITY);

        run(&mut state, COMMUNITY, CHARLIE, community, true).unwrap();
        assert_eq!(state.1[&COMMUNITY], AccountBalance::Excluded { r_owned: 0, t_owned: 0 });
        assert_eq!(r_sum(&state), state.0.r_total());
    }

    #[test]
    fn move_all_carries_the_full_balance() {
        let mut state = genesis();
        run(&mut state, OWNER, BOB, 1_000, true).unwrap();

        let stored = state.1.clone();
        let load = move |who: u8| stored.get(&who).copied().unwrap_or_default();
        let mut journal = Journal::new(state.0.clone());
        let moved = move_all(&mut journal, OWNER, CHARLIE, &load).unwrap();
        let (supply, touched) = journal.into_parts();
        state.0 = supply;
        state.1.extend(touched);

        assert_eq!(moved, T_TOTAL - 1_000);
        assert_eq!(balance(&state, OWNER), 0);
        assert_eq!(balance(&state, CHARLIE), T_TOTAL - 1_000);
    }
}
