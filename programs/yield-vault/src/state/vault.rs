use anchor_lang::prelude::*;

use crate::error::VaultError;
use crate::math;

#[account]
pub struct Vault {
    /// The mint account for shares tokens (minted on deposits, burned on withdraws)
    pub share_mint: Pubkey,
    /// The mint account for the underlying asset held by the vault
    pub underlying_mint: Pubkey,
    /// The token account that holds the underlying assets
    pub vault_token_account: Pubkey,
    /// Underlying base units added to the notional balance per slot
    pub accrual_rate: u64,
    /// Notional underlying balance as of `recorded_slot`
    pub recorded_balance: u64,
    /// Slot of the last deposit or withdraw
    pub recorded_slot: u64,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

/// Result of pricing a deposit against the current checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositQuote {
    pub notional: u64,
    pub accrued: u64,
    pub shares: u64,
}

/// Result of pricing a withdraw against the current checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawQuote {
    pub notional: u64,
    pub accrued: u64,
    pub assets: u64,
}

impl Vault {
    pub const LEN: usize = 8 + // discriminator
        32 + // share_mint
        32 + // underlying_mint
        32 + // vault_token_account
        8 + // accrual_rate
        8 + // recorded_balance
        8 + // recorded_slot
        1; // bump

    /// Accrual only runs while someone holds shares.
    fn effective_rate(&self, total_shares: u64) -> u64 {
        if total_shares == 0 {
            0
        } else {
            self.accrual_rate
        }
    }

    pub fn notional_balance(&self, total_shares: u64, slot: u64) -> Result<u64> {
        math::notional_balance(
            self.recorded_balance,
            self.effective_rate(total_shares),
            self.recorded_slot,
            slot,
        )
    }

    fn accrued(&self, notional: u64) -> Result<u64> {
        notional
            .checked_sub(self.recorded_balance)
            .ok_or_else(|| error!(VaultError::MathOverflow))
    }

    pub fn quote_deposit(&self, amount: u64, total_shares: u64, slot: u64) -> Result<DepositQuote> {
        require!(amount > 0, VaultError::InvalidAmount);

        let notional = self.notional_balance(total_shares, slot)?;
        let shares = math::shares_for_deposit(amount, total_shares, notional)?;

        Ok(DepositQuote {
            notional,
            accrued: self.accrued(notional)?,
            shares,
        })
    }

    pub fn quote_withdraw(&self, shares: u64, total_shares: u64, slot: u64) -> Result<WithdrawQuote> {
        require!(shares > 0, VaultError::InvalidAmount);
        require!(shares <= total_shares, VaultError::InsufficientShares);

        let notional = self.notional_balance(total_shares, slot)?;
        let assets = math::assets_for_shares(shares, total_shares, notional)?;

        Ok(WithdrawQuote {
            notional,
            accrued: self.accrued(notional)?,
            assets,
        })
    }

    pub fn record_deposit(&mut self, amount: u64, quote: &DepositQuote, slot: u64) -> Result<()> {
        self.recorded_balance = quote
            .notional
            .checked_add(amount)
            .ok_or(VaultError::MathOverflow)?;
        self.recorded_slot = slot;
        Ok(())
    }

    pub fn record_withdraw(&mut self, quote: &WithdrawQuote, slot: u64) -> Result<()> {
        self.recorded_balance = quote
            .notional
            .checked_sub(quote.assets)
            .ok_or(VaultError::MathOverflow)?;
        self.recorded_slot = slot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anchor_lang::error::Error;

    use super::*;

    const RATE: u64 = 10;

    fn vault_at(slot: u64) -> Vault {
        Vault {
            share_mint: Pubkey::default(),
            underlying_mint: Pubkey::default(),
            vault_token_account: Pubkey::default(),
            accrual_rate: RATE,
            recorded_balance: 0,
            recorded_slot: slot,
            bump: 255,
        }
    }

    /// Mirrors the deposit/withdraw handlers: share mint supply, holder
    /// accounts and custody tracked alongside the checkpoint.
    struct Ledger {
        vault: Vault,
        total_shares: u64,
        holders: HashMap<&'static str, u64>,
        custody: u64,
    }

    impl Ledger {
        fn new(slot: u64) -> Self {
            Self {
                vault: vault_at(slot),
                total_shares: 0,
                holders: HashMap::new(),
                custody: 0,
            }
        }

        fn deposit(&mut self, who: &'static str, amount: u64, slot: u64) -> Result<u64> {
            let quote = self.vault.quote_deposit(amount, self.total_shares, slot)?;
            require!(quote.shares > 0, VaultError::ZeroSharesMinted);
            self.vault.record_deposit(amount, &quote, slot)?;

            self.custody += amount + quote.accrued;
            self.total_shares += quote.shares;
            *self.holders.entry(who).or_default() += quote.shares;
            Ok(quote.shares)
        }

        fn withdraw(&mut self, who: &'static str, shares: u64, slot: u64) -> Result<u64> {
            let held = self.holders.get(who).copied().unwrap_or_default();
            require!(held >= shares, VaultError::InsufficientShares);

            let quote = self.vault.quote_withdraw(shares, self.total_shares, slot)?;
            require!(
                self.custody + quote.accrued >= quote.assets,
                VaultError::CustodyShortfall
            );
            self.vault.record_withdraw(&quote, slot)?;

            self.custody = self.custody + quote.accrued - quote.assets;
            self.total_shares -= shares;
            *self.holders.get_mut(who).unwrap() -= shares;
            Ok(quote.assets)
        }

        fn assert_invariants(&self) {
            assert_eq!(self.holders.values().sum::<u64>(), self.total_shares);
            assert_eq!(self.custody, self.vault.recorded_balance);
        }
    }

    #[test]
    fn test_bootstrap_deposit_mints_one_to_one() {
        let mut ledger = Ledger::new(100);
        assert_eq!(ledger.deposit("alice", 1_000, 100).unwrap(), 1_000);
        assert_eq!(ledger.vault.recorded_balance, 1_000);
        assert_eq!(ledger.vault.recorded_slot, 100);
        ledger.assert_invariants();
    }

    #[test]
    fn test_full_withdraw_after_five_slots() {
        let mut ledger = Ledger::new(0);
        ledger.deposit("alice", 1_000, 10).unwrap();

        assert_eq!(ledger.withdraw("alice", 1_000, 15).unwrap(), 1_050);
        assert_eq!(ledger.total_shares, 0);
        assert_eq!(ledger.vault.recorded_balance, 0);
        assert_eq!(ledger.vault.recorded_slot, 15);
        ledger.assert_invariants();
    }

    #[test]
    fn test_second_deposit_priced_against_notional() {
        let mut ledger = Ledger::new(0);
        ledger.deposit("alice", 1_000, 10).unwrap();

        let before = ledger.vault.clone();
        let quote = before.quote_deposit(100, ledger.total_shares, 15).unwrap();
        assert_eq!(quote.notional, 1_000 + RATE * 5);
        assert_eq!(quote.accrued, RATE * 5);

        let shares = ledger.deposit("bob", 100, 15).unwrap();
        assert_eq!(shares, 100 * 1_000 / (1_000 + RATE * 5));
        assert_eq!(ledger.vault.recorded_balance, quote.notional + 100);
        assert_eq!(ledger.vault.recorded_slot, 15);
        ledger.assert_invariants();
    }

    #[test]
    fn test_double_withdraw_shares_accrual_evenly() {
        let mut ledger = Ledger::new(0);
        assert_eq!(ledger.deposit("alice", 500, 1).unwrap(), 500);
        // 20 accrued over two slots, so 520 buys exactly 500 shares.
        assert_eq!(ledger.deposit("bob", 520, 3).unwrap(), 500);
        assert_eq!(ledger.vault.recorded_balance, 1_040);

        assert_eq!(ledger.withdraw("alice", 500, 8).unwrap(), 545);
        ledger.assert_invariants();
        assert_eq!(ledger.withdraw("bob", 500, 13).unwrap(), 595);
        ledger.assert_invariants();
        assert_eq!(ledger.total_shares, 0);
    }

    #[test]
    fn test_idle_vault_does_not_accrue() {
        let vault = vault_at(0);
        assert_eq!(vault.notional_balance(0, 1_000).unwrap(), 0);

        let quote = vault.quote_deposit(700, 0, 1_000).unwrap();
        assert_eq!(quote.shares, 700);
        assert_eq!(quote.accrued, 0);
    }

    #[test]
    fn test_rate_is_monotonic_in_slot() {
        let mut ledger = Ledger::new(0);
        ledger.deposit("alice", 3_333, 0).unwrap();
        let total = ledger.total_shares as u128;
        let scale = 1_000_000_000u128;

        let mut last_rate = 0u128;
        for slot in 0..50 {
            let notional = ledger.vault.notional_balance(ledger.total_shares, slot).unwrap() as u128;
            let rate = notional * scale / total;
            assert!(rate >= last_rate, "rate fell at slot {slot}");
            last_rate = rate;
        }
    }

    #[test]
    fn test_round_trip_in_same_slot_never_profits() {
        let mut ledger = Ledger::new(0);
        ledger.deposit("alice", 1_000, 0).unwrap();
        ledger.deposit("bob", 1, 3).ok();
        ledger.deposit("bob", 7_777, 9).unwrap();

        for amount in [1u64, 13, 999, 12_345] {
            let shares = match ledger.deposit("carol", amount, 20) {
                Ok(shares) => shares,
                Err(_) => continue,
            };
            let back = ledger.withdraw("carol", shares, 20).unwrap();
            assert!(back <= amount, "deposited {amount}, withdrew {back}");
            ledger.assert_invariants();
        }
    }

    #[test]
    fn test_conservation_across_interleaved_operations() {
        let mut ledger = Ledger::new(0);
        let users = ["alice", "bob", "carol"];
        let mut slot = 0;

        for round in 0..30u64 {
            slot += round % 4;
            let who = users[(round % 3) as usize];
            if round % 5 == 4 {
                let held = ledger.holders.get(who).copied().unwrap_or_default();
                if held > 1 {
                    ledger.withdraw(who, held / 2, slot).unwrap();
                }
            } else {
                ledger.deposit(who, 100 + round * 37, slot).unwrap();
            }
            ledger.assert_invariants();
        }

        // Everyone exits; the pool pays out exactly what it recorded.
        for who in users {
            let held = ledger.holders.get(who).copied().unwrap_or_default();
            if held > 0 {
                ledger.withdraw(who, held, slot).unwrap();
            }
            ledger.assert_invariants();
        }
        assert_eq!(ledger.total_shares, 0);
    }

    #[test]
    fn test_withdraw_more_than_held_is_rejected() {
        let mut ledger = Ledger::new(0);
        ledger.deposit("alice", 100, 0).unwrap();

        let err = ledger.withdraw("alice", 500, 1).unwrap_err();
        assert_eq!(err, Error::from(VaultError::InsufficientShares));
        assert_eq!(ledger.vault.recorded_slot, 0);
        ledger.assert_invariants();
    }

    #[test]
    fn test_zero_amounts_are_rejected_without_state_change() {
        let vault = vault_at(5);
        assert_eq!(
            vault.quote_deposit(0, 0, 6).unwrap_err(),
            Error::from(VaultError::InvalidAmount)
        );
        assert_eq!(
            vault.quote_withdraw(0, 10, 6).unwrap_err(),
            Error::from(VaultError::InvalidAmount)
        );
        assert_eq!(vault.recorded_slot, 5);
    }

    #[test]
    fn test_dust_deposit_mints_zero_shares() {
        let mut ledger = Ledger::new(0);
        ledger.deposit("alice", 1_000, 0).unwrap();

        let quote = ledger.vault.quote_deposit(1, ledger.total_shares, 5).unwrap();
        assert_eq!(quote.shares, 0);
        assert_eq!(
            ledger.deposit("bob", 1, 5).unwrap_err(),
            Error::from(VaultError::ZeroSharesMinted)
        );
        assert_eq!(ledger.vault.recorded_slot, 0);
    }

    #[test]
    fn test_checkpoint_behind_clock_is_an_invariant_violation() {
        let vault = vault_at(50);
        assert_eq!(
            vault.quote_deposit(10, 0, 49).unwrap_err(),
            Error::from(VaultError::SlotRegression)
        );
    }
}
