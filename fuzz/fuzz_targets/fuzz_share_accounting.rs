#![no_main]

//! Runtime-free fuzzing of the checkpoint engine: random interleavings of
//! deposits, withdraws and idle slots from several holders, checked against
//! the ledger invariants after every step.

use anchor_lang::prelude::Pubkey;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use yield_vault::state::Vault;

const HOLDERS: usize = 4;

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Op {
    Deposit { holder: u8, amount: u32 },
    Withdraw { holder: u8, fraction: u8 },
    Advance { slots: u8 },
}

#[derive(Debug, Clone, Arbitrary)]
struct SequenceInput {
    accrual_rate: u16,
    start_slot: u32,
    ops: Vec<Op>,
}

struct Model {
    vault: Vault,
    slot: u64,
    total_shares: u64,
    shares: [u64; HOLDERS],
    custody: u64,
}

impl Model {
    fn check(&self) {
        // Conservation: no share exists outside a holder balance
        assert_eq!(self.shares.iter().sum::<u64>(), self.total_shares);
        // Custody backs the recorded balance after every operation
        assert_eq!(self.custody, self.vault.recorded_balance);
        assert!(self.vault.recorded_slot <= self.slot);
    }
}

fuzz_target!(|input: SequenceInput| {
    let start_slot = input.start_slot as u64;
    let mut model = Model {
        vault: Vault {
            share_mint: Pubkey::default(),
            underlying_mint: Pubkey::default(),
            vault_token_account: Pubkey::default(),
            accrual_rate: input.accrual_rate as u64,
            recorded_balance: 0,
            recorded_slot: start_slot,
            bump: 255,
        },
        slot: start_slot,
        total_shares: 0,
        shares: [0; HOLDERS],
        custody: 0,
    };

    for op in input.ops.into_iter().take(64) {
        match op {
            Op::Advance { slots } => {
                let notional_before = model
                    .vault
                    .notional_balance(model.total_shares, model.slot)
                    .unwrap();
                model.slot += slots as u64;
                let notional_after = model
                    .vault
                    .notional_balance(model.total_shares, model.slot)
                    .unwrap();
                // Same share count, later slot: notional never falls
                assert!(notional_after >= notional_before);
            }
            Op::Deposit { holder, amount } => {
                let holder = holder as usize % HOLDERS;
                let amount = amount as u64;
                let Ok(quote) = model
                    .vault
                    .quote_deposit(amount, model.total_shares, model.slot)
                else {
                    assert_eq!(amount, 0);
                    continue;
                };
                if quote.shares == 0 {
                    continue;
                }

                if model.total_shares == 0 {
                    assert_eq!(quote.shares, amount);
                } else {
                    // Rounding never favours the depositor
                    assert!(
                        quote.shares as u128 * quote.notional as u128
                            <= amount as u128 * model.total_shares as u128
                    );
                }

                model
                    .vault
                    .record_deposit(amount, &quote, model.slot)
                    .unwrap();
                model.custody += amount + quote.accrued;
                model.total_shares += quote.shares;
                model.shares[holder] += quote.shares;

                // Immediate exit in the same slot never returns more than paid
                let exit = model
                    .vault
                    .quote_withdraw(quote.shares, model.total_shares, model.slot)
                    .unwrap();
                assert!(exit.assets <= amount, "round trip profit: {:?}", exit);
            }
            Op::Withdraw { holder, fraction } => {
                let holder = holder as usize % HOLDERS;
                let held = model.shares[holder];
                let shares = held * (fraction as u64 % 101) / 100;
                if shares == 0 {
                    continue;
                }

                let quote = model
                    .vault
                    .quote_withdraw(shares, model.total_shares, model.slot)
                    .unwrap();
                assert!(model.custody + quote.accrued >= quote.assets);

                model.vault.record_withdraw(&quote, model.slot).unwrap();
                model.custody = model.custody + quote.accrued - quote.assets;
                model.total_shares -= shares;
                model.shares[holder] -= shares;

                if model.total_shares == 0 {
                    // Last holder out takes everything that was recorded
                    assert_eq!(model.vault.recorded_balance, 0);
                }
            }
        }

        model.check();
    }
});
