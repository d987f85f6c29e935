#![no_main]

use arbitrary::Arbitrary;
use fuzz_helpers::*;
use libfuzzer_sys::fuzz_target;
use solana_sdk::signature::Signer;
use yield_vault::error::VaultError;
use yield_vault::events::Withdrawn;

/// Fuzzable input for withdraw instruction
#[derive(Debug, Clone, Arbitrary)]
struct WithdrawFuzzInput {
    /// Amount deposited before withdrawing
    deposit_amount: u64,
    /// Shares to withdraw, may exceed the holding
    shares: u64,
    /// Token decimals (for setup)
    decimals: u8,
    /// Per-slot accrual configured on the vault
    accrual_rate: u32,
    /// Slots to advance between deposit and withdraw
    slots_elapsed: u16,
}

/// Execute a single fuzz iteration for the withdraw instruction
async fn fuzz_withdraw_once(input: WithdrawFuzzInput) -> FuzzResult<()> {
    let deposit_amount = (input.deposit_amount % 1_000_000_000_000).max(1);
    let shares = input.shares % (deposit_amount * 2);
    let decimals = input.decimals % 10;
    let accrual_rate = input.accrual_rate as u64;
    let slots_elapsed = input.slots_elapsed as u64;

    let (mut env, setup) =
        match setup_complete_environment(deposit_amount, decimals, accrual_rate).await {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Setup failed: {}", e);
                return Ok(());
            }
        };

    let ix = deposit_ix(&env.program_id, &setup, &setup.user, deposit_amount, 0);
    if send(&mut env.context, &[ix], &setup.user.owner).await.is_err() {
        return Ok(());
    }

    advance_slots(&mut env.context, slots_elapsed).await?;

    let vault_before = get_vault_state(&mut env.context, &setup.vault.vault).await?;
    let custody_before =
        get_token_balance(&mut env.context, &setup.vault.vault_token_account).await?;
    let share_supply_before = get_mint_supply(&mut env.context, &setup.vault.share_mint).await?;
    let user_balance_before =
        get_token_balance(&mut env.context, &setup.user.underlying_token_account).await?;
    let user_shares_before =
        get_token_balance(&mut env.context, &setup.user.share_token_account).await?;
    let slot = current_slot(&mut env.context).await?;

    let ix = withdraw_ix(&env.program_id, &setup, &setup.user, shares);
    let result = send_with_logs(&mut env.context, &[ix], &setup.user.owner).await;

    let notional =
        vault_before.recorded_balance + accrual_rate * (slot - vault_before.recorded_slot);

    match result {
        Ok(logs) => {
            let vault_after = get_vault_state(&mut env.context, &setup.vault.vault).await?;
            let custody_after =
                get_token_balance(&mut env.context, &setup.vault.vault_token_account).await?;
            let share_supply_after =
                get_mint_supply(&mut env.context, &setup.vault.share_mint).await?;
            let user_balance_after =
                get_token_balance(&mut env.context, &setup.user.underlying_token_account).await?;
            let user_shares_after =
                get_token_balance(&mut env.context, &setup.user.share_token_account).await?;

            let returned = user_balance_after - user_balance_before;
            let expected =
                (shares as u128 * notional as u128 / share_supply_before as u128) as u64;

            // Payout is the floor of the holder's proportional claim
            assert_eq!(
                returned, expected,
                "Withdraw payout incorrect. shares={}, notional={}, supply={}",
                shares, notional, share_supply_before
            );

            // Shares are burned, not moved
            assert_eq!(user_shares_after, user_shares_before - shares);
            assert_eq!(share_supply_after, share_supply_before - shares);

            // Checkpoint and custody agree after payout
            assert_eq!(vault_after.recorded_balance, notional - returned);
            assert_eq!(vault_after.recorded_slot, slot);
            assert_eq!(
                custody_after, vault_after.recorded_balance,
                "Custody must back the recorded balance"
            );

            // A sole holder exiting fully receives the whole notional balance
            if shares == share_supply_before {
                assert_eq!(returned, notional);
            }

            // The emitted event reports what actually moved
            let event: Withdrawn = find_event(&logs).ok_or("Withdrawn event not emitted")?;
            assert_eq!(event.withdrawer, setup.user.owner.pubkey());
            assert_eq!(event.amount_out, returned);
            assert_eq!(event.shares_in, user_shares_before - user_shares_after);

            println!(
                "✓ PASS - withdraw shares={}, returned={}, notional={}, slots={}",
                shares, returned, notional, slots_elapsed
            );
        }
        Err(e) => {
            println!("✗ Withdraw failed: shares={}, error={:?}", shares, e);

            if shares == 0 {
                assert!(is_vault_error(&e, VaultError::InvalidAmount));
            } else if shares > user_shares_before {
                assert!(is_vault_error(&e, VaultError::InsufficientShares));
            } else {
                let acceptable = [VaultError::ZeroAssetsReturned, VaultError::MathOverflow];
                if !acceptable.into_iter().any(|code| is_vault_error(&e, code)) {
                    panic!("Unexpected error during withdraw: {:?}\nInput: {:?}", e, input);
                }
            }

            let vault_after = get_vault_state(&mut env.context, &setup.vault.vault).await?;
            assert_eq!(vault_after.recorded_balance, vault_before.recorded_balance);
            assert_eq!(vault_after.recorded_slot, vault_before.recorded_slot);
            let custody_after =
                get_token_balance(&mut env.context, &setup.vault.vault_token_account).await?;
            assert_eq!(custody_after, custody_before);
        }
    }

    Ok(())
}

fuzz_target!(|input: WithdrawFuzzInput| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        if let Err(e) = fuzz_withdraw_once(input).await {
            eprintln!("Fuzz iteration failed: {}", e);
        }
    });
});
