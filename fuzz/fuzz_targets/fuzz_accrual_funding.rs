#![no_main]

use arbitrary::Arbitrary;
use fuzz_helpers::*;
use libfuzzer_sys::fuzz_target;
use solana_sdk::signature::Signer;
use yield_vault::error::VaultError;

/// Accrual with the minter role moved away from the vault
#[derive(Debug, Clone, Arbitrary)]
struct AccrualFundingInput {
    /// First deposit, also the second deposit attempt
    deposit_amount: u64,
    /// Per-slot accrual configured on the vault
    accrual_rate: u32,
    /// Slots to advance after the minter is revoked
    slots_elapsed: u16,
    /// Percentage of the holding to withdraw (1..=100)
    withdraw_percent: u8,
}

struct Snapshot {
    recorded_balance: u64,
    recorded_slot: u64,
    custody: u64,
    share_supply: u64,
}

async fn snapshot(env: &mut FuzzTestEnv, setup: &CompleteSetup) -> FuzzResult<Snapshot> {
    let vault = get_vault_state(&mut env.context, &setup.vault.vault).await?;
    Ok(Snapshot {
        recorded_balance: vault.recorded_balance,
        recorded_slot: vault.recorded_slot,
        custody: get_token_balance(&mut env.context, &setup.vault.vault_token_account).await?,
        share_supply: get_mint_supply(&mut env.context, &setup.vault.share_mint).await?,
    })
}

fn assert_untouched(before: &Snapshot, after: &Snapshot) {
    assert_eq!(after.recorded_balance, before.recorded_balance);
    assert_eq!(after.recorded_slot, before.recorded_slot);
    assert_eq!(after.custody, before.custody, "Custody moved on refusal");
    assert_eq!(after.share_supply, before.share_supply);
}

async fn fuzz_accrual_funding_once(input: AccrualFundingInput) -> FuzzResult<()> {
    let amount = (input.deposit_amount % 1_000_000_000_000).max(1);
    let accrual_rate = input.accrual_rate as u64;
    let slots_elapsed = input.slots_elapsed as u64;

    let (mut env, setup) = match setup_complete_environment(amount * 2, 6, accrual_rate).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Setup failed: {}", e);
            return Ok(());
        }
    };

    let ix = deposit_ix(&env.program_id, &setup, &setup.user, amount, 0);
    send(&mut env.context, &[ix], &setup.user.owner).await?;

    // Owner takes the minter role back from the vault
    let owner = setup.protocol.owner.pubkey();
    let ix = set_minter_ix(&env.program_id, &setup.protocol, &owner, owner);
    send(&mut env.context, &[ix], &setup.protocol.owner).await?;

    advance_slots(&mut env.context, slots_elapsed).await?;

    let before = snapshot(&mut env, &setup).await?;
    let slot = current_slot(&mut env.context).await?;
    let accrued = accrual_rate * (slot - before.recorded_slot);
    let notional = before.recorded_balance + accrued;

    let percent = (input.withdraw_percent % 100) as u64 + 1;
    let shares = (before.share_supply * percent / 100).max(1);
    let expected_payout =
        (shares as u128 * notional as u128 / before.share_supply as u128) as u64;

    if accrued > 0 {
        // Deposit: a zero-share quote is refused before the minter is consulted
        let expected_shares =
            (amount as u128 * before.share_supply as u128 / notional as u128) as u64;
        let ix = deposit_ix(&env.program_id, &setup, &setup.user, amount, 0);
        let e = send(&mut env.context, &[ix], &setup.user.owner)
            .await
            .expect_err("Deposit funded accrual without the minter role");
        let code = if expected_shares == 0 {
            VaultError::ZeroSharesMinted
        } else {
            VaultError::VaultNotMinter
        };
        assert!(is_vault_error(&e, code), "Wrong deposit refusal: {:?}", e);
        assert_untouched(&before, &snapshot(&mut env, &setup).await?);

        let ix = withdraw_ix(&env.program_id, &setup, &setup.user, shares);
        let e = send(&mut env.context, &[ix], &setup.user.owner)
            .await
            .expect_err("Withdraw funded accrual without the minter role");
        assert!(
            is_vault_error(&e, VaultError::VaultNotMinter),
            "Wrong withdraw refusal: {:?}",
            e
        );
        assert_untouched(&before, &snapshot(&mut env, &setup).await?);

        // Hand the role back in the same slot, then retry
        let vault = setup.vault.vault;
        let ix = set_minter_ix(&env.program_id, &setup.protocol, &owner, vault);
        send(&mut env.context, &[ix], &setup.protocol.owner).await?;
        env.context.last_blockhash = env.context.get_new_latest_blockhash().await?;
        assert_eq!(current_slot(&mut env.context).await?, slot);
    }

    // Either nothing accrued, or the vault is the minter again
    let ix = withdraw_ix(&env.program_id, &setup, &setup.user, shares);
    let result = send(&mut env.context, &[ix], &setup.user.owner).await;
    assert!(result.is_ok(), "Funded withdraw refused: {:?}", result);

    let after = snapshot(&mut env, &setup).await?;
    assert_eq!(after.recorded_slot, slot);
    assert_eq!(after.recorded_balance, notional - expected_payout);
    assert_eq!(after.custody, after.recorded_balance, "Custody must back the recorded balance");
    assert_eq!(after.share_supply, before.share_supply - shares);

    println!(
        "✓ PASS - accrued={}, shares={}, payout={}, slots={}",
        accrued, shares, expected_payout, slots_elapsed
    );

    Ok(())
}

fuzz_target!(|input: AccrualFundingInput| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        if let Err(e) = fuzz_accrual_funding_once(input).await {
            eprintln!("Fuzz iteration failed: {}", e);
        }
    });
});
