#![no_main]

use arbitrary::Arbitrary;
use fuzz_helpers::*;
use libfuzzer_sys::fuzz_target;
use solana_sdk::signature::{Keypair, Signer};
use yield_vault::error::VaultError;

/// Who signs the privileged call
#[derive(Debug, Clone, Copy, Arbitrary)]
enum Caller {
    Owner,
    Minter,
    Stranger,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Action {
    Mint { caller: Caller, amount: u32 },
    SetMinter { caller: Caller, to_stranger: bool },
    TransferOwnership { caller: Caller, to: Caller },
}

#[derive(Debug, Clone, Arbitrary)]
struct MinterGateInput {
    actions: Vec<Action>,
}

async fn fuzz_minter_gate_once(input: MinterGateInput) -> FuzzResult<()> {
    let mut env = setup_program_test().await;
    let protocol = setup_protocol(&mut env.context, &env.program_id, 6, 1_000_000).await?;

    let minter = Keypair::new();
    let stranger = Keypair::new();
    fund_lamports(&mut env.context, &minter.pubkey()).await?;
    fund_lamports(&mut env.context, &stranger.pubkey()).await?;

    let ix = set_minter_ix(
        &env.program_id,
        &protocol,
        &protocol.owner.pubkey(),
        minter.pubkey(),
    );
    send(&mut env.context, &[ix], &protocol.owner).await?;

    let mut current_minter = minter.pubkey();
    let mut current_owner = protocol.owner.pubkey();

    for action in input.actions.into_iter().take(8) {
        let supply_before = get_mint_supply(&mut env.context, &protocol.underlying_mint).await?;
        let config_before = get_token_config(&mut env.context, &protocol.token_config).await?;

        match action {
            Action::Mint { caller, amount } => {
                let amount = amount as u64 + 1;
                let signer = match caller {
                    Caller::Owner => &protocol.owner,
                    Caller::Minter => &minter,
                    Caller::Stranger => &stranger,
                };
                let ix = mint_ix(
                    &env.program_id,
                    &protocol,
                    &signer.pubkey(),
                    &protocol.owner_token_account,
                    amount,
                );
                let result = send(&mut env.context, &[ix], signer).await;
                let supply_after =
                    get_mint_supply(&mut env.context, &protocol.underlying_mint).await?;

                if signer.pubkey() == current_minter {
                    assert!(result.is_ok(), "Minter was refused: {:?}", result);
                    assert_eq!(supply_after, supply_before + amount);
                } else {
                    let e = result.expect_err("Non-minter was allowed to mint");
                    assert!(is_vault_error(&e, VaultError::NotMinter));
                    assert_eq!(supply_after, supply_before, "Balances changed on refusal");
                }
            }
            Action::SetMinter { caller, to_stranger } => {
                let signer = match caller {
                    Caller::Owner => &protocol.owner,
                    Caller::Minter => &minter,
                    Caller::Stranger => &stranger,
                };
                let target = if to_stranger {
                    stranger.pubkey()
                } else {
                    minter.pubkey()
                };
                let ix = set_minter_ix(&env.program_id, &protocol, &signer.pubkey(), target);
                let result = send(&mut env.context, &[ix], signer).await;
                let config_after =
                    get_token_config(&mut env.context, &protocol.token_config).await?;

                if signer.pubkey() == current_owner {
                    assert!(result.is_ok(), "Owner was refused: {:?}", result);
                    assert_eq!(config_after.minter, target);
                    current_minter = target;
                } else {
                    let e = result.expect_err("Non-owner changed the minter");
                    assert!(is_vault_error(&e, VaultError::NotOwner));
                    assert_eq!(config_after.minter, config_before.minter);
                }
            }
            Action::TransferOwnership { caller, to } => {
                let signer = match caller {
                    Caller::Owner => &protocol.owner,
                    Caller::Minter => &minter,
                    Caller::Stranger => &stranger,
                };
                let target = match to {
                    Caller::Owner => protocol.owner.pubkey(),
                    Caller::Minter => minter.pubkey(),
                    Caller::Stranger => stranger.pubkey(),
                };
                let ix =
                    transfer_ownership_ix(&env.program_id, &protocol, &signer.pubkey(), target);
                let result = send(&mut env.context, &[ix], signer).await;
                let config_after =
                    get_token_config(&mut env.context, &protocol.token_config).await?;

                if signer.pubkey() == current_owner {
                    assert!(result.is_ok(), "Owner was refused: {:?}", result);
                    assert_eq!(config_after.owner, target);
                    current_owner = target;
                } else {
                    let e = result.expect_err("Non-owner transferred ownership");
                    assert!(is_vault_error(&e, VaultError::NotOwner));
                    assert_eq!(config_after.owner, config_before.owner);
                }
                // Ownership never moves the minter
                assert_eq!(config_after.minter, config_before.minter);
            }
        }

        // Fresh blockhash so identical actions are not deduplicated
        env.context.last_blockhash = env.context.get_new_latest_blockhash().await?;
    }

    Ok(())
}

fuzz_target!(|input: MinterGateInput| {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        if let Err(e) = fuzz_minter_gate_once(input).await {
            eprintln!("Fuzz iteration failed: {}", e);
        }
    });
});
