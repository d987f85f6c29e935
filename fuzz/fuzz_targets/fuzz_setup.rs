use anchor_lang::AccountDeserialize;
use anchor_lang::AnchorDeserialize;
use anchor_lang::Event;
use anchor_lang::InstructionData;
use anchor_lang::ToAccountMetas;
use anchor_spl::associated_token::get_associated_token_address;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use solana_program_test::*;
use solana_sdk::{
    clock::Clock,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use spl_token::instruction as token_instruction;
use spl_token::solana_program::program_pack::Pack;
use yield_vault::error::VaultError;
use yield_vault::state::{TokenConfig, Vault};

// Re-export for convenience
pub use solana_program_test::ProgramTestContext;

// Custom error type for fuzzing
pub type FuzzResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Test environment with program loaded
pub struct FuzzTestEnv {
    pub program_id: Pubkey,
    pub context: ProgramTestContext,
}

/// Protocol-level accounts (token config, vault authority, underlying mint)
#[derive(Debug)]
pub struct ProtocolAccounts {
    pub token_config: Pubkey,
    pub vault_authority: Pubkey,
    pub underlying_mint: Pubkey,
    pub owner: Keypair,
    pub owner_token_account: Pubkey,
    pub decimals: u8,
}

/// Vault-specific accounts
#[derive(Debug, Clone)]
pub struct VaultAccounts {
    pub vault: Pubkey,
    pub vault_token_account: Pubkey,
    pub share_mint: Pubkey,
    pub underlying_mint: Pubkey,
}

/// User token accounts for interacting with vault
#[derive(Debug)]
pub struct UserAccounts {
    pub owner: Keypair,
    pub underlying_token_account: Pubkey,
    pub share_token_account: Pubkey,
}

/// Complete setup with all accounts
pub struct CompleteSetup {
    pub protocol: ProtocolAccounts,
    pub vault: VaultAccounts,
    pub user: UserAccounts,
}

/// Anchor custom error code as it appears in a failed transaction.
pub fn custom_code(error: VaultError) -> u32 {
    error as u32 + anchor_lang::error::ERROR_CODE_OFFSET
}

/// True when a transaction error carries the given vault error.
pub fn is_vault_error(error: &BanksClientError, expected: VaultError) -> bool {
    format!("{:?}", error).contains(&format!("Custom({})", custom_code(expected)))
}

// ============================================================================
// Core Setup Functions
// ============================================================================

/// Creates the program test environment with the compiled vault program loaded
pub async fn setup_program_test() -> FuzzTestEnv {
    let program_id = yield_vault::id();
    let program_test = ProgramTest::new("yield_vault", program_id, None);

    let context = program_test.start_with_context().await;

    FuzzTestEnv {
        program_id,
        context,
    }
}

/// Sends lamports from the test payer so `to` can sign and pay fees
pub async fn fund_lamports(context: &mut ProgramTestContext, to: &Pubkey) -> FuzzResult<()> {
    let rent = context.banks_client.get_rent().await?;
    let lamports = rent.minimum_balance(0) + 1_000_000_000; // 1 SOL

    let ix = solana_sdk::system_instruction::transfer(&context.payer.pubkey(), to, lamports);

    let tx = Transaction::new_signed_with_payer(
        &[ix],
        Some(&context.payer.pubkey()),
        &[&context.payer],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;
    Ok(())
}

/// Signs `ixs` with `signer` as fee payer and submits them
pub async fn send(
    context: &mut ProgramTestContext,
    ixs: &[Instruction],
    signer: &Keypair,
) -> Result<(), BanksClientError> {
    let tx = Transaction::new_signed_with_payer(
        ixs,
        Some(&signer.pubkey()),
        &[signer],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await
}

/// Like `send`, but hands back the program logs of the committed transaction
pub async fn send_with_logs(
    context: &mut ProgramTestContext,
    ixs: &[Instruction],
    signer: &Keypair,
) -> Result<Vec<String>, BanksClientError> {
    let tx = Transaction::new_signed_with_payer(
        ixs,
        Some(&signer.pubkey()),
        &[signer],
        context.last_blockhash,
    );

    let outcome = context
        .banks_client
        .process_transaction_with_metadata(tx)
        .await?;
    outcome.result.map_err(BanksClientError::TransactionError)?;

    Ok(outcome
        .metadata
        .map(|metadata| metadata.log_messages)
        .unwrap_or_default())
}

/// First event of type `E` found in the `Program data:` lines of `logs`
pub fn find_event<E: Event>(logs: &[String]) -> Option<E> {
    logs.iter()
        .filter_map(|line| line.strip_prefix("Program data: "))
        .filter_map(|encoded| STANDARD.decode(encoded).ok())
        .find_map(|bytes| {
            let mut payload = bytes.strip_prefix(E::DISCRIMINATOR)?;
            E::deserialize(&mut payload).ok()
        })
}

/// Initializes the protocol: vault authority, underlying mint, token config
/// and the owner's initial supply
pub async fn setup_protocol(
    context: &mut ProgramTestContext,
    program_id: &Pubkey,
    decimals: u8,
    initial_supply: u64,
) -> FuzzResult<ProtocolAccounts> {
    let owner = Keypair::new();
    fund_lamports(context, &owner.pubkey()).await?;

    // Derive PDAs
    let (token_config, _) = derive_token_config_pda(program_id);
    let (vault_authority, _) = derive_vault_authority_pda(program_id);
    let (underlying_mint, _) = derive_underlying_mint_pda(program_id);
    let owner_token_account = get_associated_token_address(&owner.pubkey(), &underlying_mint);

    let accounts = yield_vault::accounts::Initialize {
        token_config,
        vault_authority,
        underlying_mint,
        owner_token_account,
        owner: owner.pubkey(),
        payer: owner.pubkey(),
        system_program: solana_sdk::system_program::ID,
        token_program: spl_token::id(),
        associated_token_program: anchor_spl::associated_token::ID,
    };

    let data = yield_vault::instruction::Initialize {
        decimals,
        initial_supply,
    }
    .data();

    let ix = Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data,
    };

    send(context, &[ix], &owner).await?;

    Ok(ProtocolAccounts {
        token_config,
        vault_authority,
        underlying_mint,
        owner,
        owner_token_account,
        decimals,
    })
}

/// Builds a set_minter_address instruction signed by `caller`
pub fn set_minter_ix(
    program_id: &Pubkey,
    protocol: &ProtocolAccounts,
    caller: &Pubkey,
    minter: Pubkey,
) -> Instruction {
    let accounts = yield_vault::accounts::SetMinterAddress {
        token_config: protocol.token_config,
        owner: *caller,
    };

    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::SetMinterAddress { minter }.data(),
    }
}

/// Builds a transfer_ownership instruction signed by `caller`
pub fn transfer_ownership_ix(
    program_id: &Pubkey,
    protocol: &ProtocolAccounts,
    caller: &Pubkey,
    new_owner: Pubkey,
) -> Instruction {
    let accounts = yield_vault::accounts::TransferOwnership {
        token_config: protocol.token_config,
        current_owner: *caller,
        new_owner,
    };

    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::TransferOwnership {}.data(),
    }
}

/// Builds a mint instruction signed by `caller`
pub fn mint_ix(
    program_id: &Pubkey,
    protocol: &ProtocolAccounts,
    caller: &Pubkey,
    destination: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = yield_vault::accounts::MintTokens {
        token_config: protocol.token_config,
        underlying_mint: protocol.underlying_mint,
        destination: *destination,
        vault_authority: protocol.vault_authority,
        minter: *caller,
        token_program: spl_token::id(),
    };

    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::Mint { amount }.data(),
    }
}

/// Initializes a vault over the protocol's underlying mint
pub async fn setup_vault(
    context: &mut ProgramTestContext,
    program_id: &Pubkey,
    protocol: &ProtocolAccounts,
    accrual_rate: u64,
) -> FuzzResult<VaultAccounts> {
    // Derive PDAs
    let (vault, _) = derive_vault_pda(program_id, &protocol.underlying_mint);
    let (share_mint, _) = derive_share_mint_pda(program_id, &vault);
    let (vault_token_account, _) = derive_vault_token_account_pda(program_id, &vault);

    let accounts = yield_vault::accounts::InitializeVault {
        vault,
        token_config: protocol.token_config,
        underlying_mint: protocol.underlying_mint,
        vault_token_account,
        share_mint,
        vault_authority: protocol.vault_authority,
        owner: protocol.owner.pubkey(),
        payer: protocol.owner.pubkey(),
        system_program: solana_sdk::system_program::ID,
        token_program: spl_token::id(),
    };

    let data = yield_vault::instruction::InitializeVault { accrual_rate }.data();

    let ix = Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data,
    };

    send(context, &[ix], &protocol.owner).await?;

    Ok(VaultAccounts {
        vault,
        vault_token_account,
        share_mint,
        underlying_mint: protocol.underlying_mint,
    })
}

/// Creates token accounts for a user (for deposits/withdraws)
pub async fn setup_user_accounts(
    context: &mut ProgramTestContext,
    underlying_mint: &Pubkey,
    share_mint: &Pubkey,
) -> FuzzResult<UserAccounts> {
    let owner = Keypair::new();
    fund_lamports(context, &owner.pubkey()).await?;

    let rent = context.banks_client.get_rent().await?;
    let account_len = spl_token::state::Account::LEN;

    // Create underlying token account
    let underlying_token_account = Keypair::new();
    let create_underlying_ix = solana_sdk::system_instruction::create_account(
        &context.payer.pubkey(),
        &underlying_token_account.pubkey(),
        rent.minimum_balance(account_len),
        account_len as u64,
        &spl_token::id(),
    );

    let init_underlying_ix = token_instruction::initialize_account(
        &spl_token::id(),
        &underlying_token_account.pubkey(),
        underlying_mint,
        &owner.pubkey(),
    )?;

    // Create share token account
    let share_token_account = Keypair::new();
    let create_share_ix = solana_sdk::system_instruction::create_account(
        &context.payer.pubkey(),
        &share_token_account.pubkey(),
        rent.minimum_balance(account_len),
        account_len as u64,
        &spl_token::id(),
    );

    let init_share_ix = token_instruction::initialize_account(
        &spl_token::id(),
        &share_token_account.pubkey(),
        share_mint,
        &owner.pubkey(),
    )?;

    let tx = Transaction::new_signed_with_payer(
        &[
            create_underlying_ix,
            init_underlying_ix,
            create_share_ix,
            init_share_ix,
        ],
        Some(&context.payer.pubkey()),
        &[
            &context.payer,
            &underlying_token_account,
            &share_token_account,
        ],
        context.last_blockhash,
    );

    context.banks_client.process_transaction(tx).await?;

    Ok(UserAccounts {
        owner,
        underlying_token_account: underlying_token_account.pubkey(),
        share_token_account: share_token_account.pubkey(),
    })
}

/// Moves underlying from the owner's initial supply to `destination`
pub async fn transfer_from_owner(
    context: &mut ProgramTestContext,
    protocol: &ProtocolAccounts,
    destination: &Pubkey,
    amount: u64,
) -> FuzzResult<()> {
    let ix = token_instruction::transfer(
        &spl_token::id(),
        &protocol.owner_token_account,
        destination,
        &protocol.owner.pubkey(),
        &[],
        amount,
    )?;

    send(context, &[ix], &protocol.owner).await?;
    Ok(())
}

/// Builds a deposit instruction for `user`
pub fn deposit_ix(
    program_id: &Pubkey,
    setup: &CompleteSetup,
    user: &UserAccounts,
    amount: u64,
    min_shares_out: u64,
) -> Instruction {
    let accounts = yield_vault::accounts::Deposit {
        vault: setup.vault.vault,
        token_config: setup.protocol.token_config,
        underlying_mint: setup.vault.underlying_mint,
        vault_token_account: setup.vault.vault_token_account,
        share_mint: setup.vault.share_mint,
        vault_authority: setup.protocol.vault_authority,
        depositor_underlying_account: user.underlying_token_account,
        depositor_share_account: user.share_token_account,
        depositor: user.owner.pubkey(),
        token_program: spl_token::id(),
    };

    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::Deposit {
            amount,
            min_shares_out,
        }
        .data(),
    }
}

/// Builds a withdraw instruction for `user`
pub fn withdraw_ix(
    program_id: &Pubkey,
    setup: &CompleteSetup,
    user: &UserAccounts,
    shares: u64,
) -> Instruction {
    let accounts = yield_vault::accounts::Withdraw {
        vault: setup.vault.vault,
        token_config: setup.protocol.token_config,
        underlying_mint: setup.vault.underlying_mint,
        vault_token_account: setup.vault.vault_token_account,
        share_mint: setup.vault.share_mint,
        vault_authority: setup.protocol.vault_authority,
        withdrawer_underlying_account: user.underlying_token_account,
        withdrawer_share_account: user.share_token_account,
        withdrawer: user.owner.pubkey(),
        token_program: spl_token::id(),
    };

    Instruction {
        program_id: *program_id,
        accounts: accounts.to_account_metas(None),
        data: yield_vault::instruction::Withdraw { shares }.data(),
    }
}

/// Moves the bank forward by `slots` and refreshes the blockhash
pub async fn advance_slots(context: &mut ProgramTestContext, slots: u64) -> FuzzResult<u64> {
    let current = current_slot(context).await?;
    if slots == 0 {
        return Ok(current);
    }

    let target = current + slots;
    context.warp_to_slot(target)?;
    context.last_blockhash = context.banks_client.get_latest_blockhash().await?;

    Ok(target)
}

/// Sets up everything: protocol + vault (as minter) + user with tokens
pub async fn setup_complete_environment(
    initial_user_balance: u64,
    decimals: u8,
    accrual_rate: u64,
) -> FuzzResult<(FuzzTestEnv, CompleteSetup)> {
    let mut env = setup_program_test().await;

    // Owner holds the whole initial supply, the user is funded from it
    let protocol = setup_protocol(
        &mut env.context,
        &env.program_id,
        decimals,
        initial_user_balance,
    )
    .await?;

    let vault = setup_vault(&mut env.context, &env.program_id, &protocol, accrual_rate).await?;

    // Accrual is funded by the vault minting into its own custody
    let ix = set_minter_ix(
        &env.program_id,
        &protocol,
        &protocol.owner.pubkey(),
        vault.vault,
    );
    send(&mut env.context, &[ix], &protocol.owner).await?;

    let user = setup_user_accounts(&mut env.context, &protocol.underlying_mint, &vault.share_mint)
        .await?;

    if initial_user_balance > 0 {
        transfer_from_owner(
            &mut env.context,
            &protocol,
            &user.underlying_token_account,
            initial_user_balance,
        )
        .await?;
    }

    let setup = CompleteSetup {
        protocol,
        vault,
        user,
    };

    Ok((env, setup))
}

// ============================================================================
// PDA Derivation Helpers
// ============================================================================

/// Derive token config PDA
pub fn derive_token_config_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[yield_vault::TOKEN_CONFIG_SEED], program_id)
}

/// Derive vault authority PDA
pub fn derive_vault_authority_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[yield_vault::VAULT_AUTHORITY_SEED], program_id)
}

/// Derive underlying mint PDA
pub fn derive_underlying_mint_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[yield_vault::UNDERLYING_MINT_SEED], program_id)
}

/// Derive vault PDA
pub fn derive_vault_pda(program_id: &Pubkey, underlying_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[yield_vault::VAULT_SEED, underlying_mint.as_ref()], program_id)
}

/// Derive share mint PDA
pub fn derive_share_mint_pda(program_id: &Pubkey, vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[yield_vault::SHARE_MINT_SEED, vault.as_ref()], program_id)
}

/// Derive vault token account PDA
pub fn derive_vault_token_account_pda(program_id: &Pubkey, vault: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[yield_vault::VAULT_TOKEN_ACCOUNT_SEED, vault.as_ref()],
        program_id,
    )
}

// ============================================================================
// Account State Verification Helpers
// ============================================================================

/// Slot the program will observe through the Clock sysvar
pub async fn current_slot(context: &mut ProgramTestContext) -> FuzzResult<u64> {
    let clock: Clock = context.banks_client.get_sysvar().await?;
    Ok(clock.slot)
}

/// Fetch and return vault state
pub async fn get_vault_state(context: &mut ProgramTestContext, vault: &Pubkey) -> FuzzResult<Vault> {
    let account = context
        .banks_client
        .get_account(*vault)
        .await?
        .ok_or("Vault account not found")?;

    let vault_data = Vault::try_deserialize(&mut account.data.as_ref())?;
    Ok(vault_data)
}

/// Get token account balance
pub async fn get_token_balance(context: &mut ProgramTestContext, account: &Pubkey) -> FuzzResult<u64> {
    let account_data = context
        .banks_client
        .get_account(*account)
        .await?
        .ok_or("Token account not found")?;

    let token_account = spl_token::state::Account::unpack(&account_data.data)?;
    Ok(token_account.amount)
}

/// Get mint supply
pub async fn get_mint_supply(context: &mut ProgramTestContext, mint: &Pubkey) -> FuzzResult<u64> {
    let account = context
        .banks_client
        .get_account(*mint)
        .await?
        .ok_or("Mint account not found")?;

    let mint = spl_token::state::Mint::unpack(&account.data)?;
    Ok(mint.supply)
}

/// Get token config
pub async fn get_token_config(
    context: &mut ProgramTestContext,
    token_config: &Pubkey,
) -> FuzzResult<TokenConfig> {
    let account = context
        .banks_client
        .get_account(*token_config)
        .await?
        .ok_or("Token config account not found")?;

    let config = TokenConfig::try_deserialize(&mut account.data.as_ref())?;
    Ok(config)
}

