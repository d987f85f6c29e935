use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{
    SHARE_MINT_SEED, TOKEN_CONFIG_SEED, VAULT_AUTHORITY_SEED, VAULT_SEED, VAULT_TOKEN_ACCOUNT_SEED,
};
use crate::error::VaultError;
use crate::state::{TokenConfig, Vault, VaultAuthority};

#[derive(Accounts)]
pub struct InitializeVault<'info> {
    #[account(
        init,
        payer = payer,
        space = Vault::LEN,
        seeds = [VAULT_SEED, underlying_mint.key().as_ref()],
        bump
    )]
    pub vault: Account<'info, Vault>,

    /// Only the token owner may open a vault over the underlying asset
    #[account(
        seeds = [TOKEN_CONFIG_SEED],
        bump = token_config.bump,
        has_one = underlying_mint,
        has_one = owner @ VaultError::NotOwner,
    )]
    pub token_config: Account<'info, TokenConfig>,

    /// The underlying asset mint that the vault will hold
    pub underlying_mint: InterfaceAccount<'info, Mint>,

    /// The token account that will hold the vault's underlying assets
    #[account(
        init,
        payer = payer,
        token::mint = underlying_mint,
        token::authority = vault_authority,
        token::token_program = token_program,
        seeds = [VAULT_TOKEN_ACCOUNT_SEED, vault.key().as_ref()],
        bump
    )]
    pub vault_token_account: InterfaceAccount<'info, TokenAccount>,

    /// The share mint account to be created
    /// This will be initialized in the instruction with vault_authority as mint authority
    #[account(
        init,
        payer = payer,
        mint::decimals = underlying_mint.decimals,
        mint::authority = vault_authority,
        mint::token_program = token_program,
        seeds = [SHARE_MINT_SEED, vault.key().as_ref()],
        bump
    )]
    pub share_mint: InterfaceAccount<'info, Mint>,

    /// Must be initialized via the initialize instruction first
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = vault_authority.bump
    )]
    pub vault_authority: Account<'info, VaultAuthority>,

    pub owner: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<InitializeVault>, accrual_rate: u64) -> Result<()> {
    let slot = Clock::get()?.slot;
    let vault = &mut ctx.accounts.vault;

    vault.share_mint = ctx.accounts.share_mint.key();
    vault.underlying_mint = ctx.accounts.underlying_mint.key();
    vault.vault_token_account = ctx.accounts.vault_token_account.key();
    vault.accrual_rate = accrual_rate;
    vault.recorded_balance = 0;
    vault.recorded_slot = slot;
    vault.bump = ctx.bumps.vault;

    msg!("Vault initialized successfully!");
    msg!("Vault: {}", vault.key());
    msg!("Share Mint: {}", vault.share_mint);
    msg!("Underlying Mint: {}", vault.underlying_mint);
    msg!("Vault Token Account: {}", vault.vault_token_account);
    msg!("Accrual rate: {} per slot", vault.accrual_rate);
    msg!("Checkpoint slot: {}", vault.recorded_slot);

    Ok(())
}
