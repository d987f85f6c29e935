use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{TOKEN_CONFIG_SEED, UNDERLYING_MINT_SEED, VAULT_AUTHORITY_SEED};
use crate::state::{TokenConfig, VaultAuthority};
use crate::utils::mint_signed;

#[derive(Accounts)]
#[instruction(decimals: u8)]
pub struct Initialize<'info> {
    /// Owner and minter registry for the underlying asset
    #[account(
        init,
        payer = payer,
        space = TokenConfig::LEN,
        seeds = [TOKEN_CONFIG_SEED],
        bump
    )]
    pub token_config: Account<'info, TokenConfig>,

    /// The vault authority PDA that will be used as mint/burn authority for all mints
    #[account(
        init,
        payer = payer,
        space = VaultAuthority::LEN,
        seeds = [VAULT_AUTHORITY_SEED],
        bump
    )]
    pub vault_authority: Account<'info, VaultAuthority>,

    /// The underlying asset mint, only mintable through this program
    #[account(
        init,
        payer = payer,
        mint::decimals = decimals,
        mint::authority = vault_authority,
        mint::token_program = token_program,
        seeds = [UNDERLYING_MINT_SEED],
        bump
    )]
    pub underlying_mint: InterfaceAccount<'info, Mint>,

    /// Receives the initial supply
    #[account(
        init,
        payer = payer,
        associated_token::mint = underlying_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_token_account: InterfaceAccount<'info, TokenAccount>,

    /// The initial token owner
    pub owner: Signer<'info>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}

pub fn handler(ctx: Context<Initialize>, decimals: u8, initial_supply: u64) -> Result<()> {
    let token_config = &mut ctx.accounts.token_config;

    token_config.owner = ctx.accounts.owner.key();
    token_config.minter = Pubkey::default();
    token_config.underlying_mint = ctx.accounts.underlying_mint.key();
    token_config.bump = ctx.bumps.token_config;

    ctx.accounts.vault_authority.bump = ctx.bumps.vault_authority;

    if initial_supply > 0 {
        mint_signed(
            &ctx.accounts.token_program,
            &ctx.accounts.underlying_mint,
            &ctx.accounts.owner_token_account,
            &ctx.accounts.vault_authority,
            initial_supply,
        )?;
    }

    msg!("Protocol initialized successfully!");
    msg!("Token Config: {}", ctx.accounts.token_config.key());
    msg!("Owner: {}", ctx.accounts.token_config.owner);
    msg!("Underlying Mint: {}", ctx.accounts.underlying_mint.key());
    msg!("Decimals: {}", decimals);
    msg!("Initial supply: {}", initial_supply);
    msg!("Vault Authority: {}", ctx.accounts.vault_authority.key());

    Ok(())
}
