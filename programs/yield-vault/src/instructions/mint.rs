use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::{TOKEN_CONFIG_SEED, VAULT_AUTHORITY_SEED};
use crate::error::VaultError;
use crate::state::{TokenConfig, VaultAuthority};
use crate::utils::mint_signed;

#[derive(Accounts)]
pub struct MintTokens<'info> {
    #[account(
        seeds = [TOKEN_CONFIG_SEED],
        bump = token_config.bump,
        has_one = underlying_mint,
    )]
    pub token_config: Account<'info, TokenConfig>,

    #[account(mut)]
    pub underlying_mint: InterfaceAccount<'info, Mint>,

    /// Any token account of the underlying asset
    #[account(
        mut,
        token::mint = underlying_mint,
    )]
    pub destination: InterfaceAccount<'info, TokenAccount>,

    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = vault_authority.bump
    )]
    pub vault_authority: Account<'info, VaultAuthority>,

    pub minter: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<MintTokens>, amount: u64) -> Result<()> {
    ctx.accounts
        .token_config
        .assert_minter(&ctx.accounts.minter.key())?;
    require!(amount > 0, VaultError::InvalidAmount);

    mint_signed(
        &ctx.accounts.token_program,
        &ctx.accounts.underlying_mint,
        &ctx.accounts.destination,
        &ctx.accounts.vault_authority,
        amount,
    )?;

    msg!("Minted {} tokens to {}", amount, ctx.accounts.destination.key());

    Ok(())
}
