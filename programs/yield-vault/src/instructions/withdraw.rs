use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    burn, transfer_checked, Burn, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::{TOKEN_CONFIG_SEED, VAULT_AUTHORITY_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::events::Withdrawn;
use crate::state::{TokenConfig, Vault, VaultAuthority};
use crate::utils::mint_signed;

#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, underlying_mint.key().as_ref()],
        bump = vault.bump,
        has_one = underlying_mint,
        has_one = vault_token_account,
        has_one = share_mint @ VaultError::InvalidShareMint,
    )]
    pub vault: Account<'info, Vault>,

    #[account(
        seeds = [TOKEN_CONFIG_SEED],
        bump = token_config.bump,
        has_one = underlying_mint,
    )]
    pub token_config: Account<'info, TokenConfig>,

    /// The underlying asset mint
    #[account(mut)]
    pub underlying_mint: InterfaceAccount<'info, Mint>,

    /// The vault's token account that holds underlying assets
    #[account(mut)]
    pub vault_token_account: InterfaceAccount<'info, TokenAccount>,

    /// The share mint
    #[account(mut)]
    pub share_mint: InterfaceAccount<'info, Mint>,

    /// The vault authority that can transfer from vault
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = vault_authority.bump
    )]
    pub vault_authority: Account<'info, VaultAuthority>,

    /// The withdrawer's token account for receiving underlying assets
    #[account(
        mut,
        token::mint = underlying_mint,
        token::authority = withdrawer,
    )]
    pub withdrawer_underlying_account: InterfaceAccount<'info, TokenAccount>,

    /// The withdrawer's token account for burning shares
    #[account(
        mut,
        token::mint = share_mint,
        token::authority = withdrawer,
    )]
    pub withdrawer_share_account: InterfaceAccount<'info, TokenAccount>,

    pub withdrawer: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
    require!(shares > 0, VaultError::InvalidAmount);
    require!(
        ctx.accounts.withdrawer_share_account.amount >= shares,
        VaultError::InsufficientShares
    );

    let slot = Clock::get()?.slot;
    let total_shares = ctx.accounts.share_mint.supply;

    let quote = ctx
        .accounts
        .vault
        .quote_withdraw(shares, total_shares, slot)?;

    require!(quote.assets > 0, VaultError::ZeroAssetsReturned);

    let custody = ctx
        .accounts
        .vault_token_account
        .amount
        .checked_add(quote.accrued)
        .ok_or(VaultError::MathOverflow)?;
    require!(custody >= quote.assets, VaultError::CustodyShortfall);

    if quote.accrued > 0 {
        require_keys_eq!(
            ctx.accounts.token_config.minter,
            ctx.accounts.vault.key(),
            VaultError::VaultNotMinter
        );
    }

    // Checkpoint is final before any token program call.
    ctx.accounts.vault.record_withdraw(&quote, slot)?;

    // Burn shares from withdrawer
    let burn_accounts = Burn {
        mint: ctx.accounts.share_mint.to_account_info(),
        from: ctx.accounts.withdrawer_share_account.to_account_info(),
        authority: ctx.accounts.withdrawer.to_account_info(),
    };

    let cpi_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        burn_accounts,
    );

    burn(cpi_ctx, shares)?;

    if quote.accrued > 0 {
        mint_signed(
            &ctx.accounts.token_program,
            &ctx.accounts.underlying_mint,
            &ctx.accounts.vault_token_account,
            &ctx.accounts.vault_authority,
            quote.accrued,
        )?;
    }

    // Transfer underlying tokens from vault to withdrawer
    let vault_authority_seeds = ctx.accounts.vault_authority.signer_seeds();
    let signer_seeds = &[&vault_authority_seeds[..]];

    let transfer_accounts = TransferChecked {
        from: ctx.accounts.vault_token_account.to_account_info(),
        mint: ctx.accounts.underlying_mint.to_account_info(),
        to: ctx.accounts.withdrawer_underlying_account.to_account_info(),
        authority: ctx.accounts.vault_authority.to_account_info(),
    };

    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        transfer_accounts,
        signer_seeds,
    );

    transfer_checked(cpi_ctx, quote.assets, ctx.accounts.underlying_mint.decimals)?;

    emit!(Withdrawn {
        withdrawer: ctx.accounts.withdrawer.key(),
        amount_out: quote.assets,
        shares_in: shares,
    });

    msg!("Withdraw successful!");
    msg!("Shares burned: {}", shares);
    msg!("Underlying returned: {}", quote.assets);
    msg!("Accrued since checkpoint: {}", quote.accrued);
    msg!("Recorded balance: {}", ctx.accounts.vault.recorded_balance);
    msg!("Remaining shares supply: {}", total_shares - shares);

    Ok(())
}
