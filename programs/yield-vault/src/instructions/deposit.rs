use anchor_lang::prelude::*;
use anchor_spl::token_interface::{
    transfer_checked, Mint, TokenAccount, TokenInterface, TransferChecked,
};

use crate::constants::{TOKEN_CONFIG_SEED, VAULT_AUTHORITY_SEED, VAULT_SEED};
use crate::error::VaultError;
use crate::events::Deposited;
use crate::state::{TokenConfig, Vault, VaultAuthority};
use crate::utils::mint_signed;

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, underlying_mint.key().as_ref()],
        bump = vault.bump,
        has_one = underlying_mint,
        has_one = vault_token_account,
        has_one = share_mint @ VaultError::InvalidShareMint,
    )]
    pub vault: Account<'info, Vault>,

    /// Holds the current minter, which must be the vault whenever accrual is funded
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

    /// The vault authority that can mint shares and accrued underlying
    #[account(
        seeds = [VAULT_AUTHORITY_SEED],
        bump = vault_authority.bump
    )]
    pub vault_authority: Account<'info, VaultAuthority>,

    /// The depositor's token account for the underlying asset
    #[account(
        mut,
        token::mint = underlying_mint,
        token::authority = depositor,
    )]
    pub depositor_underlying_account: InterfaceAccount<'info, TokenAccount>,

    /// The depositor's token account for receiving shares
    #[account(
        mut,
        token::mint = share_mint,
        token::authority = depositor,
    )]
    pub depositor_share_account: InterfaceAccount<'info, TokenAccount>,

    pub depositor: Signer<'info>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<Deposit>, amount: u64, min_shares_out: u64) -> Result<()> {
    let slot = Clock::get()?.slot;
    let total_shares = ctx.accounts.share_mint.supply;

    let quote = ctx
        .accounts
        .vault
        .quote_deposit(amount, total_shares, slot)?;

    require!(quote.shares > 0, VaultError::ZeroSharesMinted);
    require!(quote.shares >= min_shares_out, VaultError::SlippageExceeded);
    if quote.accrued > 0 {
        require_keys_eq!(
            ctx.accounts.token_config.minter,
            ctx.accounts.vault.key(),
            VaultError::VaultNotMinter
        );
    }

    // Checkpoint is final before any token program call.
    ctx.accounts.vault.record_deposit(amount, &quote, slot)?;

    // Transfer underlying tokens from depositor to vault
    let transfer_accounts = TransferChecked {
        from: ctx.accounts.depositor_underlying_account.to_account_info(),
        mint: ctx.accounts.underlying_mint.to_account_info(),
        to: ctx.accounts.vault_token_account.to_account_info(),
        authority: ctx.accounts.depositor.to_account_info(),
    };

    let cpi_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        transfer_accounts,
    );

    transfer_checked(cpi_ctx, amount, ctx.accounts.underlying_mint.decimals)?;

    if quote.accrued > 0 {
        mint_signed(
            &ctx.accounts.token_program,
            &ctx.accounts.underlying_mint,
            &ctx.accounts.vault_token_account,
            &ctx.accounts.vault_authority,
            quote.accrued,
        )?;
    }

    mint_signed(
        &ctx.accounts.token_program,
        &ctx.accounts.share_mint,
        &ctx.accounts.depositor_share_account,
        &ctx.accounts.vault_authority,
        quote.shares,
    )?;

    emit!(Deposited {
        depositor: ctx.accounts.depositor.key(),
        amount_in: amount,
        shares_out: quote.shares,
    });

    msg!("Deposit successful!");
    msg!("Deposited: {} tokens", amount);
    msg!("Minted: {} shares", quote.shares);
    msg!("Accrued since checkpoint: {}", quote.accrued);
    msg!("Recorded balance: {}", ctx.accounts.vault.recorded_balance);
    msg!("Total shares supply: {}", total_shares.saturating_add(quote.shares));

    Ok(())
}
