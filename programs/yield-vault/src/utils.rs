use anchor_lang::prelude::*;
use anchor_spl::token_interface::{mint_to, Mint, MintTo, TokenAccount, TokenInterface};

use crate::state::VaultAuthority;

/// Mints `amount` of `mint` into `to`, signed by the vault authority PDA.
pub fn mint_signed<'info>(
    token_program: &Interface<'info, TokenInterface>,
    mint: &InterfaceAccount<'info, Mint>,
    to: &InterfaceAccount<'info, TokenAccount>,
    vault_authority: &Account<'info, VaultAuthority>,
    amount: u64,
) -> Result<()> {
    let vault_authority_seeds = vault_authority.signer_seeds();
    let signer_seeds = &[&vault_authority_seeds[..]];

    let mint_accounts = MintTo {
        mint: mint.to_account_info(),
        to: to.to_account_info(),
        authority: vault_authority.to_account_info(),
    };

    let cpi_ctx = CpiContext::new_with_signer(
        token_program.to_account_info(),
        mint_accounts,
        signer_seeds,
    );

    mint_to(cpi_ctx, amount)
}
