use anchor_lang::prelude::*;

use crate::constants::TOKEN_CONFIG_SEED;
use crate::events::OwnershipTransferred;
use crate::state::TokenConfig;

#[derive(Accounts)]
pub struct TransferOwnership<'info> {
    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED],
        bump = token_config.bump,
    )]
    pub token_config: Account<'info, TokenConfig>,

    pub current_owner: Signer<'info>,

    /// CHECK: New owner, any address may hold ownership
    pub new_owner: UncheckedAccount<'info>,
}

pub fn handler(ctx: Context<TransferOwnership>) -> Result<()> {
    let token_config = &mut ctx.accounts.token_config;

    token_config.assert_owner(&ctx.accounts.current_owner.key())?;

    token_config.owner = ctx.accounts.new_owner.key();

    emit!(OwnershipTransferred {
        previous: ctx.accounts.current_owner.key(),
        current: token_config.owner,
    });

    msg!("Ownership transferred!");
    msg!("Previous owner: {}", ctx.accounts.current_owner.key());
    msg!("New owner: {}", ctx.accounts.new_owner.key());

    Ok(())
}
