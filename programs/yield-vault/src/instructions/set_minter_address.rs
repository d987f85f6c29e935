use anchor_lang::prelude::*;

use crate::constants::TOKEN_CONFIG_SEED;
use crate::events::MinterUpdated;
use crate::state::TokenConfig;

#[derive(Accounts)]
pub struct SetMinterAddress<'info> {
    #[account(
        mut,
        seeds = [TOKEN_CONFIG_SEED],
        bump = token_config.bump,
    )]
    pub token_config: Account<'info, TokenConfig>,

    pub owner: Signer<'info>,
}

pub fn handler(ctx: Context<SetMinterAddress>, minter: Pubkey) -> Result<()> {
    let token_config = &mut ctx.accounts.token_config;

    token_config.assert_owner(&ctx.accounts.owner.key())?;

    let previous = token_config.minter;
    token_config.minter = minter;

    emit!(MinterUpdated {
        previous,
        current: minter,
    });

    msg!("Minter updated!");
    msg!("Previous minter: {}", previous);
    msg!("New minter: {}", minter);

    Ok(())
}
