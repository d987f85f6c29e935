pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;
pub mod utils;

use anchor_lang::prelude::*;

pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("6a6e66HcZEKYqfK2rifr9NHA3VZabSZ6vAhD4173iMy1");

#[program]
pub mod yield_vault {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>, decimals: u8, initial_supply: u64) -> Result<()> {
        initialize::handler(ctx, decimals, initial_supply)
    }

    pub fn set_minter_address(ctx: Context<SetMinterAddress>, minter: Pubkey) -> Result<()> {
        set_minter_address::handler(ctx, minter)
    }

    pub fn mint(ctx: Context<MintTokens>, amount: u64) -> Result<()> {
        mint::handler(ctx, amount)
    }

    pub fn transfer_ownership(ctx: Context<TransferOwnership>) -> Result<()> {
        transfer_ownership::handler(ctx)
    }

    pub fn initialize_vault(ctx: Context<InitializeVault>, accrual_rate: u64) -> Result<()> {
        initialize_vault::handler(ctx, accrual_rate)
    }

    pub fn deposit(ctx: Context<Deposit>, amount: u64, min_shares_out: u64) -> Result<()> {
        deposit::handler(ctx, amount, min_shares_out)
    }

    pub fn withdraw(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
        withdraw::handler(ctx, shares)
    }
}
