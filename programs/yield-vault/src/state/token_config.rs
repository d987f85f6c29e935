use anchor_lang::prelude::*;

use crate::error::VaultError;

#[account]
pub struct TokenConfig {
    /// Account allowed to reassign the minter and transfer ownership
    pub owner: Pubkey,
    /// The single address allowed to mint new underlying
    pub minter: Pubkey,
    /// The underlying asset mint governed by this config
    pub underlying_mint: Pubkey,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl TokenConfig {
    pub const LEN: usize = 8 + // discriminator
        32 + // owner
        32 + // minter
        32 + // underlying_mint
        1; // bump

    pub fn assert_owner(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.owner, VaultError::NotOwner);
        Ok(())
    }

    pub fn assert_minter(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.minter, VaultError::NotMinter);
        Ok(())
    }
}
