use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Input value must be greater than zero")]
    InvalidAmount,
    #[msg("Deposit would mint zero shares")]
    ZeroSharesMinted,
    #[msg("Minted shares are below the requested minimum")]
    SlippageExceeded,
    #[msg("Withdraw would return zero underlying")]
    ZeroAssetsReturned,
    #[msg("Not enough shares")]
    InsufficientShares,
    #[msg("Only minter can call this method")]
    NotMinter,
    #[msg("Caller is not the owner")]
    NotOwner,
    #[msg("Vault is not the configured minter of the underlying asset")]
    VaultNotMinter,
    #[msg("Math operation overflow")]
    MathOverflow,
    #[msg("Current slot is behind the recorded checkpoint")]
    SlotRegression,
    #[msg("Vault custody cannot cover the withdraw payout")]
    CustodyShortfall,
    #[msg("Share mint does not match vault's share mint")]
    InvalidShareMint,
}
