use anchor_lang::prelude::*;

#[event]
pub struct Deposited {
    pub depositor: Pubkey,
    pub amount_in: u64,
    pub shares_out: u64,
}

#[event]
pub struct Withdrawn {
    pub withdrawer: Pubkey,
    pub amount_out: u64,
    pub shares_in: u64,
}

#[event]
pub struct MinterUpdated {
    pub previous: Pubkey,
    pub current: Pubkey,
}

#[event]
pub struct OwnershipTransferred {
    pub previous: Pubkey,
    pub current: Pubkey,
}
