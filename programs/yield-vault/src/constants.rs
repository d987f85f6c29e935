use anchor_lang::prelude::*;

#[constant]
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

#[constant]
pub const TOKEN_CONFIG_SEED: &[u8] = b"token_config";

#[constant]
pub const UNDERLYING_MINT_SEED: &[u8] = b"underlying_mint";

#[constant]
pub const VAULT_SEED: &[u8] = b"vault";

#[constant]
pub const VAULT_TOKEN_ACCOUNT_SEED: &[u8] = b"vault_token_account";

#[constant]
pub const SHARE_MINT_SEED: &[u8] = b"share_mint";
