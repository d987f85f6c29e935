pub mod token_config;
pub mod vault;
pub mod vault_authority;

pub use token_config::*;
pub use vault::*;
pub use vault_authority::*;
