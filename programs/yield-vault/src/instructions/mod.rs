pub mod deposit;
pub mod initialize;
pub mod initialize_vault;
pub mod mint;
pub mod set_minter_address;
pub mod transfer_ownership;
pub mod withdraw;

pub use deposit::*;
pub use initialize::*;
pub use initialize_vault::*;
pub use mint::*;
pub use set_minter_address::*;
pub use transfer_ownership::*;
pub use withdraw::*;
