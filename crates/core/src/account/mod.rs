//! Chart of accounts registry.

mod types;

pub use types::{Account, AccountType, NormalBalance};
