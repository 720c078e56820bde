pub mod account;
pub mod migrate;
