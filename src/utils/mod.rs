pub mod addresses;
pub mod config;
pub mod errors;
