pub mod config;
pub mod errors;
pub mod forks;
pub mod hashing;
pub mod tx;
