pub mod access_token;
pub mod authorization;
pub mod connectors;
pub mod normalizer;
pub mod signer;
pub mod types;
pub mod utils;
