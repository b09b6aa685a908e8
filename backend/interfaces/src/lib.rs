pub mod api;
pub mod connector_integration;
pub mod signer;
pub mod transport;
