pub mod configs;
pub mod http_client;
pub mod logger;
pub mod service;

pub use http_client::ReqwestTransport;
pub use service::Gateway;
