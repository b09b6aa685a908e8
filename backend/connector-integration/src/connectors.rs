pub mod braspag;
pub use self::braspag::Braspag;

pub mod cybersource;
pub use self::cybersource::Cybersource;

pub mod fusebox;
pub use self::fusebox::Fusebox;

pub mod quickbooks;
pub use self::quickbooks::Quickbooks;

pub mod versapay;
pub use self::versapay::Versapay;
