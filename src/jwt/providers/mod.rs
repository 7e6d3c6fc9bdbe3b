//! Production provider implementations.

pub mod hmac;
pub mod json;

pub use self::hmac::HmacCryptoProvider;
pub use self::json::SerdeJsonProvider;
