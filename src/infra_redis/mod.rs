mod otp_store_redis;
mod revocation_store_redis;

pub use otp_store_redis::*;
pub use revocation_store_redis::*;
