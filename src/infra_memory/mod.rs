mod otp_store_memory;
mod revocation_store_memory;
mod user_directory_memory;

pub use otp_store_memory::*;
pub use revocation_store_memory::*;
pub use user_directory_memory::*;
