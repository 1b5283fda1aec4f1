mod auth_service;
mod otp_service;
mod token_service;

pub use auth_service::*;
pub use otp_service::*;
pub use token_service::*;
