mod auth_service_impl;
mod mailer_log;
mod otp_service_impl;
mod password;
mod token_service_impl;

pub use auth_service_impl::*;
pub use mailer_log::*;
pub use otp_service_impl::*;
pub use password::*;
pub use token_service_impl::*;
