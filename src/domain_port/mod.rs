// store

mod otp_store;
mod revocation_store;

pub use otp_store::*;
pub use revocation_store::*;

// external collaborators

mod mailer;
mod user_directory;

pub use mailer::*;
pub use user_directory::*;
