mod error;
pub mod handler;
mod router;

pub use error::*;
pub use router::*;
