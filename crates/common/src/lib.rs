//! Common types for the admin shell workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
