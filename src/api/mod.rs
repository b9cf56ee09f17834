mod client;
mod error;
pub mod mock;

pub use client::{Api, AuthResponse, HttpApi};
pub use error::{ApiError, INVALID_RESPONSE_MSG};
