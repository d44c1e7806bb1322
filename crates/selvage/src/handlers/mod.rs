//! http handlers for selvage api endpoints.

mod error;
pub mod health;
pub mod licenses;
pub mod models;
pub mod reviews;
pub mod sync;
pub mod ws;

pub use error::{ApiError, OptionExt, ResultExt};
