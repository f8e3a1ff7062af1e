pub mod config;
pub mod error;
pub mod types;

pub use error::{OrcapixError, OrcapixResult};
pub use types::{PixKeyInput, PixKeyType};
