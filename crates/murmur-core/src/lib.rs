pub mod config;
pub mod error;

pub use config::{DictationConfig, GeneralConfig, MurmurConfig};
pub use error::{MurmurError, Result};
