//! Image types and the data-URL codec.
//!
//! # Module Structure
//!
//! - `payload`: base64 image payload (`ImagePayload`)
//! - `data_url`: the `data:<mime>;base64,<payload>` codec (`DataUrl`)

mod data_url;
mod payload;

// Re-export public API
pub use data_url::{DOWNLOAD_FILE_NAME, DataUrl, read_local_file};
pub use payload::ImagePayload;
