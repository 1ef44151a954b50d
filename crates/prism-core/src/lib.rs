//! Core domain layer of the PRISM studio engine.
//!
//! This crate holds everything the product-photo studio needs that is pure
//! logic: the data-URL codec, the edit and prompt history controllers, the
//! generative-capability interface with its typed request/response model,
//! and the user-facing error taxonomy with its remote-failure normalizer.
//! The only I/O here is the async local-file reader in [`image`].

pub mod capability;
pub mod error;
pub mod history;
pub mod image;

// Re-export common error types
pub use error::{CapabilityError, StudioError};
