//! PRISM Interaction - Remote generative capability implementations.
//!
//! This crate provides the Gemini-backed implementation of
//! [`prism_core::capability::GenerativeCapability`] along with its
//! secret.json configuration loader.

pub mod config;
pub mod gemini;

pub use config::{GeminiConfig, SecretConfig, load_secret_config};
pub use gemini::GeminiCapability;
