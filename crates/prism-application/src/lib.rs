//! Application layer for PRISM.
//!
//! This crate coordinates the studio workflows: it wires per-session state
//! (uploads, edit history, prompt history) to the remote generative
//! capability through `StudioService`.

pub mod session;
pub mod studio_service;

pub use session::{EditSession, GenerateSession, STYLE_REFINEMENT_SUGGESTIONS};
pub use studio_service::{RefinementResult, StudioService};
