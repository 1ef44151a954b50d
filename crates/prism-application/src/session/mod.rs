//! Session state for the studio workflows.
//!
//! A session owns the state one user works against: uploads, histories,
//! suggestions, and the latest results. Remote calls go through
//! `StudioService`; sessions only mutate themselves after those calls
//! succeed.

mod edit;
mod generate;

pub use edit::{EditSession, STYLE_REFINEMENT_SUGGESTIONS};
pub use generate::GenerateSession;
