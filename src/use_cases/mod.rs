//! Use cases (orchestration)
//!
//! Use cases coordinate ports and domain logic; they never pick a concrete
//! backend themselves.

mod generate_request;

pub use generate_request::{generate_request, CsrArtifact};
