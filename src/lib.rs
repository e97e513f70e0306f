//! Client-side core for talking to certificate authority services
//!
//! Translates provider zone templates into one canonical [`model::Policy`],
//! fills request defaults from it, synthesizes key pairs and PKCS#10
//! requests, and assembles returned PEM bundles into ordered chains.
//! Transport to the authorities themselves lives elsewhere.

pub mod adapters;
pub mod api;
pub mod error;
mod logic;
pub mod model;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use error::{CertError, CertResult, ErrorKind, PolicyViolation};
pub use model::{KeyMaterial, KeyType, Policy, Request};

// Re-export public API
pub use api::{
    apply_policy_defaults, assemble_chain, generate_request, translate_policy, zone_configuration,
};
