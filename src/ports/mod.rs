//! Ports (traits) for key and CSR operations
//!
//! The request synthesis use case depends on these abstractions, not on a
//! concrete cryptography library.

mod csr_signer;
mod key_generator;
mod material_inspector;

pub use csr_signer::CsrSigner;
pub use key_generator::{KeyDefaults, KeyGenerator};
pub use material_inspector::MaterialInspector;

/// Combined trait for everything CSR synthesis needs
pub trait CsrBackend: KeyGenerator + CsrSigner + MaterialInspector {}

// Blanket implementation for types that implement all operation traits
impl<T> CsrBackend for T where T: KeyGenerator + CsrSigner + MaterialInspector {}
