//! Adapters - concrete implementations of ports (traits)

mod rcgen_backend;

#[cfg(test)]
pub mod fake_backend;

// Re-export for convenience
pub use rcgen_backend::RcgenBackend;
