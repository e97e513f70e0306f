//! KeyGenerator trait - capability to create fresh key pairs

use crate::error::CertResult;
use crate::model::{EllipticCurve, KeyAlgorithm, KeyType};

/// Sizes and curves used when a request leaves them unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDefaults {
    /// RSA modulus in bits
    pub rsa_bits: u32,
    pub ecdsa_curve: EllipticCurve,
}

impl Default for KeyDefaults {
    fn default() -> Self {
        Self {
            rsa_bits: KeyType::DEFAULT_RSA_BITS,
            ecdsa_curve: EllipticCurve::default_ecdsa(),
        }
    }
}

/// Capability to generate key pairs
pub trait KeyGenerator {
    /// Generate a new key pair of the given algorithm
    ///
    /// # Errors
    ///
    /// `UnsupportedKeyConfiguration` when the backend cannot produce keys of
    /// this algorithm, size or curve.
    fn generate_key(&mut self, algorithm: KeyAlgorithm) -> CertResult<crate::model::KeyMaterial>;
}
