use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use super::key_type::{EllipticCurve, KeyType};

const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
const CSR_LABEL: &str = "CERTIFICATE REQUEST";
const LEGACY_CSR_LABEL: &str = "NEW CERTIFICATE REQUEST";

/// Concrete algorithm of a key pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rsa { bits: u32 },
    Ecdsa(EllipticCurve),
    Ed25519,
}

impl KeyAlgorithm {
    pub fn key_type(self) -> KeyType {
        match self {
            KeyAlgorithm::Rsa { .. } => KeyType::Rsa,
            KeyAlgorithm::Ecdsa(_) => KeyType::Ecdsa,
            KeyAlgorithm::Ed25519 => KeyType::Ed25519,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Rsa { bits } => write!(f, "RSA {bits}"),
            KeyAlgorithm::Ecdsa(curve) => write!(f, "ECDSA {curve}"),
            KeyAlgorithm::Ed25519 => write!(f, "ED25519"),
        }
    }
}

/// An owned private/public key pair
///
/// The private half is kept as PKCS#8 DER and wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    algorithm: KeyAlgorithm,
    private_der: Zeroizing<Vec<u8>>,
    public_der: Vec<u8>,
}

impl KeyMaterial {
    pub fn new(
        algorithm: KeyAlgorithm,
        private_der: Vec<u8>,
        public_der: Vec<u8>,
    ) -> Result<Self, KeyMaterialError> {
        if private_der.is_empty() {
            return Err(KeyMaterialError::Empty {
                what: "private key".to_string(),
            });
        }
        if public_der.is_empty() {
            return Err(KeyMaterialError::Empty {
                what: "public key".to_string(),
            });
        }
        Ok(Self {
            algorithm,
            private_der: Zeroizing::new(private_der),
            public_der,
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn key_type(&self) -> KeyType {
        self.algorithm.key_type()
    }

    /// PKCS#8 DER of the private key
    pub fn private_key_der(&self) -> &[u8] {
        &self.private_der
    }

    pub fn private_key_pem(&self) -> Zeroizing<String> {
        Zeroizing::new(pem::encode(&pem::Pem::new(
            PRIVATE_KEY_LABEL,
            self.private_der.to_vec(),
        )))
    }

    /// SubjectPublicKeyInfo DER of the public key
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_der
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail = &self.public_der[self.public_der.len().saturating_sub(8)..];
        write!(
            f,
            "KeyMaterial {{ algorithm: {}, private: [REDACTED], public: ..{} }}",
            self.algorithm,
            hex::encode(tail)
        )
    }
}

/// DER-encoded PKCS#10 certificate signing request
#[derive(Clone, PartialEq, Eq)]
pub struct Csr(Vec<u8>);

impl Csr {
    pub fn from_der(der: Vec<u8>) -> Result<Self, KeyMaterialError> {
        if der.is_empty() {
            return Err(KeyMaterialError::Empty {
                what: "CSR".to_string(),
            });
        }
        Ok(Self(der))
    }

    /// Accepts either a PEM `CERTIFICATE REQUEST` block or raw DER
    pub fn from_pem_or_der(bytes: &[u8]) -> Result<Self, KeyMaterialError> {
        if !looks_like_pem(bytes) {
            return Self::from_der(bytes.to_vec());
        }
        let block = pem::parse(bytes).map_err(|e| KeyMaterialError::InvalidPem {
            reason: e.to_string(),
        })?;
        if block.tag() != CSR_LABEL && block.tag() != LEGACY_CSR_LABEL {
            return Err(KeyMaterialError::UnexpectedLabel {
                expected: CSR_LABEL.to_string(),
                found: block.tag().to_string(),
            });
        }
        Self::from_der(block.into_contents())
    }

    pub fn as_der(&self) -> &[u8] {
        &self.0
    }

    pub fn to_pem(&self) -> String {
        pem::encode(&pem::Pem::new(CSR_LABEL, self.0.clone()))
    }
}

impl fmt::Debug for Csr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Csr({} bytes)", self.0.len())
    }
}

pub(crate) fn looks_like_pem(bytes: &[u8]) -> bool {
    bytes.trim_ascii_start().starts_with(b"-----BEGIN")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterialError {
    #[error("{what} is empty")]
    Empty { what: String },

    #[error("Invalid PEM: {reason}")]
    InvalidPem { reason: String },

    #[error("Expected PEM block {expected}, got {found}")]
    UnexpectedLabel { expected: String, found: String },
}
