//! Key algorithms, curves and the allowed key configurations of a zone

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Key algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Rsa,
    Ecdsa,
    Ed25519,
}

impl KeyType {
    /// RSA is used whenever nothing else was asked for
    pub fn default_local() -> Self {
        Self::Rsa
    }

    /// Modulus used when RSA is requested without a size
    pub const DEFAULT_RSA_BITS: u32 = 2048;

    /// RSA modulus sizes offered when a zone does not lock the size
    pub const ALL_RSA_SIZES: [u32; 4] = [2048, 3072, 4096, 8192];
}

impl FromStr for KeyType {
    type Err = KeyTypeError;

    /// Accepts the spellings authorities use on the wire, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" => Ok(KeyType::Rsa),
            "ec" | "ecc" | "ecdsa" => Ok(KeyType::Ecdsa),
            "ed25519" => Ok(KeyType::Ed25519),
            _ => Err(KeyTypeError::UnknownKeyType {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Rsa => write!(f, "RSA"),
            KeyType::Ecdsa => write!(f, "ECDSA"),
            KeyType::Ed25519 => write!(f, "ED25519"),
        }
    }
}

/// Named elliptic curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EllipticCurve {
    P256,
    P384,
    P521,
    /// Some templates list `ED25519` among EC curves; it is kept as-is.
    Ed25519,
}

impl EllipticCurve {
    pub fn default_ecdsa() -> Self {
        Self::P256
    }

    /// NIST curves offered when a zone does not lock the curve
    pub const ALL_ECDSA: [EllipticCurve; 3] = [
        EllipticCurve::P256,
        EllipticCurve::P384,
        EllipticCurve::P521,
    ];
}

impl FromStr for EllipticCurve {
    type Err = KeyTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "P256" | "P-256" | "SECP256R1" | "PRIME256V1" => Ok(EllipticCurve::P256),
            "P384" | "P-384" | "SECP384R1" => Ok(EllipticCurve::P384),
            "P521" | "P-521" | "SECP521R1" => Ok(EllipticCurve::P521),
            "ED25519" => Ok(EllipticCurve::Ed25519),
            _ => Err(KeyTypeError::UnknownCurve {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EllipticCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EllipticCurve::P256 => write!(f, "P256"),
            EllipticCurve::P384 => write!(f, "P384"),
            EllipticCurve::P521 => write!(f, "P521"),
            EllipticCurve::Ed25519 => write!(f, "ED25519"),
        }
    }
}

/// One permitted key algorithm together with its permitted sizes or curves
///
/// Sizes only mean something for RSA and curves only for ECDSA; an entry
/// never carries both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedKeyConfiguration {
    pub key_type: KeyType,
    pub key_sizes: Vec<u32>,
    pub key_curves: Vec<EllipticCurve>,
}

impl AllowedKeyConfiguration {
    pub fn rsa(sizes: impl Into<Vec<u32>>) -> Self {
        Self {
            key_type: KeyType::Rsa,
            key_sizes: sizes.into(),
            key_curves: Vec::new(),
        }
    }

    pub fn ecdsa(curves: impl Into<Vec<EllipticCurve>>) -> Self {
        Self {
            key_type: KeyType::Ecdsa,
            key_sizes: Vec::new(),
            key_curves: curves.into(),
        }
    }

    pub fn ed25519() -> Self {
        Self {
            key_type: KeyType::Ed25519,
            key_sizes: Vec::new(),
            key_curves: Vec::new(),
        }
    }

    /// Whether a key of this shape is covered by the entry
    ///
    /// An empty size or curve list does not restrict that dimension, and an
    /// unset size/curve on the key side is accepted (defaults fill it later).
    pub fn permits(
        &self,
        key_type: KeyType,
        size: Option<u32>,
        curve: Option<EllipticCurve>,
    ) -> bool {
        if self.key_type != key_type {
            return false;
        }
        match key_type {
            KeyType::Rsa => match size {
                Some(bits) => self.key_sizes.is_empty() || self.key_sizes.contains(&bits),
                None => true,
            },
            KeyType::Ecdsa => match curve {
                Some(c) => self.key_curves.is_empty() || self.key_curves.contains(&c),
                None => true,
            },
            KeyType::Ed25519 => true,
        }
    }

    pub fn first_size(&self) -> Option<u32> {
        self.key_sizes.first().copied()
    }

    pub fn first_curve(&self) -> Option<EllipticCurve> {
        self.key_curves.first().copied()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyTypeError {
    #[error("Key type not supported: {name}")]
    UnknownKeyType { name: String },

    #[error("Elliptic curve not supported: {name}")]
    UnknownCurve { name: String },
}
