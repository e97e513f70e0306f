use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::error::{CertError, CertResult};

/// Where the root certificate should end up in an assembled chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChainOption {
    #[default]
    AsReceived,
    RootFirst,
    RootLast,
    IgnoreRoot,
}

impl FromStr for ChainOption {
    type Err = ChainOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "as-received" | "asreceived" => Ok(ChainOption::AsReceived),
            "root-first" | "rootfirst" => Ok(ChainOption::RootFirst),
            "root-last" | "rootlast" => Ok(ChainOption::RootLast),
            "ignore-root" | "ignoreroot" => Ok(ChainOption::IgnoreRoot),
            _ => Err(ChainOptionError::Unknown {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ChainOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainOption::AsReceived => write!(f, "as-received"),
            ChainOption::RootFirst => write!(f, "root-first"),
            ChainOption::RootLast => write!(f, "root-last"),
            ChainOption::IgnoreRoot => write!(f, "ignore-root"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainOptionError {
    #[error("Unknown chain option {name:?}, expected as-received, root-first, root-last or ignore-root")]
    Unknown { name: String },
}

/// A parsed X.509 certificate
///
/// Immutable once decoded.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    self_signed: bool,
}

impl Certificate {
    /// Decode a DER certificate, rejecting trailing garbage
    pub fn from_der(der: Vec<u8>) -> CertResult<Self> {
        let (subject, issuer, self_signed) = {
            let (rest, cert) = X509Certificate::from_der(&der)
                .map_err(|e| CertError::malformed(format!("certificate does not decode: {e}")))?;
            if !rest.is_empty() {
                return Err(CertError::malformed(format!(
                    "{} trailing bytes after certificate",
                    rest.len()
                )));
            }
            (
                cert.subject().to_string(),
                cert.issuer().to_string(),
                cert.subject().as_raw() == cert.issuer().as_raw(),
            )
        };

        Ok(Self {
            der,
            subject,
            issuer,
            self_signed,
        })
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn pem(&self) -> String {
        pem::encode(&pem::Pem::new("CERTIFICATE", self.der.clone()))
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issuer and subject names are byte-identical
    pub fn is_self_signed(&self) -> bool {
        self.self_signed
    }

    /// Lowercase hex SHA-256 over the DER encoding
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.der))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("issuer", &self.issuer)
            .field("self_signed", &self.self_signed)
            .finish()
    }
}

/// Ordered certificates returned for one issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub(crate) certificates: Vec<Certificate>,
    pub(crate) private_key_pem: Option<String>,
}

impl Chain {
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// First certificate as ordered; the leaf unless the root was moved first
    pub fn first(&self) -> Option<&Certificate> {
        self.certificates.first()
    }

    /// Private key the authority sent back alongside the certificates
    pub fn private_key_pem(&self) -> Option<&str> {
        self.private_key_pem.as_deref()
    }

    pub fn to_pem(&self) -> String {
        self.certificates.iter().map(Certificate::pem).collect()
    }

    pub fn into_certificates(self) -> Vec<Certificate> {
        self.certificates
    }
}
