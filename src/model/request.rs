//! Certificate request as built by the calling application

use std::fmt;
use std::net::IpAddr;

use super::key_type::{EllipticCurve, KeyType};

/// Distinguished-name attributes of the requested certificate
///
/// Multi-valued attributes keep the caller's order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub common_name: String,
    pub organization: Vec<String>,
    pub organizational_unit: Vec<String>,
    pub locality: Vec<String>,
    pub province: Vec<String>,
    pub country: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAltNames {
    pub dns_names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    pub uris: Vec<String>,
    /// User principal names, encoded as otherName SANs
    pub upns: Vec<String>,
}

impl SubjectAltNames {
    pub fn is_empty(&self) -> bool {
        self.dns_names.is_empty()
            && self.email_addresses.is_empty()
            && self.ip_addresses.is_empty()
            && self.uris.is_empty()
            && self.upns.is_empty()
    }
}

/// Which party produces the key pair and the CSR
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CsrOrigin {
    /// Key and CSR are generated here
    #[default]
    LocalGenerated,
    /// The authority generates key and CSR on its side
    ServiceGenerated,
    /// The caller already holds a key and/or CSR
    UserProvided,
}

/// Private key or CSR bytes handed in by the caller, PEM or DER
#[derive(Clone, PartialEq, Eq)]
pub struct SuppliedBytes(pub Vec<u8>);

impl SuppliedBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SuppliedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuppliedBytes([REDACTED; {}])", self.0.len())
    }
}

impl From<Vec<u8>> for SuppliedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for SuppliedBytes {
    fn from(pem: &str) -> Self {
        Self(pem.as_bytes().to_vec())
    }
}

/// Certificate request owned by the caller
///
/// Zone defaulting only fills fields that are still empty; it never replaces
/// a value the caller set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub subject: Subject,
    pub sans: SubjectAltNames,
    pub key_type: Option<KeyType>,
    pub key_length: Option<u32>,
    pub key_curve: Option<EllipticCurve>,
    pub csr_origin: CsrOrigin,
    pub private_key: Option<SuppliedBytes>,
    pub csr: Option<SuppliedBytes>,
    /// Requested validity, a hint forwarded to the authority
    pub validity_hours: Option<u32>,
}

impl Request {
    pub fn with_common_name(common_name: impl Into<String>) -> Self {
        let mut request = Self::default();
        request.subject.common_name = common_name.into();
        request
    }
}
