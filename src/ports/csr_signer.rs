//! CsrSigner trait - capability to build PKCS#10 requests

use crate::error::CertResult;
use crate::model::{Csr, KeyMaterial, Subject, SubjectAltNames};

/// Capability to build and self-sign a certificate signing request
pub trait CsrSigner {
    /// Build a CSR carrying `subject` and `sans`, signed with `key`
    ///
    /// # Errors
    ///
    /// Returns errors if:
    /// - The key cannot be loaded for signing
    /// - A SAN value cannot be encoded (e.g. non-ASCII DNS name)
    fn sign_csr(
        &mut self,
        key: &KeyMaterial,
        subject: &Subject,
        sans: &SubjectAltNames,
    ) -> CertResult<Csr>;
}
