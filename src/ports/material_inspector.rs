//! MaterialInspector trait - capability to read caller-supplied keys and CSRs

use crate::error::CertResult;
use crate::model::{Csr, KeyMaterial, KeyType};

pub trait MaterialInspector {
    /// Load a PKCS#8 private key from PEM or DER
    fn load_key(&mut self, bytes: &[u8]) -> CertResult<KeyMaterial>;

    /// Key family of the public key a CSR is bound to
    fn csr_key_type(&mut self, csr: &Csr) -> CertResult<KeyType>;
}
