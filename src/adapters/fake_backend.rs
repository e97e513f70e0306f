#[cfg(test)]
use crate::error::{CertError, CertResult};
#[cfg(test)]
use crate::model::{
    looks_like_pem, Csr, EllipticCurve, KeyAlgorithm, KeyMaterial, KeyType, Subject,
    SubjectAltNames,
};
#[cfg(test)]
use crate::ports::{CsrSigner, KeyGenerator, MaterialInspector};
#[cfg(test)]
use rand::{rng, RngCore};

#[cfg(test)]
const FAKE_CSR_MAGIC: u8 = 0xFA;

/// Backend without real cryptography
///
/// Keys are random bytes tagged with their algorithm; CSRs are a magic byte,
/// the key tag and the common name. Every call is recorded.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub generated: Vec<KeyAlgorithm>,
    pub signed_for: Vec<String>,
    pub loaded_keys: usize,
}

#[cfg(test)]
impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_calls(&self) -> usize {
        self.generated.len() + self.signed_for.len() + self.loaded_keys
    }
}

#[cfg(test)]
fn tag(algorithm: KeyAlgorithm) -> [u8; 3] {
    match algorithm {
        KeyAlgorithm::Rsa { bits } => [1, (bits >> 8) as u8, bits as u8],
        KeyAlgorithm::Ecdsa(EllipticCurve::P256) => [2, 0, 0],
        KeyAlgorithm::Ecdsa(EllipticCurve::P384) => [2, 1, 0],
        KeyAlgorithm::Ecdsa(EllipticCurve::P521) => [2, 2, 0],
        KeyAlgorithm::Ecdsa(EllipticCurve::Ed25519) => [2, 3, 0],
        KeyAlgorithm::Ed25519 => [3, 0, 0],
    }
}

#[cfg(test)]
fn untag(bytes: &[u8]) -> Option<KeyAlgorithm> {
    match bytes {
        [1, hi, lo, ..] => Some(KeyAlgorithm::Rsa {
            bits: (u32::from(*hi) << 8) | u32::from(*lo),
        }),
        [2, 0, 0, ..] => Some(KeyAlgorithm::Ecdsa(EllipticCurve::P256)),
        [2, 1, 0, ..] => Some(KeyAlgorithm::Ecdsa(EllipticCurve::P384)),
        [3, 0, 0, ..] => Some(KeyAlgorithm::Ed25519),
        _ => None,
    }
}

#[cfg(test)]
impl KeyGenerator for FakeBackend {
    fn generate_key(&mut self, algorithm: KeyAlgorithm) -> CertResult<KeyMaterial> {
        match algorithm {
            KeyAlgorithm::Ecdsa(EllipticCurve::P521 | EllipticCurve::Ed25519) => {
                return Err(CertError::unsupported(format!("fake backend: {algorithm}")))
            }
            KeyAlgorithm::Rsa { bits } if !(2048..=8192).contains(&bits) => {
                return Err(CertError::unsupported(format!("fake backend: {algorithm}")))
            }
            _ => {}
        }
        self.generated.push(algorithm);

        let mut private = tag(algorithm).to_vec();
        let mut random = [0u8; 16];
        rng().fill_bytes(&mut random);
        private.extend_from_slice(&random);
        let public = fake_public(&private);

        Ok(KeyMaterial::new(algorithm, private, public)?)
    }
}

#[cfg(test)]
fn fake_public(private: &[u8]) -> Vec<u8> {
    private.iter().rev().map(|b| b ^ 0x5A).collect()
}

#[cfg(test)]
impl CsrSigner for FakeBackend {
    fn sign_csr(
        &mut self,
        key: &KeyMaterial,
        subject: &Subject,
        _sans: &SubjectAltNames,
    ) -> CertResult<Csr> {
        self.signed_for.push(subject.common_name.clone());

        let mut der = vec![FAKE_CSR_MAGIC];
        der.extend_from_slice(&tag(key.algorithm()));
        der.extend_from_slice(subject.common_name.as_bytes());
        Ok(Csr::from_der(der)?)
    }
}

#[cfg(test)]
impl MaterialInspector for FakeBackend {
    fn load_key(&mut self, bytes: &[u8]) -> CertResult<KeyMaterial> {
        self.loaded_keys += 1;

        let der = if looks_like_pem(bytes) {
            pem::parse(bytes)
                .map_err(|e| CertError::invalid_request(e.to_string()))?
                .into_contents()
        } else {
            bytes.to_vec()
        };
        let algorithm = untag(&der)
            .ok_or_else(|| CertError::unsupported("fake backend: unknown key bytes"))?;
        let public = fake_public(&der);
        Ok(KeyMaterial::new(algorithm, der, public)?)
    }

    fn csr_key_type(&mut self, csr: &Csr) -> CertResult<KeyType> {
        match csr.as_der() {
            [FAKE_CSR_MAGIC, rest @ ..] => untag(rest)
                .map(KeyAlgorithm::key_type)
                .ok_or_else(|| CertError::malformed("fake backend: CSR key tag")),
            _ => Err(CertError::malformed("fake backend: not a fake CSR")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract_tests_for;
    use crate::ports::contract_tests::backend_contract;

    contract_tests_for!(
        fake_backend_contract,
        make = FakeBackend::new,
        tests = {
            generate_ecdsa_p256 => backend_contract::test_generate_ecdsa_p256,
            generate_ed25519 => backend_contract::test_generate_ed25519,
            ed25519_under_ecdsa => backend_contract::test_generate_curve_ed25519_under_ecdsa_unsupported,
            sign_csr_and_read_back => backend_contract::test_sign_csr_and_read_back_key_type,
            load_key_round_trip => backend_contract::test_load_key_round_trips_generated_key,
            load_key_garbage => backend_contract::test_load_key_garbage_rejected,
            csr_key_type_garbage => backend_contract::test_csr_key_type_garbage_rejected,
        }
    );

    #[test]
    fn test_fake_records_calls() {
        let mut backend = FakeBackend::new();
        let key = backend.generate_key(KeyAlgorithm::Rsa { bits: 4096 }).unwrap();
        let subject = Subject {
            common_name: "fake.example.com".to_string(),
            ..Subject::default()
        };
        backend
            .sign_csr(&key, &subject, &SubjectAltNames::default())
            .unwrap();

        assert_eq!(backend.generated, vec![KeyAlgorithm::Rsa { bits: 4096 }]);
        assert_eq!(backend.signed_for, vec!["fake.example.com"]);
        assert_eq!(backend.total_calls(), 2);
    }
}
