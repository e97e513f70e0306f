//! Key and CSR backend built on rcgen, rsa and ed25519-dalek
//!
//! rcgen (with ring) signs the requests. It cannot create RSA keys, so those
//! come from the `rsa` crate; Ed25519 seeds are drawn the same way the rest of
//! the crate draws random bytes and encoded with ed25519-dalek.

use ed25519_dalek::SigningKey;
use rand::{rng, RngCore};
use rcgen::{
    CertificateParams, DistinguishedName, DnType, Ia5String, KeyPair, OtherNameValue, SanType,
    SignatureAlgorithm, PKCS_ECDSA_P256_SHA256, PKCS_ECDSA_P384_SHA384, PKCS_ED25519,
    PKCS_RSA_SHA256,
};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use tracing::{debug, info};
use x509_parser::certification_request::X509CertificationRequest;
use x509_parser::prelude::FromDer;
use zeroize::Zeroizing;

use crate::error::{CertError, CertResult};
use crate::model::{
    looks_like_pem, Csr, EllipticCurve, KeyAlgorithm, KeyMaterial, KeyType, Subject,
    SubjectAltNames,
};
use crate::ports::{CsrSigner, KeyGenerator, MaterialInspector};

const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_ED25519: &str = "1.3.101.112";
/// Microsoft user principal name, carried as an otherName SAN
const OID_UPN: [u64; 10] = [1, 3, 6, 1, 4, 1, 311, 20, 2, 3];

const MIN_RSA_BITS: u32 = 2048;
const MAX_RSA_BITS: u32 = 8192;

/// Software backend for local key and CSR synthesis
#[derive(Debug, Clone, Copy, Default)]
pub struct RcgenBackend;

impl RcgenBackend {
    pub fn new() -> Self {
        Self
    }
}

impl KeyGenerator for RcgenBackend {
    fn generate_key(&mut self, algorithm: KeyAlgorithm) -> CertResult<KeyMaterial> {
        debug!("Generating {} key", algorithm);

        let pkcs8: Zeroizing<Vec<u8>> = match algorithm {
            KeyAlgorithm::Rsa { bits } => generate_rsa(bits)?,
            KeyAlgorithm::Ecdsa(curve) => {
                let key_pair = KeyPair::generate_for(ecdsa_signature_algorithm(curve)?)
                    .map_err(|e| CertError::unsupported(format!("ECDSA {curve}: {e}")))?;
                Zeroizing::new(key_pair.serialize_der())
            }
            KeyAlgorithm::Ed25519 => {
                let mut seed = Zeroizing::new([0u8; 32]);
                rng().fill_bytes(&mut *seed);
                let signing_key = SigningKey::from_bytes(&seed);
                let document = signing_key
                    .to_pkcs8_der()
                    .map_err(|e| CertError::unsupported(format!("ED25519 encoding: {e}")))?;
                Zeroizing::new(document.as_bytes().to_vec())
            }
        };

        let key_pair = KeyPair::try_from(pkcs8.as_slice())
            .map_err(|e| CertError::unsupported(format!("{algorithm}: {e}")))?;
        let material = KeyMaterial::new(algorithm, pkcs8.to_vec(), key_pair.public_key_der())?;

        info!("Generated {} key", algorithm);
        Ok(material)
    }
}

impl CsrSigner for RcgenBackend {
    fn sign_csr(
        &mut self,
        key: &KeyMaterial,
        subject: &Subject,
        sans: &SubjectAltNames,
    ) -> CertResult<Csr> {
        let key_pair = KeyPair::try_from(key.private_key_der())
            .map_err(|e| CertError::unsupported(format!("{}: {e}", key.algorithm())))?;

        let mut params = CertificateParams::default();
        params.distinguished_name = distinguished_name(subject);
        params.subject_alt_names = subject_alt_names(sans)?;

        let csr = params
            .serialize_request(&key_pair)
            .map_err(|e| CertError::invalid_request(format!("CSR could not be built: {e}")))?;

        debug!("Built CSR for {:?}", subject.common_name);
        Ok(Csr::from_der(csr.der().to_vec())?)
    }
}

impl MaterialInspector for RcgenBackend {
    fn load_key(&mut self, bytes: &[u8]) -> CertResult<KeyMaterial> {
        let pkcs8 = pkcs8_der(bytes)?;
        let key_pair = KeyPair::try_from(pkcs8.as_slice()).map_err(|e| {
            CertError::unsupported(format!(
                "private key is not a usable RSA, ECDSA P-256/P-384 or ED25519 key: {e}"
            ))
        })?;

        let algorithm = key_algorithm(key_pair.algorithm(), &pkcs8)?;
        debug!("Loaded supplied {} key", algorithm);
        Ok(KeyMaterial::new(
            algorithm,
            pkcs8.to_vec(),
            key_pair.public_key_der(),
        )?)
    }

    fn csr_key_type(&mut self, csr: &Csr) -> CertResult<KeyType> {
        let (_, request) = X509CertificationRequest::from_der(csr.as_der())
            .map_err(|e| CertError::malformed(format!("CSR does not decode: {e}")))?;
        let oid = request
            .certification_request_info
            .subject_pki
            .algorithm
            .algorithm
            .to_id_string();

        match oid.as_str() {
            OID_RSA_ENCRYPTION => Ok(KeyType::Rsa),
            OID_EC_PUBLIC_KEY => Ok(KeyType::Ecdsa),
            OID_ED25519 => Ok(KeyType::Ed25519),
            other => Err(CertError::unsupported(format!(
                "CSR public key algorithm {other}"
            ))),
        }
    }
}

fn generate_rsa(bits: u32) -> CertResult<Zeroizing<Vec<u8>>> {
    if !(MIN_RSA_BITS..=MAX_RSA_BITS).contains(&bits) {
        return Err(CertError::unsupported(format!(
            "RSA {bits}: size must be between {MIN_RSA_BITS} and {MAX_RSA_BITS} bits"
        )));
    }
    let private_key = RsaPrivateKey::new(&mut rand_core::OsRng, bits as usize)
        .map_err(|e| CertError::unsupported(format!("RSA {bits}: {e}")))?;
    let document = private_key
        .to_pkcs8_der()
        .map_err(|e| CertError::unsupported(format!("RSA {bits} encoding: {e}")))?;
    Ok(Zeroizing::new(document.as_bytes().to_vec()))
}

fn ecdsa_signature_algorithm(curve: EllipticCurve) -> CertResult<&'static SignatureAlgorithm> {
    match curve {
        EllipticCurve::P256 => Ok(&PKCS_ECDSA_P256_SHA256),
        EllipticCurve::P384 => Ok(&PKCS_ECDSA_P384_SHA384),
        EllipticCurve::P521 => Err(CertError::unsupported(
            "ECDSA P521 keys cannot be generated locally",
        )),
        EllipticCurve::Ed25519 => Err(CertError::unsupported(
            "ED25519 is not an ECDSA curve, request an ED25519 key instead",
        )),
    }
}

/// PKCS#8 DER from PEM or DER input; PKCS#1 RSA keys are converted
fn pkcs8_der(bytes: &[u8]) -> CertResult<Zeroizing<Vec<u8>>> {
    if bytes.is_empty() {
        return Err(CertError::invalid_request("supplied private key is empty"));
    }
    if !looks_like_pem(bytes) {
        return Ok(Zeroizing::new(bytes.to_vec()));
    }

    let block = pem::parse(bytes)
        .map_err(|e| CertError::invalid_request(format!("private key PEM: {e}")))?;
    let tag = block.tag().to_string();
    match tag.as_str() {
        "PRIVATE KEY" => Ok(Zeroizing::new(block.into_contents())),
        "RSA PRIVATE KEY" => {
            let der = Zeroizing::new(block.into_contents());
            let key = RsaPrivateKey::from_pkcs1_der(&der)
                .map_err(|e| CertError::unsupported(format!("RSA private key: {e}")))?;
            let document = key
                .to_pkcs8_der()
                .map_err(|e| CertError::unsupported(format!("RSA private key: {e}")))?;
            Ok(Zeroizing::new(document.as_bytes().to_vec()))
        }
        other => Err(CertError::unsupported(format!(
            "private key PEM block {other} is not supported, expected PRIVATE KEY"
        ))),
    }
}

fn key_algorithm(signature: &SignatureAlgorithm, pkcs8: &[u8]) -> CertResult<KeyAlgorithm> {
    if signature == &PKCS_ED25519 {
        Ok(KeyAlgorithm::Ed25519)
    } else if signature == &PKCS_ECDSA_P256_SHA256 {
        Ok(KeyAlgorithm::Ecdsa(EllipticCurve::P256))
    } else if signature == &PKCS_ECDSA_P384_SHA384 {
        Ok(KeyAlgorithm::Ecdsa(EllipticCurve::P384))
    } else if signature == &PKCS_RSA_SHA256 {
        let key = RsaPrivateKey::from_pkcs8_der(pkcs8)
            .map_err(|e| CertError::unsupported(format!("RSA private key: {e}")))?;
        Ok(KeyAlgorithm::Rsa {
            bits: (key.size() * 8) as u32,
        })
    } else {
        Err(CertError::unsupported(format!(
            "private key algorithm {signature:?}"
        )))
    }
}

/// rcgen keeps one value per attribute type, so only the first value of a
/// multi-valued attribute is encoded.
fn distinguished_name(subject: &Subject) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    if !subject.common_name.is_empty() {
        dn.push(DnType::CommonName, subject.common_name.as_str());
    }
    let attributes = [
        (DnType::OrganizationName, &subject.organization),
        (DnType::OrganizationalUnitName, &subject.organizational_unit),
        (DnType::LocalityName, &subject.locality),
        (DnType::StateOrProvinceName, &subject.province),
        (DnType::CountryName, &subject.country),
    ];
    for (dn_type, values) in attributes {
        if let Some(value) = values.iter().find(|v| !v.is_empty()) {
            dn.push(dn_type, value.as_str());
        }
    }
    dn
}

fn subject_alt_names(sans: &SubjectAltNames) -> CertResult<Vec<SanType>> {
    let ia5 = |kind: &str, value: &str| -> CertResult<Ia5String> {
        Ia5String::try_from(value)
            .map_err(|_| CertError::invalid_request(format!("{kind} SAN {value:?} is not ASCII")))
    };

    let mut out = Vec::new();
    for dns in &sans.dns_names {
        out.push(SanType::DnsName(ia5("DNS", dns)?));
    }
    for email in &sans.email_addresses {
        out.push(SanType::Rfc822Name(ia5("email", email)?));
    }
    for ip in &sans.ip_addresses {
        out.push(SanType::IpAddress(*ip));
    }
    for uri in &sans.uris {
        out.push(SanType::URI(ia5("URI", uri)?));
    }
    for upn in &sans.upns {
        out.push(SanType::OtherName((
            OID_UPN.to_vec(),
            OtherNameValue::Utf8String(upn.clone()),
        )));
    }
    Ok(out)
}
