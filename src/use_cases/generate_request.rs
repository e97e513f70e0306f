//! Generate request use case
//!
//! Turns a finalized request into key material and a CSR, or into the
//! instructions the authority needs to generate them itself.

use tracing::{debug, info};

use crate::error::{CertError, CertResult, ED25519_SERVICE_GENERATED_MESSAGE};
use crate::model::{Csr, CsrOrigin, EllipticCurve, KeyAlgorithm, KeyMaterial, KeyType, Request};
use crate::ports::{CsrBackend, KeyDefaults};

/// What CSR synthesis produced for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsrArtifact {
    /// Fresh key pair and the CSR signed with it
    Local { key: KeyMaterial, csr: Csr },
    /// Nothing generated here; the authority creates key and CSR of this shape
    AuthorityGenerated {
        key_type: KeyType,
        key_length: Option<u32>,
        key_curve: Option<EllipticCurve>,
    },
    /// Caller material passed through; `key` is absent when only a CSR was given
    UserProvided { key: Option<KeyMaterial>, csr: Csr },
}

impl CsrArtifact {
    pub fn csr(&self) -> Option<&Csr> {
        match self {
            CsrArtifact::Local { csr, .. } | CsrArtifact::UserProvided { csr, .. } => Some(csr),
            CsrArtifact::AuthorityGenerated { .. } => None,
        }
    }

    pub fn key(&self) -> Option<&KeyMaterial> {
        match self {
            CsrArtifact::Local { key, .. } => Some(key),
            CsrArtifact::UserProvided { key, .. } => key.as_ref(),
            CsrArtifact::AuthorityGenerated { .. } => None,
        }
    }
}

/// Produce key material and CSR for a request
///
/// # Errors
///
/// Returns errors if:
/// - Ed25519 is combined with authority-side generation
/// - The key algorithm, size or curve cannot be synthesized
/// - Supplied key or CSR does not match the requested key type
/// - User-provided origin comes with neither key nor CSR
pub fn generate_request<B>(
    backend: &mut B,
    request: &Request,
    defaults: &KeyDefaults,
) -> CertResult<CsrArtifact>
where
    B: CsrBackend,
{
    if request.csr_origin == CsrOrigin::ServiceGenerated
        && request.key_type == Some(KeyType::Ed25519)
    {
        return Err(CertError::unsupported(ED25519_SERVICE_GENERATED_MESSAGE));
    }

    match request.csr_origin {
        CsrOrigin::LocalGenerated => {
            let algorithm = resolve_algorithm(request, defaults)?;
            let key = backend.generate_key(algorithm)?;
            let csr = backend.sign_csr(&key, &request.subject, &request.sans)?;
            info!("Generated {} key and CSR locally", algorithm);
            Ok(CsrArtifact::Local { key, csr })
        }
        CsrOrigin::ServiceGenerated => {
            let algorithm = resolve_algorithm(request, defaults)?;
            debug!("Key and CSR will be generated by the authority as {}", algorithm);
            let (key_length, key_curve) = match algorithm {
                KeyAlgorithm::Rsa { bits } => (Some(bits), None),
                KeyAlgorithm::Ecdsa(curve) => (None, Some(curve)),
                KeyAlgorithm::Ed25519 => (None, None),
            };
            Ok(CsrArtifact::AuthorityGenerated {
                key_type: algorithm.key_type(),
                key_length,
                key_curve,
            })
        }
        CsrOrigin::UserProvided => user_provided(backend, request),
    }
}

fn user_provided<B: CsrBackend>(backend: &mut B, request: &Request) -> CertResult<CsrArtifact> {
    let supplied_key = request.private_key.as_ref().filter(|k| !k.is_empty());
    let supplied_csr = request.csr.as_ref().filter(|c| !c.is_empty());

    let key = supplied_key
        .map(|bytes| backend.load_key(bytes.as_bytes()))
        .transpose()?;
    if let (Some(expected), Some(key)) = (request.key_type, &key) {
        if key.key_type() != expected {
            return Err(CertError::unsupported(format!(
                "supplied private key is {} but {} was requested",
                key.key_type(),
                expected
            )));
        }
    }

    let csr = match (supplied_csr, &key) {
        (Some(bytes), _) => Csr::from_pem_or_der(bytes.as_bytes())
            .map_err(|e| CertError::invalid_request(format!("supplied CSR: {e}")))?,
        (None, Some(key)) => {
            debug!("No CSR supplied, building one with the supplied key");
            backend.sign_csr(key, &request.subject, &request.sans)?
        }
        (None, None) => {
            return Err(CertError::invalid_request(
                "user provided CSR origin requires a private key or a CSR",
            ))
        }
    };

    if supplied_csr.is_some() {
        let csr_key_type = backend.csr_key_type(&csr)?;
        let expected = key.as_ref().map(KeyMaterial::key_type).or(request.key_type);
        if let Some(expected) = expected {
            if csr_key_type != expected {
                return Err(CertError::unsupported(format!(
                    "supplied CSR carries a {csr_key_type} key but {expected} was expected"
                )));
            }
        }
    }

    Ok(CsrArtifact::UserProvided { key, csr })
}

/// Concrete algorithm for a request, RSA when nothing was asked for
fn resolve_algorithm(request: &Request, defaults: &KeyDefaults) -> CertResult<KeyAlgorithm> {
    let key_type = request.key_type.unwrap_or_else(KeyType::default_local);
    match key_type {
        KeyType::Rsa => Ok(KeyAlgorithm::Rsa {
            bits: request.key_length.unwrap_or(defaults.rsa_bits),
        }),
        KeyType::Ecdsa => match request.key_curve.unwrap_or(defaults.ecdsa_curve) {
            EllipticCurve::Ed25519 => Err(CertError::unsupported(
                "ED25519 is not an ECDSA curve, request an ED25519 key instead",
            )),
            curve => Ok(KeyAlgorithm::Ecdsa(curve)),
        },
        KeyType::Ed25519 => Ok(KeyAlgorithm::Ed25519),
    }
}
