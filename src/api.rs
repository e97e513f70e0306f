use crate::adapters::RcgenBackend;
use crate::error::CertResult;
use crate::logic;
use crate::ports::KeyDefaults;
use crate::use_cases::generate_request as generate_request_use_case;

pub use crate::logic::{
    CertificateTemplate, KeyPairPolicy, LockedValue, LockedValues, ProviderTemplate,
    RecommendedKey, RecommendedSettings, ServerPolicy, SubjectPolicy, TemplateKeyType,
};
pub use crate::model::*;
pub use crate::use_cases::CsrArtifact;

pub fn translate_policy(template: &ProviderTemplate) -> Policy {
    logic::translate(template)
}

pub fn zone_configuration(template: &ProviderTemplate) -> ZoneConfiguration {
    template.to_zone_configuration()
}

/// Fill request defaults from a bare policy; never rejects
pub fn apply_policy_defaults(policy: &Policy, request: &mut Request) {
    logic::apply_policy_defaults(policy, request)
}

pub fn generate_request(request: &Request) -> CertResult<CsrArtifact> {
    generate_request_with_defaults(request, &KeyDefaults::default())
}

pub fn generate_request_with_defaults(
    request: &Request,
    defaults: &KeyDefaults,
) -> CertResult<CsrArtifact> {
    let mut backend = RcgenBackend::new();
    generate_request_use_case(&mut backend, request, defaults)
}

pub fn assemble_chain(bundle: impl AsRef<[u8]>, order: ChainOption) -> CertResult<Chain> {
    logic::assemble_chain(bundle, order)
}
