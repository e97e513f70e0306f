pub(crate) mod chain;
pub(crate) mod compliance;
mod translate;

pub use chain::assemble_chain;
pub use compliance::apply_policy_defaults;
pub use translate::{
    translate, CertificateTemplate, KeyPairPolicy, LockedValue, LockedValues, ProviderTemplate,
    RecommendedKey, RecommendedSettings, ServerPolicy, SubjectPolicy, TemplateKeyType,
};
