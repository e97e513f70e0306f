//! Translation of provider policy templates into the canonical [`Policy`]
//!
//! Each provider has its own template shape. All of them funnel through the
//! helpers here so anchoring, wildcard inference and key-type mapping behave
//! identically everywhere.

mod cloud;
mod on_prem;

use serde::Deserialize;
use tracing::warn;

pub use cloud::{CertificateTemplate, RecommendedKey, RecommendedSettings, TemplateKeyType};
pub use on_prem::{KeyPairPolicy, LockedValue, LockedValues, ServerPolicy, SubjectPolicy};

use crate::model::{AllowedKeyConfiguration, EllipticCurve, KeyType, Policy, ZoneConfiguration};

/// Zone template as returned by one of the supported authorities
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum ProviderTemplate {
    Cloud(CertificateTemplate),
    OnPrem(ServerPolicy),
}

impl ProviderTemplate {
    /// Policy plus the zone's scalar defaults
    pub fn to_zone_configuration(&self) -> ZoneConfiguration {
        match self {
            ProviderTemplate::Cloud(template) => template.to_zone_configuration(),
            ProviderTemplate::OnPrem(policy) => policy.to_zone_configuration(),
        }
    }
}

impl From<CertificateTemplate> for ProviderTemplate {
    fn from(template: CertificateTemplate) -> Self {
        ProviderTemplate::Cloud(template)
    }
}

impl From<ServerPolicy> for ProviderTemplate {
    fn from(policy: ServerPolicy) -> Self {
        ProviderTemplate::OnPrem(policy)
    }
}

/// Translate any provider template; total and deterministic
pub fn translate(template: &ProviderTemplate) -> Policy {
    match template {
        ProviderTemplate::Cloud(template) => template.to_policy(),
        ProviderTemplate::OnPrem(policy) => policy.to_policy(),
    }
}

/// Wrap a fragment as a full-match pattern, leaving existing anchors alone
pub(crate) fn anchor(fragment: &str) -> String {
    let start = if fragment.starts_with('^') { "" } else { "^" };
    let end = if fragment.ends_with('$') && !fragment.ends_with("\\$") {
        ""
    } else {
        "$"
    };
    format!("{start}{fragment}{end}")
}

/// Anchor every fragment; an absent or empty list asserts nothing
pub(crate) fn anchor_all(fragments: Option<&[String]>) -> Option<Vec<String>> {
    match fragments {
        Some(list) if !list.is_empty() => Some(list.iter().map(|f| anchor(f)).collect()),
        _ => None,
    }
}

/// The one wildcard inference rule
///
/// A DNS fragment signals wildcards when, ignoring a leading `^`, it starts
/// with `.*` or `*`.
pub(crate) fn allows_wildcards<S: AsRef<str>>(dns_fragments: &[S]) -> bool {
    dns_fragments.iter().any(|fragment| {
        let body = fragment.as_ref();
        let body = body.strip_prefix('^').unwrap_or(body);
        body.starts_with(".*") || body.starts_with('*')
    })
}

/// Map a template key-type entry; unknown curve names are dropped
///
/// Returns `None` when the key-type name itself is unknown.
pub(crate) fn key_configuration(
    key_type: &str,
    sizes: &[u32],
    curves: &[String],
) -> Option<AllowedKeyConfiguration> {
    let key_type: KeyType = match key_type.parse() {
        Ok(key_type) => key_type,
        Err(e) => {
            warn!("Dropping key type entry: {}", e);
            return None;
        }
    };

    let key_curves = curves
        .iter()
        .filter_map(|name| match name.parse::<EllipticCurve>() {
            Ok(curve) => Some(curve),
            Err(e) => {
                warn!("Dropping curve from {} entry: {}", key_type, e);
                None
            }
        })
        .collect();

    Some(AllowedKeyConfiguration {
        key_type,
        key_sizes: sizes.to_vec(),
        key_curves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("cn1"), "^cn1$");
        assert_eq!(anchor("^cn1$"), "^cn1$");
        assert_eq!(anchor("^open"), "^open$");
        assert_eq!(anchor("price\\$"), "^price\\$$");
        assert_eq!(anchor(""), "^$");
    }

    #[test]
    fn test_anchor_all_absent_and_empty() {
        let empty: Vec<String> = Vec::new();
        let fragments = vec!["a".to_string(), "^b$".to_string()];
        assert_eq!(anchor_all(None), None);
        assert_eq!(anchor_all(Some(empty.as_slice())), None);
        assert_eq!(
            anchor_all(Some(fragments.as_slice())),
            Some(vec!["^a$".to_string(), "^b$".to_string()])
        );
    }

    #[test]
    fn test_allows_wildcards() {
        assert!(allows_wildcards(&[".*example.com"]));
        assert!(allows_wildcards(&["^.*example.com$"]));
        assert!(allows_wildcards(&["host.example.com", "*.example.com"]));
        assert!(!allows_wildcards(&["host.example.com"]));
        assert!(!allows_wildcards(&["[a-z]+.example.com"]));
        assert!(!allows_wildcards::<&str>(&[]));
    }

    #[test]
    fn test_key_configuration_mapping() {
        let conf = key_configuration(
            "EC",
            &[],
            &["P256".to_string(), "brainpool".to_string(), "ED25519".to_string()],
        )
        .unwrap();
        assert_eq!(conf.key_type, KeyType::Ecdsa);
        assert_eq!(conf.key_curves, vec![EllipticCurve::P256, EllipticCurve::Ed25519]);

        assert!(key_configuration("DSA", &[1024], &[]).is_none());
    }

    #[test]
    fn test_translate_is_deterministic() {
        let template = ProviderTemplate::Cloud(CertificateTemplate {
            san_regexes: Some(vec![".*example.com".to_string()]),
            ..CertificateTemplate::default()
        });
        assert_eq!(translate(&template), translate(&template));
    }

    #[test]
    fn test_translated_patterns_survive_retranslation() {
        let template = CertificateTemplate {
            subject_cn_regexes: Some(vec!["cn1".to_string()]),
            san_regexes: Some(vec![".*example.com".to_string()]),
            ..CertificateTemplate::default()
        };
        let policy = translate(&template.clone().into());

        let again = CertificateTemplate {
            subject_cn_regexes: policy.subject_cn_regexes.clone(),
            san_regexes: policy.dns_san_regexes.clone(),
            ..CertificateTemplate::default()
        };
        assert_eq!(translate(&again.into()), policy);
    }
}
