//! On-premises server policies
//!
//! These carry whitelisted domains and locked/unlocked values rather than
//! regular expressions, so patterns are synthesized here.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{allows_wildcards, key_configuration};
use crate::model::{AllowedKeyConfiguration, EllipticCurve, KeyType, Policy, ZoneConfiguration};

/// A single value the administrator may lock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LockedValue<T> {
    pub locked: bool,
    pub value: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LockedValues {
    pub locked: bool,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SubjectPolicy {
    pub city: LockedValue<String>,
    pub country: LockedValue<String>,
    pub organization: LockedValue<String>,
    pub organizational_unit: LockedValues,
    pub state: LockedValue<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct KeyPairPolicy {
    pub key_algorithm: LockedValue<String>,
    pub key_size: LockedValue<u32>,
    pub elliptic_curve: LockedValue<String>,
}

/// Server policy as decoded from the on-prem authority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServerPolicy {
    pub subject: SubjectPolicy,
    pub key_pair: KeyPairPolicy,
    pub whitelisted_domains: Vec<String>,
    pub wildcards_allowed: bool,
    pub private_key_reuse_allowed: bool,
    pub subj_alt_name_dns_allowed: bool,
    pub subj_alt_name_email_allowed: bool,
    pub subj_alt_name_ip_allowed: bool,
    pub subj_alt_name_upn_allowed: bool,
    pub subj_alt_name_uri_allowed: bool,
}

impl ServerPolicy {
    pub fn to_policy(&self) -> Policy {
        let domains = self.domain_patterns();

        Policy {
            subject_cn_regexes: domains.clone(),
            subject_o_regexes: locked_value(&self.subject.organization),
            subject_ou_regexes: locked_values(&self.subject.organizational_unit),
            subject_st_regexes: locked_value(&self.subject.state),
            subject_l_regexes: locked_value(&self.subject.city),
            subject_c_regexes: locked_value(&self.subject.country),

            dns_san_regexes: if self.subj_alt_name_dns_allowed {
                domains.clone()
            } else {
                Some(Vec::new())
            },
            email_san_regexes: allowed(self.subj_alt_name_email_allowed),
            ip_san_regexes: allowed(self.subj_alt_name_ip_allowed),
            uri_san_regexes: allowed(self.subj_alt_name_uri_allowed),
            upn_san_regexes: allowed(self.subj_alt_name_upn_allowed),

            allow_wildcards: allows_wildcards(domains.as_deref().unwrap_or_default()),
            allow_key_reuse: self.private_key_reuse_allowed,
            allowed_key_configurations: self.key_configurations(),
        }
    }

    pub fn to_zone_configuration(&self) -> ZoneConfiguration {
        let subject = &self.subject;
        let mut zone = ZoneConfiguration::new(self.to_policy());
        zone.organization = non_empty(&subject.organization.value);
        zone.organizational_units = subject
            .organizational_unit
            .values
            .iter()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect();
        zone.country = non_empty(&subject.country.value);
        zone.province = non_empty(&subject.state.value);
        zone.locality = non_empty(&subject.city.value);
        zone.key_configuration = self.key_pair_value();
        zone
    }

    /// One fragment per whitelisted domain; `None` without a whitelist
    fn domain_patterns(&self) -> Option<Vec<String>> {
        if self.whitelisted_domains.is_empty() {
            return None;
        }
        let patterns = self
            .whitelisted_domains
            .iter()
            .map(|domain| {
                let domain = regex::escape(domain);
                if self.wildcards_allowed {
                    format!("^.*{domain}$")
                } else {
                    format!(r"^([\p{{L}}\p{{N}}-]+\.)*{domain}$")
                }
            })
            .collect();
        Some(patterns)
    }

    fn key_configurations(&self) -> Vec<AllowedKeyConfiguration> {
        let key_pair = &self.key_pair;
        let rsa_sizes = if key_pair.key_size.locked && key_pair.key_size.value > 0 {
            vec![key_pair.key_size.value]
        } else {
            KeyType::ALL_RSA_SIZES.to_vec()
        };
        let curves = if key_pair.elliptic_curve.locked {
            match key_pair.elliptic_curve.value.parse::<EllipticCurve>() {
                Ok(curve) => vec![curve],
                Err(_) => EllipticCurve::ALL_ECDSA.to_vec(),
            }
        } else {
            EllipticCurve::ALL_ECDSA.to_vec()
        };

        if !key_pair.key_algorithm.locked {
            return vec![
                AllowedKeyConfiguration::rsa(rsa_sizes),
                AllowedKeyConfiguration::ecdsa(curves),
            ];
        }

        match key_pair.key_algorithm.value.parse::<KeyType>() {
            Ok(KeyType::Rsa) => vec![AllowedKeyConfiguration::rsa(rsa_sizes)],
            Ok(KeyType::Ecdsa) => vec![AllowedKeyConfiguration::ecdsa(curves)],
            Ok(KeyType::Ed25519) => vec![AllowedKeyConfiguration::ed25519()],
            Err(_) => {
                warn!(
                    "Locked key algorithm {:?} is unknown, no key restriction applied",
                    key_pair.key_algorithm.value
                );
                Vec::new()
            }
        }
    }

    /// The configured key shape, locked or not
    fn key_pair_value(&self) -> Option<AllowedKeyConfiguration> {
        let key_pair = &self.key_pair;
        if key_pair.key_algorithm.value.is_empty() {
            return None;
        }
        let sizes: Vec<u32> = Some(key_pair.key_size.value).filter(|s| *s > 0).into_iter().collect();
        let curves: Vec<String> = non_empty(&key_pair.elliptic_curve.value).into_iter().collect();
        key_configuration(&key_pair.key_algorithm.value, &sizes, &curves).map(|mut conf| {
            match conf.key_type {
                KeyType::Rsa => conf.key_curves.clear(),
                KeyType::Ecdsa => conf.key_sizes.clear(),
                KeyType::Ed25519 => {
                    conf.key_sizes.clear();
                    conf.key_curves.clear();
                }
            }
            conf
        })
    }
}

fn locked_value(value: &LockedValue<String>) -> Option<Vec<String>> {
    if value.locked && !value.value.is_empty() {
        Some(vec![exact(&value.value)])
    } else {
        None
    }
}

fn locked_values(values: &LockedValues) -> Option<Vec<String>> {
    if values.locked && !values.values.is_empty() {
        Some(values.values.iter().map(|v| exact(v)).collect())
    } else {
        None
    }
}

fn exact(value: &str) -> String {
    format!("^{}$", regex::escape(value))
}

/// Unset when the SAN type is allowed, an empty set when it is not
fn allowed(flag: bool) -> Option<Vec<String>> {
    if flag {
        None
    } else {
        Some(Vec::new())
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
