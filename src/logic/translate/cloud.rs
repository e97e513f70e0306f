//! Cloud issuing templates

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{allows_wildcards, anchor_all, key_configuration};
use crate::model::{AllowedKeyConfiguration, Policy, ZoneConfiguration};

/// Issuing template as decoded from the cloud authority
///
/// Lists that are absent on the wire stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateTemplate {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "subjectCNRegexes")]
    pub subject_cn_regexes: Option<Vec<String>>,
    #[serde(rename = "subjectORegexes")]
    pub subject_o_regexes: Option<Vec<String>>,
    #[serde(rename = "subjectOURegexes")]
    pub subject_ou_regexes: Option<Vec<String>>,
    #[serde(rename = "subjectLRegexes")]
    pub subject_l_regexes: Option<Vec<String>>,
    #[serde(rename = "subjectSTRegexes")]
    pub subject_st_regexes: Option<Vec<String>>,
    #[serde(rename = "subjectCValues")]
    pub subject_c_values: Option<Vec<String>>,
    /// DNS SAN fragments
    pub san_regexes: Option<Vec<String>>,
    pub san_rfc822_name_regexes: Option<Vec<String>>,
    pub san_ip_address_regexes: Option<Vec<String>>,
    pub san_uniform_resource_identifier_regexes: Option<Vec<String>>,
    pub key_reuse: bool,
    pub key_types: Vec<TemplateKeyType>,
    /// ISO-8601 duration such as `P90D`
    pub validity_period: Option<String>,
    pub recommended_settings: Option<RecommendedSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateKeyType {
    pub key_type: String,
    pub key_lengths: Vec<u32>,
    pub key_curves: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendedSettings {
    pub subject_o_value: Option<String>,
    pub subject_ou_value: Option<String>,
    pub subject_l_value: Option<String>,
    pub subject_st_value: Option<String>,
    pub subject_c_value: Option<String>,
    pub key: Option<RecommendedKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendedKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub length: Option<u32>,
    pub curve: Option<String>,
}

impl CertificateTemplate {
    pub fn to_policy(&self) -> Policy {
        let allowed_key_configurations = self
            .key_types
            .iter()
            .filter_map(|kt| key_configuration(&kt.key_type, &kt.key_lengths, &kt.key_curves))
            .collect();

        Policy {
            subject_cn_regexes: anchor_all(self.subject_cn_regexes.as_deref()),
            subject_o_regexes: anchor_all(self.subject_o_regexes.as_deref()),
            subject_ou_regexes: anchor_all(self.subject_ou_regexes.as_deref()),
            subject_st_regexes: anchor_all(self.subject_st_regexes.as_deref()),
            subject_l_regexes: anchor_all(self.subject_l_regexes.as_deref()),
            subject_c_regexes: anchor_all(self.subject_c_values.as_deref()),

            dns_san_regexes: anchor_all(self.san_regexes.as_deref()),
            email_san_regexes: anchor_all(self.san_rfc822_name_regexes.as_deref()),
            ip_san_regexes: anchor_all(self.san_ip_address_regexes.as_deref()),
            uri_san_regexes: anchor_all(self.san_uniform_resource_identifier_regexes.as_deref()),
            upn_san_regexes: None,

            allow_wildcards: allows_wildcards(self.san_regexes.as_deref().unwrap_or_default()),
            allow_key_reuse: self.key_reuse,
            allowed_key_configurations,
        }
    }

    pub fn to_zone_configuration(&self) -> ZoneConfiguration {
        let mut zone = ZoneConfiguration::new(self.to_policy());
        zone.validity_hours = self.validity_period.as_deref().and_then(validity_hours);

        if let Some(settings) = &self.recommended_settings {
            zone.organization = non_empty(&settings.subject_o_value);
            zone.organizational_units = non_empty(&settings.subject_ou_value).into_iter().collect();
            zone.locality = non_empty(&settings.subject_l_value);
            zone.province = non_empty(&settings.subject_st_value);
            zone.country = non_empty(&settings.subject_c_value);
            zone.key_configuration = settings.key.as_ref().and_then(recommended_key);
        }
        zone
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn recommended_key(key: &RecommendedKey) -> Option<AllowedKeyConfiguration> {
    let sizes: Vec<u32> = key.length.into_iter().collect();
    let curves: Vec<String> = key.curve.iter().cloned().collect();
    key_configuration(&key.key_type, &sizes, &curves)
}

/// Hours in an ISO-8601 duration made of days and hours (`P30D`, `PT12H`, `P1DT6H`)
fn validity_hours(period: &str) -> Option<u32> {
    let parsed = (|| {
        let rest = period.strip_prefix('P')?;
        let (date, time) = rest.split_once('T').unwrap_or((rest, ""));

        let days = match date {
            "" => 0,
            d => d.strip_suffix('D')?.parse::<u32>().ok()?,
        };
        let hours = match time {
            "" => 0,
            t => t.strip_suffix('H')?.parse::<u32>().ok()?,
        };
        days.checked_mul(24)?.checked_add(hours)
    })();

    if parsed.is_none() {
        debug!("Ignoring validity period {:?}", period);
    }
    parsed.filter(|h| *h > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EllipticCurve, KeyType};

    fn strings(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_empty_template_yields_empty_policy() {
        assert_eq!(CertificateTemplate::default().to_policy(), Policy::default());
    }

    #[test]
    fn test_every_field_is_anchored() {
        let template = CertificateTemplate {
            subject_cn_regexes: strings(&["cn1", "cn2"]),
            subject_o_regexes: strings(&["o1", "o2"]),
            subject_ou_regexes: strings(&["ou1", "ou2"]),
            subject_st_regexes: strings(&["st1", "st2"]),
            subject_l_regexes: strings(&["l1", "l2"]),
            subject_c_values: strings(&["c1", "c2"]),
            san_regexes: strings(&["dns1", "dns2"]),
            san_rfc822_name_regexes: strings(&["email1", "email2"]),
            san_ip_address_regexes: strings(&["ip1", "ip2"]),
            san_uniform_resource_identifier_regexes: strings(&["uri1", "uri2"]),
            ..CertificateTemplate::default()
        };

        let expected = Policy {
            subject_cn_regexes: strings(&["^cn1$", "^cn2$"]),
            subject_o_regexes: strings(&["^o1$", "^o2$"]),
            subject_ou_regexes: strings(&["^ou1$", "^ou2$"]),
            subject_st_regexes: strings(&["^st1$", "^st2$"]),
            subject_l_regexes: strings(&["^l1$", "^l2$"]),
            subject_c_regexes: strings(&["^c1$", "^c2$"]),
            dns_san_regexes: strings(&["^dns1$", "^dns2$"]),
            email_san_regexes: strings(&["^email1$", "^email2$"]),
            ip_san_regexes: strings(&["^ip1$", "^ip2$"]),
            uri_san_regexes: strings(&["^uri1$", "^uri2$"]),
            upn_san_regexes: None,
            ..Policy::default()
        };
        assert_eq!(template.to_policy(), expected);
    }

    #[test]
    fn test_wildcard_and_key_reuse() {
        let template = CertificateTemplate {
            key_reuse: true,
            san_regexes: strings(&[".*example.com"]),
            ..CertificateTemplate::default()
        };

        let expected = Policy {
            dns_san_regexes: strings(&["^.*example.com$"]),
            allow_key_reuse: true,
            allow_wildcards: true,
            ..Policy::default()
        };
        assert_eq!(template.to_policy(), expected);
    }

    #[test]
    fn test_rsa_sizes_copied_verbatim() {
        let template = CertificateTemplate {
            key_types: vec![TemplateKeyType {
                key_type: "RSA".to_string(),
                key_lengths: vec![88888],
                key_curves: vec![],
            }],
            ..CertificateTemplate::default()
        };

        let policy = template.to_policy();
        assert_eq!(
            policy.allowed_key_configurations,
            vec![AllowedKeyConfiguration::rsa(vec![88888])]
        );
    }

    #[test]
    fn test_ec_curve_names_mapped() {
        let template = CertificateTemplate {
            key_types: vec![TemplateKeyType {
                key_type: "EC".to_string(),
                key_lengths: vec![],
                key_curves: vec!["P256".to_string(), "P-384".to_string(), "ED25519".to_string()],
            }],
            ..CertificateTemplate::default()
        };

        let policy = template.to_policy();
        assert_eq!(
            policy.allowed_key_configurations,
            vec![AllowedKeyConfiguration {
                key_type: KeyType::Ecdsa,
                key_sizes: vec![],
                key_curves: vec![EllipticCurve::P256, EllipticCurve::P384, EllipticCurve::Ed25519],
            }]
        );
    }

    #[test]
    fn test_deserialize_wire_names() {
        let json = r#"{
            "subjectCNRegexes": ["cn1"],
            "sanRegexes": ["*.example.com"],
            "keyReuse": false,
            "keyTypes": [{"keyType": "RSA", "keyLengths": [2048, 4096]}],
            "validityPeriod": "P90D",
            "recommendedSettings": {
                "subjectOValue": "Venafi, Inc.",
                "subjectCValue": "US",
                "key": {"type": "EC", "curve": "P384"}
            }
        }"#;
        let template: CertificateTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.subject_cn_regexes, strings(&["cn1"]));
        assert!(template.subject_o_regexes.is_none());

        let zone = template.to_zone_configuration();
        assert!(zone.policy.allow_wildcards);
        assert_eq!(zone.validity_hours, Some(90 * 24));
        assert_eq!(zone.organization.as_deref(), Some("Venafi, Inc."));
        assert_eq!(zone.country.as_deref(), Some("US"));
        assert_eq!(
            zone.key_configuration,
            Some(AllowedKeyConfiguration::ecdsa(vec![EllipticCurve::P384]))
        );
    }

    #[test]
    fn test_validity_hours() {
        assert_eq!(validity_hours("P30D"), Some(720));
        assert_eq!(validity_hours("PT12H"), Some(12));
        assert_eq!(validity_hours("P1DT6H"), Some(30));
        assert_eq!(validity_hours("P1Y"), None);
        assert_eq!(validity_hours("garbage"), None);
        assert_eq!(validity_hours("P0D"), None);
    }
}
