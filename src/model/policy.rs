//! Canonical issuance policy of a zone
//!
//! Every provider template is translated into this one shape. Pattern sets
//! are tri-state:
//!
//! - `None`: the template asserted nothing, any value is accepted
//! - `Some(vec![])`: the attribute is present but nothing is permitted
//! - `Some(patterns)`: a value must fully match at least one pattern
//!
//! Patterns are always anchored (`^...$`).

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::key_type::AllowedKeyConfiguration;
use super::request::Request;
use crate::error::PolicyViolation;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Policy {
    pub subject_cn_regexes: Option<Vec<String>>,
    pub subject_o_regexes: Option<Vec<String>>,
    pub subject_ou_regexes: Option<Vec<String>>,
    pub subject_st_regexes: Option<Vec<String>>,
    pub subject_l_regexes: Option<Vec<String>>,
    pub subject_c_regexes: Option<Vec<String>>,

    pub dns_san_regexes: Option<Vec<String>>,
    pub email_san_regexes: Option<Vec<String>>,
    pub ip_san_regexes: Option<Vec<String>>,
    pub uri_san_regexes: Option<Vec<String>>,
    pub upn_san_regexes: Option<Vec<String>>,

    /// Inferred from the DNS patterns, never copied from a template
    pub allow_wildcards: bool,
    pub allow_key_reuse: bool,

    /// Empty means no key restriction was asserted
    pub allowed_key_configurations: Vec<AllowedKeyConfiguration>,
}

impl Policy {
    /// Check a request against every asserted restriction
    ///
    /// Returns the first violation found. Unset pattern sets and empty
    /// request fields are never violations.
    pub fn check_request(&self, request: &Request) -> Result<(), PolicyViolation> {
        let subject = &request.subject;
        let cn: &[String] = if subject.common_name.is_empty() {
            &[]
        } else {
            std::slice::from_ref(&subject.common_name)
        };

        let subject_checks: [(&str, &Option<Vec<String>>, &[String]); 6] = [
            ("common name", &self.subject_cn_regexes, cn),
            ("organization", &self.subject_o_regexes, subject.organization.as_slice()),
            (
                "organizational unit",
                &self.subject_ou_regexes,
                subject.organizational_unit.as_slice(),
            ),
            ("province", &self.subject_st_regexes, subject.province.as_slice()),
            ("locality", &self.subject_l_regexes, subject.locality.as_slice()),
            ("country", &self.subject_c_regexes, subject.country.as_slice()),
        ];
        for (attribute, patterns, values) in subject_checks {
            if let Some(value) = first_mismatch(patterns, values.iter().map(String::as_str)) {
                return Err(PolicyViolation::SubjectNotAllowed {
                    attribute: attribute.to_string(),
                    value,
                });
            }
        }

        let sans = &request.sans;
        let ips: Vec<String> = sans.ip_addresses.iter().map(|ip| ip.to_string()).collect();
        let san_checks: [(&str, &Option<Vec<String>>, &[String]); 5] = [
            ("DNS", &self.dns_san_regexes, sans.dns_names.as_slice()),
            ("email", &self.email_san_regexes, sans.email_addresses.as_slice()),
            ("IP", &self.ip_san_regexes, ips.as_slice()),
            ("URI", &self.uri_san_regexes, sans.uris.as_slice()),
            ("UPN", &self.upn_san_regexes, sans.upns.as_slice()),
        ];
        for (san_type, patterns, values) in san_checks {
            if let Some(value) = first_mismatch(patterns, values.iter().map(String::as_str)) {
                return Err(PolicyViolation::SanNotAllowed {
                    san_type: san_type.to_string(),
                    value,
                });
            }
        }

        if let Some(key_type) = request.key_type {
            if !self.allowed_key_configurations.is_empty()
                && !self
                    .allowed_key_configurations
                    .iter()
                    .any(|conf| conf.permits(key_type, request.key_length, request.key_curve))
            {
                let mut key = key_type.to_string();
                if let Some(bits) = request.key_length {
                    key.push_str(&format!(" {bits}"));
                }
                if let Some(curve) = request.key_curve {
                    key.push_str(&format!(" {curve}"));
                }
                return Err(PolicyViolation::KeyNotAllowed { key });
            }
        }

        Ok(())
    }
}

/// First value that matches none of the patterns, if any
fn first_mismatch<'a>(
    patterns: &Option<Vec<String>>,
    values: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let patterns = patterns.as_ref()?;
    let compiled: Vec<Regex> = patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Ignoring invalid policy pattern {:?}: {}", p, e);
                None
            }
        })
        .collect();

    values
        .filter(|v| !v.is_empty())
        .find(|v| !compiled.iter().any(|re| re.is_match(v)))
        .map(str::to_string)
}
