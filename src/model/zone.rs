//! Zone-level defaults layered on top of the canonical policy

use serde::Serialize;
use tracing::debug;

use super::key_type::{AllowedKeyConfiguration, KeyType};
use super::policy::Policy;
use super::request::Request;
use crate::error::CertResult;
use crate::logic::compliance;

/// Everything a zone contributes to a request besides pattern restrictions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZoneConfiguration {
    pub organization: Option<String>,
    pub organizational_units: Vec<String>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub locality: Option<String>,
    pub policy: Policy,
    /// Recommended key shape, preferred over the policy's first allowed entry
    pub key_configuration: Option<AllowedKeyConfiguration>,
    pub validity_hours: Option<u32>,
}

impl ZoneConfiguration {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Fill every empty request field the zone has a default for
    ///
    /// Idempotent: a second call without caller changes in between is a no-op.
    pub fn update_certificate_request(&self, request: &mut Request) {
        let subject = &mut request.subject;
        let scalars = [
            (&self.organization, &mut subject.organization),
            (&self.country, &mut subject.country),
            (&self.province, &mut subject.province),
            (&self.locality, &mut subject.locality),
        ];
        for (default, field) in scalars {
            if field.is_empty() {
                field.extend(default.iter().cloned());
            }
        }
        if subject.organizational_unit.is_empty() {
            subject.organizational_unit = self.organizational_units.clone();
        }

        compliance::apply_subject_defaults(&self.policy, request);

        if compliance::supplies_key_material(request) {
            debug!("Caller supplied key material, key shape left as given");
        } else {
            if let Some(conf) = &self.key_configuration {
                compliance::apply_key_configuration(conf, request);
            }
            compliance::apply_key_defaults(&self.policy, request);
            if request.key_type == Some(KeyType::Rsa) && request.key_length.is_none() {
                request.key_length = Some(KeyType::DEFAULT_RSA_BITS);
            }
        }

        if request.validity_hours.is_none() {
            request.validity_hours = self.validity_hours;
        }

        debug!(
            "Request after zone defaults: key {:?} {:?} {:?}",
            request.key_type, request.key_length, request.key_curve
        );
    }

    /// Check a request against the zone policy
    ///
    /// Opt-in: defaulting and CSR synthesis never call this.
    pub fn validate_certificate_request(&self, request: &Request) -> CertResult<()> {
        self.policy.check_request(request)?;
        Ok(())
    }
}
