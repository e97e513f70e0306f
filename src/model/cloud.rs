//! Identifiers and machine identities returned by the cloud authority

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CertError, CertResult};

/// Parse an identifier that must be a UUID
pub fn parse_identifier(field: &str, value: &str) -> CertResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| CertError::InvalidIdentifier {
        field: field.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Machine identity as decoded from the wire
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineIdentityRecord {
    pub id: String,
    pub cloud_keystore_id: String,
    pub cloud_keystore_name: Option<String>,
    pub cloud_provider_id: Option<String>,
    pub cloud_provider_name: Option<String>,
    pub certificate_id: String,
    pub metadata: Option<Value>,
    pub status: String,
    pub status_details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MachineIdentityStatus {
    New,
    Pending,
    Installed,
    Discovered,
    Validated,
    Missing,
    Failed,
    Unknown,
}

impl FromStr for MachineIdentityStatus {
    type Err = std::convert::Infallible;

    /// Unrecognised statuses map to `Unknown`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "NEW" => Self::New,
            "PENDING" => Self::Pending,
            "INSTALLED" => Self::Installed,
            "DISCOVERED" => Self::Discovered,
            "VALIDATED" => Self::Validated,
            "MISSING" => Self::Missing,
            "FAILED" => Self::Failed,
            _ => Self::Unknown,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudMachineIdentity {
    pub id: Uuid,
    pub cloud_keystore_id: Uuid,
    pub cloud_keystore_name: String,
    pub cloud_provider_id: Uuid,
    pub cloud_provider_name: String,
    pub certificate_id: Uuid,
    pub metadata: Option<Map<String, Value>>,
    pub status: MachineIdentityStatus,
    pub status_details: String,
}

impl TryFrom<MachineIdentityRecord> for CloudMachineIdentity {
    type Error = CertError;

    fn try_from(record: MachineIdentityRecord) -> CertResult<Self> {
        let id = parse_identifier("machine identity id", &record.id)?;
        let cloud_keystore_id = parse_identifier("cloud keystore id", &record.cloud_keystore_id)?;
        let certificate_id = parse_identifier("certificate id", &record.certificate_id)?;
        let cloud_provider_id = parse_identifier(
            "cloud provider id",
            record.cloud_provider_id.as_deref().unwrap_or_default(),
        )?;

        let metadata = match record.metadata {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(other) => {
                return Err(CertError::invalid_request(format!(
                    "machine identity metadata must be a JSON object, got {other}"
                )))
            }
        };

        let status = record
            .status
            .parse()
            .unwrap_or(MachineIdentityStatus::Unknown);

        Ok(Self {
            id,
            cloud_keystore_id,
            cloud_keystore_name: record.cloud_keystore_name.unwrap_or_default(),
            cloud_provider_id,
            cloud_provider_name: record.cloud_provider_name.unwrap_or_default(),
            certificate_id,
            metadata,
            status,
            status_details: record.status_details.unwrap_or_default(),
        })
    }
}
