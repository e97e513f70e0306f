mod chain;
mod cloud;
mod key_material;
mod key_type;
mod policy;
mod request;
mod zone;

pub use chain::{Certificate, Chain, ChainOption, ChainOptionError};
pub use cloud::{
    parse_identifier, CloudMachineIdentity, MachineIdentityRecord, MachineIdentityStatus,
};
pub(crate) use key_material::looks_like_pem;
pub use key_material::{Csr, KeyAlgorithm, KeyMaterial, KeyMaterialError};
pub use key_type::{AllowedKeyConfiguration, EllipticCurve, KeyType, KeyTypeError};
pub use policy::Policy;
pub use request::{CsrOrigin, Request, Subject, SubjectAltNames, SuppliedBytes};
pub use zone::ZoneConfiguration;
