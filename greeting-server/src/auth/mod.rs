//! Bearer-token authorization for the MCP endpoint.

pub mod challenge;
pub mod gate;
pub mod idp;
pub mod scopes;
pub mod validator;
pub mod verdict;

#[cfg(test)]
pub(crate) mod test_support;

pub use challenge::{challenge_value, request_origin, METADATA_PATH, MCP_PATH, ROOT_METADATA_PATH};
pub use gate::{AuthGate, GateRequest, DEFAULT_VALIDATION_TIMEOUT};
pub use idp::{IdentityProviderClient, IdentityProviderSettings};
pub use scopes::resolve_required_scopes;
pub use validator::{CredentialValidator, LazyValidator, ValidationError, ValidationOptions};
pub use verdict::{Denial, DenyReason, Verdict};
