use common_utils::{CustomResult, Request};
use domain_types::{
    errors::ConnectorError,
    router_data::{AccessToken, ConnectorAuthType},
};
use time::OffsetDateTime;

/// Inputs to a signing pass that do not come from the request itself.
#[derive(Clone, Debug)]
pub struct SigningContext {
    /// Timestamp covered by time-dependent signatures
    pub now: OffsetDateTime,
    /// Current bearer token for OAuth2 credentials
    pub access_token: Option<AccessToken>,
}

impl SigningContext {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now,
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, access_token: AccessToken) -> Self {
        self.access_token = Some(access_token);
        self
    }
}

/// An authentication strategy applied to an outbound request.
///
/// Implementations return an amended copy and never touch the input. A
/// missing credential field is a configuration error and fails the call.
pub trait RequestSigner: Send + Sync {
    fn sign(
        &self,
        request: &Request,
        auth: &ConnectorAuthType,
        context: &SigningContext,
    ) -> CustomResult<Request, ConnectorError>;
}
