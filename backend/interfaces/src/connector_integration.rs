use common_utils::{CustomResult, Request};
use domain_types::{
    connector_types::{Flow, PaymentsRequestData, ResponseRules, VerifyPolicy},
    errors::ConnectorError,
    router_data::{AccessToken, ConnectorAuthType},
    router_response_types::Response,
    types::Connectors,
    utils::flow_not_supported_err,
};

use crate::api::ConnectorCommon;

/// A connector's rule table: how to build each flow's request and how to read
/// its response. Control flow lives in the executor, not here.
pub trait ConnectorIntegration: ConnectorCommon + Send + Sync {
    fn supported_flows(&self) -> &'static [Flow];

    /// The unsigned request for `flow`.
    fn build_request(
        &self,
        flow: Flow,
        req: &PaymentsRequestData,
        auth: &ConnectorAuthType,
        connectors: &Connectors,
    ) -> CustomResult<Request, ConnectorError>;

    fn response_rules(&self, flow: Flow) -> CustomResult<ResponseRules, ConnectorError>;

    /// Whether a response means the credentials were rejected.
    fn is_authentication_failure(&self, status_code: u16, _body: &[u8]) -> bool {
        status_code == 401
    }

    fn verify_policy(&self) -> VerifyPolicy {
        VerifyPolicy::ZeroAmountAuthorize
    }

    /// Token endpoint request renewing `current` with its refresh token.
    fn build_access_token_request(
        &self,
        _auth: &ConnectorAuthType,
        _current: &AccessToken,
        _connectors: &Connectors,
    ) -> CustomResult<Request, ConnectorError> {
        Err(error_stack::report!(ConnectorError::FailedToObtainAccessToken)
            .attach_printable(format!("{} does not issue access tokens", self.id())))
    }

    fn handle_access_token_response(
        &self,
        _response: &Response,
        _current: &AccessToken,
    ) -> CustomResult<AccessToken, ConnectorError> {
        Err(ConnectorError::FailedToObtainAccessToken.into())
    }

    fn ensure_flow_supported(&self, flow: Flow) -> CustomResult<(), ConnectorError> {
        if self.supported_flows().contains(&flow) {
            Ok(())
        } else {
            Err(flow_not_supported_err(flow, self.id()))
        }
    }
}

pub type BoxedConnector = Box<&'static (dyn ConnectorIntegration + Sync)>;
