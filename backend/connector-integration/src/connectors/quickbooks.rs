pub mod transformers;

use base64::Engine;
use common_utils::{
    consts::BASE64_ENGINE, errors::CustomResult, generate_time_ordered_id, FieldPath, Mask,
    Method, PeekInterface, Request, RequestBuilder, RequestContent, ScrubRule,
};
use domain_types::{
    connector_types::{
        AuthorizationField, ErrorCodeRule, Flow, PaymentsRequestData, ResponseRules,
        SuccessPredicate, VerifyPolicy,
    },
    errors,
    router_data::{AccessToken, AuthStrategy, ConnectorAuthType},
    router_response_types::Response,
    types::Connectors,
    utils::flow_not_supported_err,
};
use error_stack::ResultExt;
use interfaces::{api::ConnectorCommon, connector_integration::ConnectorIntegration};
use transformers::{
    QuickbooksAuthType, QuickbooksAuthorization, QuickbooksCaptureRequest,
    QuickbooksChargeRequest, QuickbooksRefreshTokenRequest, QuickbooksRefundRequest,
    QuickbooksTokenResponse,
};

use crate::utils;

pub(crate) mod headers {
    pub(crate) const ACCEPT: &str = "Accept";
    pub(crate) const REQUEST_ID: &str = "Request-Id";
    pub(crate) const AUTHORIZATION: &str = "Authorization";
}

const AUTHENTICATION_FAILED: &str = "AuthenticationFailed";
const SUPPORTED_FLOWS: &[Flow] = &[
    Flow::Purchase,
    Flow::Authorize,
    Flow::Capture,
    Flow::Refund,
    Flow::Void,
    Flow::Verify,
];

#[derive(Clone, Debug)]
pub struct Quickbooks;

impl Quickbooks {
    pub const fn new() -> &'static Self {
        &Self
    }

    fn charges_url(&self, connectors: &Connectors) -> String {
        utils::join_url(self.base_url(connectors), "quickbooks/v4/payments/charges")
    }

    fn json_request(&self, url: &str, body: RequestContent) -> Request {
        RequestBuilder::new()
            .method(Method::Post)
            .url(url)
            .header(headers::ACCEPT, "application/json")
            .header(headers::REQUEST_ID, &generate_time_ordered_id("qb"))
            .set_body(body)
            .build()
    }
}

fn json_body<T: serde::Serialize + std::fmt::Debug>(
    body: &T,
) -> CustomResult<RequestContent, errors::ConnectorError> {
    RequestContent::json(body).change_context(errors::ConnectorError::RequestEncodingFailed)
}

impl ConnectorCommon for Quickbooks {
    fn id(&self) -> &'static str {
        "quickbooks"
    }

    fn base_url<'a>(&self, connectors: &'a Connectors) -> &'a str {
        connectors.quickbooks.base_url.as_ref()
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::OAuth2Bearer
    }

    fn scrub_rules(&self) -> Vec<ScrubRule> {
        vec![ScrubRule::json_field("expMonth"), ScrubRule::json_field("expYear")]
    }
}

impl ConnectorIntegration for Quickbooks {
    fn supported_flows(&self) -> &'static [Flow] {
        SUPPORTED_FLOWS
    }

    fn build_request(
        &self,
        flow: Flow,
        req: &PaymentsRequestData,
        _auth: &ConnectorAuthType,
        connectors: &Connectors,
    ) -> CustomResult<Request, errors::ConnectorError> {
        let charges_url = self.charges_url(connectors);
        match flow {
            Flow::Purchase => Ok(self.json_request(
                &charges_url,
                json_body(&QuickbooksChargeRequest::try_new(req, true)?)?,
            )),
            Flow::Authorize | Flow::Verify => Ok(self.json_request(
                &charges_url,
                json_body(&QuickbooksChargeRequest::try_new(req, false)?)?,
            )),
            Flow::Capture => {
                let authorization = QuickbooksAuthorization::try_from(req.get_authorization()?)?;
                Ok(self.json_request(
                    &format!("{charges_url}/{}/capture", authorization.charge_id),
                    json_body(&QuickbooksCaptureRequest::new(req))?,
                ))
            }
            Flow::Refund => {
                let authorization = QuickbooksAuthorization::try_from(req.get_authorization()?)?;
                Ok(self.json_request(
                    &format!("{charges_url}/{}/refunds", authorization.charge_id),
                    json_body(&QuickbooksRefundRequest::new(req.amount, req.currency))?,
                ))
            }
            // a void refunds the full amount recorded in the authorization
            Flow::Void => {
                let authorization = QuickbooksAuthorization::try_from(req.get_authorization()?)?;
                Ok(self.json_request(
                    &format!("{charges_url}/{}/refunds", authorization.charge_id),
                    json_body(&QuickbooksRefundRequest::new(
                        authorization.amount,
                        authorization.currency,
                    ))?,
                ))
            }
            Flow::Store => Err(flow_not_supported_err(flow, self.id())),
        }
    }

    fn response_rules(&self, flow: Flow) -> CustomResult<ResponseRules, errors::ConnectorError> {
        self.ensure_flow_supported(flow)?;
        let success_statuses: &'static [&'static str] = match flow {
            Flow::Purchase | Flow::Capture => &["CAPTURED"],
            Flow::Authorize | Flow::Verify => &["AUTHORIZED"],
            Flow::Refund | Flow::Void => &["ISSUED"],
            Flow::Store => &[],
        };
        let rules = ResponseRules::json(SuccessPredicate::field_in("status", success_statuses))
            .message(&["errors.message", "fault.error.message"])
            .error_code(ErrorCodeRule::fields(&["errors.code", "fault.error.code"]));
        Ok(match flow {
            Flow::Purchase | Flow::Authorize | Flow::Verify => rules.authorization(vec![
                AuthorizationField::response("id"),
                AuthorizationField::Amount,
                AuthorizationField::Currency,
            ]),
            Flow::Capture | Flow::Refund | Flow::Void | Flow::Store => rules,
        })
    }

    fn is_authentication_failure(&self, status_code: u16, body: &[u8]) -> bool {
        status_code == 401
            || serde_json::from_slice::<serde_json::Value>(utils::strip_bom(body))
                .ok()
                .is_some_and(|document| {
                    ["fault.error.code", "errors.code"].iter().any(|path| {
                        FieldPath::parse(path).dig_string(&document).as_deref()
                            == Some(AUTHENTICATION_FAILED)
                    })
                })
    }

    fn verify_policy(&self) -> VerifyPolicy {
        VerifyPolicy::AuthorizeThenVoid {
            amount: common_utils::MinorUnit::new(100),
            report_void_failure: false,
        }
    }

    fn build_access_token_request(
        &self,
        auth: &ConnectorAuthType,
        current: &AccessToken,
        connectors: &Connectors,
    ) -> CustomResult<Request, errors::ConnectorError> {
        let auth = QuickbooksAuthType::try_from(auth)?;
        let token_url = utils::get_secondary_base_url(
            &connectors.quickbooks,
            "connectors.quickbooks.secondary_base_url",
        )?;
        let body = RequestContent::form_url_encoded(&QuickbooksRefreshTokenRequest::try_from(
            current,
        )?)
        .change_context(errors::ConnectorError::RequestEncodingFailed)?;
        let credentials = BASE64_ENGINE.encode(format!(
            "{}:{}",
            auth.client_id.peek(),
            auth.client_secret.peek()
        ));
        Ok(RequestBuilder::new()
            .method(Method::Post)
            .url(token_url)
            .header(headers::ACCEPT, "application/json")
            .headers(vec![(
                headers::AUTHORIZATION.to_string(),
                format!("Basic {credentials}").into_masked(),
            )])
            .set_body(body)
            .build())
    }

    fn handle_access_token_response(
        &self,
        response: &Response,
        current: &AccessToken,
    ) -> CustomResult<AccessToken, errors::ConnectorError> {
        QuickbooksTokenResponse::try_from_response(response, current)
    }
}
