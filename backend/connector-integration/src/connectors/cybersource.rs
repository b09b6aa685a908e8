pub mod transformers;

use common_utils::{errors::CustomResult, Method, Request, RequestBuilder, RequestContent};
use domain_types::{
    connector_types::{
        AuthorizationField, ErrorCodeRule, Flow, PaymentsRequestData, ResponseRules,
        SuccessPredicate,
    },
    errors,
    router_data::{AuthStrategy, ConnectorAuthType},
    types::Connectors,
};
use error_stack::ResultExt;
use interfaces::{api::ConnectorCommon, connector_integration::ConnectorIntegration};
use transformers::{
    CybersourceFollowOnRequest, CybersourcePaymentsRequest, CybersourceVoidRequest, PaymentIntent,
};

use crate::{signer::HmacSignatureSigner, utils};

pub(crate) mod headers {
    pub(crate) const ACCEPT: &str = "Accept";
}

const SUPPORTED_FLOWS: &[Flow] = &[
    Flow::Purchase,
    Flow::Authorize,
    Flow::Capture,
    Flow::Refund,
    Flow::Void,
    Flow::Store,
    Flow::Verify,
];

#[derive(Clone, Debug)]
pub struct Cybersource;

impl Cybersource {
    pub const fn new() -> &'static Self {
        &Self
    }

    fn post(&self, url: String, body: RequestContent) -> Request {
        RequestBuilder::new()
            .method(Method::Post)
            .url(&url)
            .header(headers::ACCEPT, "application/hal+json;charset=utf-8")
            .header("Content-Type", self.common_get_content_type())
            .set_body(body)
            .signable_fields(HmacSignatureSigner::default_signable_fields(Method::Post))
            .build()
    }
}

fn json_body<T: serde::Serialize + std::fmt::Debug>(
    body: &T,
) -> CustomResult<RequestContent, errors::ConnectorError> {
    RequestContent::json(body).change_context(errors::ConnectorError::RequestEncodingFailed)
}

impl ConnectorCommon for Cybersource {
    fn id(&self) -> &'static str {
        "cybersource"
    }

    fn common_get_content_type(&self) -> &'static str {
        "application/json;charset=utf-8"
    }

    fn base_url<'a>(&self, connectors: &'a Connectors) -> &'a str {
        connectors.cybersource.base_url.as_ref()
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::HmacSignature
    }
}

impl ConnectorIntegration for Cybersource {
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
        let payments_url = utils::join_url(self.base_url(connectors), "pts/v2/payments");
        let follow_on_url = |action: &str| -> CustomResult<String, errors::ConnectorError> {
            let id = transformers::transaction_id(req.get_authorization()?)?;
            Ok(format!("{payments_url}/{id}/{action}"))
        };
        Ok(match flow {
            Flow::Purchase => self.post(
                payments_url.clone(),
                json_body(&CybersourcePaymentsRequest::try_new(req, PaymentIntent::Sale)?)?,
            ),
            Flow::Authorize | Flow::Verify => self.post(
                payments_url.clone(),
                json_body(&CybersourcePaymentsRequest::try_new(
                    req,
                    PaymentIntent::Authorize,
                )?)?,
            ),
            Flow::Store => self.post(
                payments_url.clone(),
                json_body(&CybersourcePaymentsRequest::try_new(
                    req,
                    PaymentIntent::Tokenize,
                )?)?,
            ),
            Flow::Capture => self.post(
                follow_on_url("captures")?,
                json_body(&CybersourceFollowOnRequest::from(req))?,
            ),
            Flow::Refund => self.post(
                follow_on_url("refunds")?,
                json_body(&CybersourceFollowOnRequest::from(req))?,
            ),
            Flow::Void => self.post(
                follow_on_url("voids")?,
                json_body(&CybersourceVoidRequest::from(req))?,
            ),
        })
    }

    fn response_rules(&self, flow: Flow) -> CustomResult<ResponseRules, errors::ConnectorError> {
        self.ensure_flow_supported(flow)?;
        let success_statuses: &'static [&'static str] = match flow {
            Flow::Purchase | Flow::Authorize | Flow::Store | Flow::Verify => &["AUTHORIZED"],
            Flow::Capture | Flow::Refund => &["PENDING", "TRANSMITTED"],
            Flow::Void => &["VOIDED", "REVERSED"],
        };
        let rules = ResponseRules::json(SuccessPredicate::field_in("status", success_statuses))
            .message(&["errorInformation.message", "message"])
            .error_code(ErrorCodeRule::fields(&["errorInformation.reason", "reason"]));
        Ok(match flow {
            Flow::Store => rules.authorization(vec![
                AuthorizationField::response("id"),
                AuthorizationField::response("tokenInformation.paymentInstrument.id"),
            ]),
            Flow::Purchase
            | Flow::Authorize
            | Flow::Verify
            | Flow::Capture
            | Flow::Refund
            | Flow::Void => rules.authorization(vec![
                AuthorizationField::response("id"),
                AuthorizationField::response("reconciliationId"),
            ]),
        })
    }
}
