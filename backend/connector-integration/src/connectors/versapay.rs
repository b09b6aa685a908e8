pub mod transformers;

use common_utils::{
    errors::CustomResult, FieldPath, Method, Request, RequestBuilder, RequestContent, ScrubRule,
};
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
use transformers::{VersapayOrderRequest, VersapayTransactionRequest, VersapayWalletRequest};

use crate::utils;

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
pub struct Versapay;

impl Versapay {
    pub const fn new() -> &'static Self {
        &Self
    }

    fn post<T: serde::Serialize + std::fmt::Debug>(
        &self,
        connectors: &Connectors,
        path: &str,
        body: &T,
    ) -> CustomResult<Request, errors::ConnectorError> {
        let body = RequestContent::json(body)
            .change_context(errors::ConnectorError::RequestEncodingFailed)?;
        Ok(RequestBuilder::new()
            .method(Method::Post)
            .url(&utils::join_url(
                self.base_url(connectors),
                &format!("api/gateway/v1/{path}"),
            ))
            .header("Accept", "application/json")
            .set_body(body)
            .build())
    }
}

impl ConnectorCommon for Versapay {
    fn id(&self) -> &'static str {
        "versapay"
    }

    fn base_url<'a>(&self, connectors: &'a Connectors) -> &'a str {
        connectors.versapay.base_url.as_ref()
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::BasicAuth
    }

    fn scrub_rules(&self) -> Vec<ScrubRule> {
        vec![
            ScrubRule::json_field("expiry_month"),
            ScrubRule::json_field("expiry_year"),
        ]
    }
}

impl ConnectorIntegration for Versapay {
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
        let transaction = |action: &str| -> CustomResult<Request, errors::ConnectorError> {
            let transaction_id = transformers::transaction_id(req.get_authorization()?)?;
            self.post(
                connectors,
                &format!("transactions/{transaction_id}/{action}"),
                &VersapayTransactionRequest::from(req),
            )
        };
        match flow {
            Flow::Purchase => self.post(connectors, "orders/sale", &VersapayOrderRequest::try_new(req)?),
            Flow::Authorize => self.post(connectors, "orders/auth", &VersapayOrderRequest::try_new(req)?),
            Flow::Verify => self.post(connectors, "orders/verify", &VersapayOrderRequest::try_new(req)?),
            Flow::Store => self.post(connectors, "wallets", &VersapayWalletRequest::try_new(req)?),
            Flow::Capture => transaction("capture"),
            Flow::Refund => transaction("refund"),
            Flow::Void => transaction("void"),
        }
    }

    fn response_rules(&self, flow: Flow) -> CustomResult<ResponseRules, errors::ConnectorError> {
        self.ensure_flow_supported(flow)?;
        let success = match flow {
            Flow::Purchase | Flow::Capture => SuccessPredicate::field_in("state", &["settled"]),
            Flow::Authorize | Flow::Verify => SuccessPredicate::field_in("state", &["authorized"]),
            Flow::Refund => SuccessPredicate::field_in("state", &["refunded"]),
            Flow::Void => SuccessPredicate::field_in("state", &["voided"]),
            Flow::Store => SuccessPredicate::All(vec![
                SuccessPredicate::HttpSuccess,
                SuccessPredicate::present("wallet_token"),
            ]),
        };
        let rules = ResponseRules::json(success)
            .message(&["message", "errors.0"])
            .error_code(ErrorCodeRule::Composite {
                gateway: FieldPath::parse("gateway_response.gateway_error_code"),
                response: FieldPath::parse("gateway_response.response_code"),
            });
        Ok(match flow {
            Flow::Store => rules
                .success_message("Card stored")
                .authorization(vec![
                    AuthorizationField::response("wallet_token"),
                    AuthorizationField::response("credit_cards.token"),
                ]),
            Flow::Purchase
            | Flow::Authorize
            | Flow::Verify
            | Flow::Capture
            | Flow::Refund
            | Flow::Void => rules.authorization(vec![
                AuthorizationField::response("token"),
                AuthorizationField::response("transaction_id"),
            ]),
        })
    }
}
