pub mod transformers;

use common_utils::{errors::CustomResult, Method, Request, RequestBuilder, RequestContent};
use domain_types::{
    connector_types::{
        AuthorizationField, ErrorCodeRule, Flow, PaymentsRequestData, ResponseRules,
        SuccessPredicate, VerifyPolicy,
    },
    errors,
    router_data::{AuthStrategy, ConnectorAuthType},
    types::Connectors,
    utils::flow_not_supported_err,
};
use error_stack::ResultExt;
use interfaces::{api::ConnectorCommon, connector_integration::ConnectorIntegration};
use transformers::BraspagPaymentsRequest;

use crate::utils;

pub(crate) mod headers {
    pub(crate) const MERCHANT_ID: &str = "MerchantId";
    pub(crate) const MERCHANT_KEY: &str = "MerchantKey";
}

const SUPPORTED_FLOWS: &[Flow] = &[
    Flow::Purchase,
    Flow::Authorize,
    Flow::Capture,
    Flow::Refund,
    Flow::Void,
    Flow::Verify,
];

#[derive(Clone, Debug)]
pub struct Braspag;

impl Braspag {
    pub const fn new() -> &'static Self {
        &Self
    }

    fn sales_url(&self, connectors: &Connectors) -> String {
        utils::join_url(self.base_url(connectors), "v2/sales/")
    }

    /// `PUT v2/sales/{payment_id}/{action}`, with the amount as a query parameter when set.
    fn follow_on(
        &self,
        req: &PaymentsRequestData,
        connectors: &Connectors,
        action: &str,
    ) -> CustomResult<Request, errors::ConnectorError> {
        let payment_id = transformers::payment_id(req.get_authorization()?)?;
        let mut url = format!("{}{payment_id}/{action}", self.sales_url(connectors));
        if !req.amount.is_zero() {
            url.push_str(&format!("?amount={}", req.amount));
        }
        Ok(RequestBuilder::new().method(Method::Put).url(&url).build())
    }
}

impl ConnectorCommon for Braspag {
    fn id(&self) -> &'static str {
        "braspag"
    }

    fn base_url<'a>(&self, connectors: &'a Connectors) -> &'a str {
        connectors.braspag.base_url.as_ref()
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::StaticKey {
            header: headers::MERCHANT_ID,
            secondary_header: Some(headers::MERCHANT_KEY),
        }
    }
}

impl ConnectorIntegration for Braspag {
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
        let sale = |capture: bool| -> CustomResult<Request, errors::ConnectorError> {
            let body = RequestContent::json(&BraspagPaymentsRequest::try_new(req, capture)?)
                .change_context(errors::ConnectorError::RequestEncodingFailed)?;
            Ok(RequestBuilder::new()
                .method(Method::Post)
                .url(&self.sales_url(connectors))
                .set_body(body)
                .build())
        };
        match flow {
            Flow::Purchase => sale(true),
            Flow::Authorize | Flow::Verify => sale(false),
            Flow::Capture => self.follow_on(req, connectors, "capture"),
            // Braspag refunds through the void endpoint
            Flow::Refund | Flow::Void => self.follow_on(req, connectors, "void"),
            Flow::Store => Err(flow_not_supported_err(flow, self.id())),
        }
    }

    fn response_rules(&self, flow: Flow) -> CustomResult<ResponseRules, errors::ConnectorError> {
        self.ensure_flow_supported(flow)?;
        // payment status codes: 1 authorized, 2 confirmed, 10 voided, 11 refunded
        let success = match flow {
            Flow::Purchase => SuccessPredicate::field_in("Payment.Status", &["2"]),
            Flow::Authorize | Flow::Verify => SuccessPredicate::field_in("Payment.Status", &["1"]),
            Flow::Capture => SuccessPredicate::field_in("Status", &["2"]),
            Flow::Refund | Flow::Void | Flow::Store => {
                SuccessPredicate::field_in("Status", &["10", "11"])
            }
        };
        let rules = ResponseRules::json(success)
            .message(&["Payment.ReturnMessage", "ReasonMessage", "Message"])
            .error_code(ErrorCodeRule::fields(&[
                "Payment.ReturnCode",
                "ProviderReturnCode",
                "Code",
            ]));
        Ok(match flow {
            Flow::Purchase | Flow::Authorize | Flow::Verify => rules.authorization(vec![
                AuthorizationField::OrderId,
                AuthorizationField::response("Payment.PaymentId"),
            ]),
            Flow::Capture | Flow::Refund | Flow::Void | Flow::Store => rules,
        })
    }

    fn verify_policy(&self) -> VerifyPolicy {
        VerifyPolicy::AuthorizeThenVoid {
            amount: common_utils::MinorUnit::new(100),
            report_void_failure: true,
        }
    }
}
