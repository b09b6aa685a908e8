pub mod transformers;

use common_utils::{errors::CustomResult, Method, Request, RequestBuilder, RequestContent, ScrubRule};
use domain_types::{
    connector_types::{
        AuthorizationField, ErrorCodeRule, Flow, PaymentsRequestData, ResponseFormat,
        ResponseRules, SuccessPredicate,
    },
    errors,
    router_data::{AuthStrategy, ConnectorAuthType},
    types::Connectors,
};
use interfaces::{api::ConnectorCommon, connector_integration::ConnectorIntegration};
use transformers::{FuseboxRequest, APPROVED_CODES, RESPONSE_FIELDS, SOAP_ACTION};

use crate::utils;

pub(crate) mod headers {
    pub(crate) const API_KEY: &str = "Apikey";
    pub(crate) const SOAP_ACTION: &str = "SOAPAction";
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

const FAULT: &str = "Envelope.Body.Fault";

#[derive(Clone, Debug)]
pub struct Fusebox;

impl Fusebox {
    pub const fn new() -> &'static Self {
        &Self
    }
}

impl ConnectorCommon for Fusebox {
    fn id(&self) -> &'static str {
        "fusebox"
    }

    fn base_url<'a>(&self, connectors: &'a Connectors) -> &'a str {
        connectors.fusebox.base_url.as_ref()
    }

    fn auth_strategy(&self) -> AuthStrategy {
        AuthStrategy::StaticKey {
            header: headers::API_KEY,
            secondary_header: None,
        }
    }

    fn common_get_content_type(&self) -> &'static str {
        "text/xml; charset=utf-8"
    }

    fn scrub_rules(&self) -> Vec<ScrubRule> {
        // card number, expiry and security code
        ["F0003", "F0004", "F0005"]
            .into_iter()
            .map(ScrubRule::xml_element)
            .chain(std::iter::once(ScrubRule::header(headers::API_KEY)))
            .collect()
    }
}

impl ConnectorIntegration for Fusebox {
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
        let envelope = FuseboxRequest::try_new(flow, req)?.to_soap_envelope()?;
        Ok(RequestBuilder::new()
            .method(Method::Post)
            .url(&utils::join_url(self.base_url(connectors), "fusebox/service.asmx"))
            .header("Content-Type", self.common_get_content_type())
            .header(headers::SOAP_ACTION, SOAP_ACTION)
            .set_body(RequestContent::Xml(envelope))
            .build())
    }

    fn response_rules(&self, flow: Flow) -> CustomResult<ResponseRules, errors::ConnectorError> {
        self.ensure_flow_supported(flow)?;
        let rules = ResponseRules::new(
            ResponseFormat::NumberedXml(RESPONSE_FIELDS),
            SuccessPredicate::All(vec![
                SuccessPredicate::absent(FAULT),
                SuccessPredicate::field_in("response_code", APPROVED_CODES),
            ]),
        )
        .message(&["response_text", "Envelope.Body.Fault.faultstring"])
        .error_code(ErrorCodeRule::fields(&[
            "gateway_error_code",
            "response_code",
            "Envelope.Body.Fault.faultcode",
        ]));
        Ok(rules.authorization(vec![
            AuthorizationField::response("transaction_id"),
            AuthorizationField::response("token"),
            AuthorizationField::CardBrand,
            AuthorizationField::CardLast4,
        ]))
    }
}
