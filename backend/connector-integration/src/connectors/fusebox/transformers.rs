use domain_types::{
    connector_types::{Flow, PaymentsRequestData},
    errors::ConnectorError,
};
use error_stack::ResultExt;
use hyperswitch_masking::Secret;
use serde::Serialize;

use crate::authorization;

/// `transaction_id|token|brand|last4`
pub const AUTHORIZATION_ARITY: usize = 4;

pub const SOAP_ACTION: &str = "http://fusebox.net/ProcessTransaction";

/// Numbered response tags and the names they are read as.
pub const RESPONSE_FIELDS: &[(&str, &str)] = &[
    ("F0100", "response_code"),
    ("F0101", "response_text"),
    ("F0102", "transaction_id"),
    ("F0103", "token"),
    ("F0104", "approval_code"),
    ("F0105", "gateway_error_code"),
];

/// Response codes of an approved transaction.
pub const APPROVED_CODES: &[&str] = &["00", "10"];

fn transaction_type(flow: Flow) -> &'static str {
    match flow {
        Flow::Purchase => "01",
        Flow::Authorize => "02",
        Flow::Capture => "03",
        Flow::Refund => "04",
        Flow::Void => "05",
        Flow::Verify => "06",
        Flow::Store => "07",
    }
}

/// The numbered request fields of one transaction.
#[derive(Debug, Default, Serialize)]
pub struct FuseboxRequest {
    /// transaction type
    #[serde(rename = "F0001")]
    transaction_type: &'static str,
    /// amount in major units
    #[serde(rename = "F0002", skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
    #[serde(rename = "F0003", skip_serializing_if = "Option::is_none")]
    card_number: Option<cards::CardNumber>,
    /// MMYY
    #[serde(rename = "F0004", skip_serializing_if = "Option::is_none")]
    expiry: Option<Secret<String>>,
    #[serde(rename = "F0005", skip_serializing_if = "Option::is_none")]
    cvv: Option<Secret<String>>,
    #[serde(rename = "F0006")]
    currency: String,
    #[serde(rename = "F0007", skip_serializing_if = "Option::is_none")]
    invoice: Option<String>,
    /// original transaction id
    #[serde(rename = "F0008", skip_serializing_if = "Option::is_none")]
    original_transaction_id: Option<String>,
    #[serde(rename = "F0009", skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl FuseboxRequest {
    pub fn try_new(
        flow: Flow,
        req: &PaymentsRequestData,
    ) -> Result<Self, error_stack::Report<ConnectorError>> {
        let mut request = Self {
            transaction_type: transaction_type(flow),
            amount: (flow != Flow::Store)
                .then(|| req.amount.to_major_unit_as_string(req.currency)),
            currency: req.currency.to_string(),
            invoice: req.options.order_id.clone(),
            ..Self::default()
        };
        if flow.requires_authorization() {
            let authorization = FuseboxAuthorization::try_from(req.get_authorization()?)?;
            request.original_transaction_id = Some(authorization.transaction_id);
            request.token = Some(authorization.token).filter(|token| !token.is_empty());
        } else {
            let card = req.get_card()?;
            request.card_number = Some(card.card_number.clone());
            request.expiry = Some(
                card.get_expiry_date_as_mmyy()
                    .change_context(ConnectorError::RequestEncodingFailed)?,
            );
            request.cvv = Some(card.card_cvc.clone());
        }
        Ok(request)
    }

    /// The request wrapped in its SOAP envelope.
    pub fn to_soap_envelope(&self) -> Result<String, error_stack::Report<ConnectorError>> {
        let fields = quick_xml::se::to_string_with_root("Request", self)
            .change_context(ConnectorError::RequestEncodingFailed)
            .attach_printable("Failed to serialize fusebox request fields")?;
        Ok(format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
             <soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\
             <soap:Body><ProcessTransaction xmlns=\"http://fusebox.net/\">{fields}</ProcessTransaction></soap:Body>\
             </soap:Envelope>"
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuseboxAuthorization {
    pub transaction_id: String,
    pub token: String,
    pub brand: String,
    pub last4: String,
}

impl TryFrom<&str> for FuseboxAuthorization {
    type Error = error_stack::Report<ConnectorError>;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        let [transaction_id, token, brand, last4]: [String; AUTHORIZATION_ARITY] =
            authorization::decode_exact(token, AUTHORIZATION_ARITY)?
                .try_into()
                .map_err(|_| ConnectorError::InvalidAuthorizationField {
                    field_name: "authorization",
                })?;
        if transaction_id.is_empty() {
            Err(ConnectorError::InvalidAuthorizationField {
                field_name: "transaction_id",
            })?
        }
        Ok(Self {
            transaction_id,
            token,
            brand,
            last4,
        })
    }
}
