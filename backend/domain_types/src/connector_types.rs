use common_enums::{Currency, PaymentInitiator, StoredCredentialReason};
use common_utils::{FieldPath, MinorUnit};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::{
    payment_method_data::Card,
    utils::{missing_field_err, Error},
};

// snake case for enum variants
#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConnectorEnum {
    Braspag,
    Cybersource,
    Fusebox,
    Quickbooks,
    Versapay,
}

/// The uniform operations every connector exposes.
#[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Purchase,
    Authorize,
    Capture,
    Refund,
    Void,
    Store,
    Verify,
}

impl Flow {
    /// Flows that charge or tokenize a payment method.
    pub fn requires_payment_method(self) -> bool {
        matches!(self, Self::Purchase | Self::Authorize | Self::Store | Self::Verify)
    }

    /// Follow-on flows addressing an earlier transaction through its authorization token.
    pub fn requires_authorization(self) -> bool {
        matches!(self, Self::Capture | Self::Refund | Self::Void)
    }
}

/// CIT/MIT details for transactions reusing stored card credentials. Passed
/// through to connectors that map them; never interpreted by the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub initiator: PaymentInitiator,
    pub reason: StoredCredentialReason,
    /// Network transaction id of the initial transaction, for subsequent uses
    pub network_transaction_id: Option<String>,
}

impl StoredCredential {
    pub fn is_initial(&self) -> bool {
        self.network_transaction_id.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOptions {
    pub order_id: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub ip_address: Option<String>,
    pub stored_credential: Option<StoredCredential>,
}

/// Everything a connector needs to build the request of one flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentsRequestData {
    pub amount: MinorUnit,
    pub currency: Currency,
    pub payment_method: Option<Card>,
    /// Composite authorization token of the transaction a follow-on flow addresses
    pub authorization: Option<String>,
    #[serde(default)]
    pub options: PaymentOptions,
}

impl PaymentsRequestData {
    pub fn new(amount: MinorUnit, currency: Currency) -> Self {
        Self {
            amount,
            currency,
            payment_method: None,
            authorization: None,
            options: PaymentOptions::default(),
        }
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.payment_method = Some(card);
        self
    }

    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    pub fn with_options(mut self, options: PaymentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn get_card(&self) -> Result<&Card, Error> {
        self.payment_method
            .as_ref()
            .ok_or_else(missing_field_err("payment_method"))
    }

    pub fn get_authorization(&self) -> Result<&str, Error> {
        self.authorization
            .as_deref()
            .ok_or_else(missing_field_err("authorization"))
    }

    pub fn get_stored_credential(&self) -> Option<&StoredCredential> {
        self.options.stored_credential.as_ref()
    }
}

/// The uniform outcome of one connector call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayResult {
    pub success: bool,
    pub message: String,
    pub error_code: Option<String>,
    pub authorization: Option<String>,
    pub params: Map<String, Value>,
    pub test_mode: bool,
}

impl GatewayResult {
    pub fn failure(message: impl Into<String>, error_code: Option<String>, test_mode: bool) -> Self {
        Self {
            success: false,
            message: message.into(),
            error_code,
            authorization: None,
            params: Map::new(),
            test_mode,
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn status_code(&self) -> Option<u16> {
        self.params
            .get("status_code")
            .and_then(Value::as_u64)
            .and_then(|status_code| u16::try_from(status_code).ok())
    }
}

/// Tag → field name pairs of a numbered-field wire format.
pub type FieldTable = &'static [(&'static str, &'static str)];

/// Wire shape of a connector's response bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    /// XML or SOAP; a `Fault` element is an ordinary node of the parsed tree
    Xml,
    FormUrlEncoded,
    /// XML whose fields are numbered tags, renamed through the table
    NumberedXml(FieldTable),
}

/// Provider-declared success test over the parsed body and the HTTP status.
#[derive(Clone, Debug)]
pub enum SuccessPredicate {
    FieldIn {
        path: FieldPath,
        values: &'static [&'static str],
    },
    FieldPresent(FieldPath),
    FieldAbsent(FieldPath),
    HttpSuccess,
    All(Vec<SuccessPredicate>),
    Any(Vec<SuccessPredicate>),
    Custom(fn(&Value, u16) -> bool),
}

impl SuccessPredicate {
    pub fn field_in(path: &str, values: &'static [&'static str]) -> Self {
        Self::FieldIn {
            path: FieldPath::parse(path),
            values,
        }
    }

    pub fn present(path: &str) -> Self {
        Self::FieldPresent(FieldPath::parse(path))
    }

    pub fn absent(path: &str) -> Self {
        Self::FieldAbsent(FieldPath::parse(path))
    }
}

/// Where a failed result's error code comes from.
#[derive(Clone, Debug, Default)]
pub enum ErrorCodeRule {
    /// No code field; only the HTTP status can supply one
    #[default]
    StatusOnly,
    /// First non-empty value among the paths
    Fields(Vec<FieldPath>),
    /// A gateway-level code and a response-level code reported together as
    /// `gateway_error_code: <g> | response_code: <r>`
    Composite {
        gateway: FieldPath,
        response: FieldPath,
    },
}

impl ErrorCodeRule {
    pub fn fields(paths: &[&str]) -> Self {
        Self::Fields(paths.iter().copied().map(FieldPath::parse).collect())
    }
}

/// One positional field of a composite authorization token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationField {
    Response(FieldPath),
    Amount,
    Currency,
    OrderId,
    CardBrand,
    CardLast4,
}

impl AuthorizationField {
    pub fn response(path: &str) -> Self {
        Self::Response(FieldPath::parse(path))
    }
}

/// A connector's response table for one flow.
#[derive(Clone, Debug)]
pub struct ResponseRules {
    pub format: ResponseFormat,
    pub success: SuccessPredicate,
    pub message: Vec<FieldPath>,
    pub success_message: &'static str,
    pub error_code: ErrorCodeRule,
    pub authorization: Vec<AuthorizationField>,
}

impl ResponseRules {
    pub fn new(format: ResponseFormat, success: SuccessPredicate) -> Self {
        Self {
            format,
            success,
            message: Vec::new(),
            success_message: "Transaction approved",
            error_code: ErrorCodeRule::default(),
            authorization: Vec::new(),
        }
    }

    pub fn json(success: SuccessPredicate) -> Self {
        Self::new(ResponseFormat::Json, success)
    }

    pub fn message(mut self, paths: &[&str]) -> Self {
        self.message = paths.iter().copied().map(FieldPath::parse).collect();
        self
    }

    pub fn success_message(mut self, message: &'static str) -> Self {
        self.success_message = message;
        self
    }

    pub fn error_code(mut self, rule: ErrorCodeRule) -> Self {
        self.error_code = rule;
        self
    }

    pub fn authorization(mut self, fields: Vec<AuthorizationField>) -> Self {
        self.authorization = fields;
        self
    }
}

/// How a connector verifies a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyPolicy {
    /// A single authorization for a zero amount
    ZeroAmountAuthorize,
    /// Authorize `amount`, then void it. When `report_void_failure` is false a
    /// failed void still yields the successful authorization's result.
    AuthorizeThenVoid {
        amount: MinorUnit,
        report_void_failure: bool,
    },
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_connector_and_flow_names() {
        assert_eq!(ConnectorEnum::from_str("quickbooks").unwrap(), ConnectorEnum::Quickbooks);
        assert!(ConnectorEnum::from_str("redsys").is_err());
        assert_eq!(Flow::Void.to_string(), "void");
        assert!(Flow::Refund.requires_authorization());
        assert!(!Flow::Refund.requires_payment_method());
    }

    #[test]
    fn test_missing_request_fields() {
        let request = PaymentsRequestData::new(MinorUnit::new(100), Currency::USD);
        let error = request.get_authorization().unwrap_err();
        assert_eq!(
            error.current_context(),
            &crate::errors::ConnectorError::MissingRequiredField {
                field_name: "authorization"
            }
        );
        assert!(request.get_card().is_err());
    }

    #[test]
    fn test_gateway_result_status_code() {
        let result = GatewayResult::failure("declined", Some("05".to_string()), true)
            .with_param("status_code", 402);
        assert_eq!(result.status_code(), Some(402));
        assert!(!result.success);
    }
}
