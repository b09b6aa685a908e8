use common_enums::{CardNetwork, Currency, PaymentInitiator, StoredCredentialReason};
use domain_types::{
    connector_types::{PaymentsRequestData, StoredCredential},
    errors::ConnectorError,
    payment_method_data::Card,
};
use hyperswitch_masking::Secret;
use serde::Serialize;

use crate::authorization;

/// `id|reconciliation_id`
pub const AUTHORIZATION_ARITY: usize = 2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientReferenceInformation {
    code: Option<String>,
}

impl From<&PaymentsRequestData> for ClientReferenceInformation {
    fn from(req: &PaymentsRequestData) -> Self {
        Self {
            code: req.options.order_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CybersourceActionsList {
    TokenCreate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CybersourceActionsTokenType {
    Customer,
    PaymentInstrument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingInformation {
    #[serde(skip_serializing_if = "Option::is_none")]
    action_list: Option<Vec<CybersourceActionsList>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action_token_types: Option<Vec<CybersourceActionsTokenType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization_options: Option<CybersourceAuthorizationOptions>,
    commerce_indicator: String,
    capture: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CybersourceAuthorizationOptions {
    initiator: Option<CybersourcePaymentInitiator>,
    merchant_initiated_transaction: Option<MerchantInitiatedTransaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantInitiatedTransaction {
    reason: Option<String>,
    previous_transaction_id: Option<Secret<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CybersourcePaymentInitiator {
    #[serde(rename = "type")]
    initiator_type: Option<CybersourcePaymentInitiatorTypes>,
    credential_stored_on_file: Option<bool>,
    stored_credential_used: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CybersourcePaymentInitiatorTypes {
    Customer,
    Merchant,
}

impl From<&StoredCredential> for CybersourceAuthorizationOptions {
    fn from(stored_credential: &StoredCredential) -> Self {
        let initiator_type = match stored_credential.initiator {
            PaymentInitiator::Customer => CybersourcePaymentInitiatorTypes::Customer,
            PaymentInitiator::Merchant => CybersourcePaymentInitiatorTypes::Merchant,
        };
        let merchant_initiated_transaction = match stored_credential.initiator {
            PaymentInitiator::Customer => None,
            PaymentInitiator::Merchant => Some(MerchantInitiatedTransaction {
                // reason codes from the CyberSource MIT guide
                reason: match stored_credential.reason {
                    StoredCredentialReason::Unscheduled => Some("7".to_string()),
                    StoredCredentialReason::Recurring | StoredCredentialReason::Installment => None,
                },
                previous_transaction_id: stored_credential
                    .network_transaction_id
                    .clone()
                    .map(Secret::new),
            }),
        };
        Self {
            initiator: Some(CybersourcePaymentInitiator {
                initiator_type: Some(initiator_type),
                credential_stored_on_file: Some(stored_credential.is_initial()),
                stored_credential_used: Some(!stored_credential.is_initial()),
            }),
            merchant_initiated_transaction,
        }
    }
}

fn commerce_indicator(stored_credential: Option<&StoredCredential>) -> String {
    match stored_credential.map(|stored_credential| stored_credential.reason) {
        Some(StoredCredentialReason::Recurring) => "recurring",
        Some(StoredCredentialReason::Installment) => "install",
        Some(StoredCredentialReason::Unscheduled) | None => "internet",
    }
    .to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CybersourceCard {
    number: cards::CardNumber,
    expiration_month: Secret<String>,
    expiration_year: Secret<String>,
    security_code: Option<Secret<String>>,
    #[serde(rename = "type")]
    card_type: Option<String>,
}

/// CyberSource card type codes.
fn card_type(network: Option<CardNetwork>) -> Option<String> {
    let code = match network? {
        CardNetwork::Visa => "001",
        CardNetwork::Mastercard => "002",
        CardNetwork::AmericanExpress => "003",
        CardNetwork::Discover => "004",
        CardNetwork::DinersClub => "005",
        CardNetwork::JCB => "007",
        CardNetwork::Maestro => "042",
        CardNetwork::UnionPay => "062",
    };
    Some(code.to_string())
}

impl From<&Card> for CybersourceCard {
    fn from(card: &Card) -> Self {
        Self {
            number: card.card_number.clone(),
            expiration_month: card.get_expiry_month_2_digit(),
            expiration_year: card.get_expiry_year_4_digit(),
            security_code: Some(card.card_cvc.clone()),
            card_type: card_type(card.get_card_network()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInformation {
    card: CybersourceCard,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    total_amount: String,
    currency: Currency,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillTo {
    email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInformationWithBill {
    amount_details: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    bill_to: Option<BillTo>,
}

impl From<&PaymentsRequestData> for OrderInformationWithBill {
    fn from(req: &PaymentsRequestData) -> Self {
        Self {
            amount_details: Amount {
                total_amount: req.amount.to_major_unit_as_string(req.currency),
                currency: req.currency,
            },
            bill_to: req.options.email.clone().map(|email| BillTo { email }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CybersourcePaymentsRequest {
    processing_information: ProcessingInformation,
    payment_information: PaymentInformation,
    order_information: OrderInformationWithBill,
    client_reference_information: ClientReferenceInformation,
}

/// What a payments request asks CyberSource to do with the card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentIntent {
    Sale,
    Authorize,
    /// Authorize and keep the card as a payment instrument token
    Tokenize,
}

impl CybersourcePaymentsRequest {
    pub fn try_new(
        req: &PaymentsRequestData,
        intent: PaymentIntent,
    ) -> Result<Self, error_stack::Report<ConnectorError>> {
        let card = req.get_card()?;
        let (action_list, action_token_types) = match intent {
            PaymentIntent::Tokenize => (
                Some(vec![CybersourceActionsList::TokenCreate]),
                Some(vec![
                    CybersourceActionsTokenType::Customer,
                    CybersourceActionsTokenType::PaymentInstrument,
                ]),
            ),
            PaymentIntent::Sale | PaymentIntent::Authorize => (None, None),
        };
        Ok(Self {
            processing_information: ProcessingInformation {
                action_list,
                action_token_types,
                authorization_options: req
                    .get_stored_credential()
                    .map(CybersourceAuthorizationOptions::from),
                commerce_indicator: commerce_indicator(req.get_stored_credential()),
                capture: Some(intent == PaymentIntent::Sale),
            },
            payment_information: PaymentInformation {
                card: CybersourceCard::from(card),
            },
            order_information: OrderInformationWithBill::from(req),
            client_reference_information: ClientReferenceInformation::from(req),
        })
    }
}

/// Body shared by captures and refunds.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CybersourceFollowOnRequest {
    order_information: OrderInformationWithBill,
    client_reference_information: ClientReferenceInformation,
}

impl From<&PaymentsRequestData> for CybersourceFollowOnRequest {
    fn from(req: &PaymentsRequestData) -> Self {
        Self {
            order_information: OrderInformationWithBill {
                bill_to: None,
                ..OrderInformationWithBill::from(req)
            },
            client_reference_information: ClientReferenceInformation::from(req),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CybersourceVoidRequest {
    client_reference_information: ClientReferenceInformation,
}

impl From<&PaymentsRequestData> for CybersourceVoidRequest {
    fn from(req: &PaymentsRequestData) -> Self {
        Self {
            client_reference_information: ClientReferenceInformation::from(req),
        }
    }
}

/// The payment id from an `id|reconciliation_id` token.
pub fn transaction_id(token: &str) -> Result<String, error_stack::Report<ConnectorError>> {
    let mut fields = authorization::decode_exact(token, AUTHORIZATION_ARITY)?;
    let id = fields.swap_remove(0);
    if id.is_empty() {
        Err(ConnectorError::InvalidAuthorizationField { field_name: "id" })?
    } else {
        Ok(id)
    }
}
