use std::str::FromStr;

use common_enums::Currency;
use common_utils::{date_time, ext_traits::BytesExt, MinorUnit};
use domain_types::{
    connector_types::PaymentsRequestData,
    errors::ConnectorError,
    payment_method_data::Card,
    router_data::{AccessToken, ConnectorAuthType},
    router_response_types::Response,
};
use error_stack::{report, ResultExt};
use hyperswitch_masking::{PeekInterface, Secret};
use serde::{Deserialize, Serialize};

use crate::authorization;

/// `id|amount|currency`, amount in minor units.
pub const AUTHORIZATION_ARITY: usize = 3;

pub struct QuickbooksAuthType {
    pub(super) client_id: Secret<String>,
    pub(super) client_secret: Secret<String>,
}

impl TryFrom<&ConnectorAuthType> for QuickbooksAuthType {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(auth_type: &ConnectorAuthType) -> Result<Self, Self::Error> {
        if let ConnectorAuthType::OAuth2 {
            client_id,
            client_secret,
            ..
        } = auth_type
        {
            Ok(Self {
                client_id: client_id.to_owned(),
                client_secret: client_secret.to_owned(),
            })
        } else {
            Err(ConnectorError::FailedToObtainAuthType)?
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickbooksCard {
    number: cards::CardNumber,
    exp_month: Secret<String>,
    exp_year: Secret<String>,
    cvc: Secret<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<Secret<String>>,
}

impl From<&Card> for QuickbooksCard {
    fn from(card: &Card) -> Self {
        Self {
            number: card.card_number.clone(),
            exp_month: card.get_expiry_month_2_digit(),
            exp_year: card.get_expiry_year_4_digit(),
            cvc: card.card_cvc.clone(),
            name: card.card_holder_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickbooksContext {
    mobile: bool,
    is_ecommerce: bool,
}

impl Default for QuickbooksContext {
    fn default() -> Self {
        Self {
            mobile: false,
            is_ecommerce: true,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickbooksChargeRequest {
    amount: String,
    currency: Currency,
    card: QuickbooksCard,
    capture: bool,
    context: QuickbooksContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl QuickbooksChargeRequest {
    pub fn try_new(
        req: &PaymentsRequestData,
        capture: bool,
    ) -> Result<Self, error_stack::Report<ConnectorError>> {
        Ok(Self {
            amount: req.amount.to_major_unit_as_string(req.currency),
            currency: req.currency,
            card: QuickbooksCard::from(req.get_card()?),
            capture,
            context: QuickbooksContext::default(),
            description: req.options.description.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickbooksCaptureRequest {
    amount: String,
    context: QuickbooksContext,
}

impl QuickbooksCaptureRequest {
    pub fn new(req: &PaymentsRequestData) -> Self {
        Self {
            amount: req.amount.to_major_unit_as_string(req.currency),
            context: QuickbooksContext::default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuickbooksRefundRequest {
    amount: String,
}

impl QuickbooksRefundRequest {
    pub fn new(amount: MinorUnit, currency: Currency) -> Self {
        Self {
            amount: amount.to_major_unit_as_string(currency),
        }
    }
}

/// A decoded `id|amount|currency` token.
#[derive(Debug, PartialEq, Eq)]
pub struct QuickbooksAuthorization {
    pub charge_id: String,
    pub amount: MinorUnit,
    pub currency: Currency,
}

impl TryFrom<&str> for QuickbooksAuthorization {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(token: &str) -> Result<Self, Self::Error> {
        let fields = authorization::decode_exact(token, AUTHORIZATION_ARITY)?;
        let charge_id = fields[0].clone();
        if charge_id.is_empty() {
            return Err(report!(ConnectorError::InvalidAuthorizationField {
                field_name: "id"
            }));
        }
        let amount = fields[1]
            .parse::<i64>()
            .map(MinorUnit::new)
            .change_context(ConnectorError::InvalidAuthorizationField {
                field_name: "amount",
            })?;
        let currency = Currency::from_str(&fields[2]).change_context(
            ConnectorError::InvalidAuthorizationField {
                field_name: "currency",
            },
        )?;
        Ok(Self {
            charge_id,
            amount,
            currency,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct QuickbooksRefreshTokenRequest {
    grant_type: &'static str,
    refresh_token: Secret<String>,
}

impl TryFrom<&AccessToken> for QuickbooksRefreshTokenRequest {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(current: &AccessToken) -> Result<Self, Self::Error> {
        let refresh_token = current
            .refresh_token
            .clone()
            .filter(|token| !token.peek().is_empty())
            .ok_or(ConnectorError::MissingRequiredField {
                field_name: "refresh_token",
            })?;
        Ok(Self {
            grant_type: "refresh_token",
            refresh_token,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct QuickbooksTokenResponse {
    access_token: Secret<String>,
    refresh_token: Option<Secret<String>>,
    expires_in: Option<i64>,
}

impl QuickbooksTokenResponse {
    pub fn try_from_response(
        response: &Response,
        current: &AccessToken,
    ) -> Result<AccessToken, error_stack::Report<ConnectorError>> {
        if !response.is_success() {
            return Err(report!(ConnectorError::FailedToObtainAccessToken).attach_printable(
                format!("token endpoint responded with status {}", response.status_code),
            ));
        }
        let token: Self = response
            .response
            .parse_struct("QuickbooksTokenResponse")
            .change_context(ConnectorError::FailedToObtainAccessToken)?;
        if token.access_token.peek().is_empty() {
            return Err(report!(ConnectorError::FailedToObtainAccessToken)
                .attach_printable("token endpoint returned an empty access token"));
        }
        Ok(AccessToken {
            token: token.access_token,
            // the endpoint may keep the old refresh token valid and omit a new one
            refresh_token: token.refresh_token.or_else(|| current.refresh_token.clone()),
            expires_at: token
                .expires_in
                .map(|expires_in| date_time::now_unix_timestamp() + expires_in),
        })
    }
}
