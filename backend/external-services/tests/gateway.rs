#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::VecDeque,
    str::FromStr,
    sync::{Arc, Mutex},
};

use common_enums::Currency;
use common_utils::{consts, errors::CustomResult, MinorUnit, PeekInterface, Request, Secret};
use connector_integration::access_token::{AccessTokenManager, TokenStore};
use domain_types::{
    connector_types::{ConnectorEnum, PaymentOptions},
    errors::{ApiClientError, ConnectorError},
    payment_method_data::Card,
    router_data::ConnectorAuthType,
    router_response_types::Response,
    types::{ConnectorParams, Connectors},
};
use error_stack::report;
use external_services::Gateway;
use interfaces::transport::Transport;
use serde_json::Value;

const TOKEN_URL: &str = "https://oauth.example.com/tokens/bearer";

const CAPTURED: &str = r#"{"id":"EMU831117485","status":"CAPTURED","amount":"1.00","currency":"USD"}"#;
const AUTHENTICATION_FAILED: &str =
    r#"{"fault":{"error":[{"code":"AuthenticationFailed","message":"Token expired"}],"type":"AUTHENTICATION"}}"#;
const FRESH_TOKEN: &str =
    r#"{"access_token":"fresh-token","refresh_token":"rt-2","expires_in":3600,"token_type":"bearer"}"#;

enum Reply {
    Status(u16, &'static str),
    Unreachable,
}

/// Answers payment calls and token calls from two scripts and records what was sent.
#[derive(Default)]
struct ScriptedTransport {
    calls: Mutex<VecDeque<Reply>>,
    token_calls: Mutex<VecDeque<Reply>>,
    sent: Mutex<Vec<Request>>,
    sent_to_token_endpoint: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    fn new(calls: Vec<Reply>, token_calls: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(calls.into()),
            token_calls: Mutex::new(token_calls.into()),
            ..Self::default()
        })
    }

    fn sent(&self) -> Vec<Request> {
        self.sent.lock().unwrap().clone()
    }

    fn token_call_count(&self) -> usize {
        self.sent_to_token_endpoint.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: Request,
    ) -> CustomResult<Result<Response, Response>, ApiClientError> {
        let reply = if request.url == TOKEN_URL {
            self.sent_to_token_endpoint.lock().unwrap().push(request);
            self.token_calls.lock().unwrap().pop_front()
        } else {
            self.sent.lock().unwrap().push(request);
            self.calls.lock().unwrap().pop_front()
        };
        match reply.expect("unscripted call") {
            Reply::Status(status_code, body) => {
                let response = Response::new(status_code, body);
                Ok(if response.is_success() {
                    Ok(response)
                } else {
                    Err(response)
                })
            }
            Reply::Unreachable => Err(report!(ApiClientError::RequestNotSent(
                "connection refused".to_string()
            ))),
        }
    }
}

fn connectors() -> Connectors {
    Connectors {
        braspag: ConnectorParams::new("https://apisandbox.braspag.com.br/".to_string(), None),
        quickbooks: ConnectorParams::new(
            "https://sandbox.api.intuit.com/".to_string(),
            Some(TOKEN_URL.to_string()),
        ),
        versapay: ConnectorParams::new("https://uat.versapay.com/".to_string(), None),
        ..Connectors::default()
    }
}

fn oauth2(expires_in: i64) -> ConnectorAuthType {
    ConnectorAuthType::OAuth2 {
        client_id: Secret::new("client".to_string()),
        client_secret: Secret::new("secret".to_string()),
        access_token: Some(Secret::new("stale-token".to_string())),
        refresh_token: Secret::new("rt-1".to_string()),
        expires_at: Some(common_utils::date_time::now_unix_timestamp() + expires_in),
    }
}

fn card() -> Card {
    Card {
        card_number: cards::CardNumber::from_str("4242424242424242").unwrap(),
        card_exp_month: Secret::new("12".to_string()),
        card_exp_year: Secret::new("2030".to_string()),
        card_cvc: Secret::new("123".to_string()),
        card_holder_name: Some(Secret::new("Jane Doe".to_string())),
        card_network: None,
    }
}

fn quickbooks(transport: Arc<ScriptedTransport>, auth: ConnectorAuthType) -> Gateway {
    Gateway::new(ConnectorEnum::Quickbooks, auth, connectors(), transport, true)
}

fn header(request: &Request, name: &str) -> String {
    request.get_headers_map()[name].clone()
}

#[tokio::test]
async fn test_authentication_failure_refreshes_once_and_replays() {
    let transport = ScriptedTransport::new(
        vec![
            Reply::Status(401, AUTHENTICATION_FAILED),
            Reply::Status(200, CAPTURED),
        ],
        vec![Reply::Status(200, FRESH_TOKEN)],
    );
    let gateway = quickbooks(transport.clone(), oauth2(3600));

    let result = gateway
        .purchase(MinorUnit::new(100), Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(transport.token_call_count(), 1);
    assert_eq!(header(&sent[0], "Authorization"), "Bearer stale-token");
    assert_eq!(header(&sent[1], "Authorization"), "Bearer fresh-token");
    // the replay is the same request, re-signed
    assert_eq!(header(&sent[0], "Request-Id"), header(&sent[1], "Request-Id"));
    assert_eq!(sent[0].get_body_bytes(), sent[1].get_body_bytes());

    let snapshot = gateway.token_store().unwrap().snapshot();
    assert_eq!(snapshot.generation, 1);
    assert_eq!(
        snapshot.token.refresh_token.as_ref().map(|token| token.peek().as_str()),
        Some("rt-2")
    );
}

#[tokio::test]
async fn test_persistent_authentication_failure_is_not_retried_twice() {
    let transport = ScriptedTransport::new(
        vec![
            Reply::Status(401, AUTHENTICATION_FAILED),
            Reply::Status(401, AUTHENTICATION_FAILED),
        ],
        vec![Reply::Status(200, FRESH_TOKEN)],
    );
    let gateway = quickbooks(transport.clone(), oauth2(3600));

    let result = gateway
        .purchase(MinorUnit::new(100), Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.message, "Token expired");
    assert_eq!(result.error_code.as_deref(), Some("AuthenticationFailed"));
    assert_eq!(transport.sent().len(), 2);
    assert_eq!(transport.token_call_count(), 1);
}

#[tokio::test]
async fn test_failed_refresh_reports_the_rejected_response() {
    let transport = ScriptedTransport::new(
        vec![Reply::Status(401, AUTHENTICATION_FAILED)],
        vec![Reply::Status(400, r#"{"error":"invalid_grant"}"#)],
    );
    let gateway = quickbooks(transport.clone(), oauth2(3600));

    let result = gateway
        .purchase(MinorUnit::new(100), Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.status_code(), Some(401));
    assert_eq!(transport.sent().len(), 1);
    assert_eq!(transport.token_call_count(), 1);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_before_signing() {
    let transport = ScriptedTransport::new(
        vec![
            Reply::Status(401, AUTHENTICATION_FAILED),
            Reply::Status(200, CAPTURED),
        ],
        vec![
            Reply::Status(200, FRESH_TOKEN),
            Reply::Status(
                200,
                r#"{"access_token":"fresher-token","expires_in":3600}"#,
            ),
        ],
    );
    // expires within the skew, so it is refreshed proactively
    let gateway = quickbooks(transport.clone(), oauth2(30));

    let result = gateway
        .purchase(MinorUnit::new(100), Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();

    // the proactive refresh does not use up the reactive one
    assert!(result.success);
    let sent = transport.sent();
    assert_eq!(header(&sent[0], "Authorization"), "Bearer fresh-token");
    assert_eq!(header(&sent[1], "Authorization"), "Bearer fresher-token");
    assert_eq!(transport.token_call_count(), 2);
    assert_eq!(gateway.token_store().unwrap().snapshot().generation, 2);
}

#[tokio::test]
async fn test_unusable_token_endpoint_before_signing() {
    let transport = ScriptedTransport::new(vec![], vec![Reply::Status(503, "")]);
    let gateway = quickbooks(transport.clone(), oauth2(0));

    let result = gateway
        .purchase(MinorUnit::new(100), Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(
        result.error_code.as_deref(),
        Some(external_services::service::ACCESS_TOKEN_ERROR_CODE)
    );
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_basic_auth_rejection_is_terminal() {
    let transport = ScriptedTransport::new(
        vec![Reply::Status(401, r#"{"errors":["Invalid credentials"]}"#)],
        vec![],
    );
    let gateway = Gateway::new(
        ConnectorEnum::Versapay,
        ConnectorAuthType::BasicAuth {
            username: Secret::new("api_token".to_string()),
            password: Secret::new("wrong".to_string()),
        },
        connectors(),
        transport.clone(),
        true,
    );

    let result = gateway
        .purchase(MinorUnit::new(500), Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.message, "Invalid credentials");
    assert_eq!(result.error_code.as_deref(), Some("response_code: 401"));
    assert_eq!(transport.sent().len(), 1);
    assert_eq!(transport.token_call_count(), 0);
}

#[tokio::test]
async fn test_truncated_body_is_an_invalid_response() {
    let transport = ScriptedTransport::new(
        vec![Reply::Status(200, r#"{"id":"EMU831117485","status":"CAPT"#)],
        vec![],
    );
    let gateway = quickbooks(transport, oauth2(3600));

    let result = gateway
        .purchase(MinorUnit::new(100), Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.message.starts_with(consts::INVALID_RESPONSE_MESSAGE_PREFIX));
    assert_eq!(result.error_code, None);
    assert_eq!(
        result.param("raw"),
        Some(&Value::String(r#"{"id":"EMU831117485","status":"CAPT"#.to_string()))
    );
}

#[tokio::test]
async fn test_transport_failure_is_in_band() {
    let transport = ScriptedTransport::new(vec![Reply::Unreachable], vec![]);
    let gateway = quickbooks(transport.clone(), oauth2(3600));

    let result = gateway
        .purchase(MinorUnit::new(100), Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some(consts::TRANSPORT_ERROR_CODE));
    assert!(result
        .message
        .starts_with(consts::TRANSPORT_ERROR_MESSAGE_PREFIX));
    assert!(result.test_mode);
    assert_eq!(transport.token_call_count(), 0);
}

#[tokio::test]
async fn test_purchase_then_void_decodes_the_authorization() {
    let transport = ScriptedTransport::new(
        vec![
            Reply::Status(200, CAPTURED),
            Reply::Status(
                201,
                r#"{"id":"E8RPOZ1ZXAA5","status":"ISSUED","amount":"1.00","type":"REFUND"}"#,
            ),
        ],
        vec![],
    );
    let gateway = quickbooks(transport.clone(), oauth2(3600));

    let purchase = gateway
        .purchase(MinorUnit::new(100), Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();
    assert!(purchase.success);
    let authorization = purchase.authorization.unwrap();
    assert_eq!(authorization, "EMU831117485|100|USD");

    let void = gateway
        .void(&authorization, PaymentOptions::default())
        .await
        .unwrap();
    assert!(void.success);

    let sent = transport.sent();
    let purchase_body: Value = serde_json::from_slice(&sent[0].get_body_bytes()).unwrap();
    assert_eq!(purchase_body["amount"], "1.00");
    assert_eq!(purchase_body["card"]["number"], "4242424242424242");
    assert_eq!(
        sent[1].url,
        "https://sandbox.api.intuit.com/quickbooks/v4/payments/charges/EMU831117485/refunds"
    );
    let void_body: Value = serde_json::from_slice(&sent[1].get_body_bytes()).unwrap();
    assert_eq!(void_body["amount"], "1.00");
}

#[tokio::test]
async fn test_malformed_authorization_fails_before_sending() {
    let transport = ScriptedTransport::new(vec![], vec![]);
    let gateway = quickbooks(transport.clone(), oauth2(3600));

    let error = gateway
        .capture(
            MinorUnit::new(100),
            Currency::USD,
            "EMU831117485",
            PaymentOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(error.current_context().is_configuration_error());
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_unsupported_flow_is_a_configuration_error() {
    let transport = ScriptedTransport::new(vec![], vec![]);
    let gateway = quickbooks(transport, oauth2(3600));

    let error = gateway
        .store(card(), PaymentOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        error.current_context(),
        ConnectorError::FlowNotSupported { .. }
    ));
}

#[tokio::test]
async fn test_verify_reports_authorization_when_void_fails() {
    let transport = ScriptedTransport::new(
        vec![
            Reply::Status(
                200,
                r#"{"id":"EMU1","status":"AUTHORIZED","amount":"1.00","currency":"USD"}"#,
            ),
            Reply::Status(
                400,
                r#"{"errors":[{"code":"PMT-4000","message":"refund not allowed"}]}"#,
            ),
        ],
        vec![],
    );
    let gateway = quickbooks(transport.clone(), oauth2(3600));

    let result = gateway
        .verify(Currency::USD, card(), PaymentOptions::default())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.authorization.as_deref(), Some("EMU1|100|USD"));
    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn test_verify_reports_void_failure_when_declared() {
    let transport = ScriptedTransport::new(
        vec![
            Reply::Status(
                201,
                r#"{"MerchantOrderId":"","Payment":{"PaymentId":"922e-59fc86a36c03","Status":1,"ReturnCode":"4","ReturnMessage":"Operation Successful"}}"#,
            ),
            Reply::Status(
                400,
                r#"[{"Code":308,"Message":"Transaction not available to void"}]"#,
            ),
        ],
        vec![],
    );
    let gateway = Gateway::new(
        ConnectorEnum::Braspag,
        ConnectorAuthType::BodyKey {
            api_key: Secret::new("merchant-id".to_string()),
            key1: Secret::new("merchant-key".to_string()),
        },
        connectors(),
        transport.clone(),
        true,
    );

    let result = gateway
        .verify(Currency::BRL, card(), PaymentOptions::default())
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.message, "Transaction not available to void");
    let sent = transport.sent();
    assert_eq!(
        sent[1].url,
        "https://apisandbox.braspag.com.br/v2/sales/922e-59fc86a36c03/void?amount=100"
    );
}

#[tokio::test]
async fn test_concurrent_refreshes_share_one_token_call() {
    let transport = ScriptedTransport::new(vec![], vec![Reply::Status(200, FRESH_TOKEN)]);
    let auth = oauth2(3600);
    let store = TokenStore::from_auth(&auth).unwrap();
    let stale = store.snapshot();
    let connector = connector_integration::connectors::Quickbooks::new();

    let (first, second) = tokio::join!(
        AccessTokenManager::refresh(connector, &store, &auth, &connectors(), transport.as_ref(), &stale),
        AccessTokenManager::refresh(connector, &store, &auth, &connectors(), transport.as_ref(), &stale),
    );

    assert_eq!(first.unwrap().generation, 1);
    assert_eq!(second.unwrap().generation, 1);
    assert_eq!(transport.token_call_count(), 1);
}
