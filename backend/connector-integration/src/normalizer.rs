//! Turns a raw provider response into a [`GatewayResult`].
//!
//! Parsing, success detection, message and error code extraction are all
//! driven by the connector's [`ResponseRules`]; nothing here knows about a
//! particular provider. Nothing here fails either: every outcome, including
//! an unparseable body, is a `GatewayResult`.

use common_utils::{
    consts,
    errors::{CustomResult, ParsingError},
    field_path::dig_first_string,
    TranscriptScrubber,
};
use domain_types::{
    connector_types::{
        AuthorizationField, ErrorCodeRule, GatewayResult, PaymentsRequestData, ResponseFormat,
        ResponseRules, SuccessPredicate,
    },
    errors::ApiClientError,
};
use error_stack::{Report, ResultExt};
use serde_json::{Map, Value};

use crate::{authorization, utils};

pub const STATUS_CODE_PARAM: &str = "status_code";
pub const RAW_BODY_PARAM: &str = "raw";

/// Everything besides the response itself that goes into a result.
#[derive(Clone, Copy)]
pub struct NormalizerContext<'a> {
    pub request: &'a PaymentsRequestData,
    pub scrubber: &'a TranscriptScrubber,
    pub test_mode: bool,
}

pub fn normalize(
    status_code: u16,
    body: &[u8],
    rules: &ResponseRules,
    context: &NormalizerContext<'_>,
) -> GatewayResult {
    let body = utils::strip_bom(body);
    let document = match parse_body(rules.format, body) {
        Ok(document) => document,
        Err(error) => {
            tracing::warn!(status_code, ?error, "response body could not be parsed");
            return invalid_response(status_code, &error.to_string(), body, context);
        }
    };

    let success = evaluate(&rules.success, &document, status_code);
    let message = dig_first_string(&document, &rules.message).unwrap_or_else(|| {
        if success {
            rules.success_message.to_string()
        } else {
            consts::NO_ERROR_MESSAGE.to_string()
        }
    });

    let authorization = if success && !rules.authorization.is_empty() {
        let fields = rules
            .authorization
            .iter()
            .map(|field| authorization_field(field, &document, context.request))
            .collect::<Vec<_>>();
        match authorization::encode(&fields) {
            Ok(token) => Some(token),
            Err(error) => {
                tracing::warn!(?error, "authorization fields could not be encoded");
                let mut result = invalid_response(
                    status_code,
                    "authorization field contains the delimiter",
                    body,
                    context,
                );
                result.error_code = Some(consts::AUTHORIZATION_ENCODING_ERROR_CODE.to_string());
                return result;
            }
        }
    } else {
        None
    };

    let error_code =
        (!success).then(|| extract_error_code(&rules.error_code, &document, status_code));

    let mut params = match document {
        Value::Object(map) => map,
        other => Map::from_iter([("body".to_string(), other)]),
    };
    params.insert(STATUS_CODE_PARAM.to_string(), Value::from(status_code));

    GatewayResult {
        success,
        message,
        error_code,
        authorization,
        params,
        test_mode: context.test_mode,
    }
}

/// The in-band result of a request that never produced a response.
pub fn transport_failure(error: &Report<ApiClientError>, test_mode: bool) -> GatewayResult {
    GatewayResult::failure(
        format!(
            "{}: {}",
            consts::TRANSPORT_ERROR_MESSAGE_PREFIX,
            error.current_context()
        ),
        Some(consts::TRANSPORT_ERROR_CODE.to_string()),
        test_mode,
    )
}

pub fn parse_body(format: ResponseFormat, body: &[u8]) -> CustomResult<Value, ParsingError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    match format {
        ResponseFormat::Json => serde_json::from_slice::<Value>(body)
            .change_context(ParsingError::StructParseFailure("json response")),
        ResponseFormat::FormUrlEncoded => serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .change_context(ParsingError::StructParseFailure("form response"))
            .map(|pairs| {
                Value::Object(
                    pairs
                        .into_iter()
                        .map(|(key, value)| (key, Value::String(value)))
                        .collect(),
                )
            }),
        ResponseFormat::Xml => utils::xml_to_value(&body_as_str(body)?),
        ResponseFormat::NumberedXml(table) => {
            let mut document = utils::xml_to_value(&body_as_str(body)?)?;
            let fields = utils::collect_numbered_fields(&document, table);
            if let Value::Object(root) = &mut document {
                root.extend(fields);
            }
            Ok(document)
        }
    }
}

fn body_as_str(body: &[u8]) -> CustomResult<String, ParsingError> {
    String::from_utf8(body.to_vec()).change_context(ParsingError::StructParseFailure("utf-8 body"))
}

pub fn evaluate(predicate: &SuccessPredicate, document: &Value, status_code: u16) -> bool {
    match predicate {
        SuccessPredicate::FieldIn { path, values } => path
            .dig_string(document)
            .is_some_and(|value| values.iter().any(|candidate| *candidate == value)),
        SuccessPredicate::FieldPresent(path) => path.dig(document).is_some(),
        SuccessPredicate::FieldAbsent(path) => path.dig(document).is_none(),
        SuccessPredicate::HttpSuccess => (200..300).contains(&status_code),
        SuccessPredicate::All(predicates) => predicates
            .iter()
            .all(|predicate| evaluate(predicate, document, status_code)),
        SuccessPredicate::Any(predicates) => predicates
            .iter()
            .any(|predicate| evaluate(predicate, document, status_code)),
        SuccessPredicate::Custom(predicate) => predicate(document, status_code),
    }
}

fn status_fallback(status_code: u16) -> String {
    if (200..300).contains(&status_code) {
        consts::NO_ERROR_CODE.to_string()
    } else {
        format!("response_code: {status_code}")
    }
}

pub fn extract_error_code(rule: &ErrorCodeRule, document: &Value, status_code: u16) -> String {
    match rule {
        ErrorCodeRule::StatusOnly => status_fallback(status_code),
        ErrorCodeRule::Fields(paths) => {
            dig_first_string(document, paths).unwrap_or_else(|| status_fallback(status_code))
        }
        ErrorCodeRule::Composite { gateway, response } => {
            match (gateway.dig_string(document), response.dig_string(document)) {
                (Some(gateway), Some(response)) => {
                    format!("gateway_error_code: {gateway} | response_code: {response}")
                }
                (Some(gateway), None) => gateway,
                (None, Some(response)) => format!("response_code: {response}"),
                (None, None) => status_fallback(status_code),
            }
        }
    }
}

fn authorization_field(
    field: &AuthorizationField,
    document: &Value,
    request: &PaymentsRequestData,
) -> String {
    let card = request.payment_method.as_ref();
    match field {
        AuthorizationField::Response(path) => path.dig_string(document),
        AuthorizationField::Amount => Some(request.amount.to_string()),
        AuthorizationField::Currency => Some(request.currency.to_string()),
        AuthorizationField::OrderId => request.options.order_id.clone(),
        AuthorizationField::CardBrand => card
            .and_then(|card| card.get_card_network())
            .map(|network| network.to_string()),
        AuthorizationField::CardLast4 => card.map(|card| card.get_last4()),
    }
    .unwrap_or_default()
}

fn invalid_response(
    status_code: u16,
    detail: &str,
    body: &[u8],
    context: &NormalizerContext<'_>,
) -> GatewayResult {
    let error_code =
        (!(200..300).contains(&status_code)).then(|| format!("response_code: {status_code}"));
    let raw = context.scrubber.scrub(&String::from_utf8_lossy(body));
    GatewayResult::failure(
        format!("{}: {detail}", consts::INVALID_RESPONSE_MESSAGE_PREFIX),
        error_code,
        context.test_mode,
    )
    .with_param(STATUS_CODE_PARAM, status_code)
    .with_param(RAW_BODY_PARAM, raw)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use common_enums::Currency;
    use common_utils::{FieldPath, MinorUnit};
    use serde_json::json;

    use super::*;

    fn request() -> PaymentsRequestData {
        PaymentsRequestData::new(MinorUnit::new(100), Currency::USD)
    }

    fn run(status_code: u16, body: &str, rules: &ResponseRules) -> GatewayResult {
        let request = request();
        let scrubber = TranscriptScrubber::with_defaults();
        normalize(
            status_code,
            body.as_bytes(),
            rules,
            &NormalizerContext {
                request: &request,
                scrubber: &scrubber,
                test_mode: true,
            },
        )
    }

    fn captured_rules() -> ResponseRules {
        ResponseRules::json(SuccessPredicate::field_in("status", &["CAPTURED"]))
            .message(&["errors.message"])
            .error_code(ErrorCodeRule::fields(&["errors.code"]))
            .authorization(vec![
                AuthorizationField::response("id"),
                AuthorizationField::Amount,
                AuthorizationField::Currency,
            ])
    }

    #[test]
    fn test_flat_json_success() {
        let result = run(201, r#"{"id":"EMU123","status":"CAPTURED"}"#, &captured_rules());
        assert!(result.success);
        assert_eq!(result.message, "Transaction approved");
        assert_eq!(result.error_code, None);
        assert_eq!(result.authorization.as_deref(), Some("EMU123|100|USD"));
        assert_eq!(result.status_code(), Some(201));
        assert_eq!(result.param("id"), Some(&json!("EMU123")));
        assert!(result.test_mode);
    }

    #[test]
    fn test_unencodable_authorization_has_its_own_code() {
        let result = run(201, r#"{"id":"EMU|123","status":"CAPTURED"}"#, &captured_rules());
        assert!(!result.success);
        assert!(result
            .message
            .starts_with(consts::INVALID_RESPONSE_MESSAGE_PREFIX));
        assert_eq!(
            result.error_code.as_deref(),
            Some(consts::AUTHORIZATION_ENCODING_ERROR_CODE)
        );
        assert_eq!(result.authorization, None);
        assert_eq!(result.status_code(), Some(201));
        assert_eq!(
            result.param(RAW_BODY_PARAM),
            Some(&json!(r#"{"id":"EMU|123","status":"CAPTURED"}"#))
        );
    }

    #[test]
    fn test_error_array_failure() {
        let result = run(
            400,
            r#"{"errors":[{"code":"PMT-4000","message":"card number is invalid."}]}"#,
            &captured_rules(),
        );
        assert!(!result.success);
        assert_eq!(result.message, "card number is invalid.");
        assert_eq!(result.error_code.as_deref(), Some("PMT-4000"));
        assert_eq!(result.authorization, None);
    }

    #[test]
    fn test_top_level_error_array() {
        let rules = ResponseRules::json(SuccessPredicate::present("Payment.PaymentId"))
            .message(&["Message"])
            .error_code(ErrorCodeRule::fields(&["Code"]));
        let result = run(
            400,
            r#"[{"Code":126,"Message":"Credit Card Expiration Date is invalid"}]"#,
            &rules,
        );
        assert!(!result.success);
        assert_eq!(result.error_code.as_deref(), Some("126"));
        assert_eq!(result.message, "Credit Card Expiration Date is invalid");
        assert!(result.param("body").is_some_and(Value::is_array));
    }

    #[test]
    fn test_truncated_json_is_an_invalid_response() {
        let result = run(200, r#"{"id":"EMU123","status":"CAPT"#, &captured_rules());
        assert!(!result.success);
        assert!(result.message.starts_with("invalid response"));
        assert_eq!(result.error_code, None);
        assert_eq!(
            result.param(RAW_BODY_PARAM),
            Some(&json!(r#"{"id":"EMU123","status":"CAPT"#))
        );
    }

    #[test]
    fn test_server_error_html_page() {
        let result = run(
            503,
            "<html><body><h1>503 Service Unavailable</h1></body>",
            &captured_rules(),
        );
        assert!(!result.success);
        assert!(result.message.starts_with(consts::INVALID_RESPONSE_MESSAGE_PREFIX));
        assert_eq!(result.error_code.as_deref(), Some("response_code: 503"));
        assert_eq!(result.status_code(), Some(503));
    }

    #[test]
    fn test_raw_body_is_scrubbed() {
        let result = run(
            500,
            r#"{"card":{"number":"4242424242424242","cvc":"123"}"#,
            &captured_rules(),
        );
        let raw = result.param(RAW_BODY_PARAM).and_then(Value::as_str).unwrap();
        assert!(!raw.contains("4242424242424242"));
        assert!(!raw.contains("\"123\""));
        assert!(raw.contains("[FILTERED]"));
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let result = run(
            200,
            "\u{feff}{\"id\":\"EMU123\",\"status\":\"CAPTURED\"}",
            &captured_rules(),
        );
        assert!(result.success);
    }

    #[test]
    fn test_composite_error_code() {
        let rules = ResponseRules::json(SuccessPredicate::field_in("state", &["settled"]))
            .error_code(ErrorCodeRule::Composite {
                gateway: FieldPath::parse("transactions.gateway_error_code"),
                response: FieldPath::parse("transactions.response_code"),
            });
        let both = run(
            422,
            r#"{"state":"error","transactions":[{"gateway_error_code":"DECLINED","response_code":"05"}]}"#,
            &rules,
        );
        assert_eq!(
            both.error_code.as_deref(),
            Some("gateway_error_code: DECLINED | response_code: 05")
        );
        let neither = run(422, r#"{"state":"error"}"#, &rules);
        assert_eq!(neither.error_code.as_deref(), Some("response_code: 422"));
        assert_eq!(neither.message, consts::NO_ERROR_MESSAGE);
    }

    #[test]
    fn test_soap_fault_detection() {
        let rules = ResponseRules::new(
            ResponseFormat::Xml,
            SuccessPredicate::absent("Envelope.Body.Fault"),
        )
        .message(&["Envelope.Body.Fault.faultstring"])
        .error_code(ErrorCodeRule::fields(&["Envelope.Body.Fault.faultcode"]));
        let result = run(
            500,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Server</faultcode><faultstring>Unauthorized</faultstring></soap:Fault></soap:Body></soap:Envelope>"#,
            &rules,
        );
        assert!(!result.success);
        assert_eq!(result.message, "Unauthorized");
        assert_eq!(result.error_code.as_deref(), Some("soap:Server"));
    }

    #[test]
    fn test_numbered_xml_fields() {
        const TABLE: &[(&str, &str)] = &[("F0001", "response_code"), ("F0002", "response_text")];
        let rules = ResponseRules::new(
            ResponseFormat::NumberedXml(TABLE),
            SuccessPredicate::field_in("response_code", &["000"]),
        )
        .message(&["response_text"]);
        let result = run(
            200,
            "<Envelope><Body><Reply><F0001>000</F0001><F0002>APPROVAL</F0002></Reply></Body></Envelope>",
            &rules,
        );
        assert!(result.success);
        assert_eq!(result.message, "APPROVAL");
    }

    #[test]
    fn test_form_encoded_body() {
        let rules = ResponseRules::new(
            ResponseFormat::FormUrlEncoded,
            SuccessPredicate::field_in("rcode", &["000"]),
        );
        let result = run(200, "rcode=000&msg=Approved", &rules);
        assert!(result.success);
        assert_eq!(result.param("msg"), Some(&json!("Approved")));
    }

    #[test]
    fn test_empty_body_with_http_success() {
        let rules = ResponseRules::json(SuccessPredicate::HttpSuccess);
        assert!(run(204, "", &rules).success);
        assert!(!run(404, "", &rules).success);
    }

    #[test]
    fn test_transport_failure() {
        let error = error_stack::report!(ApiClientError::RequestTimeoutReceived);
        let result = transport_failure(&error, false);
        assert!(!result.success);
        assert!(result.message.starts_with("transport error: "));
        assert_eq!(result.error_code.as_deref(), Some("transport_error"));
    }
}
