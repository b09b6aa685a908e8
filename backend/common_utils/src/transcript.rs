//! Redaction of card data and credentials from request/response transcripts.
//!
//! Rules are keyed by field name or header context, never by value shape
//! alone, so a numeric order id survives while a `"number"` field does not.
//! Every rule rewrites only the sensitive span to [`FILTERED_MARKER`] and
//! leaves all surrounding bytes untouched. Applying the same rules twice gives
//! the same output as applying them once.

use error_stack::ResultExt;
use regex::Regex;

use crate::{
    consts::FILTERED_MARKER,
    errors::{CustomResult, ValidationError},
};

#[derive(Clone, Debug)]
pub struct ScrubRule {
    pattern: Regex,
    replacement: String,
}

impl ScrubRule {
    /// A raw rule. `replacement` may reference capture groups (`${1}`).
    pub fn new(pattern: &str, replacement: &str) -> CustomResult<Self, ValidationError> {
        let pattern = Regex::new(pattern)
            .change_context(ValidationError::InvalidValue {
                message: format!("invalid scrub pattern: {pattern}"),
            })?;
        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    fn from_trusted(pattern: String, replacement: String) -> Self {
        #[allow(clippy::expect_used)]
        let pattern = Regex::new(&pattern).expect("scrub patterns built from escaped names compile");
        Self {
            pattern,
            replacement,
        }
    }

    /// A JSON member, as a string or a bare number. Also matches JSON that is
    /// itself embedded (backslash-escaped) inside another JSON string; the
    /// marker is quoted the same way the key is.
    pub fn json_field(name: &str) -> Self {
        let name = regex::escape(name);
        Self::from_trusted(
            format!(r#"((?P<kq>\\?"){name}\\?"\s*:\s*)(?:\\?"[^"\\]*\\?"|-?\d+(?:\.\d+)?)"#),
            format!("${{1}}${{kq}}{FILTERED_MARKER}${{kq}}"),
        )
    }

    /// A `name=value` pair of a form-urlencoded body or query string.
    pub fn form_field(name: &str) -> Self {
        let name = regex::escape(name);
        Self::from_trusted(
            format!(r"((?:^|[?&\s]){name}=)[^&\s]*"),
            format!("${{1}}{FILTERED_MARKER}"),
        )
    }

    /// The text content of an XML element, with or without a namespace
    /// prefix. A CDATA section is replaced as a whole.
    pub fn xml_element(name: &str) -> Self {
        let name = regex::escape(name);
        Self::from_trusted(
            format!(
                r"(?s)(<(?:[\w-]+:)?{name}(?:\s[^>]*)?>)(?:<!\[CDATA\[.*?\]\]>|[^<]*)(</(?:[\w-]+:)?{name}>)"
            ),
            format!("${{1}}{FILTERED_MARKER}${{2}}"),
        )
    }

    /// The value of an HTTP header line in a wire-format transcript.
    pub fn header(name: &str) -> Self {
        let name = regex::escape(name);
        Self::from_trusted(
            format!(r"(?im)(^[ \t]*{name}:[ \t]*)[^\r\n]+"),
            format!("${{1}}{FILTERED_MARKER}"),
        )
    }

    /// The credential after a `Basic` or `Bearer` scheme, in an
    /// `Authorization` header line or an `"Authorization"` JSON member.
    pub fn authorization_credentials() -> Self {
        Self::from_trusted(
            r#"(?im)((?:^[ \t]*authorization:[ \t]*|"authorization\\?"\s*:\s*\\?")(?:basic|bearer)[ \t]+)[A-Za-z0-9\-._~+/]+=*"#
                .to_string(),
            format!("${{1}}{FILTERED_MARKER}"),
        )
    }

    /// The `signature="..."` parameter of an HTTP signature header.
    pub fn signature_parameter() -> Self {
        Self::from_trusted(
            r#"(\bsignature=\\?")[^"\\]*(\\?")"#.to_string(),
            format!("${{1}}{FILTERED_MARKER}${{2}}"),
        )
    }

    /// A literal secret value, such as a configured API key.
    pub fn literal(value: &str) -> Self {
        Self::from_trusted(regex::escape(value), FILTERED_MARKER.to_string())
    }

    pub fn apply(&self, transcript: &str) -> String {
        self.pattern
            .replace_all(transcript, self.replacement.as_str())
            .into_owned()
    }
}

/// Ordered scrub rules applied through one routine.
#[derive(Clone, Debug, Default)]
pub struct TranscriptScrubber {
    rules: Vec<ScrubRule>,
}

impl TranscriptScrubber {
    pub fn new(rules: Vec<ScrubRule>) -> Self {
        Self { rules }
    }

    /// Card number, security code and credential rules shared by every connector.
    pub fn with_defaults() -> Self {
        let mut rules = [
            "number",
            "card_number",
            "cardNumber",
            "CardNumber",
            "cvv",
            "cvc",
            "securityCode",
            "SecurityCode",
            "access_token",
            "refresh_token",
            "client_secret",
        ]
        .iter()
        .map(|name| ScrubRule::json_field(name))
        .collect::<Vec<_>>();
        rules.extend(
            ["refresh_token", "client_secret", "access_token"]
                .iter()
                .map(|name| ScrubRule::form_field(name)),
        );
        rules.push(ScrubRule::authorization_credentials());
        rules.push(ScrubRule::signature_parameter());
        Self { rules }
    }

    pub fn with_rule(mut self, rule: ScrubRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = ScrubRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn rules(&self) -> &[ScrubRule] {
        &self.rules
    }

    pub fn scrub(&self, transcript: &str) -> String {
        self.rules
            .iter()
            .fold(transcript.to_string(), |scrubbed, rule| rule.apply(&scrubbed))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn scrubber() -> TranscriptScrubber {
        TranscriptScrubber::with_defaults()
            .with_rule(ScrubRule::xml_element("CardNumber"))
            .with_rule(ScrubRule::xml_element("F0003"))
            .with_rule(ScrubRule::form_field("card[number]"))
            .with_rule(ScrubRule::header("MerchantKey"))
    }

    #[test]
    fn test_json_card_fields_are_filtered_in_place() {
        let transcript = r#"{"orderId":"4111111111111111","card":{"number":"4242424242424242","cvc":"123","expiryMonth":"12"}}"#;
        assert_eq!(
            scrubber().scrub(transcript),
            r#"{"orderId":"4111111111111111","card":{"number":"[FILTERED]","cvc":"[FILTERED]","expiryMonth":"12"}}"#
        );
    }

    #[test]
    fn test_numeric_json_values_are_filtered() {
        let transcript = r#"{"cvv": 123, "amount": 100}"#;
        assert_eq!(
            scrubber().scrub(transcript),
            r#"{"cvv": "[FILTERED]", "amount": 100}"#
        );
    }

    #[test]
    fn test_escaped_json_is_filtered_with_escaped_marker() {
        let transcript = r#"body: "{\"number\":\"4242424242424242\",\"order\":\"77\"}""#;
        assert_eq!(
            scrubber().scrub(transcript),
            r#"body: "{\"number\":\"[FILTERED]\",\"order\":\"77\"}""#
        );
    }

    #[test]
    fn test_headers_and_credentials() {
        let transcript = "POST /v1/payments HTTP/1.1\r\nAuthorization: Basic dXNlcjpwYXNz\r\nMerchantKey: 0123456789\r\nSignature: keyid=\"k\", signature=\"c2lnbmF0dXJl\"\r\n";
        assert_eq!(
            scrubber().scrub(transcript),
            "POST /v1/payments HTTP/1.1\r\nAuthorization: Basic [FILTERED]\r\nMerchantKey: [FILTERED]\r\nSignature: keyid=\"k\", signature=\"[FILTERED]\"\r\n"
        );
    }

    #[test]
    fn test_form_and_xml_fields() {
        let form = "amount=1000&card[number]=4111111111111111&refresh_token=rt_1";
        assert_eq!(
            scrubber().scrub(form),
            "amount=1000&card[number]=[FILTERED]&refresh_token=[FILTERED]"
        );

        let xml = r#"<soap:Body><Request><ns1:CardNumber>4111111111111111</ns1:CardNumber><F0003 type="pan">4111111111111111</F0003><F0001>42</F0001></Request></soap:Body>"#;
        assert_eq!(
            scrubber().scrub(xml),
            r#"<soap:Body><Request><ns1:CardNumber>[FILTERED]</ns1:CardNumber><F0003 type="pan">[FILTERED]</F0003><F0001>42</F0001></Request></soap:Body>"#
        );

        let cdata = "<Request><F0003><![CDATA[4111111111111111]]></F0003><F0007><![CDATA[INV-1]]></F0007></Request>";
        assert_eq!(
            scrubber().scrub(cdata),
            "<Request><F0003>[FILTERED]</F0003><F0007><![CDATA[INV-1]]></F0007></Request>"
        );
    }

    #[test]
    fn test_scheme_words_outside_credentials_survive() {
        let body = r#"{"message":"Basic validation failed for order","note":"bearer bonds not accepted","status":"DECLINED"}"#;
        assert_eq!(scrubber().scrub(body), body);

        let json_header = r#"{"headers":{"Authorization":"Bearer eyJhbGciOi.J9","Accept":"application/json"}}"#;
        assert_eq!(
            scrubber().scrub(json_header),
            r#"{"headers":{"Authorization":"Bearer [FILTERED]","Accept":"application/json"}}"#
        );
    }

    #[test]
    fn test_scrub_is_idempotent() {
        let transcripts = [
            r#"{"number":"4242424242424242","cvv":123,"access_token":"eyJ.abc"}"#,
            "Authorization: Bearer eyJhbGciOi.J9\r\nsignature=\"abc\"",
            "amount=1&client_secret=s3cr3t",
            r#"{\"cvc\":\"999\"}"#,
            "<F0003><![CDATA[\n4111111111111111\n]]></F0003>",
            r#"{"Authorization":"Basic dXNlcjpwYXNz"}"#,
        ];
        let scrubber = scrubber();
        for transcript in transcripts {
            let once = scrubber.scrub(transcript);
            assert_eq!(scrubber.scrub(&once), once);
        }
    }

    #[test]
    fn test_literal_rule() {
        let scrubber = TranscriptScrubber::default().with_rule(ScrubRule::literal("sk_live.1+2"));
        assert_eq!(scrubber.scrub("key=sk_live.1+2;"), "key=[FILTERED];");
    }

    #[test]
    fn test_invalid_custom_pattern_is_reported() {
        assert!(ScrubRule::new("(unclosed", "x").is_err());
        let rule = ScrubRule::new(r"(pin=)\d{4}", "${1}[FILTERED]").unwrap();
        assert_eq!(rule.apply("pin=1234"), "pin=[FILTERED]");
    }
}
