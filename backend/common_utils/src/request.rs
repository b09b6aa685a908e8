//! Canonical, provider-agnostic description of an outbound connector call.
//!
//! Connectors build a [`Request`]; signers return an amended copy and the
//! transport sends it.

use std::collections::BTreeMap;

use error_stack::ResultExt;
use hyperswitch_masking::{ExposeInterface, Maskable, PeekInterface, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{CustomResult, ParsingError},
    ext_traits::Encode,
};

pub type Headers = BTreeMap<String, Maskable<String>>;

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    /// Whether requests with this method carry a body (and therefore a body digest).
    pub fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

#[derive(Clone, PartialEq, Serialize)]
pub enum RequestContent {
    Json(serde_json::Value),
    FormUrlEncoded(String),
    Xml(String),
    RawBytes(Vec<u8>),
}

impl std::fmt::Debug for RequestContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Json(_) => "JsonRequestBody",
            Self::FormUrlEncoded(_) => "FormUrlEncodedRequestBody",
            Self::Xml(_) => "XmlRequestBody",
            Self::RawBytes(_) => "RawBytesRequestBody",
        })
    }
}

impl RequestContent {
    pub fn json<T: Serialize + std::fmt::Debug>(body: &T) -> CustomResult<Self, ParsingError> {
        body.encode_to_value().map(Self::Json)
    }

    pub fn form_url_encoded<T: Serialize>(body: &T) -> CustomResult<Self, ParsingError> {
        serde_urlencoded::to_string(body)
            .change_context(ParsingError::EncodeError("x-www-form-urlencoded"))
            .map(Self::FormUrlEncoded)
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => "application/json",
            Self::FormUrlEncoded(_) => "application/x-www-form-urlencoded",
            Self::Xml(_) => "text/xml; charset=utf-8",
            Self::RawBytes(_) => "application/octet-stream",
        }
    }

    pub fn get_inner_value(&self) -> Secret<String> {
        match self {
            Self::Json(i) => serde_json::to_string(i).unwrap_or_default().into(),
            Self::FormUrlEncoded(i) | Self::Xml(i) => i.clone().into(),
            Self::RawBytes(bytes) => String::from_utf8_lossy(bytes).into_owned().into(),
        }
    }

    pub fn get_body_bytes(&self) -> Vec<u8> {
        match self {
            Self::RawBytes(bytes) => bytes.clone(),
            Self::Json(_) | Self::FormUrlEncoded(_) | Self::Xml(_) => {
                self.get_inner_value().expose().into_bytes()
            }
        }
    }
}

/// A component of the canonical string an HMAC signer covers.
///
/// Order matters: the signer emits the names of the fields it actually signed,
/// in this order, next to the signature.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SignableField {
    Host,
    Date,
    RequestTarget,
    Digest,
    /// A header whose value comes from the credentials, e.g. `v-c-merchant-id`
    MerchantId(String),
    /// Any other header already present on the request
    Header(String),
}

impl SignableField {
    pub fn name(&self) -> String {
        match self {
            Self::Host => "host".to_string(),
            Self::Date => "date".to_string(),
            Self::RequestTarget => "(request-target)".to_string(),
            Self::Digest => "digest".to_string(),
            Self::MerchantId(header) | Self::Header(header) => header.to_lowercase(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub body: Option<RequestContent>,
    pub signable_fields: Vec<SignableField>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: String::from(url),
            headers: Headers::new(),
            body: None,
            signable_fields: Vec::new(),
        }
    }

    pub fn set_body<T: Into<RequestContent>>(&mut self, body: T) {
        self.body.replace(body.into());
    }

    pub fn add_header(&mut self, header: &str, value: Maskable<String>) {
        self.headers.insert(String::from(header), value);
    }

    /// Case-insensitive header lookup.
    pub fn get_header(&self, header: &str) -> Option<&Maskable<String>> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(header))
            .map(|(_, value)| value)
    }

    pub fn get_headers_map(&self) -> std::collections::HashMap<String, String> {
        self.headers
            .iter()
            .map(|(k, v)| {
                let val = match v {
                    Maskable::Masked(s) => s.peek().to_string(),
                    Maskable::Normal(s) => s.to_string(),
                };
                (k.clone(), val)
            })
            .collect()
    }

    /// Headers with masked values replaced, safe to log.
    pub fn get_masked_headers(&self) -> serde_json::Value {
        let masked_headers = self
            .headers
            .iter()
            .fold(serde_json::Map::new(), |mut acc, (k, v)| {
                let value = match v {
                    Maskable::Masked(_) => {
                        serde_json::Value::String("*** alloc::string::String ***".to_string())
                    }
                    Maskable::Normal(iv) => serde_json::Value::String(iv.to_owned()),
                };
                acc.insert(k.clone(), value);
                acc
            });
        serde_json::Value::Object(masked_headers)
    }

    pub fn get_body_bytes(&self) -> Vec<u8> {
        self.body
            .as_ref()
            .map(RequestContent::get_body_bytes)
            .unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
    pub signable_fields: Vec<SignableField>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: String::with_capacity(1024),
            headers: Headers::new(),
            body: None,
            signable_fields: Vec::new(),
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, header: &str, value: &str) -> Self {
        self.headers.insert(header.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: Vec<(String, Maskable<String>)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn set_body<T: Into<RequestContent>>(mut self, body: T) -> Self {
        self.body.replace(body.into());
        self
    }

    pub fn signable_fields(mut self, fields: Vec<SignableField>) -> Self {
        self.signable_fields = fields;
        self
    }

    pub fn build(self) -> Request {
        let mut headers = self.headers;
        if let Some(body) = self.body.as_ref() {
            if !headers
                .keys()
                .any(|name| name.eq_ignore_ascii_case("Content-Type"))
            {
                headers.insert("Content-Type".to_string(), body.content_type().into());
            }
        }
        Request {
            method: self.method,
            url: self.url,
            headers,
            body: self.body,
            signable_fields: self.signable_fields,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
