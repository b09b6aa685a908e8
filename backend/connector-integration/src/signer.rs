//! Authentication strategies.
//!
//! Every signer clones the incoming [`Request`], adds its headers to the copy
//! and returns it; the caller's request is left as built.

use base64::Engine;
use common_utils::{
    consts::BASE64_ENGINE,
    crypto::{GenerateDigest, HmacSha256, Sha256, SignMessage},
    date_time, CustomResult, Mask, Method, PeekInterface, Request, SignableField,
};
use domain_types::{
    errors::ConnectorError,
    router_data::{AuthStrategy, ConnectorAuthType},
};
use error_stack::{report, ResultExt};
use hyperswitch_masking::{ExposeInterface, Maskable};
use interfaces::signer::{RequestSigner, SigningContext};

pub mod headers {
    pub const AUTHORIZATION: &str = "Authorization";
    pub const DATE: &str = "Date";
    pub const DIGEST: &str = "Digest";
    pub const HOST: &str = "Host";
    pub const SIGNATURE: &str = "Signature";
    pub const MERCHANT_ID: &str = "v-c-merchant-id";
}

pub fn signer_for(strategy: &AuthStrategy) -> Box<dyn RequestSigner> {
    match strategy {
        AuthStrategy::StaticKey {
            header,
            secondary_header,
        } => Box::new(StaticKeySigner {
            header: *header,
            secondary_header: *secondary_header,
        }),
        AuthStrategy::BasicAuth => Box::new(BasicAuthSigner),
        AuthStrategy::HmacSignature => Box::new(HmacSignatureSigner),
        AuthStrategy::OAuth2Bearer => Box::new(BearerTokenSigner),
    }
}

/// Fixed key headers, e.g. `Apikey: <key>`.
#[derive(Debug)]
pub struct StaticKeySigner {
    pub header: &'static str,
    pub secondary_header: Option<&'static str>,
}

impl RequestSigner for StaticKeySigner {
    fn sign(
        &self,
        request: &Request,
        auth: &ConnectorAuthType,
        _context: &SigningContext,
    ) -> CustomResult<Request, ConnectorError> {
        let mut signed = request.clone();
        match (auth, self.secondary_header) {
            (ConnectorAuthType::HeaderKey { api_key }, None) => {
                signed.add_header(self.header, api_key.clone().into_masked());
            }
            (ConnectorAuthType::BodyKey { api_key, key1 }, secondary) => {
                signed.add_header(self.header, api_key.clone().into_masked());
                if let Some(secondary) = secondary {
                    signed.add_header(secondary, key1.clone().into_masked());
                }
            }
            (ConnectorAuthType::HeaderKey { .. }, Some(_)) => {
                return Err(report!(ConnectorError::MissingRequiredField {
                    field_name: "key1"
                }))
            }
            _ => return Err(report!(ConnectorError::FailedToObtainAuthType)),
        }
        Ok(signed)
    }
}

/// `Authorization: Basic base64(user:pass)`.
#[derive(Debug)]
pub struct BasicAuthSigner;

impl RequestSigner for BasicAuthSigner {
    fn sign(
        &self,
        request: &Request,
        auth: &ConnectorAuthType,
        _context: &SigningContext,
    ) -> CustomResult<Request, ConnectorError> {
        let ConnectorAuthType::BasicAuth { username, password } = auth else {
            return Err(report!(ConnectorError::FailedToObtainAuthType));
        };
        if username.peek().is_empty() {
            return Err(report!(ConnectorError::MissingRequiredField {
                field_name: "username"
            }));
        }
        let encoded = BASE64_ENGINE.encode(format!("{}:{}", username.peek(), password.peek()));
        let mut signed = request.clone();
        signed.add_header(
            headers::AUTHORIZATION,
            format!("Basic {encoded}").into_masked(),
        );
        Ok(signed)
    }
}

/// `Authorization: Bearer <token>` from the token store's current token.
#[derive(Debug)]
pub struct BearerTokenSigner;

impl RequestSigner for BearerTokenSigner {
    fn sign(
        &self,
        request: &Request,
        auth: &ConnectorAuthType,
        context: &SigningContext,
    ) -> CustomResult<Request, ConnectorError> {
        if !auth.is_oauth2() {
            return Err(report!(ConnectorError::FailedToObtainAuthType));
        }
        let token = context
            .access_token
            .as_ref()
            .filter(|token| !token.is_missing())
            .ok_or(ConnectorError::FailedToObtainAccessToken)
            .attach_printable("no access token available for signing")?;
        let mut signed = request.clone();
        signed.add_header(
            headers::AUTHORIZATION,
            format!("Bearer {}", token.token.peek()).into_masked(),
        );
        Ok(signed)
    }
}

/// HTTP signature over an ordered list of request components, keyed by the
/// base64-decoded shared secret.
#[derive(Debug)]
pub struct HmacSignatureSigner;

impl HmacSignatureSigner {
    /// Fields signed when the request does not declare its own list.
    pub fn default_signable_fields(method: Method) -> Vec<SignableField> {
        let mut fields = vec![SignableField::Host, SignableField::Date, SignableField::RequestTarget];
        if method.carries_body() {
            fields.push(SignableField::Digest);
        }
        fields.push(SignableField::MerchantId(headers::MERCHANT_ID.to_string()));
        fields
    }

    pub fn generate_digest(payload: &[u8]) -> CustomResult<String, ConnectorError> {
        let payload_digest = Sha256
            .generate_digest(payload)
            .change_context(ConnectorError::RequestEncodingFailed)?;
        Ok(format!("SHA-256={}", BASE64_ENGINE.encode(payload_digest)))
    }

    /// The `(name, value)` pairs covered by the signature, in signing order.
    fn signed_components(
        request: &Request,
        merchant_id: &str,
        context: &SigningContext,
    ) -> CustomResult<Vec<(SignableField, String)>, ConnectorError> {
        let url = url::Url::parse(&request.url)
            .change_context(ConnectorError::FailedToObtainIntegrationUrl)
            .attach_printable_lazy(|| format!("unparseable url {}", request.url))?;
        let fields = if request.signable_fields.is_empty() {
            Self::default_signable_fields(request.method)
        } else {
            request.signable_fields.clone()
        };

        fields
            .into_iter()
            .filter(|field| *field != SignableField::Digest || request.method.carries_body())
            .map(|field| {
                let value = match &field {
                    SignableField::Host => match (url.host_str(), url.port()) {
                        (Some(host), Some(port)) => format!("{host}:{port}"),
                        (Some(host), None) => host.to_string(),
                        (None, _) => {
                            return Err(report!(ConnectorError::FailedToObtainIntegrationUrl))
                        }
                    },
                    SignableField::Date => date_time::format_http_date(context.now)
                        .change_context(ConnectorError::RequestEncodingFailed)?,
                    SignableField::RequestTarget => {
                        let target = match url.query() {
                            Some(query) => format!("{}?{query}", url.path()),
                            None => url.path().to_string(),
                        };
                        format!("{} {target}", request.method.to_string().to_lowercase())
                    }
                    SignableField::Digest => Self::generate_digest(&request.get_body_bytes())?,
                    SignableField::MerchantId(_) => merchant_id.to_string(),
                    SignableField::Header(name) => request
                        .get_header(name)
                        .map(|value| value.clone().into_inner())
                        .ok_or(ConnectorError::InvalidConnectorConfig {
                            config: "signable_fields",
                        })
                        .attach_printable_lazy(|| format!("signed header {name} is not set"))?,
                };
                Ok((field, value))
            })
            .collect()
    }
}

impl RequestSigner for HmacSignatureSigner {
    fn sign(
        &self,
        request: &Request,
        auth: &ConnectorAuthType,
        context: &SigningContext,
    ) -> CustomResult<Request, ConnectorError> {
        let ConnectorAuthType::SignatureKey {
            api_key,
            api_secret,
            merchant_id,
        } = auth
        else {
            return Err(report!(ConnectorError::FailedToObtainAuthType));
        };
        let merchant_id = merchant_id
            .as_ref()
            .filter(|merchant_id| !merchant_id.peek().is_empty())
            .ok_or(ConnectorError::MissingRequiredField {
                field_name: "merchant_id",
            })?;
        let key_value = BASE64_ENGINE
            .decode(api_secret.clone().expose())
            .change_context(ConnectorError::InvalidConnectorConfig {
                config: "connector_account_details.api_secret",
            })?;

        let components = Self::signed_components(request, merchant_id.peek(), context)?;
        let signed_header_names = components
            .iter()
            .map(|(field, _)| field.name())
            .collect::<Vec<_>>()
            .join(" ");
        let signature_string = components
            .iter()
            .map(|(field, value)| format!("{}: {value}", field.name()))
            .collect::<Vec<_>>()
            .join("\n");
        let signature_value = HmacSha256
            .sign_message(&key_value, signature_string.as_bytes())
            .change_context(ConnectorError::RequestEncodingFailed)?;
        let signature_header = format!(
            r#"keyid="{}", algorithm="HmacSHA256", headers="{signed_header_names}", signature="{}""#,
            api_key.peek(),
            BASE64_ENGINE.encode(signature_value)
        );

        let mut signed = request.clone();
        for (field, value) in components {
            match field {
                SignableField::Host => signed.add_header(headers::HOST, value.into()),
                SignableField::Date => signed.add_header(headers::DATE, value.into()),
                SignableField::Digest => signed.add_header(headers::DIGEST, value.into_masked()),
                SignableField::MerchantId(header) => {
                    signed.add_header(&header, value.into_masked())
                }
                SignableField::RequestTarget | SignableField::Header(_) => {}
            }
        }
        signed.add_header(headers::SIGNATURE, Maskable::new_masked(signature_header.into()));
        Ok(signed)
    }
}
