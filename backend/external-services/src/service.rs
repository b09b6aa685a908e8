use std::{convert::identity, sync::Arc};

use common_enums::Currency;
use common_utils::{
    errors::CustomResult, Maskable, MinorUnit, PeekInterface, Request, ScrubRule,
    TranscriptScrubber,
};
use connector_integration::{
    access_token::{AccessTokenManager, TokenSnapshot, TokenStore},
    normalizer::{self, NormalizerContext},
    signer::signer_for,
    types::ConnectorData,
};
use domain_types::{
    connector_types::{
        ConnectorEnum, Flow, GatewayResult, PaymentOptions, PaymentsRequestData, VerifyPolicy,
    },
    errors::{ApiClientError, ConnectorError},
    payment_method_data::Card,
    router_data::{AuthStrategy, ConnectorAuthType},
    router_response_types::Response,
    types::Connectors,
};
use error_stack::Report;
use interfaces::{
    connector_integration::ConnectorIntegration, signer::SigningContext, transport::Transport,
};
use tracing::field::Empty;

/// Error code of a call that could not get a usable access token.
pub const ACCESS_TOKEN_ERROR_CODE: &str = "access_token_error";

/// One connector bound to one credential set, issuing the uniform operations.
///
/// Each operation builds its request once, signs it, sends it and normalizes
/// the response. Only configuration errors come back as `Err`; declines,
/// unreadable bodies and transport failures are failed [`GatewayResult`]s.
/// With OAuth2 credentials a rejected call triggers one token refresh and
/// one replay of the same request.
pub struct Gateway {
    connector: ConnectorData,
    auth: ConnectorAuthType,
    connectors: Connectors,
    transport: Arc<dyn Transport>,
    token_store: Option<Arc<TokenStore>>,
    scrubber: TranscriptScrubber,
    test_mode: bool,
}

impl Gateway {
    pub fn new(
        connector_name: ConnectorEnum,
        auth: ConnectorAuthType,
        connectors: Connectors,
        transport: Arc<dyn Transport>,
        test_mode: bool,
    ) -> Self {
        let connector = ConnectorData::get_connector_by_name(&connector_name);
        let strategy = connector.connector.auth_strategy();
        let token_store = match strategy {
            AuthStrategy::OAuth2Bearer => TokenStore::from_auth(&auth).map(Arc::new),
            AuthStrategy::StaticKey { .. }
            | AuthStrategy::BasicAuth
            | AuthStrategy::HmacSignature => None,
        };
        let scrubber = TranscriptScrubber::with_defaults()
            .with_rules(connector.connector.scrub_rules())
            .with_rules(credential_header_rules(&strategy));
        Self {
            connector,
            auth,
            connectors,
            transport,
            token_store,
            scrubber,
            test_mode,
        }
    }

    /// Shares a token store with other gateways using the same OAuth2
    /// credentials, so a refresh by one is seen by all.
    pub fn with_token_store(mut self, token_store: Arc<TokenStore>) -> Self {
        self.token_store = Some(token_store);
        self
    }

    pub fn token_store(&self) -> Option<&Arc<TokenStore>> {
        self.token_store.as_ref()
    }

    pub fn connector_name(&self) -> ConnectorEnum {
        self.connector.connector_name
    }

    pub async fn purchase(
        &self,
        amount: MinorUnit,
        currency: Currency,
        card: Card,
        options: PaymentOptions,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        let req = PaymentsRequestData::new(amount, currency)
            .with_card(card)
            .with_options(options);
        self.execute(Flow::Purchase, &req).await
    }

    pub async fn authorize(
        &self,
        amount: MinorUnit,
        currency: Currency,
        card: Card,
        options: PaymentOptions,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        let req = PaymentsRequestData::new(amount, currency)
            .with_card(card)
            .with_options(options);
        self.execute(Flow::Authorize, &req).await
    }

    pub async fn capture(
        &self,
        amount: MinorUnit,
        currency: Currency,
        authorization: &str,
        options: PaymentOptions,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        let req = PaymentsRequestData::new(amount, currency)
            .with_authorization(authorization)
            .with_options(options);
        self.execute(Flow::Capture, &req).await
    }

    pub async fn refund(
        &self,
        amount: MinorUnit,
        currency: Currency,
        authorization: &str,
        options: PaymentOptions,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        let req = PaymentsRequestData::new(amount, currency)
            .with_authorization(authorization)
            .with_options(options);
        self.execute(Flow::Refund, &req).await
    }

    pub async fn void(
        &self,
        authorization: &str,
        options: PaymentOptions,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        let req = PaymentsRequestData::new(MinorUnit::zero(), Currency::default())
            .with_authorization(authorization)
            .with_options(options);
        self.execute(Flow::Void, &req).await
    }

    pub async fn store(
        &self,
        card: Card,
        options: PaymentOptions,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        let req = PaymentsRequestData::new(MinorUnit::zero(), Currency::default())
            .with_card(card)
            .with_options(options);
        self.execute(Flow::Store, &req).await
    }

    pub async fn verify(
        &self,
        currency: Currency,
        card: Card,
        options: PaymentOptions,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        let req = PaymentsRequestData::new(MinorUnit::zero(), currency)
            .with_card(card)
            .with_options(options);
        self.execute(Flow::Verify, &req).await
    }

    #[tracing::instrument(
        name = "gateway_operation",
        skip_all,
        fields(connector = %self.connector.connector_name, flow = %flow)
    )]
    pub async fn execute(
        &self,
        flow: Flow,
        req: &PaymentsRequestData,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        match flow {
            Flow::Verify => self.verify_with_policy(req).await,
            Flow::Purchase
            | Flow::Authorize
            | Flow::Capture
            | Flow::Refund
            | Flow::Void
            | Flow::Store => self.call(flow, req).await,
        }
    }

    fn connector(&self) -> &'static dyn ConnectorIntegration {
        *self.connector.connector
    }

    async fn verify_with_policy(
        &self,
        req: &PaymentsRequestData,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        self.connector().ensure_flow_supported(Flow::Verify)?;
        match self.connector().verify_policy() {
            VerifyPolicy::ZeroAmountAuthorize => {
                let mut verify = req.clone();
                verify.amount = MinorUnit::zero();
                self.call(Flow::Verify, &verify).await
            }
            VerifyPolicy::AuthorizeThenVoid {
                amount,
                report_void_failure,
            } => {
                let mut authorize = req.clone();
                authorize.amount = amount;
                let authorized = self.call(Flow::Authorize, &authorize).await?;
                let authorization = match authorized.authorization.as_deref() {
                    Some(authorization) if authorized.success => authorization.to_string(),
                    _ => return Ok(authorized),
                };

                let void = PaymentsRequestData::new(amount, req.currency)
                    .with_authorization(authorization)
                    .with_options(req.options.clone());
                let voided = self.call(Flow::Void, &void).await?;
                if voided.success {
                    Ok(authorized)
                } else if report_void_failure {
                    Ok(voided)
                } else {
                    tracing::warn!(
                        message = %voided.message,
                        "void after verification authorize failed, reporting the authorization"
                    );
                    Ok(authorized)
                }
            }
        }
    }

    async fn call(
        &self,
        flow: Flow,
        req: &PaymentsRequestData,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        let connector = self.connector();
        connector.ensure_flow_supported(flow)?;
        let rules = connector.response_rules(flow)?;
        let request = connector.build_request(flow, req, &self.auth, &self.connectors)?;

        let token = match self.token_store.as_deref() {
            Some(store) => match AccessTokenManager::ensure_access_token(
                connector,
                store,
                &self.auth,
                &self.connectors,
                self.transport.as_ref(),
            )
            .await
            {
                Ok(snapshot) => Some(snapshot),
                Err(error) => return self.access_token_failure(error),
            },
            None => None,
        };

        let signed = self.sign(&request, token.as_ref())?;
        let first = match self.send(flow, signed, 1).await {
            Ok(response) => response.unwrap_or_else(identity),
            Err(error) => return Ok(normalizer::transport_failure(&error, self.test_mode)),
        };

        let response = match (self.token_store.as_deref(), token) {
            (Some(store), Some(stale))
                if connector.is_authentication_failure(first.status_code, &first.response) =>
            {
                tracing::info!(
                    status_code = first.status_code,
                    generation = stale.generation,
                    "authentication failed, refreshing the access token and replaying once"
                );
                match AccessTokenManager::refresh(
                    connector,
                    store,
                    &self.auth,
                    &self.connectors,
                    self.transport.as_ref(),
                    &stale,
                )
                .await
                {
                    Ok(fresh) => {
                        let signed = self.sign(&request, Some(&fresh))?;
                        match self.send(flow, signed, 2).await {
                            Ok(response) => response.unwrap_or_else(identity),
                            Err(error) => {
                                return Ok(normalizer::transport_failure(&error, self.test_mode))
                            }
                        }
                    }
                    Err(error) if error.current_context().is_configuration_error() => {
                        return Err(error)
                    }
                    Err(error) => {
                        tracing::warn!(?error, "access token refresh failed");
                        first
                    }
                }
            }
            _ => first,
        };

        let context = NormalizerContext {
            request: req,
            scrubber: &self.scrubber,
            test_mode: self.test_mode,
        };
        let result = normalizer::normalize(
            response.status_code,
            &response.response,
            &rules,
            &context,
        );
        tracing::info!(
            success = result.success,
            error_code = result.error_code.as_deref(),
            "connector response normalized"
        );
        Ok(result)
    }

    fn sign(
        &self,
        request: &Request,
        token: Option<&TokenSnapshot>,
    ) -> CustomResult<Request, ConnectorError> {
        let context = SigningContext::new(common_utils::date_time::now());
        let context = match token {
            Some(snapshot) => context.with_access_token(snapshot.token.as_ref().clone()),
            None => context,
        };
        signer_for(&self.connector().auth_strategy()).sign(request, &self.auth, &context)
    }

    fn access_token_failure(
        &self,
        error: Report<ConnectorError>,
    ) -> CustomResult<GatewayResult, ConnectorError> {
        if error.current_context().is_configuration_error() {
            return Err(error);
        }
        tracing::warn!(?error, "no usable access token");
        Ok(GatewayResult::failure(
            format!("authentication error: {}", error.current_context()),
            Some(ACCESS_TOKEN_ERROR_CODE.to_string()),
            self.test_mode,
        ))
    }

    #[tracing::instrument(
        name = "connector_call",
        skip_all,
        fields(
            connector = self.connector().id(),
            flow = %flow,
            attempt = attempt,
            request.method = %request.method,
            request.url = %request.url,
            request.headers = %request.get_masked_headers(),
            response.status_code = Empty,
            latency = Empty,
        )
    )]
    async fn send(
        &self,
        flow: Flow,
        request: Request,
        attempt: u8,
    ) -> CustomResult<Result<Response, Response>, ApiClientError> {
        let start = tokio::time::Instant::now();
        let outcome = self.transport.send(request.clone()).await;
        let latency = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::Span::current().record("latency", latency);

        match &outcome {
            Ok(response) => {
                let response = response.as_ref().unwrap_or_else(identity);
                tracing::Span::current().record("response.status_code", response.status_code);
                tracing::debug!(
                    transcript = %self.scrubber.scrub(&transcript(&request, Some(response))),
                    "connector exchange"
                );
                tracing::info!("outgoing request completed");
            }
            Err(error) => {
                tracing::debug!(
                    transcript = %self.scrubber.scrub(&transcript(&request, None)),
                    "connector exchange"
                );
                tracing::warn!(?error, "outgoing request failed");
            }
        }
        outcome
    }
}

/// Header rules for strategies that put raw credentials in named headers.
fn credential_header_rules(strategy: &AuthStrategy) -> Vec<ScrubRule> {
    match strategy {
        AuthStrategy::StaticKey {
            header,
            secondary_header,
        } => std::iter::once(*header)
            .chain(*secondary_header)
            .map(ScrubRule::header)
            .collect(),
        AuthStrategy::BasicAuth | AuthStrategy::HmacSignature | AuthStrategy::OAuth2Bearer => {
            Vec::new()
        }
    }
}

/// The wire form of one exchange, before scrubbing.
fn transcript(request: &Request, response: Option<&Response>) -> String {
    let mut transcript = format!("{} {}\n", request.method, request.url);
    for (name, value) in &request.headers {
        let value = match value {
            Maskable::Masked(secret) => secret.peek().as_str(),
            Maskable::Normal(value) => value.as_str(),
        };
        transcript.push_str(&format!("{name}: {value}\n"));
    }
    transcript.push('\n');
    transcript.push_str(&String::from_utf8_lossy(&request.get_body_bytes()));
    if let Some(response) = response {
        transcript.push_str(&format!("\n\n<- {}\n", response.status_code));
        transcript.push_str(&String::from_utf8_lossy(&response.response));
    }
    transcript
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use common_utils::{Method, RequestBuilder, Secret};

    use super::*;

    #[test]
    fn test_transcript_is_scrubbed_for_static_key_headers() {
        let mut request = RequestBuilder::new()
            .method(Method::Post)
            .url("https://apisandbox.braspag.com.br/v2/sales/")
            .build();
        request.add_header("MerchantKey", Maskable::new_masked(Secret::new("MK-123".to_string())));
        let response = Response::new(201, r#"{"Payment":{"Status":1}}"#);
        let scrubber = TranscriptScrubber::with_defaults().with_rules(credential_header_rules(
            &AuthStrategy::StaticKey {
                header: "MerchantId",
                secondary_header: Some("MerchantKey"),
            },
        ));

        let scrubbed = scrubber.scrub(&transcript(&request, Some(&response)));
        assert!(scrubbed.starts_with("POST https://apisandbox.braspag.com.br/v2/sales/\n"));
        assert!(scrubbed.contains("MerchantKey: [FILTERED]\n"));
        assert!(!scrubbed.contains("MK-123"));
        assert!(scrubbed.ends_with("<- 201\n{\"Payment\":{\"Status\":1}}"));
    }

    #[test]
    fn test_no_header_rules_for_signed_strategies() {
        assert!(credential_header_rules(&AuthStrategy::BasicAuth).is_empty());
        assert!(credential_header_rules(&AuthStrategy::OAuth2Bearer).is_empty());
    }
}
