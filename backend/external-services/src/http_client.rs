use std::{str::FromStr, time::Duration};

use common_utils::{
    errors::CustomResult,
    request::{Headers, Method},
    Request,
};
use domain_types::{errors::ApiClientError, router_response_types::Response, types::Proxy};
use error_stack::{report, ResultExt};
use interfaces::transport::Transport;
use reqwest::Client;

/// The production [`Transport`]. Clients are built from the transport's own
/// proxy settings when it is constructed and live as long as it does.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    proxy: Proxy,
    direct_client: Client,
    proxied_client: Option<Client>,
}

impl ReqwestTransport {
    pub fn new(proxy: Proxy) -> CustomResult<Self, ApiClientError> {
        let direct_client = build_client(&proxy, true)?;
        let proxied_client = if proxy.is_configured() {
            Some(build_client(&proxy, false)?)
        } else {
            None
        };
        Ok(Self {
            proxy,
            direct_client,
            proxied_client,
        })
    }

    /// The client a request to `url` goes through: direct for bypassed URLs
    /// or when no proxy is configured.
    pub fn client_for(&self, url: &reqwest::Url) -> &Client {
        let should_bypass_proxy = self.proxy.bypass_proxy_urls.contains(&url.to_string());
        match &self.proxied_client {
            Some(client) if !should_bypass_proxy => client,
            _ => &self.direct_client,
        }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: Request,
    ) -> CustomResult<Result<Response, Response>, ApiClientError> {
        let url =
            reqwest::Url::parse(&request.url).change_context(ApiClientError::UrlEncodingFailed)?;
        let client = self.client_for(&url).clone();
        call_connector_api(&client, url, request).await
    }
}

pub async fn call_connector_api(
    client: &Client,
    url: reqwest::Url,
    request: Request,
) -> CustomResult<Result<Response, Response>, ApiClientError> {
    let body = request.get_body_bytes();
    let headers = request.headers.construct_header_map()?;

    let request = match request.method {
        Method::Get => client.get(url),
        Method::Post => client.post(url).body(body),
        Method::Put => client.put(url).body(body),
        Method::Patch => client.patch(url).body(body),
        Method::Delete => client.delete(url),
    }
    .headers(headers);

    let response = request.send().await.map_err(|error| {
        let api_error = match error {
            error if error.is_timeout() => ApiClientError::RequestTimeoutReceived,
            error => ApiClientError::RequestNotSent(error.to_string()),
        };
        tracing::info!(?api_error, "unable to send request to connector");
        report!(api_error)
    })?;

    handle_response(response).await
}

fn build_client(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
) -> CustomResult<Client, ApiClientError> {
    get_client_builder(proxy_config, should_bypass_proxy)?
        .build()
        .change_context(ApiClientError::ClientConstructionFailed)
        .inspect_err(|error| {
            tracing::error!(?error, "failed to construct base client");
        })
}

fn get_client_builder(
    proxy_config: &Proxy,
    should_bypass_proxy: bool,
) -> CustomResult<reqwest::ClientBuilder, ApiClientError> {
    let mut client_builder = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_idle_timeout(Duration::from_secs(
            proxy_config
                .idle_pool_connection_timeout
                .unwrap_or_default(),
        ));

    if should_bypass_proxy {
        return Ok(client_builder);
    }

    // Proxy all HTTPS traffic through the configured HTTPS proxy
    if let Some(url) = proxy_config.https_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::https(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .attach_printable("HTTPS proxy configuration error")?,
        );
    }

    // Proxy all HTTP traffic through the configured HTTP proxy
    if let Some(url) = proxy_config.http_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::http(url)
                .change_context(ApiClientError::InvalidProxyConfiguration)
                .attach_printable("HTTP proxy configuration error")?,
        );
    }

    Ok(client_builder)
}

async fn handle_response(
    response: reqwest::Response,
) -> CustomResult<Result<Response, Response>, ApiClientError> {
    let status_code = response.status().as_u16();
    let headers = response.headers().to_owned();
    let body = response
        .bytes()
        .await
        .change_context(ApiClientError::ResponseDecodingFailed)?;
    let response = Response::new(status_code, body).with_headers(headers);
    match status_code {
        200..=299 => Ok(Ok(response)),
        300..=599 => Ok(Err(response)),
        _ => {
            tracing::info!(status_code, "unexpected response from server");
            Err(report!(ApiClientError::UnexpectedServerResponse))
        }
    }
}

pub(super) trait HeaderExt {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError>;
}

impl HeaderExt for Headers {
    fn construct_header_map(self) -> CustomResult<reqwest::header::HeaderMap, ApiClientError> {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        self.into_iter().try_fold(
            HeaderMap::new(),
            |mut header_map, (header_name, header_value)| {
                let header_name = HeaderName::from_str(&header_name)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                let header_value = header_value.into_inner();
                let header_value = HeaderValue::from_str(&header_value)
                    .change_context(ApiClientError::HeaderMapConstructionFailed)?;
                header_map.append(header_name, header_value);
                Ok(header_map)
            },
        )
    }
}
