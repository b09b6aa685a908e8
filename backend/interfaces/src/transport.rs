use common_utils::{CustomResult, Request};
use domain_types::{errors::ApiClientError, router_response_types::Response};

/// Issues one HTTP exchange.
///
/// `Ok(Ok(_))` is a 2xx response, `Ok(Err(_))` any other response the server
/// sent, and `Err(_)` a failure to get a response at all.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: Request,
    ) -> CustomResult<Result<Response, Response>, ApiClientError>;
}
