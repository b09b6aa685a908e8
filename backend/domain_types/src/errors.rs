#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectorError {
    #[error("Error while obtaining URL for the integration")]
    FailedToObtainIntegrationUrl,
    #[error("Failed to encode connector request")]
    RequestEncodingFailed,
    #[error("Failed to deserialize connector response")]
    ResponseDeserializationFailed,
    #[error("Failed to execute a processing step")]
    ProcessingStepFailed,
    #[error("Missing required field: {field_name}")]
    MissingRequiredField { field_name: &'static str },
    #[error("Failed to obtain authentication type")]
    FailedToObtainAuthType,
    #[error("Invalid connector configuration: {config}")]
    InvalidConnectorConfig { config: &'static str },
    #[error("{flow} flow not supported by {connector} connector")]
    FlowNotSupported { flow: String, connector: String },
    #[error("Invalid authorization: expected {expected} fields, found {found}")]
    InvalidAuthorization { expected: usize, found: usize },
    #[error("Invalid value in authorization field: {field_name}")]
    InvalidAuthorizationField { field_name: &'static str },
    #[error("Failed to obtain access token")]
    FailedToObtainAccessToken,
}

impl ConnectorError {
    /// Errors caused by how the caller set up the call. They are raised before
    /// any network traffic and never retried.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::FailedToObtainIntegrationUrl
                | Self::MissingRequiredField { .. }
                | Self::FailedToObtainAuthType
                | Self::InvalidConnectorConfig { .. }
                | Self::FlowNotSupported { .. }
                | Self::InvalidAuthorization { .. }
                | Self::InvalidAuthorizationField { .. }
        )
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiClientError {
    #[error("Header map construction failed")]
    HeaderMapConstructionFailed,
    #[error("Invalid proxy configuration")]
    InvalidProxyConfiguration,
    #[error("Client construction failed")]
    ClientConstructionFailed,
    #[error("URL encoding of request payload failed")]
    UrlEncodingFailed,
    #[error("Failed to send request to connector {0}")]
    RequestNotSent(String),
    #[error("Failed to decode response")]
    ResponseDecodingFailed,
    #[error("Server responded with Request Timeout")]
    RequestTimeoutReceived,
    #[error("Server responded with unexpected response")]
    UnexpectedServerResponse,
}
