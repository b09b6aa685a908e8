use common_utils::ScrubRule;
use domain_types::{router_data::AuthStrategy, types::Connectors};

/// The trait that provides the common
pub trait ConnectorCommon {
    /// Name of the connector (in lowercase).
    fn id(&self) -> &'static str;

    /// The base URL for interacting with the connector's API.
    fn base_url<'a>(&self, connectors: &'a Connectors) -> &'a str;

    /// How every request of this connector is authenticated.
    fn auth_strategy(&self) -> AuthStrategy;

    /// HTTP `Content-Type` of request bodies. Defaults to `application/json`.
    fn common_get_content_type(&self) -> &'static str {
        "application/json"
    }

    /// Redaction rules for this connector's field names, applied after the
    /// shared card and credential rules.
    fn scrub_rules(&self) -> Vec<ScrubRule> {
        Vec::new()
    }
}
