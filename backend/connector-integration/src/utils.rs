pub mod xml_utils;

use common_utils::consts;
use domain_types::{errors, types::ConnectorParams};
use error_stack::Report;
pub use xml_utils::{collect_numbered_fields, xml_to_value};

type Error = Report<errors::ConnectorError>;

/// Drops a leading UTF-8 byte order mark.
pub fn strip_bom(body: &[u8]) -> &[u8] {
    body.strip_prefix(consts::UTF8_BOM).unwrap_or(body)
}

/// The configured secondary endpoint of a connector, e.g. its OAuth2 token URL.
pub fn get_secondary_base_url(
    params: &ConnectorParams,
    config: &'static str,
) -> Result<&str, Error> {
    params
        .secondary_base_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| errors::ConnectorError::InvalidConnectorConfig { config }.into())
}

/// Joins a base URL and a path with exactly one slash between them.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
