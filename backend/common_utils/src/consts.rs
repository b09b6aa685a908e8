/// Error code used when the connector does not send one
pub const NO_ERROR_CODE: &str = "No error code";
/// Error message used when the connector does not send one
pub const NO_ERROR_MESSAGE: &str = "No error message";

/// Every result built from an unparseable response body starts with this prefix
pub const INVALID_RESPONSE_MESSAGE_PREFIX: &str = "invalid response";
/// Every result built from a transport failure starts with this prefix
pub const TRANSPORT_ERROR_MESSAGE_PREFIX: &str = "transport error";
/// Error code of results built from a transport failure
pub const TRANSPORT_ERROR_CODE: &str = "transport_error";
/// Error code of an otherwise successful response whose identifiers cannot be
/// packed into an authorization token
pub const AUTHORIZATION_ENCODING_ERROR_CODE: &str = "authorization_encoding_error";

/// Marker written over redacted transcript values
pub const FILTERED_MARKER: &str = "[FILTERED]";

/// Separator of composite authorization tokens; provider identifiers never contain it
pub const AUTHORIZATION_DELIMITER: char = '|';

/// Access tokens this close to expiry are refreshed before signing
pub const ACCESS_TOKEN_EXPIRY_SKEW_SECONDS: i64 = 60;

pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// UTF-8 byte order mark some gateways prepend to response bodies
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
