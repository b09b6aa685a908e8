use common_utils::{consts, date_time};
use hyperswitch_masking::{ExposeInterface, PeekInterface, Secret};

/// Credentials for one connector account.
///
/// Only the OAuth2 token fields ever change after construction, and those are
/// replaced as a whole through the token store rather than mutated here.
#[derive(Default, Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(tag = "auth_type")]
pub enum ConnectorAuthType {
    HeaderKey {
        api_key: Secret<String>,
    },
    BodyKey {
        api_key: Secret<String>,
        key1: Secret<String>,
    },
    BasicAuth {
        username: Secret<String>,
        password: Secret<String>,
    },
    SignatureKey {
        api_key: Secret<String>,
        api_secret: Secret<String>,
        #[serde(default)]
        merchant_id: Option<Secret<String>>,
    },
    OAuth2 {
        client_id: Secret<String>,
        client_secret: Secret<String>,
        #[serde(default)]
        access_token: Option<Secret<String>>,
        refresh_token: Secret<String>,
        /// Unix timestamp in seconds
        #[serde(default)]
        expires_at: Option<i64>,
    },
    #[default]
    NoKey,
}

impl ConnectorAuthType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HeaderKey { .. } => "HeaderKey",
            Self::BodyKey { .. } => "BodyKey",
            Self::BasicAuth { .. } => "BasicAuth",
            Self::SignatureKey { .. } => "SignatureKey",
            Self::OAuth2 { .. } => "OAuth2",
            Self::NoKey => "NoKey",
        }
    }

    pub fn is_oauth2(&self) -> bool {
        matches!(self, Self::OAuth2 { .. })
    }

    /// The token this credential was configured with, if any.
    pub fn initial_access_token(&self) -> Option<AccessToken> {
        match self {
            Self::OAuth2 {
                access_token,
                refresh_token,
                expires_at,
                ..
            } => Some(AccessToken {
                token: access_token.clone().unwrap_or_default(),
                refresh_token: Some(refresh_token.clone()),
                expires_at: *expires_at,
            }),
            _ => None,
        }
    }

    // show only first and last two characters of the key and mask others with *
    // mask the entire key if it's length is less than or equal to 4
    fn mask_key(&self, key: String) -> Secret<String> {
        let key_len = key.chars().count();
        let masked_key = if key_len <= 4 {
            "*".repeat(key_len)
        } else {
            key.chars()
                .enumerate()
                .map(|(index, character)| {
                    if index < 2 || index >= key_len - 2 {
                        character
                    } else {
                        '*'
                    }
                })
                .collect()
        };
        Secret::new(masked_key)
    }

    // Mask the keys in the auth_type
    pub fn get_masked_keys(&self) -> Self {
        match self {
            Self::NoKey => Self::NoKey,
            Self::HeaderKey { api_key } => Self::HeaderKey {
                api_key: self.mask_key(api_key.clone().expose()),
            },
            Self::BodyKey { api_key, key1 } => Self::BodyKey {
                api_key: self.mask_key(api_key.clone().expose()),
                key1: self.mask_key(key1.clone().expose()),
            },
            Self::BasicAuth { username, password } => Self::BasicAuth {
                username: self.mask_key(username.clone().expose()),
                password: self.mask_key(password.clone().expose()),
            },
            Self::SignatureKey {
                api_key,
                api_secret,
                merchant_id,
            } => Self::SignatureKey {
                api_key: self.mask_key(api_key.clone().expose()),
                api_secret: self.mask_key(api_secret.clone().expose()),
                merchant_id: merchant_id
                    .as_ref()
                    .map(|merchant_id| self.mask_key(merchant_id.clone().expose())),
            },
            Self::OAuth2 {
                client_id,
                client_secret,
                access_token,
                refresh_token,
                expires_at,
            } => Self::OAuth2 {
                client_id: self.mask_key(client_id.clone().expose()),
                client_secret: self.mask_key(client_secret.clone().expose()),
                access_token: access_token
                    .as_ref()
                    .map(|token| self.mask_key(token.clone().expose())),
                refresh_token: self.mask_key(refresh_token.clone().expose()),
                expires_at: *expires_at,
            },
        }
    }
}

/// A bearer token and the material needed to renew it.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct AccessToken {
    pub token: Secret<String>,
    pub refresh_token: Option<Secret<String>>,
    /// Unix timestamp in seconds; `None` means the provider gave no expiry
    pub expires_at: Option<i64>,
}

impl AccessToken {
    pub fn is_missing(&self) -> bool {
        self.token.peek().is_empty()
    }

    /// Whether the token is at or within [`consts::ACCESS_TOKEN_EXPIRY_SKEW_SECONDS`] of expiring.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now + consts::ACCESS_TOKEN_EXPIRY_SKEW_SECONDS >= expires_at)
    }

    pub fn is_usable(&self) -> bool {
        !self.is_missing() && !self.is_expired_at(date_time::now_unix_timestamp())
    }
}

/// How a connector authenticates its requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Fixed key headers. The first header carries `api_key`; the optional second
    /// header carries `key1` of a [`ConnectorAuthType::BodyKey`].
    StaticKey {
        header: &'static str,
        secondary_header: Option<&'static str>,
    },
    BasicAuth,
    HmacSignature,
    OAuth2Bearer,
}
