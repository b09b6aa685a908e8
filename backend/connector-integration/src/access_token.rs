use std::sync::{Arc, PoisonError, RwLock};

use common_utils::errors::CustomResult;
use domain_types::{
    errors::ConnectorError,
    router_data::{AccessToken, ConnectorAuthType},
    types::Connectors,
};
use error_stack::{report, ResultExt};
use interfaces::{connector_integration::ConnectorIntegration, transport::Transport};

/// The token record at one point in time. `generation` increases by one with
/// every replacement, so a holder can tell whether the token it used is
/// still current.
#[derive(Clone, Debug)]
pub struct TokenSnapshot {
    pub generation: u64,
    pub token: Arc<AccessToken>,
}

/// Shared bearer token of one OAuth2 credential set.
///
/// The record is only ever replaced whole, through [`TokenStore::compare_and_swap`];
/// readers never observe a token paired with another token's expiry.
#[derive(Debug)]
pub struct TokenStore {
    record: RwLock<TokenSnapshot>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl TokenStore {
    pub fn new(token: AccessToken) -> Self {
        Self {
            record: RwLock::new(TokenSnapshot {
                generation: 0,
                token: Arc::new(token),
            }),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The store seeded from an OAuth2 credential; `None` for other credential kinds.
    pub fn from_auth(auth: &ConnectorAuthType) -> Option<Self> {
        auth.initial_access_token().map(Self::new)
    }

    pub fn snapshot(&self) -> TokenSnapshot {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `token` if the record is still at `expected_generation`.
    /// Otherwise leaves the record alone and returns the newer one.
    pub fn compare_and_swap(
        &self,
        expected_generation: u64,
        token: AccessToken,
    ) -> Result<TokenSnapshot, TokenSnapshot> {
        let mut record = self.record.write().unwrap_or_else(PoisonError::into_inner);
        if record.generation != expected_generation {
            return Err(record.clone());
        }
        *record = TokenSnapshot {
            generation: expected_generation + 1,
            token: Arc::new(token),
        };
        Ok(record.clone())
    }
}

pub struct AccessTokenManager;

impl AccessTokenManager {
    pub fn should_refresh_token(snapshot: &TokenSnapshot) -> bool {
        !snapshot.token.is_usable()
    }

    /// A usable token, refreshing first when the stored one is missing or
    /// within the expiry skew.
    pub async fn ensure_access_token(
        connector: &dyn ConnectorIntegration,
        store: &TokenStore,
        auth: &ConnectorAuthType,
        connectors: &Connectors,
        transport: &dyn Transport,
    ) -> CustomResult<TokenSnapshot, ConnectorError> {
        let snapshot = store.snapshot();
        if Self::should_refresh_token(&snapshot) {
            tracing::info!(
                connector = connector.id(),
                generation = snapshot.generation,
                "access token missing or about to expire, refreshing before signing"
            );
            Self::refresh(connector, store, auth, connectors, transport, &snapshot).await
        } else {
            Ok(snapshot)
        }
    }

    /// Replaces the token `stale` with a fresh one from the token endpoint.
    ///
    /// Concurrent callers holding the same stale generation share one
    /// refresh: whoever gets the lock second finds a newer record and uses it.
    pub async fn refresh(
        connector: &dyn ConnectorIntegration,
        store: &TokenStore,
        auth: &ConnectorAuthType,
        connectors: &Connectors,
        transport: &dyn Transport,
        stale: &TokenSnapshot,
    ) -> CustomResult<TokenSnapshot, ConnectorError> {
        let _guard = store.refresh_lock.lock().await;

        let current = store.snapshot();
        if current.generation != stale.generation {
            tracing::debug!(
                connector = connector.id(),
                generation = current.generation,
                "access token already refreshed by another caller"
            );
            return Ok(current);
        }

        let request = connector.build_access_token_request(auth, &current.token, connectors)?;
        let response = transport
            .send(request)
            .await
            .change_context(ConnectorError::FailedToObtainAccessToken)
            .attach_printable("token endpoint unreachable")?
            .map_err(|response| {
                report!(ConnectorError::FailedToObtainAccessToken).attach_printable(format!(
                    "token endpoint responded with status {}",
                    response.status_code
                ))
            })?;
        let token = connector.handle_access_token_response(&response, &current.token)?;

        let installed = store
            .compare_and_swap(current.generation, token)
            .unwrap_or_else(|newer| newer);
        tracing::info!(
            connector = connector.id(),
            generation = installed.generation,
            "access token refreshed"
        );
        Ok(installed)
    }
}
