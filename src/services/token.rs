// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token lifecycle: exchange a grant for a credential pair and persist it.

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::{CredentialPair, TokenGrant};
use crate::services::StravaClient;
use std::sync::Arc;

/// Owns the durable credential pair.
#[derive(Clone)]
pub struct TokenManager {
    client: StravaClient,
    store: Arc<dyn CredentialStore>,
}

impl TokenManager {
    pub fn new(client: StravaClient, store: Arc<dyn CredentialStore>) -> Self {
        Self { client, store }
    }

    /// Run a store operation on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CredentialStore) -> Result<T, AppError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Credential store task failed: {}", e))
            })?
    }

    /// Exchange a grant for a fresh pair and overwrite the stored one.
    ///
    /// Nothing is written unless the endpoint returned both tokens.
    pub async fn exchange(&self, grant: TokenGrant) -> Result<CredentialPair, AppError> {
        tracing::info!(grant_type = grant.grant_type(), "Exchanging OAuth grant");

        let pair = CredentialPair::from(self.client.exchange_token(&grant).await?);
        if !pair.is_present() {
            return Err(AppError::AuthExchange(
                "Token response missing access or refresh token".to_string(),
            ));
        }

        let stored = pair.clone();
        self.with_store(move |store| store.save(&stored)).await?;
        tracing::info!(grant_type = grant.grant_type(), "Credential pair stored");
        Ok(pair)
    }

    /// Authorization code grant (OAuth callback).
    pub async fn exchange_code(&self, code: &str) -> Result<CredentialPair, AppError> {
        self.exchange(TokenGrant::AuthorizationCode(code.to_string()))
            .await
    }

    /// Refresh grant using the stored refresh token.
    pub async fn refresh(&self) -> Result<CredentialPair, AppError> {
        let current = self.current().await?.ok_or(AppError::Unauthorized)?;
        self.exchange(TokenGrant::RefreshToken(current.refresh_token))
            .await
    }

    /// Currently stored pair, if any.
    pub async fn current(&self) -> Result<Option<CredentialPair>, AppError> {
        self.with_store(|store| store.load()).await
    }

    pub async fn is_authenticated(&self) -> Result<bool, AppError> {
        self.with_store(|store| store.is_authenticated()).await
    }

    /// Drop the stored pair.
    pub async fn forget(&self) -> Result<(), AppError> {
        self.with_store(|store| store.clear()).await?;
        tracing::info!("Credential pair cleared");
        Ok(())
    }
}
