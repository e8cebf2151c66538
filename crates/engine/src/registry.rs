//! Token registry — the set of device tokens that receive notice pushes.
//!
//! Registrations arrive concurrently from the HTTP layer while the poller
//! reads snapshots. Every mutation, including the durable append, happens
//! under one async mutex so concurrent registrations cannot lose updates.

use std::collections::HashSet;

use tokio::sync::Mutex;

use notice_common::error::AppError;
use notice_common::types::Registration;

use crate::token_store::TokenStore;

#[derive(Debug, Default)]
struct Tokens {
    ordered: Vec<String>,
    index: HashSet<String>,
}

impl Tokens {
    fn insert(&mut self, token: &str) -> bool {
        if !self.index.insert(token.to_string()) {
            return false;
        }
        self.ordered.push(token.to_string());
        true
    }
}

/// In-memory token set, optionally backed by a `TokenStore`.
#[derive(Debug)]
pub struct TokenRegistry {
    tokens: Mutex<Tokens>,
    store: Option<TokenStore>,
}

impl TokenRegistry {
    /// Registry without durable storage.
    pub fn in_memory() -> Self {
        Self {
            tokens: Mutex::new(Tokens::default()),
            store: None,
        }
    }

    /// Registry seeded from `store`; new registrations are appended to it.
    pub async fn from_store(store: TokenStore) -> Result<Self, AppError> {
        let mut tokens = Tokens::default();
        for token in store.load().await? {
            tokens.insert(&token);
        }

        Ok(Self {
            tokens: Mutex::new(tokens),
            store: Some(store),
        })
    }

    /// Register `token`. Registering a known token is a success.
    ///
    /// If the durable append fails the token stays registered in memory and
    /// `AppError::Persistence` is returned.
    pub async fn register(&self, token: &str) -> Result<Registration, AppError> {
        validate(token)?;

        let mut tokens = self.tokens.lock().await;
        if !tokens.insert(token) {
            return Ok(Registration::AlreadyRegistered);
        }

        if let Some(store) = &self.store
            && let Err(e) = store.append(token).await
        {
            tracing::error!(error = %e, "Failed to persist device token");
            return Err(e);
        }

        tracing::info!(registered = tokens.ordered.len(), "Device token registered");
        Ok(Registration::Created)
    }

    /// Snapshot of all tokens in registration order.
    pub async fn list(&self) -> Vec<String> {
        self.tokens.lock().await.ordered.clone()
    }

    pub async fn len(&self) -> usize {
        self.tokens.lock().await.ordered.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn validate(token: &str) -> Result<(), AppError> {
    if token.trim().is_empty() {
        return Err(AppError::InvalidInput("Token is required".to_string()));
    }
    // Tokens are compared verbatim, so padding would make two identities.
    if token.trim() != token {
        return Err(AppError::InvalidInput(
            "Token must not start or end with whitespace".to_string(),
        ));
    }
    // The store is one token per line.
    if token.contains(['\n', '\r']) {
        return Err(AppError::InvalidInput(
            "Token must not contain line breaks".to_string(),
        ));
    }
    Ok(())
}
