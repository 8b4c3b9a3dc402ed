//! Client for the remote preference datastore.
//!
//! Two operations against one endpoint, both keyed by
//! `(movie name, user email)`: a lookup of any stored record and an
//! upsert of the full record. No retries, no timeouts beyond reqwest's
//! defaults.

use thiserror::Error;
use tracing::debug;

use crate::{
    identity::Identity,
    models::{LookupResponse, PreferenceRecord, UpsertResponse},
};

/// Message shown when the server accepts an upsert without one.
const DEFAULT_SUBMIT_MESSAGE: &str = "Saved successfully";

/// Errors surfaced by the datastore client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The server was unreachable or the payload could not be read.
    #[error("server not reachable")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status code.
    #[error("server rejected the request: {0}")]
    Rejected(String),
}

/// Handle to the preference datastore endpoint.
#[derive(Clone)]
pub struct PreferenceStore {
    client: reqwest::Client,
    endpoint: String,
}

impl PreferenceStore {
    /// Build a store client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the stored preference for `(movie, identity)`, returning
    /// `None` when the datastore has no record for the key.
    pub async fn lookup(
        &self,
        movie: &str,
        identity: &Identity,
    ) -> Result<Option<PreferenceRecord>, StoreError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("Movie_name", movie), ("Emails", identity.email())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected(status.to_string()));
        }

        let body: LookupResponse = response.json().await?;
        debug!(movie = %movie, status = %body.status, "Lookup completed");
        if body.status != "exists" {
            return Ok(None);
        }
        Ok(body
            .data
            .map(|data| PreferenceRecord::from_lookup(movie, identity.email(), &data)))
    }

    /// Create or update the preference record, returning the server's
    /// status message.
    pub async fn submit(&self, record: &PreferenceRecord) -> Result<String, StoreError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&record.to_upsert())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected(status.to_string()));
        }

        let body: UpsertResponse = response.json().await?;
        debug!(movie = %record.movie_name, status = ?body.status, "Upsert completed");
        Ok(body
            .message
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUBMIT_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_response_with_exists_status_carries_data() {
        let body: LookupResponse = serde_json::from_value(json!({
            "status": "exists",
            "data": {
                "isPreferredTheatre": true,
                "preferredTheatres": "A|B",
            }
        }))
        .unwrap();
        assert_eq!(body.status, "exists");
        let data = body.data.unwrap();
        assert!(data.is_preferred_theatre);
        assert_eq!(data.preferred_theatres, "A|B");
    }

    #[test]
    fn lookup_response_without_record_has_no_data() {
        let body: LookupResponse =
            serde_json::from_value(json!({ "status": "not_found" })).unwrap();
        assert_eq!(body.status, "not_found");
        assert!(body.data.is_none());
    }

    #[test]
    fn upsert_response_message_is_optional() {
        let body: UpsertResponse =
            serde_json::from_value(json!({ "status": "ok" })).unwrap();
        assert!(body.message.is_none());

        let body: UpsertResponse =
            serde_json::from_value(json!({ "message": "Alert saved" })).unwrap();
        assert_eq!(body.message.as_deref(), Some("Alert saved"));
    }
}
