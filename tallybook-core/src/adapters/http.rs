//! HTTP datastore client
//!
//! Talks to the remote records API: one collection per record type,
//! POST to insert a record, GET to list a collection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::TransformedRow;
use crate::ports::{Datastore, RecordId};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the remote records API
#[derive(Debug, Clone)]
pub struct HttpDatastore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsertResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<TransformedRow>,
}

impl HttpDatastore {
    /// Create a client for the given base URL
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid datastore URL: {}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::config("Datastore URL must use http or https"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::datastore(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/collections/{}/records", self.base_url, collection)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        }
    }

    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::datastore(format!(
                "Request timed out after {} seconds",
                REQUEST_TIMEOUT_SECS
            ))
        } else if error.is_connect() {
            Error::datastore("Unable to connect to the datastore")
        } else {
            Error::datastore(format!("Request failed: {}", error))
        }
    }

    fn check_status(&self, status: reqwest::StatusCode) -> Result<()> {
        match status.as_u16() {
            200 | 201 => Ok(()),
            401 | 403 => Err(Error::datastore(
                "Datastore rejected the API key; check the datastore.apiKey setting",
            )),
            404 => Err(Error::datastore("Unknown collection")),
            422 => Err(Error::datastore("Datastore rejected the record")),
            status => Err(Error::datastore(format!(
                "Datastore returned HTTP {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl Datastore for HttpDatastore {
    fn name(&self) -> &str {
        "http"
    }

    async fn insert_one(&self, collection: &str, record: &TransformedRow) -> Result<RecordId> {
        let response = self
            .with_auth(self.client.post(self.collection_url(collection)))
            .json(record)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.check_status(response.status())?;

        let body: InsertResponse = response
            .json()
            .await
            .map_err(|e| Error::datastore(format!("Malformed insert response: {}", e)))?;

        Ok(RecordId(body.id))
    }

    async fn list(&self, collection: &str) -> Result<Vec<TransformedRow>> {
        let response = self
            .with_auth(self.client.get(self.collection_url(collection)))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.check_status(response.status())?;

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| Error::datastore(format!("Malformed list response: {}", e)))?;

        Ok(body.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https_urls() {
        assert!(HttpDatastore::new("https://records.example.com", None).is_ok());
        assert!(HttpDatastore::new("http://localhost:8090", None).is_ok());
    }

    #[test]
    fn test_rejects_other_schemes() {
        let result = HttpDatastore::new("ftp://records.example.com", None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("http or https"));
    }

    #[test]
    fn test_rejects_malformed_url() {
        assert!(HttpDatastore::new("not a url", None).is_err());
    }

    #[test]
    fn test_collection_url_trims_trailing_slash() {
        let store = HttpDatastore::new("http://localhost:8090/", None).unwrap();
        assert_eq!(
            store.collection_url("customers"),
            "http://localhost:8090/collections/customers/records"
        );
    }
}
