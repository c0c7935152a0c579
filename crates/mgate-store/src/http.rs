//! HTTP object-store backend.
//!
//! Talks to any object endpoint that maps keys onto URL paths with plain
//! `HEAD` / `GET` / `PUT` verbs (S3-compatible gateways, MinIO, an artifact
//! server). All requests are blocking; the evaluate/promote cycle has no
//! async runtime.

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use crate::store::{ObjectStore, StoreError};

/// Remote [`ObjectStore`] under an HTTP(S) base URL.
pub struct HttpStore {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl HttpStore {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    fn request(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

impl ObjectStore for HttpStore {
    fn name(&self) -> &'static str {
        "http"
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let resp = self
            .request(self.client.head(self.url(key)))
            .send()
            .map_err(|e| StoreError::Transport(format!("HEAD {key}: {e}")))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(StoreError::Api {
                status: s.as_u16(),
                message: format!("HEAD {key}"),
            }),
        }
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let resp = self
            .request(self.client.get(self.url(key)))
            .send()
            .map_err(|e| StoreError::Transport(format!("GET {key}: {e}")))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
            s if s.is_success() => {
                let bytes = resp
                    .bytes()
                    .map_err(|e| StoreError::Transport(format!("GET {key} body: {e}")))?;
                Ok(bytes.to_vec())
            }
            s => Err(StoreError::Api {
                status: s.as_u16(),
                message: format!("GET {key}"),
            }),
        }
    }

    fn put(&self, source: &Path, key: &str, remove_source: bool) -> Result<(), StoreError> {
        let bytes = fs::read(source)
            .map_err(|e| StoreError::Io(format!("read '{}': {e}", source.display())))?;

        self.put_bytes(&bytes, key)?;

        // Copy-then-delete: the local source survives any upload failure.
        if remove_source {
            fs::remove_file(source)
                .map_err(|e| StoreError::Io(format!("remove '{}': {e}", source.display())))?;
        }
        Ok(())
    }

    fn put_bytes(&self, bytes: &[u8], key: &str) -> Result<(), StoreError> {
        let resp = self
            .request(self.client.put(self.url(key)).body(bytes.to_vec()))
            .send()
            .map_err(|e| StoreError::Transport(format!("PUT {key}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: format!("PUT {key}"),
            });
        }
        debug!(key, len = bytes.len(), "http store put");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use httpmock::Method::HEAD;

    use super::*;

    #[test]
    fn exists_maps_200_and_404() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/models/prod.json");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(HEAD).path("/models/absent.json");
            then.status(404);
        });

        let store = HttpStore::new(format!("{}/models", server.base_url()), None);
        assert!(store.exists("prod.json").unwrap());
        assert!(!store.exists("absent.json").unwrap());
    }

    #[test]
    fn get_returns_body_and_maps_404_to_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/models/prod.json");
            then.status(200).body("{\"weights\":[]}");
        });
        server.mock(|when, then| {
            when.method(GET).path("/models/absent.json");
            then.status(404);
        });

        let store = HttpStore::new(format!("{}/models", server.base_url()), None);
        assert_eq!(store.get("prod.json").unwrap(), b"{\"weights\":[]}");
        assert!(matches!(
            store.get("absent.json"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn put_uploads_source_file_body() {
        let server = MockServer::start();
        let put_mock = server.mock(|when, then| {
            when.method(PUT).path("/models/prod.json").body("payload");
            then.status(201);
        });

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("candidate.json");
        fs::write(&src, b"payload").unwrap();

        let store = HttpStore::new(format!("{}/models", server.base_url()), None);
        store.put(&src, "prod.json", false).unwrap();

        put_mock.assert();
        assert!(src.is_file());
    }

    #[test]
    fn put_with_remove_source_deletes_only_on_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/models/denied.json");
            then.status(403);
        });
        server.mock(|when, then| {
            when.method(PUT).path("/models/ok.json");
            then.status(200);
        });

        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("m.json");
        fs::write(&src, b"x").unwrap();

        let store = HttpStore::new(format!("{}/models", server.base_url()), None);

        let err = store.put(&src, "denied.json", true).unwrap_err();
        assert!(matches!(err, StoreError::Api { status: 403, .. }), "{err}");
        assert!(src.is_file(), "failed upload must not delete the source");

        store.put(&src, "ok.json", true).unwrap();
        assert!(!src.exists());
    }

    #[test]
    fn bearer_token_is_attached_when_configured() {
        let server = MockServer::start();
        let auth_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/models/prod.json")
                .header("authorization", "Bearer secret-token");
            then.status(200).body("ok");
        });

        let store = HttpStore::new(
            format!("{}/models", server.base_url()),
            Some("secret-token".to_string()),
        );
        assert_eq!(store.get("prod.json").unwrap(), b"ok");
        auth_mock.assert();
    }
}
