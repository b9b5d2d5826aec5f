//! HTTP backend for S3-compatible stores
//!
//! Uses path-style addressing: `{endpoint}/{bucket}/{key}`. Endpoint and
//! credentials are handed in by the host; nothing here discovers them.

use super::backend::{key_segments, validate_bucket, BlobBackend, ObjectMeta};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, EXPIRES};
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// A backend speaking plain GET/PUT to an S3-compatible endpoint
pub struct HttpBackend {
    endpoint: Url,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    /// Create a backend for `endpoint`, optionally sending a bearer token
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Self::with_client(endpoint, token, client)
    }

    /// Create a backend that sends requests through an existing client
    pub fn with_client(
        endpoint: &str,
        token: Option<String>,
        client: reqwest::blocking::Client,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Config(format!("Invalid endpoint {:?}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Endpoint cannot hold a path: {}",
                endpoint
            )));
        }

        Ok(HttpBackend {
            endpoint,
            token,
            client,
        })
    }

    /// Full URL for a blob, with each key segment percent-encoded
    ///
    /// Keys with empty, `.` or `..` segments are rejected: URL normalization
    /// would otherwise fold them onto a different object.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url> {
        let bucket = validate_bucket(bucket)?;
        let key = key_segments(key)?;

        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::Config(format!("Endpoint cannot hold a path: {}", self.endpoint))
            })?;
            segments.pop_if_empty().push(bucket).extend(key);
        }
        Ok(url)
    }

    fn authorize(
        &self,
        builder: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }
}

/// Format a timestamp as an RFC 7231 HTTP date
pub(crate) fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn transport(e: reqwest::Error) -> Error {
    Error::Transport(e.to_string())
}

impl BlobBackend for HttpBackend {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.object_url(bucket, key)?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(bucket, key));
        }
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(Error::Transport(format!(
                "GET {}/{} failed: {} {}",
                bucket, key, status, text
            )));
        }

        let body = response.bytes().map_err(transport)?;
        Ok(body.to_vec())
    }

    fn put(&self, bucket: &str, key: &str, data: &[u8], meta: &ObjectMeta) -> Result<()> {
        let url = self.object_url(bucket, key)?;
        let response = self
            .authorize(self.client.put(url))
            .header(CONTENT_TYPE, meta.content_type.as_str())
            .header(EXPIRES, http_date(meta.expires))
            .body(data.to_vec())
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(Error::Transport(format!(
                "PUT {}/{} failed: {} {}",
                bucket, key, status, text
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
