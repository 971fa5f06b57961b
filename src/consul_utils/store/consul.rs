use super::KvStore;
use crate::config::ConsulConfig;
use crate::error::{ConsulUtilsError, Result};
use crate::model::Record;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

const TOKEN_HEADER: &str = "X-Consul-Token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of a `GET /v1/kv/<key>?recurse` response. Other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct KvEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: Option<String>,
}

/// Blocking client for Consul's key-value HTTP API.
pub struct ConsulStore {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ConsulStore {
    pub fn new(config: &ConsulConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let address = config.base_url();
        let base_url = Url::parse(&address).map_err(|e| {
            ConsulUtilsError::Config(format!("Invalid Consul address {address}: {e}"))
        })?;
        Ok(Self {
            client,
            base_url,
            token: Some(config.token.clone()).filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `/v1/kv/<key>` with every key segment percent-encoded, so `#`, `?`
    /// and `%` stay part of the key. A trailing `/` is kept.
    fn kv_url(&self, key: &str, recurse: bool) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConsulUtilsError::Config(format!("Invalid Consul address {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v1", "kv"])
            .extend(key.trim_start_matches('/').split('/'));
        if recurse {
            url.query_pairs_mut().append_pair("recurse", "true");
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }
}

impl KvStore for ConsulStore {
    fn fetch(&self, root: &str) -> Result<Option<Vec<Record>>> {
        let url = self.kv_url(root, true)?;
        tracing::debug!(%url, "fetching key values");
        let resp = self.request(Method::GET, url).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let entries: Vec<KvEntry> = resp.error_for_status()?.json()?;
        decode_entries(entries).map(Some)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let url = self.kv_url(key, false)?;
        let resp = self
            .request(Method::PUT, url)
            .body(value.to_string())
            .send()?
            .error_for_status()?;
        let accepted: bool = resp.json()?;
        if !accepted {
            return Err(ConsulUtilsError::Store(format!("Write rejected for key {key}")));
        }
        Ok(())
    }

    fn delete(&mut self, key: &str, recurse: bool) -> Result<()> {
        let url = self.kv_url(key, recurse)?;
        self.request(Method::DELETE, url).send()?.error_for_status()?;
        Ok(())
    }

    fn clear_cache(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Turn raw API entries into records, decoding base64 values as UTF-8.
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn decode_entries(entries: Vec<KvEntry>) -> Result<Vec<Record>> {
    entries
        .into_iter()
        .map(|entry| {
            let value = match entry.value {
                Some(encoded) => {
                    let bytes = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
                        ConsulUtilsError::Store(format!(
                            "Invalid value encoding for key {}: {e}",
                            entry.key
                        ))
                    })?;
                    Some(String::from_utf8_lossy(&bytes).into_owned())
                }
                None => None,
            };
            Ok(Record {
                key: entry.key,
                value,
            })
        })
        .collect()
}
