//! Content bundles carried across pause, update, and destroy.
//!
//! On the wire a content blob is opaque text. Inside the runtime it decodes
//! to a [`ContentInfo`]: an ordered string key/value bundle. The encoded form
//! is the base64 of the bundle's JSON object.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WidgetError};

/// Decoded content bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentInfo(BTreeMap<String, String>);

impl ContentInfo {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a value, returning the bundle for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Looks up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes the bundle into its blob form.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(&self.0)
            .map_err(|e| WidgetError::Fault(format!("content encode failed: {e}")))?;
        Ok(STANDARD.encode(json))
    }

    /// Decodes a blob produced by [`encode`](Self::encode).
    pub fn decode(blob: &str) -> Result<Self> {
        let raw = STANDARD
            .decode(blob.trim())
            .map_err(|e| WidgetError::invalid(format!("content is not base64: {e}")))?;
        let map = serde_json::from_slice(&raw)
            .map_err(|e| WidgetError::invalid(format!("content is not a bundle: {e}")))?;
        Ok(Self(map))
    }

    /// Decodes an optional blob, treating undecodable content as absent.
    pub(crate) fn decode_lossy(blob: Option<&str>) -> Option<Self> {
        let blob = blob?;
        match Self::decode(blob) {
            Ok(info) => Some(info),
            Err(err) => {
                log::warn!("ignoring undecodable content blob: {err}");
                None
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContentInfo {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
