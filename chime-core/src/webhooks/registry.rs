//! Webhook definitions and their JSON settings file.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::Storage;

/// One externally notified HTTP endpoint.
///
/// Parameter values are templates; `%EVENT%` expands to the event kind name
/// and `%SOUND_FILE%` to the triggering event's sound file path. Parameters
/// iterate in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub url: String,
    /// "GET" or "POST"; anything else aborts the dispatch pass it appears in.
    pub method: String,
    pub parameters: BTreeMap<String, String>,
}

/// Wire form of a webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WebhookSpec {
    #[serde(default)]
    url: String,
    #[serde(default)]
    method: String,
    /// Null when the hook takes no parameters.
    #[serde(default)]
    parameters: Option<BTreeMap<String, String>>,
}

/// Top level of the webhook settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WebhooksFile {
    #[serde(default)]
    enable: bool,
    /// Null when no hooks are configured.
    #[serde(default)]
    webhooks: Option<Vec<WebhookSpec>>,
}

/// The ordered list of webhooks plus the master enable switch, backed by a
/// JSON settings file.
///
/// Updates replace: a new payload clears the hook list and rebuilds it, so
/// hooks absent from the payload are gone. The animation catalog merges
/// instead; that asymmetry matches the shipped behavior and is kept.
pub struct WebhookRegistry {
    storage: Arc<dyn Storage>,
    settings_file: String,
    enabled: bool,
    hooks: Vec<Webhook>,
}

impl WebhookRegistry {
    pub fn new(storage: Arc<dyn Storage>, settings_file: impl Into<String>) -> Self {
        Self {
            storage,
            settings_file: settings_file.into(),
            enabled: false,
            hooks: Vec::new(),
        }
    }

    /// Loads settings from the settings file. A missing or empty file is not
    /// an error: the current (empty, disabled) settings are written out as
    /// the starting point.
    pub fn load(&mut self) -> Result<()> {
        tracing::info!("Loading webhook settings");
        let raw = self.storage.read(&self.settings_file);
        if raw.is_empty() {
            if !self.persist() {
                return Err(Error::StorageWrite(self.settings_file.clone()));
            }
            return Ok(());
        }
        self.apply(raw.trim())
    }

    /// Parses a JSON payload and replaces the current settings with it.
    ///
    /// A payload that fails to parse leaves the prior settings untouched.
    pub fn apply(&mut self, raw: &str) -> Result<()> {
        let parsed: WebhooksFile = serde_json::from_str(raw)
            .map_err(|e| Error::Malformed(self.settings_file.clone(), e.to_string()))?;

        self.enabled = parsed.enable;
        self.hooks.clear();
        for spec in parsed.webhooks.unwrap_or_default() {
            self.hooks.push(Webhook {
                url: spec.url,
                method: spec.method,
                parameters: spec.parameters.unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Replaces the current settings and persists the result.
    pub fn update(&mut self, raw: &str) -> Result<()> {
        self.apply(raw)?;
        if !self.persist() {
            return Err(Error::StorageWrite(self.settings_file.clone()));
        }
        Ok(())
    }

    /// Serializes the current settings and writes them to the settings file.
    pub fn persist(&self) -> bool {
        let file = WebhooksFile {
            enable: self.enabled,
            webhooks: if self.hooks.is_empty() {
                None
            } else {
                Some(
                    self.hooks
                        .iter()
                        .map(|hook| WebhookSpec {
                            url: hook.url.clone(),
                            method: hook.method.clone(),
                            parameters: if hook.parameters.is_empty() {
                                None
                            } else {
                                Some(hook.parameters.clone())
                            },
                        })
                        .collect(),
                )
            },
        };
        let raw = match serde_json::to_string(&file) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Could not serialize webhook settings: {}", e);
                return false;
            }
        };
        self.storage.write(&self.settings_file, &raw)
    }

    /// Returns the stored settings file exactly as persisted, or an empty
    /// string when no file exists yet.
    pub fn get_raw(&self) -> String {
        if self.storage.exists(&self.settings_file) {
            self.storage.read(&self.settings_file)
        } else {
            String::new()
        }
    }

    /// Master switch: when false, the dispatcher discards events.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn hooks(&self) -> &[Webhook] {
        &self.hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn registry() -> WebhookRegistry {
        WebhookRegistry::new(Arc::new(MemoryStorage::new()), "/settings/webhooks.json")
    }

    const TWO_HOOKS: &str = r#"{
        "enable": true,
        "webhooks": [
            {"url": "http://a.example/ring", "method": "GET",
             "parameters": {"event": "%EVENT%", "file": "%SOUND_FILE%"}},
            {"url": "http://b.example/ring", "method": "POST", "parameters": null}
        ]
    }"#;

    #[test]
    fn test_apply_builds_hooks_in_order() {
        let mut reg = registry();
        reg.apply(TWO_HOOKS).unwrap();

        assert!(reg.enabled());
        assert_eq!(reg.hooks().len(), 2);
        assert_eq!(reg.hooks()[0].url, "http://a.example/ring");
        assert_eq!(reg.hooks()[0].parameters["event"], "%EVENT%");
        assert_eq!(reg.hooks()[1].method, "POST");
        assert!(reg.hooks()[1].parameters.is_empty());
    }

    #[test]
    fn test_apply_replaces_wholesale() {
        let mut reg = registry();
        reg.apply(TWO_HOOKS).unwrap();
        reg.apply(r#"{"enable": false, "webhooks": []}"#).unwrap();

        // Replace, not merge: the prior hooks are gone.
        assert!(!reg.enabled());
        assert!(reg.hooks().is_empty());
    }

    #[test]
    fn test_apply_null_webhooks_means_empty() {
        let mut reg = registry();
        reg.apply(TWO_HOOKS).unwrap();
        reg.apply(r#"{"enable": true, "webhooks": null}"#).unwrap();
        assert!(reg.hooks().is_empty());
    }

    #[test]
    fn test_malformed_payload_leaves_registry_untouched() {
        let mut reg = registry();
        reg.apply(TWO_HOOKS).unwrap();

        let err = reg.apply("{oops").unwrap_err();
        assert!(matches!(err, Error::Malformed(_, _)));
        assert!(reg.enabled());
        assert_eq!(reg.hooks().len(), 2);
    }

    #[test]
    fn test_persist_round_trip() {
        let storage = Arc::new(MemoryStorage::new());
        let mut reg =
            WebhookRegistry::new(Arc::clone(&storage) as Arc<dyn Storage>, "/settings/webhooks.json");
        reg.update(TWO_HOOKS).unwrap();

        let mut reloaded = WebhookRegistry::new(storage, "/settings/webhooks.json");
        reloaded.load().unwrap();

        assert!(reloaded.enabled());
        assert_eq!(reloaded.hooks(), reg.hooks());
    }

    #[test]
    fn test_persist_writes_null_for_empty_hooks() {
        let mut reg = registry();
        assert!(reg.persist());

        let raw = reg.get_raw();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["webhooks"].is_null());
    }

    #[test]
    fn test_load_missing_file_persists_defaults() {
        let mut reg = registry();
        assert_eq!(reg.get_raw(), "");

        reg.load().unwrap();
        assert!(!reg.enabled());
        assert!(!reg.get_raw().is_empty());
    }
}
