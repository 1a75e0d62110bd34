//! Environment-backed configuration, available to every container as a module.

use crate::di::{Token, provide_value};
use crate::error::Result;
use crate::module::{Module, ModuleOptions, module as compose};
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration service
///
/// Keys loaded from the environment have the prefix stripped, so with prefix
/// `APP_` the variable `APP_PORT` is read back as `PORT`.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every environment variable starting with `prefix`; an empty prefix loads all.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_vars(prefix, env::vars())
    }

    fn from_vars(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let service = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                service.set(stripped, &value);
            }
        }
        tracing::debug!(prefix, entries = service.len(), "Loaded configuration from environment");
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    /// Parse the value under `key`, `None` when missing or unparsable.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.config.get(key).and_then(|v| v.parse().ok())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.config.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.is_empty()
    }
}

/// Module binding a [`ConfigService`] loaded with `prefix` under its type token.
pub fn module(prefix: &str) -> Result<Module> {
    let prefix = prefix.to_string();
    compose(
        ModuleOptions::new().register(provide_value(&Token::<ConfigService>::of(), move || {
            ConfigService::from_env(&prefix)
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::{Overrides, create_container};

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prefix_filters_and_strips_keys() {
        let config = ConfigService::from_vars(
            "APP_",
            vars(&[("APP_PORT", "8080"), ("APP_NAME", "wiring"), ("HOME", "/root")]),
        );

        assert_eq!(config.len(), 2);
        assert_eq!(config.get("NAME").as_deref(), Some("wiring"));
        assert_eq!(config.get_parsed::<u16>("PORT"), Some(8080));
        assert_eq!(config.get_parsed::<u16>("NAME"), None);
        assert!(config.get("HOME").is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let config = ConfigService::new();
        assert!(config.is_empty());
        config.set("mode", "dev");
        config.set("mode", "prod");
        assert_eq!(config.get("mode").as_deref(), Some("prod"));
    }

    #[test]
    fn test_module_provides_a_shared_instance() {
        let container = create_container(module("WIRING_TEST_").unwrap(), Overrides::new()).unwrap();
        let token = Token::<ConfigService>::of();

        let first = container.resolve(&token).unwrap();
        first.set("flag", "on");
        let second = container.resolve(&token).unwrap();
        assert_eq!(second.get("flag").as_deref(), Some("on"));
    }
}
