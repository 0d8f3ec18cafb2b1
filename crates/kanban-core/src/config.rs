//! Client configuration
//!
//! Loaded from JSON (the browser keeps it in local storage) or from the
//! environment on native targets. Every field has a default.

use serde::{Deserialize, Serialize};

use crate::drag::CollisionStrategy;
use crate::error::{KanbanError, KanbanResult};

pub const DEFAULT_DRAG_THRESHOLD_PX: i32 = 5;

pub const ENV_API_URL: &str = "KANBAN_API_URL";
pub const ENV_API_TOKEN: &str = "KANBAN_API_TOKEN";
pub const ENV_DRAG_THRESHOLD: &str = "KANBAN_DRAG_THRESHOLD_PX";
pub const ENV_RECONCILE: &str = "KANBAN_RECONCILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KanbanConfig {
    /// Server origin, e.g. `https://crm.example.com`. Empty means offline mode.
    pub api_base_url: String,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Pointer travel (either axis) before a press becomes a drag
    pub drag_threshold_px: i32,
    /// Reload the whole board after each successful move
    pub reconcile_after_move: bool,
    pub collision: CollisionStrategy,
}

impl Default for KanbanConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            token: None,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            reconcile_after_move: true,
            collision: CollisionStrategy::default(),
        }
    }
}

impl KanbanConfig {
    pub fn from_json(json: &str) -> KanbanResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| KanbanError::ValidationFailed(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `KANBAN_*` environment variables
    pub fn from_env() -> KanbanResult<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `KANBAN_*` names
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> KanbanResult<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            config.token = Some(token).filter(|t| !t.trim().is_empty());
        }
        if let Some(threshold) = lookup(ENV_DRAG_THRESHOLD) {
            config.drag_threshold_px = threshold.trim().parse().map_err(|_| {
                KanbanError::ValidationFailed(format!(
                    "{} must be an integer, got {:?}",
                    ENV_DRAG_THRESHOLD, threshold
                ))
            })?;
        }
        if let Some(reconcile) = lookup(ENV_RECONCILE) {
            config.reconcile_after_move = !matches!(
                reconcile.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> KanbanResult<()> {
        if self.drag_threshold_px < 0 {
            return Err(KanbanError::ValidationFailed(
                "drag threshold must not be negative".to_string(),
            ));
        }
        let url = self.api_base_url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(KanbanError::ValidationFailed(format!(
                "api base url must be http(s), got {:?}",
                url
            )));
        }
        Ok(())
    }

    pub fn is_offline(&self) -> bool {
        self.api_base_url.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[test]
    fn test_defaults() {
        let config = KanbanConfig::default();
        assert_eq!(config.drag_threshold_px, 5);
        assert!(config.reconcile_after_move);
        assert!(config.is_offline());
    }

    #[test]
    fn test_from_json_partial() {
        let config = KanbanConfig::from_json(
            r#"{"apiBaseUrl":"https://crm.example.com","dragThresholdPx":8,"collision":"closestCorners"}"#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://crm.example.com");
        assert_eq!(config.drag_threshold_px, 8);
        assert_eq!(config.collision, CollisionStrategy::ClosestCorners);
        assert!(config.reconcile_after_move);
        assert!(!config.is_offline());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(KanbanConfig::from_json(r#"{"dragThresholdPx":-1}"#).is_err());
        assert!(KanbanConfig::from_json(r#"{"apiBaseUrl":"ftp://x"}"#).is_err());
        assert!(KanbanConfig::from_json("not json").is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = KanbanConfig::from_vars(vars(&[
            (ENV_API_URL, "https://crm.example.com"),
            (ENV_API_TOKEN, "tok"),
            (ENV_DRAG_THRESHOLD, " 12 "),
            (ENV_RECONCILE, "off"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://crm.example.com");
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.drag_threshold_px, 12);
        assert!(!config.reconcile_after_move);
    }

    #[test]
    fn test_from_vars_reconcile_values() {
        for off in ["0", "false", "NO", " Off "] {
            let config = KanbanConfig::from_vars(vars(&[(ENV_RECONCILE, off)])).unwrap();
            assert!(!config.reconcile_after_move, "{:?} should disable reconcile", off);
        }
        for on in ["1", "true", "yes", ""] {
            let config = KanbanConfig::from_vars(vars(&[(ENV_RECONCILE, on)])).unwrap();
            assert!(config.reconcile_after_move, "{:?} should keep reconcile", on);
        }
    }

    #[test]
    fn test_from_vars_empty_token_is_dropped() {
        let config = KanbanConfig::from_vars(vars(&[(ENV_API_TOKEN, "  ")])).unwrap();
        assert!(config.token.is_none());
    }

    #[test]
    fn test_from_vars_rejects_bad_threshold() {
        let err = KanbanConfig::from_vars(vars(&[(ENV_DRAG_THRESHOLD, "five")])).unwrap_err();
        assert!(matches!(err, KanbanError::ValidationFailed(ref m) if m.contains(ENV_DRAG_THRESHOLD)));
        assert!(KanbanConfig::from_vars(vars(&[(ENV_DRAG_THRESHOLD, "-3")])).is_err());
        assert!(KanbanConfig::from_vars(vars(&[(ENV_API_URL, "crm.example.com")])).is_err());
    }

    /// Process environment is global; env tests take this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for name in [ENV_API_URL, ENV_API_TOKEN, ENV_DRAG_THRESHOLD, ENV_RECONCILE] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        assert_eq!(KanbanConfig::from_env().unwrap(), KanbanConfig::default());

        std::env::set_var(ENV_API_URL, "http://localhost:8080");
        std::env::set_var(ENV_API_TOKEN, "");
        std::env::set_var(ENV_DRAG_THRESHOLD, "0");
        std::env::set_var(ENV_RECONCILE, "false");
        let config = KanbanConfig::from_env();

        std::env::set_var(ENV_DRAG_THRESHOLD, "lots");
        let bad = KanbanConfig::from_env();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert!(config.token.is_none());
        assert_eq!(config.drag_threshold_px, 0);
        assert!(!config.reconcile_after_move);
        assert!(bad.is_err());
    }
}
