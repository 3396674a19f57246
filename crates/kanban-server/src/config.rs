//! Process configuration (SPEC_FULL §4.11).
//!
//! A single [`AppConfig`], loaded once at startup via `figment` from the
//! environment (no config file — every field has a `KANBAN_`-prefixed
//! variable and a spec-mandated default), and handed to every subsystem
//! that needs it. Grounded in the ambient-stack convention of bundling
//! spec-table defaults into one struct, same shape as
//! `kanban_domain::config::AppLimits`, extended with the fields the core
//! spec never needed an opinion on (bind address, database URL, webhook
//! client identity, log format).

use figment::providers::{Env, Serialized};
use figment::Figment;
use kanban_domain::config::AppLimits;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub demo_org_id: String,
    pub system_user_id: Option<Uuid>,
    pub max_automation_depth: u8,
    pub max_lexorank_length: usize,
    pub webhook_timeout_secs: u64,
    pub webhook_user_agent: String,
    pub webhook_allow_http: bool,
    pub identity_provider_url: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".parse().unwrap_or_else(|_| {
                SocketAddr::from(([0, 0, 0, 0], 8080))
            }),
            database_url: "postgres://localhost/kanban".to_owned(),
            demo_org_id: "demo-org-id".to_owned(),
            system_user_id: None,
            max_automation_depth: 3,
            max_lexorank_length: 32,
            webhook_timeout_secs: 10,
            webhook_user_agent: "kanban-webhooks/1.0".to_owned(),
            webhook_allow_http: false,
            identity_provider_url: "http://localhost:9000".to_owned(),
            log_level: "info".to_owned(),
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    /// Loads from `KANBAN_*` environment variables, falling back to
    /// spec-mandated defaults for anything unset.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Env::prefixed("KANBAN_"))
            .extract()
    }

    #[must_use]
    pub fn app_limits(&self) -> AppLimits {
        AppLimits {
            demo_org_id: self.demo_org_id.clone(),
            system_user_id: self.system_user_id,
            max_automation_depth: self.max_automation_depth,
            max_lexorank_length: self.max_lexorank_length,
            ..AppLimits::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let config = AppConfig::default();
        assert_eq!(config.demo_org_id, "demo-org-id");
        assert_eq!(config.max_automation_depth, 3);
        assert_eq!(config.max_lexorank_length, 32);
        assert!(config.system_user_id.is_none());
    }

    #[test]
    fn env_override_wins_over_default() {
        std::env::set_var("KANBAN_MAX_AUTOMATION_DEPTH", "5");
        let config = AppConfig::load().expect("load config");
        assert_eq!(config.max_automation_depth, 5);
        std::env::remove_var("KANBAN_MAX_AUTOMATION_DEPTH");
    }
}
