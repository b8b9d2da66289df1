use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

/// Where the plan catalog comes from
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Path to a JSON plan catalog. When unset the built-in catalog is used.
    pub path: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: std::env::var("PLAN_CATALOG_PATH")
                .ok()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        }
    }
}

/// Credentials for the admin routes
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Bearer token required on `/v1/admin/*`. Unset locks those routes.
    pub api_token: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_token: std::env::var("ADMIN_API_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoggingConfig {
    /// Global log level for the application.
    ///
    /// Valid values: "error", "warn", "info", "debug", "trace".
    /// Default: "info" (from LOG_LEVEL env var or fallback).
    pub level: String,
    /// Log output format.
    ///
    /// Valid values: "pretty", "json".
    /// Default: "pretty" (from LOG_FORMAT env var or fallback).
    pub format: String,
    /// Per-module log levels. Each workspace crate defaults to "debug".
    pub modules: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let modules = [
            ("api", "LOG_MODULE_API"),
            ("services", "LOG_MODULE_SERVICES"),
            ("database", "LOG_MODULE_DATABASE"),
        ]
        .into_iter()
        .map(|(module, var)| {
            let level = std::env::var(var).unwrap_or_else(|_| "debug".to_string());
            (module.to_string(), level)
        })
        .collect();

        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            modules,
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive string, e.g. `info,services=debug`
    pub fn filter_directive(&self) -> String {
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();
        std::iter::once(self.level.clone())
            .chain(
                modules
                    .into_iter()
                    .map(|(module, level)| format!("{module}={level}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    pub server: ServerConfig,
    /// Plan catalog source
    pub catalog: CatalogConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::default(),
            catalog: CatalogConfig::default(),
            admin: AdminConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
