use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default)]
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                database_url: None,
                max_connections: 20,
            },
        }
    }
}

impl AppConfig {
    /// 加载顺序: 默认值 -> docgen.toml (可选) -> DOCGEN__* 环境变量
    /// 另外兼容 SERVER_HOST / SERVER_PORT / DATABASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::with_name("docgen").required(false))
            .add_source(
                Environment::with_prefix("DOCGEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("storage.database_url", std::env::var("DATABASE_URL").ok())?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let d = AppConfig::default();
        Config::builder()
            .set_default("server.host", d.server.host)?
            .set_default("server.port", d.server.port as i64)?
            .set_default("storage.backend", "memory")?
            .set_default("storage.max_connections", d.storage.max_connections as i64)
    }

    /// 检查配置组合是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres
            && self.storage.database_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Message(
                "storage.backend = postgres requires storage.database_url (or DATABASE_URL)".to_string(),
            ));
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Message(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<AppConfig, ConfigError> {
        let config: AppConfig = AppConfig::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn defaults_use_memory_store() {
        let config = from_toml("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.max_connections, 20);
        assert!(config.storage.database_url.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 9090

            [storage]
            backend = "postgres"
            database_url = "postgres://localhost/docgen"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.storage.database_url.as_deref(), Some("postgres://localhost/docgen"));
    }

    #[test]
    fn postgres_without_url_is_rejected() {
        let err = from_toml("[storage]\nbackend = \"postgres\"\n").unwrap_err();
        assert!(err.to_string().contains("database_url"));
    }
}
