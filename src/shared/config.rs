use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use crate::shared::error::GitsearchError;
use crate::shared::result::Result;

/// 覆盖 `github.token` 的环境变量
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// 应用配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub github: GitHubConfig,
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub sqlite_path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("gitsearch.db"),
            max_connections: 10,
        }
    }
}

/// GitHub API 配置
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    /// 未设置时使用 HTTP 客户端的默认超时
    pub timeout_secs: Option<u64>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: concat!("gitsearch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}

impl GitHubConfig {
    /// 非空白的 token
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

// token 不进日志
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.bearer_token().map(|_| "***"))
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter 指令，RUST_LOG 优先
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,tower_http=debug".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| GitsearchError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// 从命令行参数和文件加载配置
    pub fn from_args_and_file(
        config_path: &Path,
        db_path: Option<PathBuf>,
        bind_address: Option<SocketAddr>,
    ) -> Result<Self> {
        let mut config = if config_path.exists() {
            Self::from_file(config_path)?
        } else {
            tracing::warn!(
                "Config file {} not found, using defaults",
                config_path.display()
            );
            Config::default()
        };

        // 命令行参数覆盖配置文件
        if let Some(db_path) = db_path {
            config.database.sqlite_path = db_path;
        }
        if let Some(bind_address) = bind_address {
            config.server.bind_address = bind_address;
        }

        config.apply_token_override(std::env::var(GITHUB_TOKEN_ENV).ok());

        Ok(config)
    }

    /// 环境变量中的非空 token 覆盖配置文件
    pub fn apply_token_override(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.github.token = Some(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_section_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[github]
base_url = "http://localhost:9999"
token = "abc"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.github.base_url, "http://localhost:9999");
        assert_eq!(config.github.bearer_token(), Some("abc"));
        assert_eq!(config.github.timeout_secs, None);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.server.bind_address.port(), 8080);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[github\nbase_url = 1").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, GitsearchError::Config(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_args_and_file(
            &dir.path().join("absent.toml"),
            Some(PathBuf::from("/tmp/other.db")),
            Some("0.0.0.0:9000".parse().unwrap()),
        )
        .unwrap();

        assert_eq!(config.database.sqlite_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.server.bind_address.port(), 9000);
        assert_eq!(config.github.base_url, "https://api.github.com");
    }

    #[test]
    fn blank_token_is_ignored() {
        let mut config = Config::default();
        config.apply_token_override(Some("   ".to_string()));
        assert_eq!(config.github.bearer_token(), None);

        config.github.token = Some(" ".to_string());
        assert_eq!(config.github.bearer_token(), None);

        config.apply_token_override(Some("ghp_x".to_string()));
        assert_eq!(config.github.bearer_token(), Some("ghp_x"));
    }

    #[test]
    fn debug_output_masks_token() {
        let mut config = GitHubConfig::default();
        config.token = Some("secret-token".to_string());
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("***"));
    }
}
