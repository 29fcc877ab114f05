//! 配置加载
//!
//! 配置文件位于 `<config_dir>/shoplist/config.toml`，不存在时使用默认值。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::models::Category;

pub const DEFAULT_STORAGE_KEY: &str = "shopping-items";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("读取配置文件 '{}' 失败: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("解析配置文件 '{}' 失败: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("无效配置: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// 数据目录，默认 `<data_dir>/shoplist`
    pub data_dir: Option<PathBuf>,
    /// 清单所在的存储槽
    pub storage_key: String,
    /// 新建条目时预选的分类
    pub default_category: Category,
    /// 日志级别（`RUST_LOG` 优先）
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_category: Category::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// 默认配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shoplist").join("config.toml"))
    }

    /// 从文件加载配置；文件不存在时返回默认配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let key_ok = !self.storage_key.is_empty()
            && self
                .storage_key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !key_ok {
            return Err(ConfigError::Invalid {
                message: format!(
                    "storage_key '{}' may only contain letters, digits, '-' and '_'",
                    self.storage_key
                ),
            });
        }
        if !matches!(
            self.log_level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(ConfigError::Invalid {
                message: format!("unknown log_level '{}'", self.log_level),
            });
        }
        Ok(())
    }

    /// 实际使用的数据目录
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("shoplist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage_key, "shopping-items");
        assert_eq!(config.default_category, Category::Vegetables);
    }

    #[test]
    fn test_partial_file_overrides() {
        let (_dir, path) = write_config(
            r#"
            data_dir = "/tmp/lists"
            default_category = "Dairy"
            "#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/lists")));
        assert_eq!(config.default_category, Category::Dairy);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.resolve_data_dir(), Some(PathBuf::from("/tmp/lists")));
    }

    #[test]
    fn test_invalid_storage_key() {
        let (_dir, path) = write_config(r#"storage_key = "../items""#);
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_unknown_log_level() {
        let (_dir, path) = write_config(r#"log_level = "loud""#);
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_parse_error() {
        let (_dir, path) = write_config("default_category = \"Meat\"");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));

        let (_dir, path) = write_config("colour = \"blue\"");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }
}
