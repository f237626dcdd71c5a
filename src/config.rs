//! 配置模块，负责加载过滤编译器的JSON配置文件

use crate::ast::FieldPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 默认的数组字段 (以 JSON 数组形式存放在 data 列中)
pub const DEFAULT_ARRAY_FIELDS: &[&str] = &["metadata.tags", "metadata.markers", "metadata.annotations"];

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {}", .0.display())]
    NotFound(PathBuf),

    #[error("无法读取配置文件 {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法解析JSON配置文件 {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("无效的数组字段路径: '{0}'")]
    InvalidField(String),
}

/// 过滤编译器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// 保存 JSON 数组的字段路径, 只能使用包含/重叠判断
    #[serde(default = "default_array_fields")]
    pub array_fields: BTreeSet<String>,
}

fn default_array_fields() -> BTreeSet<String> {
    DEFAULT_ARRAY_FIELDS.iter().map(|s| s.to_string()).collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            array_fields: default_array_fields(),
        }
    }
}

impl FilterConfig {
    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        // 检查文件是否存在
        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }

        // 读取文件内容
        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;

        // 解析JSON
        let config: FilterConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path_ref.to_path_buf(),
            source,
        })?;

        config.normalized()
    }

    /// 将所有数组字段转换为规范形式 (`data.x` -> `metadata.x`)
    fn normalized(self) -> Result<Self, ConfigError> {
        let array_fields = self
            .array_fields
            .into_iter()
            .map(|field| {
                FieldPath::parse(&field)
                    .map(|path| path.canonical())
                    .ok_or(ConfigError::InvalidField(field))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { array_fields })
    }

    /// 字段是否登记为数组字段
    pub fn is_array_field(&self, path: &FieldPath) -> bool {
        self.array_fields.contains(&path.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn test_load_valid_json_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "array_fields": ["metadata.tags", "data.requirements"] }}"#).unwrap();

        let config = FilterConfig::from_json_file(file.path()).unwrap();
        assert!(config.is_array_field(&path("metadata.tags")));
        assert!(config.is_array_field(&path("metadata.requirements")));
        assert!(config.is_array_field(&path("data.requirements")));
        assert!(!config.is_array_field(&path("metadata.markers")));
    }

    #[test]
    fn test_missing_key_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();

        let config = FilterConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn test_invalid_json_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid json").unwrap();

        let result = FilterConfig::from_json_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_invalid_field_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "array_fields": ["metadata..tags"] }}"#).unwrap();

        let result = FilterConfig::from_json_file(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidField(field)) if field == "metadata..tags"));
    }

    #[test]
    fn test_missing_file() {
        let result = FilterConfig::from_json_file("non_existent_file.json");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_default_config() {
        let config = FilterConfig::default();
        assert!(config.is_array_field(&path("metadata.tags")));
        assert!(config.is_array_field(&path("data.tags")));
        assert!(config.is_array_field(&path("metadata.markers")));
        assert!(config.is_array_field(&path("metadata.annotations")));
        assert!(!config.is_array_field(&path("metadata.tags.extra")));
        assert!(!config.is_array_field(&path("tags")));
    }
}
