//! 宿主配置（ManagerConfig）
//!
//! 可通过 TOML 加载，也可用 builder 以代码构造；所有段落均可省略：
//!
//! ```toml
//! events = ["package.install"]
//!
//! [discovery]
//! prefix = "pluggable"
//! extension_dirs = ["plugins"]
//! binaries = ["my-plugin"]
//! plugins = [{ name = "local", executable = "/opt/local-plugin" }]
//!
//! [invoker]
//! offload_threshold = 8192
//! temp_prefix = "pluggable"
//! ```
use crate::error::{HostError, HostResult};
use bon::Builder;
use pluggable_core::invoke::InvokerConfig;
use pluggable_core::{EventType, Plugin};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 插件发现配置
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// 前缀扫描使用的项目前缀（匹配 `<prefix>-*`）
    #[builder(into)]
    pub prefix: Option<String>,
    /// 额外扫描目录，相对路径按当前工作目录解析
    #[builder(default)]
    pub extension_dirs: Vec<PathBuf>,
    /// 需在搜索路径中精确查找的可执行文件名
    #[builder(default)]
    pub binaries: Vec<String>,
    /// 显式登记的插件
    #[builder(default)]
    pub plugins: Vec<Plugin>,
}

/// 管理器配置
#[derive(Builder, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// 管理的事件名
    #[builder(default)]
    pub events: Vec<EventType>,
    #[builder(default)]
    pub discovery: DiscoveryConfig,
    #[builder(default)]
    pub invoker: InvokerConfig,
}

impl ManagerConfig {
    pub fn from_toml_str(raw: &str) -> HostResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> HostResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> HostResult<()> {
        if self.invoker.offload_threshold == 0 {
            return Err(HostError::Config {
                reason: "invoker.offload_threshold must be greater than zero".to_string(),
            });
        }
        if let Some(event) = self.events.iter().find(|e| e.as_str().is_empty()) {
            return Err(HostError::Config {
                reason: format!("empty event name in events: {event:?}"),
            });
        }
        if matches!(self.discovery.prefix.as_deref(), Some("")) {
            return Err(HostError::Config {
                reason: "discovery.prefix must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pluggable_core::invoke::DEFAULT_OFFLOAD_THRESHOLD;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ManagerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ManagerConfig::default());
        assert_eq!(config.invoker.offload_threshold, DEFAULT_OFFLOAD_THRESHOLD);
        assert_eq!(config.invoker.temp_prefix, "pluggable");
    }

    #[test]
    fn parses_full_document() {
        let raw = r#"
            events = ["package.install", "package.remove"]

            [discovery]
            prefix = "luet"
            extension_dirs = ["plugins", "/opt/plugins"]
            binaries = ["my-plugin"]
            plugins = [{ name = "local", executable = "/opt/local-plugin" }]

            [invoker]
            offload_threshold = 4096
            temp_dir = "/var/tmp"
        "#;
        let config = ManagerConfig::from_toml_str(raw).unwrap();

        assert_eq!(
            config.events,
            vec![EventType::from("package.install"), EventType::from("package.remove")]
        );
        assert_eq!(config.discovery.prefix.as_deref(), Some("luet"));
        assert_eq!(config.discovery.extension_dirs.len(), 2);
        assert_eq!(config.discovery.binaries, vec!["my-plugin".to_string()]);
        assert_eq!(
            config.discovery.plugins,
            vec![Plugin::new("local", "/opt/local-plugin")]
        );
        assert_eq!(config.invoker.offload_threshold, 4096);
        assert_eq!(config.invoker.temp_prefix, "pluggable");
        assert_eq!(config.invoker.temp_dir, Some(PathBuf::from("/var/tmp")));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ManagerConfig::from_toml_str("evnets = []").unwrap_err();
        assert!(matches!(err, HostError::ConfigParse(_)));
    }

    #[test]
    fn rejects_unknown_invoker_keys() {
        let err = ManagerConfig::from_toml_str("[invoker]\noffload_treshold = 4096").unwrap_err();
        assert!(matches!(err, HostError::ConfigParse(_)));
    }

    #[test]
    fn rejects_zero_threshold() {
        let err = ManagerConfig::from_toml_str("[invoker]\noffload_threshold = 0").unwrap_err();
        assert!(matches!(err, HostError::Config { .. }));
    }

    #[test]
    fn rejects_empty_prefix() {
        let err = ManagerConfig::from_toml_str("[discovery]\nprefix = \"\"").unwrap_err();
        assert!(matches!(err, HostError::Config { .. }));
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pluggable.toml");
        std::fs::write(&path, "events = [\"package.install\"]").unwrap();

        let config = ManagerConfig::from_path(&path).unwrap();
        assert_eq!(config.events, vec![EventType::from("package.install")]);

        let err = ManagerConfig::from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, HostError::Io(_)));
    }

    #[test]
    fn builder_fills_defaults() {
        let config = ManagerConfig::builder()
            .events(vec!["package.install".into()])
            .discovery(DiscoveryConfig::builder().prefix("test").build())
            .build();
        assert_eq!(config.discovery.prefix.as_deref(), Some("test"));
        assert!(config.discovery.binaries.is_empty());
        assert_eq!(config.invoker, InvokerConfig::default());
    }
}
