//! 插件注册表（PluginRegistry）
//!
//! 以发现顺序保存插件，并保证名称与可执行路径均唯一：候选插件只要与任一
//! 已登记插件同名或同路径即被静默丢弃。发现策略：
//! - `autoload`：在搜索目录中匹配 `<prefix>-*`，插件名为去掉前缀后的文件名；
//! - `load`：按搜索路径顺序精确查找给定文件名；
//! - `register`：显式登记。
//!
//! 搜索路径总是由调用方注入，`env_search_path` 仅作为显式可选的辅助。
//!
use crate::config::DiscoveryConfig;
use pluggable_core::Plugin;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Plugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按共享插入规则登记插件，冲突时返回 false
    pub fn insert(&mut self, plugin: Plugin) -> bool {
        if let Some(existing) = self.plugins.iter().find(|p| p.collides_with(&plugin)) {
            debug!(
                candidate = %plugin.name,
                executable = %plugin.executable.display(),
                existing = %existing.name,
                "plugin dropped as duplicate"
            );
            return false;
        }

        self.plugins.push(plugin);
        true
    }

    /// 显式登记
    pub fn register(&mut self, plugin: Plugin) -> &mut Self {
        self.insert(plugin);
        self
    }

    /// 前缀扫描：依次扫描 `search_path` 与 `extension_dirs` 中的 `<prefix>-*`
    ///
    /// 相对的扩展目录按当前工作目录解析，无法解析时跳过。
    pub fn autoload<P>(
        &mut self,
        prefix: &str,
        search_path: &[PathBuf],
        extension_dirs: &[P],
    ) -> &mut Self
    where
        P: AsRef<Path>,
    {
        let project_prefix = format!("{prefix}-");

        let mut dirs: Vec<PathBuf> = search_path.to_vec();
        for dir in extension_dirs {
            let dir = dir.as_ref();
            if dir.is_absolute() {
                dirs.push(dir.to_path_buf());
                continue;
            }

            match std::env::current_dir() {
                Ok(cwd) => dirs.push(cwd.join(dir)),
                Err(e) => {
                    debug!(
                        dir = %dir.display(),
                        error = %e,
                        "failed resolving extension dir against cwd"
                    );
                }
            }
        }

        for dir in &dirs {
            for found in Self::glob_prefixed(dir, &project_prefix) {
                let Some(short) = found
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_prefix(&project_prefix))
                    .map(str::to_string)
                else {
                    continue;
                };
                self.insert(Plugin::new(short, found));
            }
        }
        self
    }

    /// 精确查找：按路径顺序查找同名文件，首个命中者生效
    pub fn load<S>(&mut self, names: &[S], search_path: &[PathBuf]) -> &mut Self
    where
        S: AsRef<str>,
    {
        for dir in search_path {
            for name in names {
                let name = name.as_ref();
                let candidate = dir.join(name);
                if std::fs::symlink_metadata(&candidate).is_err() {
                    continue;
                }
                self.insert(Plugin::new(name, candidate));
            }
        }
        self
    }

    /// 按配置依次执行：显式条目 → 前缀扫描 → 精确查找
    pub fn discover(&mut self, config: &DiscoveryConfig, search_path: &[PathBuf]) -> &mut Self {
        for plugin in &config.plugins {
            self.insert(plugin.clone());
        }
        if let Some(prefix) = &config.prefix {
            self.autoload(prefix, search_path, config.extension_dirs.as_slice());
        }
        if !config.binaries.is_empty() {
            self.load(config.binaries.as_slice(), search_path);
        }
        self
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn into_plugins(self) -> Vec<Plugin> {
        self.plugins
    }

    fn glob_prefixed(dir: &Path, project_prefix: &str) -> Vec<PathBuf> {
        let Some(dir) = dir.to_str() else {
            return Vec::new();
        };
        let pattern = Path::new(&glob::Pattern::escape(dir))
            .join(format!("{}*", glob::Pattern::escape(project_prefix)));

        match glob::glob(&pattern.to_string_lossy()) {
            Ok(paths) => paths.filter_map(Result::ok).collect(),
            Err(e) => {
                debug!(pattern = %pattern.display(), error = %e, "invalid plugin glob");
                Vec::new()
            }
        }
    }
}

/// 解析进程 `PATH` 为目录列表，供调用方显式传入发现接口
pub fn env_search_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|raw| std::env::split_paths(&raw).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_keeps_first() {
        let mut registry = PluginRegistry::new();
        assert!(registry.insert(Plugin::new("a", "/x")));
        assert!(!registry.insert(Plugin::new("a", "/y")));
        assert_eq!(registry.plugins(), &[Plugin::new("a", "/x")]);
    }

    #[test]
    fn same_path_keeps_first() {
        let mut registry = PluginRegistry::new();
        registry
            .register(Plugin::new("a", "/x"))
            .register(Plugin::new("b", "/x"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.plugins()[0].name, "a");
    }

    #[test]
    fn distinct_plugins_keep_insertion_order() {
        let mut registry = PluginRegistry::new();
        registry
            .register(Plugin::new("b", "/b"))
            .register(Plugin::new("a", "/a"));
        let names: Vec<_> = registry.plugins().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn autoload_strips_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test-foo"), "").unwrap();
        std::fs::write(dir.path().join("test-bar"), "").unwrap();
        std::fs::write(dir.path().join("other-baz"), "").unwrap();

        let mut registry = PluginRegistry::new();
        registry.autoload("test", &[], &[dir.path()]);

        let mut names: Vec<_> = registry.plugins().iter().map(|p| p.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["bar", "foo"]);
        let foo = registry.plugins().iter().find(|p| p.name == "foo").unwrap();
        assert_eq!(foo.executable, dir.path().join("test-foo"));
    }

    #[test]
    fn autoload_prefers_search_path_over_extension_dirs() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("test-foo"), "").unwrap();
        std::fs::write(second.path().join("test-foo"), "").unwrap();

        let mut registry = PluginRegistry::new();
        registry.autoload("test", &[first.path().to_path_buf()], &[second.path()]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.plugins()[0].executable, first.path().join("test-foo"));
    }

    #[test]
    fn autoload_escapes_glob_characters_in_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("odd[dir]");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("test-foo"), "").unwrap();

        let mut registry = PluginRegistry::new();
        registry.autoload("test", &[dir.clone()], &[] as &[PathBuf]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn load_takes_first_match_in_path_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("my-plugin"), "").unwrap();
        std::fs::write(first.path().join("my-plugin"), "").unwrap();

        let mut registry = PluginRegistry::new();
        registry.load(
            &["my-plugin", "missing"],
            &[first.path().to_path_buf(), second.path().to_path_buf()],
        );

        assert_eq!(
            registry.plugins(),
            &[Plugin::new("my-plugin", first.path().join("my-plugin"))]
        );
    }

    #[test]
    fn discover_applies_explicit_entries_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test-foo"), "").unwrap();

        let config = DiscoveryConfig::builder()
            .prefix("test")
            .extension_dirs(vec![dir.path().to_path_buf()])
            .plugins(vec![Plugin::new("foo", "/opt/foo")])
            .build();

        let mut registry = PluginRegistry::new();
        registry.discover(&config, &[]);

        // 同名的扫描结果被显式条目挡住
        assert_eq!(registry.plugins(), &[Plugin::new("foo", "/opt/foo")]);
    }
}
