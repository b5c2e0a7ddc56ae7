use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 插件：一个挂接在事件上的外部可执行文件
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plugin {
    /// 逻辑名称
    pub name: String,
    /// 可执行文件路径
    pub executable: PathBuf,
}

impl Plugin {
    pub fn new(name: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// 名称或路径任一相同即视为同一插件
    pub fn collides_with(&self, other: &Plugin) -> bool {
        self.name == other.name || self.executable == other.executable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collides_on_either_field() {
        let a = Plugin::new("a", "/x");
        assert!(a.collides_with(&Plugin::new("a", "/y")));
        assert!(a.collides_with(&Plugin::new("b", "/x")));
        assert!(!a.collides_with(&Plugin::new("b", "/y")));
    }
}
