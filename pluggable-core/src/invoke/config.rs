use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `data` 超过该字节数即改为临时文件传递，避免触及命令行参数长度上限
pub const DEFAULT_OFFLOAD_THRESHOLD: usize = 1 << 13;
/// 临时负载文件名前缀
pub const DEFAULT_TEMP_PREFIX: &str = "pluggable";

/// 调用器配置
#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvokerConfig {
    /// 卸载阈值（字节）
    #[builder(default = DEFAULT_OFFLOAD_THRESHOLD)]
    pub offload_threshold: usize,
    /// 临时文件名前缀
    #[builder(default = DEFAULT_TEMP_PREFIX.to_string(), into)]
    pub temp_prefix: String,
    /// 临时文件目录，缺省为系统临时目录
    pub temp_dir: Option<PathBuf>,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            offload_threshold: DEFAULT_OFFLOAD_THRESHOLD,
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            temp_dir: None,
        }
    }
}
