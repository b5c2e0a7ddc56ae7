//! 核心层统一错误定义
//!
//! 覆盖信封编解码、插件子进程调用与临时文件卸载三类失败，
//! 调用期错误最终都会被写入 `EventResponse.error`，不会中断整体分发。
//!
use std::path::PathBuf;
use thiserror::Error;

/// 统一错误类型（核心库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CoreError {
    // --- 信封编解码 ---
    #[error("encoding error: {source}")]
    Encoding {
        #[source]
        source: serde_json::Error,
    },
    #[error("decoding error: {source}")]
    Decoding {
        #[source]
        source: serde_json::Error,
    },

    // --- 插件调用 ---
    #[error("failed to spawn plugin {}: {source}", executable.display())]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("plugin {} exited with {status}: {stderr}", executable.display())]
    Process {
        executable: PathBuf,
        status: String,
        stderr: String,
    },
    #[error("temporary file error: action={action}, path={}, reason={source}", path.display())]
    TempFile {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- 插件侧 ---
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid plugin invocation: {reason}")]
    InvalidInvocation { reason: String },
}

impl CoreError {
    pub fn encoding(source: serde_json::Error) -> Self {
        CoreError::Encoding { source }
    }

    pub fn decoding(source: serde_json::Error) -> Self {
        CoreError::Decoding { source }
    }

    pub fn temp_file(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::TempFile {
            action,
            path: path.into(),
            source,
        }
    }
}

/// 统一 Result 类型别名
pub type CoreResult<T> = Result<T, CoreError>;
