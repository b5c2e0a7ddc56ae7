//! 插件调用（invoke）
//!
//! - `Invoker`：对单个插件执行单个事件的统一协议；
//! - `InvocationFailure`：调用失败时仍携带一份已填好 `error` 的响应，便于分发方照常转发；
//! - `ProcessInvoker`（特性 `process`）：以子进程方式执行插件，负责大负载卸载与错误捕获。
//!
use crate::envelope::{Event, EventResponse};
use crate::error::CoreError;
use crate::plugin::Plugin;
use async_trait::async_trait;

mod config;
#[cfg(feature = "process")]
mod process;

pub use config::{DEFAULT_OFFLOAD_THRESHOLD, DEFAULT_TEMP_PREFIX, InvokerConfig};
#[cfg(feature = "process")]
pub use process::ProcessInvoker;

/// 插件调用器：以一个插件处理一个事件
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn run(&self, plugin: &Plugin, event: &Event) -> Result<EventResponse, InvocationFailure>;
}

/// 调用失败：携带响应与具体原因
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct InvocationFailure {
    pub response: EventResponse,
    #[source]
    pub error: CoreError,
}

impl InvocationFailure {
    /// 以错误构造失败结果，响应的 `error` 字段填入诊断信息
    pub fn new(error: CoreError) -> Self {
        Self::with_response(EventResponse::default(), error)
    }

    /// 保留插件已返回的响应字段，仅在 `error` 为空时补写诊断信息
    pub fn with_response(mut response: EventResponse, error: CoreError) -> Self {
        if !response.errored() {
            response.error = error.to_string();
        }
        Self { response, error }
    }

    pub fn into_response(self) -> EventResponse {
        let Self {
            mut response,
            error,
        } = self;
        if !response.errored() {
            response.error = error.to_string();
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_fills_response_error() {
        let failure = InvocationFailure::new(CoreError::InvalidInvocation {
            reason: "boom".into(),
        });
        assert!(failure.response.errored());
        assert!(failure.into_response().error.contains("boom"));
    }

    #[test]
    fn failure_keeps_existing_error_message() {
        let response = EventResponse::builder().error("plugin said no").build();
        let failure = InvocationFailure::with_response(
            response,
            CoreError::InvalidInvocation {
                reason: "other".into(),
            },
        );
        assert_eq!(failure.into_response().error, "plugin said no");
    }

    #[test]
    fn into_response_fills_cleared_error() {
        let mut failure = InvocationFailure::new(CoreError::InvalidInvocation {
            reason: "lost".into(),
        });
        failure.response.error.clear();
        assert!(failure.into_response().error.contains("lost"));
    }
}
