//! 子进程调用器（ProcessInvoker）
//!
//! 调用约定：`<executable> <事件名> <事件 JSON>`，插件在标准输出写出响应 JSON。
//! 负载超过阈值时，事件副本的 `data` 被清空，`file` 指向一次性临时文件，
//! 该文件在 `run` 返回时（任意路径）被删除。
//!
use super::{InvocationFailure, Invoker, InvokerConfig};
use crate::envelope::{Event, EventResponse};
use crate::error::{CoreError, CoreResult};
use crate::plugin::Plugin;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

/// 以子进程方式执行插件
#[derive(Clone, Debug, Default)]
pub struct ProcessInvoker {
    config: InvokerConfig,
}

impl ProcessInvoker {
    pub fn new(config: InvokerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// 事件已指向负载文件时，先读回内联负载，再统一套用卸载规则
    async fn inline_event(&self, event: &Event) -> CoreResult<Event> {
        let mut inline = event.clone();
        if inline.has_file() {
            inline.data = tokio::fs::read_to_string(&inline.file_path)
                .await
                .map_err(|e| CoreError::temp_file("read", &inline.file_path, e))?;
            inline.file_path.clear();
        }
        Ok(inline)
    }

    async fn offload(&self, event: Event) -> CoreResult<(Event, Option<NamedTempFile>)> {
        if event.data.len() <= self.config.offload_threshold {
            return Ok((event, None));
        }

        let dir = self
            .config
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let temp = tempfile::Builder::new()
            .prefix(&self.config.temp_prefix)
            .tempfile_in(&dir)
            .map_err(|e| CoreError::temp_file("create", &dir, e))?;

        // 写入失败时 temp 随即被 drop 并删除
        tokio::fs::write(temp.path(), event.data.as_bytes())
            .await
            .map_err(|e| CoreError::temp_file("write", temp.path(), e))?;

        debug!(
            event = %event.name,
            bytes = event.data.len(),
            file = %temp.path().display(),
            "payload offloaded to temporary file"
        );

        let offloaded = Event {
            name: event.name,
            data: String::new(),
            file_path: temp.path().to_string_lossy().into_owned(),
        };
        Ok((offloaded, Some(temp)))
    }

    async fn execute(
        &self,
        plugin: &Plugin,
        event: &Event,
    ) -> Result<EventResponse, InvocationFailure> {
        let encoded = event.to_json().map_err(InvocationFailure::new)?;

        debug!(plugin = %plugin.name, event = %event.name, "spawning plugin");
        let output = Command::new(&plugin.executable)
            .arg(event.name.as_str())
            .arg(&encoded)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| {
                InvocationFailure::new(CoreError::Spawn {
                    executable: plugin.executable.clone(),
                    source,
                })
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InvocationFailure::new(CoreError::Process {
                executable: plugin.executable.clone(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            }));
        }

        let response = EventResponse::from_slice(&output.stdout).map_err(InvocationFailure::new)?;
        if !response.logs.is_empty() {
            debug!(plugin = %plugin.name, logs = %response.logs, "plugin logs");
        }
        Ok(response)
    }

    fn cleanup(
        temp: NamedTempFile,
        result: Result<EventResponse, InvocationFailure>,
    ) -> Result<EventResponse, InvocationFailure> {
        let path = temp.path().to_path_buf();
        match temp.close() {
            Ok(()) => result,
            // 插件自行删除了文件
            Err(e) if e.kind() == ErrorKind::NotFound => result,
            Err(e) => match result {
                Ok(response) => Err(InvocationFailure::with_response(
                    response,
                    CoreError::temp_file("remove", path, e),
                )),
                Err(failure) => {
                    warn!(file = %path.display(), error = %e, "failed to remove temporary payload file");
                    Err(failure)
                }
            },
        }
    }
}

#[async_trait]
impl Invoker for ProcessInvoker {
    async fn run(&self, plugin: &Plugin, event: &Event) -> Result<EventResponse, InvocationFailure> {
        let inline = self
            .inline_event(event)
            .await
            .map_err(InvocationFailure::new)?;
        let (outgoing, temp) = self.offload(inline).await.map_err(InvocationFailure::new)?;

        let result = self.execute(plugin, &outgoing).await;

        match temp {
            Some(temp) => Self::cleanup(temp, result),
            None => result,
        }
    }
}
