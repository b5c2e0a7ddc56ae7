//! 插件侧处理器工厂（PluginFactory）
//!
//! 供插件可执行文件使用：解析宿主传入的事件、读回卸载到文件的负载，
//! 按事件类型路由到对应处理器，并把响应 JSON 写到输出。
//!
//! ```rust,no_run
//! use pluggable_core::envelope::EventResponse;
//! use pluggable_core::factory::PluginFactory;
//!
//! fn main() -> pluggable_core::error::CoreResult<()> {
//!     PluginFactory::new()
//!         .with("package.install", |event| {
//!             EventResponse::builder()
//!                 .state("installed")
//!                 .data(event.data.clone())
//!                 .build()
//!         })
//!         .serve()
//! }
//! ```
use crate::envelope::{Event, EventResponse, EventType};
use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;
use std::io::{Read, Write};

/// 插件处理器：接收事件，总是返回一个响应
pub type PluginHandler = Box<dyn Fn(&Event) -> EventResponse + Send + Sync>;

/// 事件类型到处理器的映射
#[derive(Default)]
pub struct PluginFactory {
    handlers: HashMap<EventType, PluginHandler>,
}

impl PluginFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为事件类型关联处理器，重复注册时后者覆盖前者
    pub fn add<F>(&mut self, event: impl Into<EventType>, handler: F) -> &mut Self
    where
        F: Fn(&Event) -> EventResponse + Send + Sync + 'static,
    {
        self.handlers.insert(event.into(), Box::new(handler));
        self
    }

    pub fn with<F>(mut self, event: impl Into<EventType>, handler: F) -> Self
    where
        F: Fn(&Event) -> EventResponse + Send + Sync + 'static,
    {
        self.add(event, handler);
        self
    }

    pub fn handles(&self, event: &EventType) -> bool {
        self.handlers.contains_key(event)
    }

    /// 从 `input` 读取事件 JSON，处理后把响应写入 `output`
    ///
    /// 没有匹配处理器时写出空响应。
    pub fn run<R, W>(&self, name: &EventType, mut input: R, mut output: W) -> CoreResult<()>
    where
        R: Read,
        W: Write,
    {
        let mut raw = String::new();
        input.read_to_string(&mut raw)?;

        let mut event = Event::from_json(&raw)?;
        event.resolve_file()?;

        let response = match self.handlers.get(name) {
            Some(handler) => handler(&event),
            None => {
                tracing::debug!(event = %name, "no handler registered");
                EventResponse::default()
            }
        };

        output.write_all(response.to_json()?.as_bytes())?;
        output.flush()?;
        Ok(())
    }

    /// 以进程参数运行：`argv[1]` 为事件名，`argv[2]` 为事件 JSON，响应写到标准输出
    pub fn serve(&self) -> CoreResult<()> {
        self.serve_args(std::env::args().skip(1))
    }

    pub fn serve_args<I>(&self, args: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let (Some(name), Some(payload)) = (args.next(), args.next()) else {
            return Err(CoreError::InvalidInvocation {
                reason: "expected <event name> <event json> arguments".to_string(),
            });
        };

        let stdout = std::io::stdout();
        self.run(&EventType::from(name), payload.as_bytes(), stdout.lock())
    }
}
