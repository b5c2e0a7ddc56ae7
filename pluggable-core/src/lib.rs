//! 插件事件总线核心库（pluggable-core）
//!
//! 宿主进程以命名事件驱动外部可执行插件：每个插件对每个事件被调用一次，
//! 通过命令行参数接收事件，通过标准输出返回结构化响应。本 crate 提供：
//! - 事件信封（`envelope`）：`Event`/`EventResponse` 及其 JSON 约定；
//! - 插件描述（`plugin`）与调用协议（`invoke`）：参数编码、大负载卸载、错误捕获；
//! - 插件侧工厂（`factory`）：在插件可执行文件内解析事件并写回响应。
//!
//! 分发、订阅与插件发现位于 `pluggable-host`。
//!
pub mod envelope;
pub mod error;
pub mod factory;
pub mod invoke;
pub mod plugin;

pub use envelope::{Event, EventResponse, EventType, RESULTS_SUFFIX};
pub use error::{CoreError, CoreResult};
pub use plugin::Plugin;
