//! 插件事件总线宿主（pluggable-host）
//!
//! 在 `pluggable-core` 的调用协议之上提供宿主侧能力：
//! - 插件发现（`registry`）：前缀扫描、精确查找与显式登记，名称与路径去重；
//! - 事件发射器（`emitter`）：按事件名登记处理器，每个处理器独立任务执行；
//! - 分发（`manager`）：事件扇出到全部插件，并以 `<event>-results` 回传关联响应；
//! - 配置（`config`）：TOML 或 builder 构造的宿主配置。
//!
pub mod config;
pub mod emitter;
pub mod error;
pub mod manager;
pub mod registry;

pub use config::{DiscoveryConfig, ManagerConfig};
pub use emitter::{InMemoryEmitter, ListenerId};
pub use error::{HostError, HostResult};
pub use manager::{Manager, ResponseEvent};
pub use registry::{PluginRegistry, env_search_path};
