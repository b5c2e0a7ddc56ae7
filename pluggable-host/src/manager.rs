//! 插件管理器（Manager）
//!
//! 编排“发布 → 扇出 → 关联响应”：
//! - 构建时把每个插件挂接到每个受管事件名上（全有或全无），之后插件与事件列表只读；
//! - `publish`：编码负载并发射事件，不等待插件完成；
//! - 每个（插件，事件）对在独立任务中调用插件，结果以 `<event>-results` 重新发射，
//!   即使调用失败也会发射带 `error` 的响应；
//! - `response`/`on_result`：登记响应监听器，每个插件响应各调用一次，相互之间无顺序保证；
//! - `publish_and_collect`：在监听机制之上的同步收集，按期望数量或超时返回。
//!
//! 生命周期：一个管理器在构建时创建并持有唯一一条总线，直至被丢弃。
//!
use crate::config::ManagerConfig;
use crate::emitter::{InMemoryEmitter, ListenerId};
use crate::error::{HostError, HostResult};
use crate::registry::PluginRegistry;
use bon::bon;
use pluggable_core::invoke::{Invoker, ProcessInvoker};
use pluggable_core::{Event, EventResponse, EventType, Plugin, RESULTS_SUFFIX};
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// 关联响应事件：哪个插件、对哪个事件实例、返回了什么
#[derive(Debug, Clone)]
pub struct ResponseEvent {
    pub plugin: Plugin,
    pub response: EventResponse,
    /// 触发该响应的事件实例
    pub event: Arc<Event>,
}

impl ResponseEvent {
    /// 是否由给定的事件实例触发（按实例而非事件名判断）
    pub fn is_from(&self, event: &Arc<Event>) -> bool {
        Arc::ptr_eq(&self.event, event)
    }
}

type EventEmitter = InMemoryEmitter<Arc<Event>>;
type ResultEmitter = InMemoryEmitter<Arc<ResponseEvent>>;

/// 插件集合 + 受管事件集合 + 总线
#[derive(Clone)]
pub struct Manager {
    plugins: Arc<[Plugin]>,
    events: Arc<[EventType]>,
    bus: Arc<EventEmitter>,
    results: Arc<ResultEmitter>,
}

#[bon]
impl Manager {
    /// 构建并完成订阅；需在 tokio 运行时上下文中调用
    ///
    /// 未指定 `invoker` 时使用默认配置的 `ProcessInvoker`。
    #[builder]
    pub fn new(
        #[builder(default)] events: Vec<EventType>,
        #[builder(default)] registry: PluginRegistry,
        invoker: Option<Arc<dyn Invoker>>,
    ) -> HostResult<Self> {
        let manager = Self {
            plugins: registry.into_plugins().into(),
            events: events.into(),
            bus: Arc::new(EventEmitter::current()?),
            results: Arc::new(ResultEmitter::current()?),
        };

        let invoker = invoker.unwrap_or_else(|| Arc::new(ProcessInvoker::default()));
        manager.subscribe(invoker);
        Ok(manager)
    }
}

impl Manager {
    /// 按配置发现插件并构建管理器，`search_path` 由调用方显式给出
    pub fn from_config(config: &ManagerConfig, search_path: &[PathBuf]) -> HostResult<Self> {
        let mut registry = PluginRegistry::new();
        registry.discover(&config.discovery, search_path);

        Self::builder()
            .events(config.events.clone())
            .registry(registry)
            .invoker(Arc::new(ProcessInvoker::new(config.invoker.clone())))
            .build()
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn events(&self) -> &[EventType] {
        &self.events
    }

    fn subscribe(&self, invoker: Arc<dyn Invoker>) {
        for plugin in self.plugins.iter() {
            let plugin = Arc::new(plugin.clone());

            for event in self.events.iter() {
                let plugin = plugin.clone();
                let invoker = invoker.clone();
                let results = self.results.clone();

                self.bus.on(event.clone(), move |event: Arc<Event>| {
                    let plugin = plugin.clone();
                    let invoker = invoker.clone();
                    let results = results.clone();
                    async move { Self::propagate(&plugin, invoker.as_ref(), &results, event).await }
                });
            }
        }

        info!(
            plugins = self.plugins.len(),
            events = self.events.len(),
            "plugins subscribed"
        );
    }

    async fn propagate(
        plugin: &Plugin,
        invoker: &dyn Invoker,
        results: &ResultEmitter,
        event: Arc<Event>,
    ) {
        let response = match invoker.run(plugin, &event).await {
            Ok(response) => response,
            Err(failure) => {
                warn!(
                    plugin = %plugin.name,
                    event = %event.name,
                    error = %failure,
                    "plugin invocation failed"
                );
                failure.into_response()
            }
        };

        let name = event.response_name(RESULTS_SUFFIX);
        let listeners = results.emit(
            &name,
            Arc::new(ResponseEvent {
                plugin: plugin.clone(),
                response,
                event,
            }),
        );
        debug!(plugin = %plugin.name, event = %name, listeners, "response emitted");
    }

    /// 构造事件并发射，返回被发射的事件实例；编码失败时不会发射
    pub fn publish<T>(&self, event: impl Into<EventType>, payload: &T) -> HostResult<Arc<Event>>
    where
        T: Serialize + ?Sized,
    {
        let event = Arc::new(Event::new(event, payload)?);
        self.emit(event.clone());
        Ok(event)
    }

    /// 发射一个已构造好的事件（例如已指向负载文件的事件）
    pub fn publish_event(&self, event: Event) -> Arc<Event> {
        let event = Arc::new(event);
        self.emit(event.clone());
        event
    }

    fn emit(&self, event: Arc<Event>) -> usize {
        let name = event.name.clone();
        let handlers = self.bus.emit(&name, event);
        debug!(event = %name, handlers, "event published");
        handlers
    }

    /// 登记响应监听器：每个插件的响应各调用一次
    pub fn response<F>(&self, event: impl Into<EventType>, listener: F) -> ListenerId
    where
        F: Fn(&Plugin, &EventResponse) + Send + Sync + 'static,
    {
        let listener = Arc::new(listener);
        self.on_result(event, move |result: Arc<ResponseEvent>| {
            let listener = listener.clone();
            async move { listener(&result.plugin, &result.response) }
        })
    }

    /// 登记接收完整 `ResponseEvent` 的异步监听器
    pub fn on_result<F, Fut>(&self, event: impl Into<EventType>, listener: F) -> ListenerId
    where
        F: Fn(Arc<ResponseEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.results.on(Self::results_name(event), listener)
    }

    pub fn remove_response(&self, event: impl Into<EventType>, id: ListenerId) -> bool {
        self.results.off(&Self::results_name(event), id)
    }

    /// 发布并等待 `expected` 个属于本次发布的响应
    ///
    /// 超时返回 `HostError::CollectTimeout`；期间其他发布产生的响应会被忽略。
    pub async fn publish_and_collect<T>(
        &self,
        event: impl Into<EventType>,
        payload: &T,
        expected: usize,
        timeout: Duration,
    ) -> HostResult<Vec<Arc<ResponseEvent>>>
    where
        T: Serialize + ?Sized,
    {
        let event = Arc::new(Event::new(event, payload)?);
        let results_name = event.response_name(RESULTS_SUFFIX);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let origin = event.clone();
        let listener = self
            .results
            .on(results_name.clone(), move |result: Arc<ResponseEvent>| {
                let tx = tx.clone();
                let origin = origin.clone();
                async move {
                    if result.is_from(&origin) {
                        let _ = tx.send(result);
                    }
                }
            });

        self.emit(event.clone());

        let mut collected = Vec::with_capacity(expected);
        let outcome = tokio::time::timeout(timeout, async {
            while collected.len() < expected {
                match rx.recv().await {
                    Some(result) => collected.push(result),
                    None => break,
                }
            }
        })
        .await;

        self.results.off(&results_name, listener);

        if outcome.is_err() {
            warn!(
                event = %event.name,
                expected,
                received = collected.len(),
                "timed out collecting plugin responses"
            );
            return Err(HostError::CollectTimeout {
                event: event.name.to_string(),
                expected,
                received: collected.len(),
            });
        }

        Ok(collected)
    }

    fn results_name(event: impl Into<EventType>) -> EventType {
        Event {
            name: event.into(),
            ..Default::default()
        }
        .response_name(RESULTS_SUFFIX)
    }
}
