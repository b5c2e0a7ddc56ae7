//! 内存版事件发射器（InMemoryEmitter）
//!
//! 以事件名为键登记有序的处理器列表：
//! - `on`/`off`：注册与注销处理器；
//! - `emit`：对当前登记的每个处理器各派生一个 tokio 任务，慢处理器不会阻塞同级处理器；
//! - 发射本身从不失败，无处理器时直接返回 0。
//!
use crate::error::{HostError, HostResult};
use dashmap::DashMap;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use pluggable_core::EventType;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;

type HandlerFn<M> = Arc<dyn Fn(M) -> BoxFuture<'static, ()> + Send + Sync>;

/// 处理器注册句柄，用于注销
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct InMemoryEmitter<M> {
    handlers: DashMap<EventType, Vec<(ListenerId, HandlerFn<M>)>>,
    sequence: AtomicU64,
    runtime: Handle,
}

impl<M> InMemoryEmitter<M>
where
    M: Clone + Send + 'static,
{
    /// 处理器任务派生到给定运行时
    pub fn new(runtime: Handle) -> Self {
        Self {
            handlers: DashMap::new(),
            sequence: AtomicU64::new(1),
            runtime,
        }
    }

    /// 绑定到当前 tokio 运行时；不在运行时上下文中时返回错误
    pub fn current() -> HostResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| HostError::Runtime {
                reason: e.to_string(),
            })
    }

    /// 注册处理器，按注册顺序登记
    pub fn on<F, Fut>(&self, name: impl Into<EventType>, handler: F) -> ListenerId
    where
        F: Fn(M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = ListenerId(self.sequence.fetch_add(1, Ordering::Relaxed));
        let f: HandlerFn<M> = Arc::new(move |message| handler(message).boxed());

        self.handlers.entry(name.into()).or_default().push((id, f));
        id
    }

    /// 注销处理器，返回是否确实移除
    pub fn off(&self, name: &EventType, id: ListenerId) -> bool {
        let Some(mut list) = self.handlers.get_mut(name) else {
            return false;
        };

        let before = list.len();
        list.retain(|(listener, _)| *listener != id);
        before != list.len()
    }

    /// 发射事件，返回被派发的处理器数量
    pub fn emit(&self, name: &EventType, message: M) -> usize {
        // 先拷贝处理器快照并释放分片锁，处理器内部可以再次 on/emit
        let snapshot: Vec<HandlerFn<M>> = match self.handlers.get(name) {
            Some(list) => list.iter().map(|(_, h)| h.clone()).collect(),
            None => return 0,
        };

        for handler in &snapshot {
            self.runtime.spawn(handler(message.clone()));
        }
        snapshot.len()
    }

    pub fn listener_count(&self, name: &EventType) -> usize {
        self.handlers.get(name).map(|list| list.len()).unwrap_or(0)
    }
}
