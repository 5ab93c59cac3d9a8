//! The event bus: publish/subscribe with a bounded worker pool, per-handler
//! panic isolation and timeout, and an append-only history ring buffer.
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio::time::timeout;
use tracing::warn;
use uuid::Uuid;

use crate::event::error::EventSystemError;
use crate::event::filter::EventFilter;
use crate::event::types::PluginEvent;
use crate::kernel::constants::{
    DEFAULT_EVENT_HANDLER_TIMEOUT_SECS, DEFAULT_EVENT_HISTORY_CAPACITY, DEFAULT_EVENT_WORKER_POOL_SIZE,
};
use crate::kernel::error::{Error, Result};

/// A subscriber's callback. Handlers never return a `Result` — failures are
/// reported by panicking, which the bus catches and counts, never
/// propagating into the publisher.
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn handle(&self, event: &PluginEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Sync,
    Async,
    Batch,
}

#[derive(Debug, Clone, Default)]
pub struct EventBusStats {
    pub published: u64,
    pub dropped_timeouts: u64,
    pub dropped_panics: u64,
}

struct Listener {
    filter: EventFilter,
    handler: Arc<dyn EventListener>,
}

struct Counters {
    published: AtomicU64,
    timeouts: AtomicU64,
    panics: AtomicU64,
}

pub struct EventBus {
    listeners: RwLock<HashMap<Uuid, Listener>>,
    history: Mutex<VecDeque<PluginEvent>>,
    history_capacity: RwLock<usize>,
    dispatch_mode: RwLock<DispatchMode>,
    worker_semaphore: RwLock<Arc<Semaphore>>,
    handler_timeout: RwLock<Duration>,
    counters: Arc<Counters>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            history: Mutex::new(VecDeque::new()),
            history_capacity: RwLock::new(DEFAULT_EVENT_HISTORY_CAPACITY),
            dispatch_mode: RwLock::new(DispatchMode::Async),
            worker_semaphore: RwLock::new(Arc::new(Semaphore::new(DEFAULT_EVENT_WORKER_POOL_SIZE))),
            handler_timeout: RwLock::new(Duration::from_secs(DEFAULT_EVENT_HANDLER_TIMEOUT_SECS)),
            counters: Arc::new(Counters { published: AtomicU64::new(0), timeouts: AtomicU64::new(0), panics: AtomicU64::new(0) }),
        }
    }

    pub async fn subscribe(&self, filter: EventFilter, handler: Arc<dyn EventListener>) -> Uuid {
        let id = Uuid::new_v4();
        self.listeners.write().await.insert(id, Listener { filter, handler });
        id
    }

    pub async fn subscribe_all(&self, handler: Arc<dyn EventListener>) -> Uuid {
        self.subscribe(EventFilter::match_all(), handler).await
    }

    pub async fn add_plugin_listener(
        &self,
        plugin_id: &str,
        mut filter: EventFilter,
        handler: Arc<dyn EventListener>,
    ) -> Uuid {
        if !filter.plugin_ids.iter().any(|id| id == plugin_id) {
            filter.plugin_ids.push(plugin_id.to_string());
        }
        self.subscribe(filter, handler).await
    }

    pub async fn remove_listener(&self, id: Uuid) -> Result<()> {
        self.listeners
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::EventSystem(EventSystemError::ListenerNotFound(id)))
    }

    pub async fn get_history(&self) -> Vec<PluginEvent> {
        self.history.lock().await.iter().cloned().collect()
    }

    pub async fn get_plugin_history(&self, plugin_id: &str) -> Vec<PluginEvent> {
        self.history.lock().await.iter().filter(|e| e.plugin_id() == plugin_id).cloned().collect()
    }

    pub async fn set_dispatch_mode(&self, mode: DispatchMode) {
        *self.dispatch_mode.write().await = mode;
    }

    pub async fn set_worker_pool_size(&self, size: usize) {
        *self.worker_semaphore.write().await = Arc::new(Semaphore::new(size.max(1)));
    }

    pub async fn set_handler_timeout(&self, timeout: Duration) {
        *self.handler_timeout.write().await = timeout;
    }

    pub async fn set_history_capacity(&self, capacity: usize) {
        *self.history_capacity.write().await = capacity;
        let mut history = self.history.lock().await;
        while history.len() > capacity {
            history.pop_front();
        }
    }

    pub fn get_event_stats(&self) -> EventBusStats {
        EventBusStats {
            published: self.counters.published.load(Ordering::Relaxed),
            dropped_timeouts: self.counters.timeouts.load(Ordering::Relaxed),
            dropped_panics: self.counters.panics.load(Ordering::Relaxed),
        }
    }

    /// Publishes an event. Never blocks beyond enqueueing history and, under
    /// a saturated worker pool, running the handler inline as back-pressure
    /// rather than dropping it.
    pub async fn publish(&self, event: PluginEvent) {
        self.counters.published.fetch_add(1, Ordering::Relaxed);
        {
            let mut history = self.history.lock().await;
            let cap = *self.history_capacity.read().await;
            if history.len() >= cap {
                history.pop_front();
            }
            history.push_back(event.clone());
        }

        let matching: Vec<Arc<dyn EventListener>> = {
            let listeners = self.listeners.read().await;
            listeners.values().filter(|l| l.filter.matches(&event)).map(|l| l.handler.clone()).collect()
        };
        if matching.is_empty() {
            return;
        }

        let mode = *self.dispatch_mode.read().await;
        let handler_timeout = *self.handler_timeout.read().await;

        match mode {
            DispatchMode::Sync => {
                for handler in matching {
                    dispatch_one(handler, event.clone(), handler_timeout, self.counters.clone()).await;
                }
            }
            DispatchMode::Async | DispatchMode::Batch => {
                let semaphore = self.worker_semaphore.read().await.clone();
                for handler in matching {
                    match semaphore.clone().try_acquire_owned() {
                        Ok(permit) => {
                            let event = event.clone();
                            let counters = self.counters.clone();
                            tokio::spawn(async move {
                                let _permit = permit;
                                dispatch_one(handler, event, handler_timeout, counters).await;
                            });
                        }
                        Err(_) => {
                            dispatch_one(handler, event.clone(), handler_timeout, self.counters.clone()).await;
                        }
                    }
                }
            }
        }
    }
}

async fn dispatch_one(handler: Arc<dyn EventListener>, event: PluginEvent, handler_timeout: Duration, counters: Arc<Counters>) {
    let handle = tokio::spawn(async move {
        handler.handle(&event).await;
    });
    match timeout(handler_timeout, handle).await {
        Ok(Ok(())) => {}
        Ok(Err(join_err)) if join_err.is_panic() => {
            counters.panics.fetch_add(1, Ordering::Relaxed);
            warn!("event handler panicked, isolated");
        }
        Ok(Err(join_err)) => {
            warn!(error = %join_err, "event handler task failed");
        }
        Err(_) => {
            counters.timeouts.fetch_add(1, Ordering::Relaxed);
            warn!("event handler timed out");
        }
    }
}
