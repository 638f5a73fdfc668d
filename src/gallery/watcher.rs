//! # 文件夹监听模块
//!
//! ## 设计思路
//!
//! - `WatchController` 保证每个视图同一时刻至多一个活动订阅：
//!   启动新订阅前一定先拆除旧订阅，Drop 时也会拆除。
//! - 订阅的具体实现抽象为 `WatchBackend`，默认使用 `notify`；
//!   `ManualWatchBackend` 供无原生监听能力的宿主（轮询）与测试使用。
//! - 任何变化只回调一次无参 `on_change`，调用方自行全量重扫，不做增量 diff。
//! - 递归订阅被拒绝时回退为非递归订阅（嵌套子目录的变化可能丢失）；
//!   完全失败时记录为未激活，之后只能依赖手动刷新。
//!
//! ## 节流
//!
//! 文件批量复制会在短时间内产生大量事件。`ChangeDebouncer` 采用"首沿立即 + 尾沿补发"：
//! 距离上次重载已超过最小间隔则立即重载；否则只安排一次尾沿重载。

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use notify::{EventKind, RecursiveMode, Watcher};
use serde::Serialize;

use super::GalleryError;

/// 变化回调。由监听线程调用，因此必须是 `Send + Sync`。
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// 订阅模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WatchMode {
    Recursive,
    NonRecursive,
}

/// 启动监听后的结果状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchStatus {
    Active(WatchMode),
    /// 请求了递归订阅，但只拿到了非递归订阅。
    Degraded,
    /// 订阅完全失败，只能依赖手动刷新。
    Inactive(String),
}

/// 订阅句柄：被 drop 即拆除。
pub trait WatchGuard: Send {}

impl<T: Send> WatchGuard for T {}

/// 文件系统变化通知的提供者。
pub trait WatchBackend: Send + Sync {
    fn subscribe(
        &self,
        root: &Path,
        mode: WatchMode,
        on_change: ChangeCallback,
    ) -> Result<Box<dyn WatchGuard>, GalleryError>;
}

/// 基于 `notify` 推荐实现（inotify / FSEvents / ReadDirectoryChangesW）的后端。
#[derive(Debug, Default, Clone, Copy)]
pub struct NotifyBackend;

impl WatchBackend for NotifyBackend {
    fn subscribe(
        &self,
        root: &Path,
        mode: WatchMode,
        on_change: ChangeCallback,
    ) -> Result<Box<dyn WatchGuard>, GalleryError> {
        let mut watcher = notify::recommended_watcher(
            move |res: notify::Result<notify::Event>| match res {
                // 读取文件（包括物化缩略图本身）会产生访问事件，不算变化
                Ok(event) if matches!(event.kind, EventKind::Access(_)) => {}
                Ok(event) => {
                    log::trace!("👀 文件变化: {:?} {:?}", event.kind, event.paths);
                    on_change();
                }
                Err(err) => log::warn!("文件监听回调错误: {}", err),
            },
        )
        .map_err(|e| GalleryError::WatchUnavailable(e.to_string()))?;

        let recursive_mode = match mode {
            WatchMode::Recursive => RecursiveMode::Recursive,
            WatchMode::NonRecursive => RecursiveMode::NonRecursive,
        };
        watcher
            .watch(root, recursive_mode)
            .map_err(|e| GalleryError::WatchUnavailable(e.to_string()))?;

        Ok(Box::new(watcher))
    }
}

/// 手动触发的后端：记录订阅，由调用方通过 [`ManualWatchBackend::trigger`] 发出变化。
#[derive(Default, Clone)]
pub struct ManualWatchBackend {
    inner: Arc<ManualInner>,
}

#[derive(Default)]
struct ManualInner {
    next_id: AtomicU64,
    subscriptions: Mutex<Vec<ManualSubscription>>,
    refuse_recursive: AtomicBool,
    refuse_all: AtomicBool,
}

struct ManualSubscription {
    id: u64,
    root: PathBuf,
    mode: WatchMode,
    on_change: ChangeCallback,
}

struct ManualGuard {
    id: u64,
    inner: Arc<ManualInner>,
}

impl Drop for ManualGuard {
    fn drop(&mut self) {
        let mut subs = lock_recover(&self.inner.subscriptions);
        subs.retain(|s| s.id != self.id);
    }
}

impl ManualWatchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟平台不支持递归订阅。
    pub fn refuse_recursive(&self, refuse: bool) {
        self.inner.refuse_recursive.store(refuse, Ordering::SeqCst);
    }

    /// 模拟订阅完全失败。
    pub fn refuse_all(&self, refuse: bool) {
        self.inner.refuse_all.store(refuse, Ordering::SeqCst);
    }

    /// 当前存活的订阅（根目录 + 模式）。
    pub fn live(&self) -> Vec<(PathBuf, WatchMode)> {
        lock_recover(&self.inner.subscriptions)
            .iter()
            .map(|s| (s.root.clone(), s.mode))
            .collect()
    }

    /// 向所有监听 `root` 的订阅发出一次变化，返回被通知的订阅数。
    pub fn trigger(&self, root: &Path) -> usize {
        let callbacks: Vec<ChangeCallback> = lock_recover(&self.inner.subscriptions)
            .iter()
            .filter(|s| s.root == root)
            .map(|s| Arc::clone(&s.on_change))
            .collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }
}

impl WatchBackend for ManualWatchBackend {
    fn subscribe(
        &self,
        root: &Path,
        mode: WatchMode,
        on_change: ChangeCallback,
    ) -> Result<Box<dyn WatchGuard>, GalleryError> {
        if self.inner.refuse_all.load(Ordering::SeqCst) {
            return Err(GalleryError::WatchUnavailable("subscription refused".to_string()));
        }
        if mode == WatchMode::Recursive && self.inner.refuse_recursive.load(Ordering::SeqCst) {
            return Err(GalleryError::WatchUnavailable(
                "recursive watching not supported".to_string(),
            ));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        lock_recover(&self.inner.subscriptions).push(ManualSubscription {
            id,
            root: root.to_path_buf(),
            mode,
            on_change,
        });
        Ok(Box::new(ManualGuard {
            id,
            inner: Arc::clone(&self.inner),
        }))
    }
}

fn lock_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("监听订阅表锁中毒，继续使用恢复数据");
            poisoned.into_inner()
        }
    }
}

/// 活动订阅：绑定且只绑定一个根目录。
pub struct WatchSubscription {
    root: PathBuf,
    mode: WatchMode,
    _guard: Box<dyn WatchGuard>,
}

/// 启动 / 拆除计数，用于观察"至多一个订阅"的约束。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WatchStats {
    pub started: u64,
    pub stopped: u64,
}

/// 每个视图一个的监听控制器。
pub struct WatchController {
    backend: Arc<dyn WatchBackend>,
    active: Option<WatchSubscription>,
    stats: WatchStats,
}

impl WatchController {
    pub fn new(backend: Arc<dyn WatchBackend>) -> Self {
        Self {
            backend,
            active: None,
            stats: WatchStats::default(),
        }
    }

    /// 开始监听 `root`；已有订阅时先拆除。
    pub fn start(&mut self, root: &Path, recursive: bool, on_change: ChangeCallback) -> WatchStatus {
        self.stop();

        let preferred = if recursive {
            WatchMode::Recursive
        } else {
            WatchMode::NonRecursive
        };

        match self.backend.subscribe(root, preferred, Arc::clone(&on_change)) {
            Ok(guard) => {
                self.activate(root, preferred, guard);
                WatchStatus::Active(preferred)
            }
            Err(err) if recursive => {
                log::warn!("⚠️ 递归监听失败，回退为非递归监听: {}", err);
                match self.backend.subscribe(root, WatchMode::NonRecursive, on_change) {
                    Ok(guard) => {
                        self.activate(root, WatchMode::NonRecursive, guard);
                        WatchStatus::Degraded
                    }
                    Err(err) => {
                        log::warn!("⚠️ 文件监听不可用，仅支持手动刷新: {}", err);
                        WatchStatus::Inactive(err.to_string())
                    }
                }
            }
            Err(err) => {
                log::warn!("⚠️ 文件监听不可用，仅支持手动刷新: {}", err);
                WatchStatus::Inactive(err.to_string())
            }
        }
    }

    fn activate(&mut self, root: &Path, mode: WatchMode, guard: Box<dyn WatchGuard>) {
        self.stats.started += 1;
        log::info!("👀 开始监听 {} ({:?})", root.display(), mode);
        self.active = Some(WatchSubscription {
            root: root.to_path_buf(),
            mode,
            _guard: guard,
        });
    }

    /// 拆除当前订阅；没有订阅时返回 `false`。
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(subscription) => {
                log::info!("🛑 停止监听 {}", subscription.root.display());
                drop(subscription);
                self.stats.stopped += 1;
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn root(&self) -> Option<&Path> {
        self.active.as_ref().map(|s| s.root.as_path())
    }

    pub fn mode(&self) -> Option<WatchMode> {
        self.active.as_ref().map(|s| s.mode)
    }

    pub fn stats(&self) -> WatchStats {
        self.stats
    }
}

impl Drop for WatchController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn debounce_remaining(elapsed: Duration, min_interval: Duration) -> Option<Duration> {
    if elapsed >= min_interval {
        None
    } else {
        Some(min_interval - elapsed)
    }
}

/// 对一次变化事件的处理决定。
#[derive(Debug, PartialEq, Eq)]
pub enum DebounceDecision {
    ReloadNow,
    Defer {
        remaining: Duration,
        schedule_tail: bool,
    },
}

/// 监听事件节流器。
#[derive(Debug)]
pub struct ChangeDebouncer {
    min_interval: Duration,
    last_reload_at: Option<Instant>,
    tail_pending: bool,
}

impl ChangeDebouncer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_reload_at: None,
            tail_pending: false,
        }
    }

    /// 收到一次变化事件。
    pub fn on_change(&mut self, now: Instant) -> DebounceDecision {
        let elapsed = self
            .last_reload_at
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(self.min_interval);

        match debounce_remaining(elapsed, self.min_interval) {
            Some(remaining) => {
                let schedule_tail = !self.tail_pending;
                self.tail_pending = true;
                DebounceDecision::Defer {
                    remaining,
                    schedule_tail,
                }
            }
            None if self.tail_pending => DebounceDecision::Defer {
                remaining: Duration::ZERO,
                schedule_tail: false,
            },
            None => {
                self.last_reload_at = Some(now);
                DebounceDecision::ReloadNow
            }
        }
    }

    /// 尾沿重载已执行。
    pub fn on_tail_fired(&mut self, now: Instant) {
        self.tail_pending = false;
        self.last_reload_at = Some(now);
    }

    /// 任意来源（手动刷新、设置变更）的重载都会重置节流窗口。
    pub fn mark_reloaded(&mut self, now: Instant) {
        self.last_reload_at = Some(now);
    }
}
