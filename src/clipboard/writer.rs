//! # 剪贴板写入模块
//!
//! ## 设计思路
//!
//! 将与操作系统剪贴板交互的逻辑独立为 `ClipboardSink`，便于隔离平台不稳定因素，
//! 也让无图形环境（CI、无头宿主）可以换成内存实现。
//!
//! ## 实现思路
//!
//! - `SystemClipboard` 基于 `arboard`，每次写入新建句柄，避免跨线程持有。
//! - 写入失败按类型分类：被占用（Busy）、瞬时（Transient）可重试，致命（Fatal）立即终止。
//! - 重试采用指数退避，并受总预算约束；整个过程在阻塞线程中执行。

use std::borrow::Cow;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::pipeline::PreparedClipboardImage;
use super::{ClipboardConfig, CopyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardFailureKind {
    Busy,
    Transient,
    Fatal,
}

/// 单次写入失败。
#[derive(Debug, Clone)]
pub struct ClipboardWriteFailure {
    pub kind: ClipboardFailureKind,
    pub message: String,
}

impl ClipboardWriteFailure {
    pub fn busy(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Busy,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Transient,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: ClipboardFailureKind::Fatal,
            message: message.into(),
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self.kind, ClipboardFailureKind::Busy | ClipboardFailureKind::Transient)
    }
}

/// 位图剪贴板的写入端。
pub trait ClipboardSink: Send + Sync {
    fn write_image(&self, image: &PreparedClipboardImage) -> Result<(), ClipboardWriteFailure>;
}

/// 系统剪贴板（`arboard`）。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn write_image(&self, image: &PreparedClipboardImage) -> Result<(), ClipboardWriteFailure> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| ClipboardWriteFailure::busy(format!("cannot open clipboard: {}", e)))?;

        let image_data = arboard::ImageData {
            width: image.width,
            height: image.height,
            bytes: Cow::Borrowed(&image.bytes),
        };

        clipboard
            .set_image(image_data)
            .map_err(|e| ClipboardWriteFailure::transient(format!("write failed: {}", e)))
    }
}

/// 内存剪贴板：保存最后一次写入的位图，可预设若干次失败。
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    last: Mutex<Option<PreparedClipboardImage>>,
    writes: AtomicUsize,
    failures: Mutex<Vec<ClipboardWriteFailure>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接下来的写入依次返回这些失败，用完后恢复成功。
    pub fn fail_with(&self, failures: Vec<ClipboardWriteFailure>) {
        let mut queued = lock_recover(&self.failures);
        *queued = failures;
        queued.reverse();
    }

    /// 写入尝试次数（含失败）。
    pub fn attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn last_image(&self) -> Option<PreparedClipboardImage> {
        lock_recover(&self.last).clone()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_image(&self, image: &PreparedClipboardImage) -> Result<(), ClipboardWriteFailure> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = lock_recover(&self.failures).pop() {
            return Err(failure);
        }
        *lock_recover(&self.last) = Some(image.clone());
        Ok(())
    }
}

fn lock_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn compute_backoff_delay(base_delay_ms: u64, attempt: u32, max_delay_ms: u64) -> u64 {
    base_delay_ms
        .saturating_mul(1_u64 << attempt.saturating_sub(1).min(8))
        .min(max_delay_ms.max(base_delay_ms))
}

fn would_exceed_retry_budget(elapsed_ms: u64, wait_ms: u64, budget_ms: u64) -> bool {
    elapsed_ms.saturating_add(wait_ms) > budget_ms
}

/// 在当前（阻塞）线程中写入并按配置重试。
pub(crate) fn write_with_retry(
    sink: &dyn ClipboardSink,
    image: &PreparedClipboardImage,
    config: &ClipboardConfig,
) -> Result<(), CopyError> {
    log::debug!("📋 准备复制到剪贴板 - {}x{}", image.width, image.height);

    let retry_count = config.clipboard_retries.max(1);
    let started = Instant::now();
    let mut last_error = None;

    for attempt in 1..=retry_count {
        if attempt > 1 {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            let wait_ms = compute_backoff_delay(
                config.clipboard_retry_delay_ms.max(1),
                attempt - 1,
                config.clipboard_retry_max_delay_ms,
            );
            if would_exceed_retry_budget(elapsed_ms, wait_ms, config.clipboard_retry_max_total_ms) {
                log::warn!(
                    "⏱️ 跳过第 {} 次重试：等待 {}ms 会超过预算 {}ms",
                    attempt,
                    wait_ms,
                    config.clipboard_retry_max_total_ms
                );
                break;
            }
            log::debug!("🔄 重试 {}/{}，等待 {}ms", attempt, retry_count, wait_ms);
            std::thread::sleep(Duration::from_millis(wait_ms));
        }

        match sink.write_image(image) {
            Ok(()) => {
                log::info!("✅ 复制成功 (尝试 {})", attempt);
                return Ok(());
            }
            Err(failure) => {
                log::warn!(
                    "❌ 尝试 {} 失败: {}（kind={:?}）",
                    attempt,
                    failure.message,
                    failure.kind
                );
                let retryable = failure.is_retryable();
                last_error = Some(failure.message);
                if !retryable {
                    log::warn!("🛑 非可重试错误，提前终止重试");
                    break;
                }
            }
        }
    }

    Err(CopyError::Clipboard(
        last_error.unwrap_or_else(|| "unknown error".to_string()),
    ))
}
