//! # 剪贴板桥接模块
//!
//! ## 设计思路
//!
//! 把"读取文件 → 解码位图 → 写入系统剪贴板"拆成独立阶段：
//!
//! ```text
//! ClipboardBridge::copy_to_clipboard
//!    ├─ pipeline::load_from_file        （metadata + 体积上限 + 读取）
//!    ├─ pipeline::decode_for_clipboard  （矢量拒绝 + 签名 + 像素上限 + RGBA）
//!    └─ writer::write_with_retry        （ClipboardSink + 重试）
//! ```
//!
//! ## 边界约定
//!
//! `copy_to_clipboard` 返回结构化的 [`CopyError`]；
//! `copy_and_notify` 是面向界面的入口，任何失败都只转换为一条用户通知，绝不向外抛出。

mod config;
mod error;
mod pipeline;
mod writer;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::host::HostSurface;

pub use config::ClipboardConfig;
pub use error::CopyError;
pub use pipeline::PreparedClipboardImage;
pub use writer::{
    ClipboardFailureKind, ClipboardSink, ClipboardWriteFailure, MemoryClipboard, SystemClipboard,
};

/// 复制成功时的通知文案。
pub const COPY_SUCCESS_NOTICE: &str = "✅ Image copied to clipboard";

/// 剪贴板桥接器。
#[derive(Clone)]
pub struct ClipboardBridge {
    sink: Arc<dyn ClipboardSink>,
    config: ClipboardConfig,
}

impl ClipboardBridge {
    /// 使用系统剪贴板与默认配置。
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClipboard), ClipboardConfig::default())
    }

    pub fn new(sink: Arc<dyn ClipboardSink>, config: ClipboardConfig) -> Self {
        Self { sink, config }
    }

    /// 读取、解码并把图片写入剪贴板。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::path::Path;
    /// use photo_sidebar::clipboard::ClipboardBridge;
    ///
    /// # async fn demo() -> Result<(), photo_sidebar::clipboard::CopyError> {
    /// ClipboardBridge::system()
    ///     .copy_to_clipboard(Path::new("/pics/a.png"))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn copy_to_clipboard(&self, path: &Path) -> Result<(), CopyError> {
        let total_start = Instant::now();

        let raw = pipeline::load_from_file(path, &self.config).await?;
        let load_elapsed = total_start.elapsed();

        let config = self.config.clone();
        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || {
            let prepared = pipeline::decode_for_clipboard(&raw, &config)?;
            writer::write_with_retry(sink.as_ref(), &prepared, &config)
        })
        .await
        .map_err(|e| CopyError::Clipboard(format!("worker thread failed: {}", e)))??;

        log::info!(
            "✅ 图片复制完成 - {} load={}ms total={}ms",
            path.display(),
            load_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );
        Ok(())
    }

    /// 复制并通过宿主通知用户结果；返回是否成功。
    pub async fn copy_and_notify(&self, path: &Path, host: &dyn HostSurface) -> bool {
        match self.copy_to_clipboard(path).await {
            Ok(()) => {
                host.notify_user(COPY_SUCCESS_NOTICE);
                true
            }
            Err(err) => {
                log::error!("复制失败 {}: {}", path.display(), err);
                host.notify_user(&format!("❌ Copy failed: {}", err));
                false
            }
        }
    }
}
