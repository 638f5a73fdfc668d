//! # 图库模块
//!
//! ## 数据流
//!
//! ```text
//! settings ──► GalleryView ──probe_root / scan──► Vec<PathBuf>
//!                 │   │
//!                 │   └─ 每张图一个任务 ─► Semaphore ─► Materializer::load ─► ThumbnailLoaded
//!                 │
//!                 ├─ WatchController ─► on_change ─► FsChanged ─► ChangeDebouncer
//!                 └─ 激活 ─┬─ 左键 ─► FullViewPresenter
//!                          └─ 右键 ─► ClipboardBridge
//! ```
//!
//! 每个视图和每个弹窗都由一个独立的 tokio 任务驱动，状态只在该任务内被修改。

mod classifier;
mod config;
mod error;
mod full_view;
mod materializer;
mod scanner;
mod view;
mod watcher;

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::clipboard::ClipboardBridge;
use crate::host::HostSurface;

pub use classifier::{
    FALLBACK_CONTENT_TYPE, ImageKind, SUPPORTED_EXTENSIONS, content_type_of, is_supported_image,
};
pub use config::GalleryConfig;
pub use error::GalleryError;
pub use full_view::{
    COPY_ACTION, FullViewPresenter, ModalEvent, ModalHandle, OPEN_ACTION, TRANSFORM_ORIGIN, Zoom,
};
pub use materializer::{DisplayableImage, Materializer};
pub use scanner::{RootStatus, probe_root, scan};
pub use view::{
    EMPTY_MESSAGE, GalleryHandle, GalleryView, ItemButton, NO_IMAGES_MESSAGE, PANEL_TITLE,
    ViewEvent, ViewState,
};
pub use watcher::{
    ChangeCallback, ChangeDebouncer, DebounceDecision, ManualWatchBackend, NotifyBackend,
    WatchBackend, WatchController, WatchGuard, WatchMode, WatchStats, WatchStatus,
    WatchSubscription,
};

/// 视图与弹窗共享的依赖。
#[derive(Clone)]
pub struct GalleryContext {
    pub host: Arc<dyn HostSurface>,
    pub materializer: Materializer,
    pub clipboard: ClipboardBridge,
    pub watch_backend: Arc<dyn WatchBackend>,
    /// 缩略图读取许可，容量为 `config.max_concurrent_thumbnails`。
    pub thumbnail_permits: Arc<Semaphore>,
    pub config: GalleryConfig,
}

impl GalleryContext {
    /// 默认组合：`notify` 监听 + 系统剪贴板。
    pub fn new(host: Arc<dyn HostSurface>) -> Self {
        let config = GalleryConfig::default();
        Self {
            host,
            materializer: Materializer::new(&config),
            clipboard: ClipboardBridge::system(),
            watch_backend: Arc::new(NotifyBackend),
            thumbnail_permits: thumbnail_permits(&config),
            config,
        }
    }

    pub fn with_config(mut self, config: GalleryConfig) -> Self {
        self.materializer = Materializer::new(&config);
        self.thumbnail_permits = thumbnail_permits(&config);
        self.config = config;
        self
    }

    pub fn with_clipboard(mut self, clipboard: ClipboardBridge) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_watch_backend(mut self, backend: Arc<dyn WatchBackend>) -> Self {
        self.watch_backend = backend;
        self
    }
}

fn thumbnail_permits(config: &GalleryConfig) -> Arc<Semaphore> {
    Arc::new(Semaphore::new(config.max_concurrent_thumbnails.max(1)))
}
