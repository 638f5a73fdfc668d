//! # 图库视图
//!
//! ## 状态机
//!
//! ```text
//!            folder_path 为空            根目录不可用                根目录可列出
//!   ┌──────────► Empty ◄───────► Invalid { message } ◄───────► Loaded { images }
//!   │                                                               │
//!   └── SettingsChanged / Refresh / FsChanged 均触发一次完整重载 ◄──┘
//! ```
//!
//! - 进入 `Loaded` 时（重新）启动监听；离开 `Loaded` 或关闭视图时拆除监听。
//! - 每次重载递增 `generation`，并随渲染快照一起下发；
//!   缩略图结果带着发起时的 generation 回到事件循环，过期的直接丢弃。
//! - 缩略图任务共享一个信号量限制并发读取；拿到许可后若 generation 已过期则不再读文件。
//! - 激活事件带着宿主所见网格的 generation，只对当前网格生效。
//! - 手动刷新会重建监听，其余重载在根目录与递归标志不变时沿用原订阅。
//! - 视图自身只持有事件通道的弱引用，所有 [`GalleryHandle`] 被丢弃后事件循环自然结束。

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};

use super::full_view::FullViewPresenter;
use super::scanner::{RootStatus, probe_root, scan};
use super::watcher::{
    ChangeCallback, ChangeDebouncer, DebounceDecision, WatchController, WatchMode, WatchStats,
    WatchStatus,
};
use super::{DisplayableImage, GalleryContext, GalleryError};
use crate::host::{GridItem, ImageSlot, PanelBody, PanelRender, ThumbnailFit, ThumbnailUpdate};
use crate::settings::GallerySettings;

pub const PANEL_TITLE: &str = "External Photos";
pub const EMPTY_MESSAGE: &str = "Set a folder path in settings.";
pub const NO_IMAGES_MESSAGE: &str = "No images found.";

static NEXT_PANEL_ID: AtomicU64 = AtomicU64::new(1);

/// 网格卡片上的激活方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemButton {
    /// 左键：打开全图。
    Primary,
    /// 右键：复制到剪贴板。
    Secondary,
}

/// 视图事件循环接收的事件。
#[derive(Debug)]
pub enum ViewEvent {
    Open,
    Refresh,
    /// 监听回调；经过节流后才会触发重载。
    FsChanged,
    /// 节流器安排的尾沿重载。
    DebouncedReload,
    SettingsChanged(GallerySettings),
    ThumbnailLoaded {
        generation: u64,
        index: usize,
        result: Result<DisplayableImage, GalleryError>,
    },
    /// `generation` 为宿主点击时所见网格的渲染代号。
    Activate {
        generation: u64,
        index: usize,
        button: ItemButton,
    },
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Empty,
    Invalid {
        root: PathBuf,
        message: String,
    },
    Loaded {
        root: PathBuf,
        recursive: bool,
        images: Vec<PathBuf>,
    },
}

/// 宿主侧持有的视图句柄。发送失败说明视图已关闭。
#[derive(Debug, Clone)]
pub struct GalleryHandle {
    id: u64,
    events: UnboundedSender<ViewEvent>,
}

impl GalleryHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn send(&self, event: ViewEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn open(&self) -> bool {
        self.send(ViewEvent::Open)
    }

    pub fn refresh(&self) -> bool {
        self.send(ViewEvent::Refresh)
    }

    pub fn apply_settings(&self, settings: GallerySettings) -> bool {
        self.send(ViewEvent::SettingsChanged(settings))
    }

    pub fn activate(&self, generation: u64, index: usize, button: ItemButton) -> bool {
        self.send(ViewEvent::Activate {
            generation,
            index,
            button,
        })
    }

    pub fn close(&self) -> bool {
        self.send(ViewEvent::Close)
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

pub struct GalleryView {
    id: u64,
    ctx: GalleryContext,
    settings: GallerySettings,
    state: ViewState,
    generation: u64,
    /// 与缩略图任务共享的当前 generation；关闭后归零。
    live_generation: Arc<AtomicU64>,
    watch: WatchController,
    watch_key: Option<(PathBuf, bool)>,
    debouncer: ChangeDebouncer,
    events: WeakUnboundedSender<ViewEvent>,
    closed: bool,
}

impl GalleryView {
    pub fn new(
        ctx: GalleryContext,
        settings: GallerySettings,
        events: &UnboundedSender<ViewEvent>,
    ) -> Self {
        let watch = WatchController::new(Arc::clone(&ctx.watch_backend));
        let debouncer = ChangeDebouncer::new(ctx.config.reload_min_interval);
        Self {
            id: NEXT_PANEL_ID.fetch_add(1, Ordering::Relaxed),
            ctx,
            settings: settings.normalized(),
            state: ViewState::Empty,
            generation: 0,
            live_generation: Arc::new(AtomicU64::new(0)),
            watch,
            watch_key: None,
            debouncer,
            events: events.downgrade(),
            closed: false,
        }
    }

    /// 创建视图并在 tokio 上启动它的事件循环。需要在运行时上下文中调用。
    pub fn spawn(ctx: GalleryContext, settings: GallerySettings) -> GalleryHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let view = Self::new(ctx, settings, &tx);
        let handle = GalleryHandle {
            id: view.id,
            events: tx,
        };
        tokio::spawn(view.run(rx));
        handle
    }

    pub async fn run(mut self, mut events: UnboundedReceiver<ViewEvent>) {
        log::info!("🖼️ 图库视图 #{} 已启动", self.id);
        while let Some(event) = events.recv().await {
            if !self.handle(event) {
                break;
            }
        }
        self.shutdown();
        log::info!("🖼️ 图库视图 #{} 已结束", self.id);
    }

    /// 处理一个事件；返回 `false` 表示视图已关闭。
    pub fn handle(&mut self, event: ViewEvent) -> bool {
        if self.closed {
            return false;
        }

        match event {
            ViewEvent::Open => self.reload(),
            ViewEvent::Refresh => {
                // 根目录可能已被删除后重建，旧订阅会绑在失效的目录上
                self.watch_key = None;
                self.reload();
            }
            ViewEvent::FsChanged => self.on_fs_changed(),
            ViewEvent::DebouncedReload => {
                self.debouncer.on_tail_fired(Instant::now());
                self.reload();
            }
            ViewEvent::SettingsChanged(settings) => {
                self.settings = settings.normalized();
                self.reload();
            }
            ViewEvent::ThumbnailLoaded {
                generation,
                index,
                result,
            } => self.on_thumbnail(generation, index, result),
            ViewEvent::Activate {
                generation,
                index,
                button,
            } => self.activate(generation, index, button),
            ViewEvent::Close => {
                self.shutdown();
                return false;
            }
        }
        true
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn settings(&self) -> &GallerySettings {
        &self.settings
    }

    pub fn watch_mode(&self) -> Option<WatchMode> {
        self.watch.mode()
    }

    pub fn watch_stats(&self) -> WatchStats {
        self.watch.stats()
    }

    fn on_fs_changed(&mut self) {
        match self.debouncer.on_change(Instant::now()) {
            DebounceDecision::ReloadNow => self.reload(),
            DebounceDecision::Defer {
                remaining,
                schedule_tail: true,
            } => {
                log::debug!("⏳ 目录变化过于频繁，{}ms 后补发一次重载", remaining.as_millis());
                let events = self.events.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(remaining).await;
                    if let Some(tx) = events.upgrade() {
                        let _ = tx.send(ViewEvent::DebouncedReload);
                    }
                });
            }
            DebounceDecision::Defer { .. } => {}
        }
    }

    fn reload(&mut self) {
        self.generation += 1;
        self.live_generation.store(self.generation, Ordering::Release);
        self.debouncer.mark_reloaded(Instant::now());
        self.state = self.evaluate();
        self.sync_watch();

        let render = self.render();
        self.ctx.host.render_panel(&render);
        self.spawn_thumbnails();
    }

    fn evaluate(&self) -> ViewState {
        let Some(root) = self.settings.root() else {
            return ViewState::Empty;
        };
        let root = root.to_path_buf();

        let message = match probe_root(&root) {
            RootStatus::Ready => {
                let recursive = self.settings.recursive;
                let images = scan(&root, recursive);
                log::debug!("🔍 扫描 {} 得到 {} 张图片", root.display(), images.len());
                return ViewState::Loaded {
                    root,
                    recursive,
                    images,
                };
            }
            RootStatus::NotFound => GalleryError::RootMissing(root.clone()).to_string(),
            RootStatus::NotADirectory => format!("Not a folder: {}", root.display()),
            RootStatus::Unreadable(reason) => {
                format!("Cannot read folder: {} ({})", root.display(), reason)
            }
        };
        log::warn!("⚠️ {}", message);
        ViewState::Invalid { root, message }
    }

    fn sync_watch(&mut self) {
        let on_change = self.change_callback();
        let ViewState::Loaded {
            root, recursive, ..
        } = &self.state
        else {
            self.watch.stop();
            self.watch_key = None;
            return;
        };

        let key = (root.clone(), *recursive);
        if self.watch.is_active() && self.watch_key.as_ref() == Some(&key) {
            return;
        }

        let status = self.watch.start(root, *recursive, on_change);
        self.watch_key = match status {
            WatchStatus::Inactive(_) => None,
            WatchStatus::Active(_) | WatchStatus::Degraded => Some(key),
        };
    }

    fn change_callback(&self) -> ChangeCallback {
        let events = self.events.clone();
        Arc::new(move || {
            if let Some(tx) = events.upgrade() {
                let _ = tx.send(ViewEvent::FsChanged);
            }
        })
    }

    fn render(&self) -> PanelRender {
        let (dir_info, body) = match &self.state {
            ViewState::Empty => (EMPTY_MESSAGE.to_string(), PanelBody::Blank),
            ViewState::Invalid { message, .. } => (message.clone(), PanelBody::Blank),
            ViewState::Loaded {
                root,
                recursive,
                images,
            } => {
                let dir_info = if *recursive {
                    format!("Recursive: {}", root.display())
                } else {
                    format!("Folder: {}", root.display())
                };
                let body = if images.is_empty() {
                    PanelBody::NoImages {
                        message: NO_IMAGES_MESSAGE,
                    }
                } else {
                    PanelBody::Grid {
                        items: images
                            .iter()
                            .enumerate()
                            .map(|(index, path)| self.grid_item(index, path))
                            .collect(),
                    }
                };
                (dir_info, body)
            }
        };

        PanelRender {
            panel_id: self.id,
            generation: self.generation,
            title: PANEL_TITLE,
            dir_info,
            body,
        }
    }

    fn grid_item(&self, index: usize, path: &Path) -> GridItem {
        let width = self.settings.thumb_size;
        GridItem {
            index,
            path: path.to_path_buf(),
            label: base_name(path),
            width_px: width,
            height_px: self.ctx.config.thumb_height(width),
            fit: ThumbnailFit::Contain,
            thumbnail: ImageSlot::Pending,
        }
    }

    fn spawn_thumbnails(&self) {
        let ViewState::Loaded { images, .. } = &self.state else {
            return;
        };

        for (index, path) in images.iter().enumerate() {
            let materializer = self.ctx.materializer.clone();
            let permits = Arc::clone(&self.ctx.thumbnail_permits);
            let live = Arc::clone(&self.live_generation);
            let events = self.events.clone();
            let generation = self.generation;
            let path = path.clone();
            tokio::spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                if live.load(Ordering::Acquire) != generation {
                    log::debug!("⏭️ 跳过过期缩略图 #{}（generation {}）", index, generation);
                    return;
                }
                let result = materializer.load(&path).await;
                if let Some(tx) = events.upgrade() {
                    let _ = tx.send(ViewEvent::ThumbnailLoaded {
                        generation,
                        index,
                        result,
                    });
                }
            });
        }
    }

    fn on_thumbnail(
        &mut self,
        generation: u64,
        index: usize,
        result: Result<DisplayableImage, GalleryError>,
    ) {
        if generation != self.generation {
            log::debug!(
                "丢弃过期缩略图 #{}（generation {} < {}）",
                index,
                generation,
                self.generation
            );
            return;
        }

        let thumbnail = match result {
            Ok(image) => ImageSlot::Ready { image },
            Err(err) => {
                log::debug!("缩略图读取失败: {}", err);
                ImageSlot::failed(err)
            }
        };

        self.ctx.host.update_thumbnail(&ThumbnailUpdate {
            panel_id: self.id,
            generation,
            index,
            thumbnail,
        });
    }

    fn activate(&self, generation: u64, index: usize, button: ItemButton) {
        if generation != self.generation {
            log::debug!(
                "忽略过期网格上的激活 #{}（generation {} != {}）",
                index,
                generation,
                self.generation
            );
            return;
        }
        let ViewState::Loaded { images, .. } = &self.state else {
            return;
        };
        let Some(path) = images.get(index) else {
            log::debug!("忽略越界的激活: #{}", index);
            return;
        };

        match button {
            ItemButton::Primary => {
                FullViewPresenter::spawn(path.clone(), self.ctx.clone());
            }
            ItemButton::Secondary => {
                let clipboard = self.ctx.clipboard.clone();
                let host = Arc::clone(&self.ctx.host);
                let path = path.clone();
                tokio::spawn(async move {
                    clipboard.copy_and_notify(&path, host.as_ref()).await;
                });
            }
        }
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.live_generation.store(0, Ordering::Release);
        self.watch.stop();
        self.watch_key = None;
    }
}

pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardBridge, ClipboardConfig, MemoryClipboard};
    use crate::gallery::ManualWatchBackend;
    use crate::host::{HostCall, RecordingHost};
    use std::fs;
    use std::time::Duration;

    struct Fixture {
        host: Arc<RecordingHost>,
        watch: Arc<ManualWatchBackend>,
        view: GalleryView,
        events: UnboundedReceiver<ViewEvent>,
        _tx: UnboundedSender<ViewEvent>,
    }

    fn fixture(settings: GallerySettings) -> Fixture {
        let host = Arc::new(RecordingHost::new());
        let watch = Arc::new(ManualWatchBackend::new());
        let ctx = GalleryContext::new(host.clone())
            .with_watch_backend(watch.clone())
            .with_clipboard(ClipboardBridge::new(
                Arc::new(MemoryClipboard::new()),
                ClipboardConfig::default(),
            ));
        let (tx, rx) = mpsc::unbounded_channel();
        let view = GalleryView::new(ctx, settings, &tx);
        Fixture {
            host,
            watch,
            view,
            events: rx,
            _tx: tx,
        }
    }

    fn settings_for(root: &Path, recursive: bool) -> GallerySettings {
        GallerySettings {
            folder_path: root.display().to_string(),
            recursive,
            ..GallerySettings::default()
        }
    }

    #[tokio::test]
    async fn empty_settings_render_hint_without_watch() {
        let mut f = fixture(GallerySettings::default());
        assert!(f.view.handle(ViewEvent::Open));

        assert_eq!(f.view.state(), &ViewState::Empty);
        let render = f.host.last_panel_render().expect("rendered");
        assert_eq!(render.title, PANEL_TITLE);
        assert_eq!(render.dir_info, EMPTY_MESSAGE);
        assert_eq!(render.body, PanelBody::Blank);
        assert!(f.watch.live().is_empty());
    }

    #[tokio::test]
    async fn missing_folder_is_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("gone");
        let mut f = fixture(settings_for(&missing, true));
        f.view.handle(ViewEvent::Open);

        let render = f.host.last_panel_render().expect("rendered");
        assert_eq!(render.dir_info, format!("Folder not found: {}", missing.display()));
        assert!(matches!(f.view.state(), ViewState::Invalid { .. }));
        assert!(f.watch.live().is_empty());
    }

    #[tokio::test]
    async fn file_as_root_is_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.png");
        fs::write(&file, b"x").expect("write");
        let mut f = fixture(settings_for(&file, true));
        f.view.handle(ViewEvent::Open);

        let render = f.host.last_panel_render().expect("rendered");
        assert!(render.dir_info.starts_with("Not a folder: "));
    }

    #[tokio::test]
    async fn empty_folder_says_no_images() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut f = fixture(settings_for(dir.path(), false));
        f.view.handle(ViewEvent::Open);

        let render = f.host.last_panel_render().expect("rendered");
        assert_eq!(render.dir_info, format!("Folder: {}", dir.path().display()));
        assert_eq!(
            render.body,
            PanelBody::NoImages {
                message: NO_IMAGES_MESSAGE
            }
        );
        assert_eq!(f.watch.live().len(), 1);
    }

    #[tokio::test]
    async fn grid_items_use_thumb_size_box() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.png"), b"png").expect("write");
        let mut settings = settings_for(dir.path(), true);
        settings.thumb_size = 128;
        let mut f = fixture(settings);
        f.view.handle(ViewEvent::Open);

        let render = f.host.last_panel_render().expect("rendered");
        let item = &render.items()[0];
        assert_eq!(item.label, "a.png");
        assert_eq!((item.width_px, item.height_px), (128, 179));
        assert_eq!(item.fit, ThumbnailFit::Contain);
        assert!(item.thumbnail.is_pending());
    }

    #[tokio::test]
    async fn stale_thumbnail_is_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a.png");
        fs::write(&file, b"png").expect("write");
        let mut f = fixture(settings_for(dir.path(), true));

        f.view.handle(ViewEvent::Open);
        let old = f.view.generation();
        f.view.handle(ViewEvent::Refresh);
        f.host.clear();

        f.view.handle(ViewEvent::ThumbnailLoaded {
            generation: old,
            index: 0,
            result: Ok(DisplayableImage::from_bytes(&file, b"png")),
        });
        assert!(f.host.thumbnail_updates().is_empty());

        f.view.handle(ViewEvent::ThumbnailLoaded {
            generation: f.view.generation(),
            index: 0,
            result: Err(GalleryError::read(&file, "gone")),
        });
        let updates = f.host.thumbnail_updates();
        assert_eq!(updates.len(), 1);
        assert!(matches!(updates[0].thumbnail, ImageSlot::Failed { glyph: "⚠️", .. }));
    }

    #[tokio::test]
    async fn same_root_reload_keeps_subscription() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut f = fixture(settings_for(dir.path(), true));
        f.view.handle(ViewEvent::Open);
        f.view.handle(ViewEvent::DebouncedReload);
        f.view
            .handle(ViewEvent::SettingsChanged(settings_for(dir.path(), true)));

        assert_eq!(f.view.watch_stats(), WatchStats { started: 1, stopped: 0 });
        assert_eq!(f.view.watch_mode(), Some(WatchMode::Recursive));
    }

    #[tokio::test]
    async fn manual_refresh_rebinds_watch_to_recreated_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("pics");
        fs::create_dir(&root).expect("mkdir");
        let mut f = fixture(settings_for(&root, true));
        f.view.handle(ViewEvent::Open);

        fs::remove_dir(&root).expect("rmdir");
        fs::create_dir(&root).expect("recreate");
        f.view.handle(ViewEvent::Refresh);

        assert_eq!(f.view.watch_stats(), WatchStats { started: 2, stopped: 1 });
        assert_eq!(f.watch.live(), vec![(root.clone(), WatchMode::Recursive)]);
    }

    #[tokio::test]
    async fn superseded_thumbnails_are_never_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("a.png"), b"png").expect("write");
        fs::write(dir.path().join("b.png"), b"png").expect("write");
        let mut f = fixture(settings_for(dir.path(), false));

        let permits = Arc::clone(&f.view.ctx.thumbnail_permits);
        let total = f.view.ctx.config.max_concurrent_thumbnails as u32;
        let held = permits.acquire_many_owned(total).await.expect("permits");
        f.view.handle(ViewEvent::Open);
        f.view.handle(ViewEvent::Refresh);
        let current = f.view.generation();
        drop(held);

        let mut delivered = Vec::new();
        while delivered.len() < 2 {
            let event = tokio::time::timeout(Duration::from_secs(5), f.events.recv())
                .await
                .expect("thumbnail in time")
                .expect("channel open");
            if let ViewEvent::ThumbnailLoaded { generation, index, .. } = event {
                delivered.push((generation, index));
            }
        }
        delivered.sort_unstable();

        assert_eq!(delivered, vec![(current, 0), (current, 1)]);
        assert_eq!(f.view.ctx.materializer.started_loads(), 2);
    }

    #[tokio::test]
    async fn activation_on_stale_grid_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("b.png"), b"png").expect("write");
        let mut f = fixture(settings_for(dir.path(), false));
        f.view.handle(ViewEvent::Open);
        let drawn = f.host.last_panel_render().expect("rendered");
        assert_eq!(drawn.items()[0].label, "b.png");

        fs::write(dir.path().join("a.png"), b"png").expect("write");
        f.view.handle(ViewEvent::DebouncedReload);
        assert_ne!(f.view.generation(), drawn.generation);
        f.host.clear();

        f.view.handle(ViewEvent::Activate {
            generation: drawn.generation,
            index: 0,
            button: ItemButton::Primary,
        });
        tokio::task::yield_now().await;
        assert!(!f.host.calls().iter().any(|c| matches!(c, HostCall::ShowModal(_))));

        f.view.handle(ViewEvent::Activate {
            generation: f.view.generation(),
            index: 0,
            button: ItemButton::Primary,
        });
        let modal = f.host.last_modal_render().expect("modal shown");
        assert_eq!(modal.path, dir.path().join("a.png"));
    }

    #[tokio::test]
    async fn toggling_recursive_resubscribes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut f = fixture(settings_for(dir.path(), true));
        f.view.handle(ViewEvent::Open);
        f.view
            .handle(ViewEvent::SettingsChanged(settings_for(dir.path(), false)));

        assert_eq!(f.view.watch_stats(), WatchStats { started: 2, stopped: 1 });
        assert_eq!(f.watch.live(), vec![(dir.path().to_path_buf(), WatchMode::NonRecursive)]);
    }

    #[tokio::test]
    async fn close_stops_watch_and_ignores_later_events() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut f = fixture(settings_for(dir.path(), true));
        f.view.handle(ViewEvent::Open);
        assert!(!f.view.handle(ViewEvent::Close));
        assert!(f.watch.live().is_empty());

        f.host.clear();
        assert!(!f.view.handle(ViewEvent::Refresh));
        assert!(f.host.calls().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_activation_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut f = fixture(settings_for(dir.path(), true));
        f.view.handle(ViewEvent::Open);
        f.host.clear();

        f.view.handle(ViewEvent::Activate {
            generation: f.view.generation(),
            index: 3,
            button: ItemButton::Primary,
        });
        tokio::task::yield_now().await;
        assert!(!f.host.calls().iter().any(|c| matches!(c, HostCall::ShowModal(_))));
    }

    #[test]
    fn base_name_falls_back_to_full_path() {
        assert_eq!(base_name(Path::new("/pics/sub/c.gif")), "c.gif");
        assert_eq!(base_name(Path::new("/")), "/");
    }
}
