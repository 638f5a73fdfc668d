//! # 全图弹窗
//!
//! 单张图片的模态查看器：标题为文件名，操作为"复制到剪贴板"与"用外部程序打开"，
//! 按住修饰键滚动滚轮缩放。每次打开都是全新状态，关闭即释放图片数据，
//! 尚未完成的读取结果到达时直接丢弃。

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};

use super::view::base_name;
use super::{DisplayableImage, GalleryConfig, GalleryContext, GalleryError};
use crate::host::{ImageSlot, ModalRender};

pub const COPY_ACTION: &str = "Copy to Clipboard";
pub const OPEN_ACTION: &str = "Open Externally";
pub const TRANSFORM_ORIGIN: &str = "0 0";

static NEXT_MODAL_ID: AtomicU64 = AtomicU64::new(1);

/// 缩放倍率，始终落在 `[min, max]` 内。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    factor: f64,
    step: f64,
    min: f64,
    max: f64,
}

impl Zoom {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            factor: 1.0,
            step: config.zoom_step,
            min: config.zoom_min,
            max: config.zoom_max,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn zoom_in(&mut self) {
        self.set(self.factor + self.step);
    }

    pub fn zoom_out(&mut self) {
        self.set(self.factor - self.step);
    }

    /// 处理一次滚轮事件。未按修饰键时不处理并返回 `false`，
    /// 宿主应保留默认滚动行为。
    pub fn apply_wheel(&mut self, delta_y: f64, modifier: bool) -> bool {
        if !modifier {
            return false;
        }
        if delta_y < 0.0 {
            self.zoom_in();
        } else {
            self.zoom_out();
        }
        true
    }

    /// CSS 变换，如 `scale(1.2)`。
    pub fn transform(&self) -> String {
        format!("scale({})", self.factor)
    }

    fn set(&mut self, factor: f64) {
        // 对齐到 1e-6，避免连续加减步长后累积浮点误差
        let snapped = (factor * 1e6).round() / 1e6;
        self.factor = snapped.clamp(self.min, self.max);
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(&GalleryConfig::default())
    }
}

#[derive(Debug)]
pub enum ModalEvent {
    Loaded(Result<DisplayableImage, GalleryError>),
    Wheel { delta_y: f64, modifier: bool },
    CopyToClipboard,
    OpenExternally,
    Close,
}

/// 宿主侧的弹窗句柄。
#[derive(Debug, Clone)]
pub struct ModalHandle {
    id: u64,
    events: UnboundedSender<ModalEvent>,
}

impl ModalHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 转发滚轮事件；返回 `true` 表示宿主应阻止默认滚动。
    pub fn wheel(&self, delta_y: f64, modifier: bool) -> bool {
        modifier
            && self
                .events
                .send(ModalEvent::Wheel { delta_y, modifier })
                .is_ok()
    }

    pub fn copy_to_clipboard(&self) -> bool {
        self.events.send(ModalEvent::CopyToClipboard).is_ok()
    }

    pub fn open_externally(&self) -> bool {
        self.events.send(ModalEvent::OpenExternally).is_ok()
    }

    pub fn close(&self) -> bool {
        self.events.send(ModalEvent::Close).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

pub struct FullViewPresenter {
    id: u64,
    path: PathBuf,
    ctx: GalleryContext,
    image: ImageSlot,
    zoom: Zoom,
    events: WeakUnboundedSender<ModalEvent>,
    closed: bool,
}

impl FullViewPresenter {
    pub fn new(path: PathBuf, ctx: GalleryContext, events: &UnboundedSender<ModalEvent>) -> Self {
        let zoom = Zoom::new(&ctx.config);
        Self {
            id: NEXT_MODAL_ID.fetch_add(1, Ordering::Relaxed),
            path,
            ctx,
            image: ImageSlot::Pending,
            zoom,
            events: events.downgrade(),
            closed: false,
        }
    }

    /// 显示弹窗、开始读取图片并启动事件循环。
    pub fn spawn(path: PathBuf, ctx: GalleryContext) -> ModalHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let presenter = Self::new(path, ctx, &tx);
        let handle = ModalHandle {
            id: presenter.id,
            events: tx,
        };

        log::info!("🔎 打开全图 #{}: {}", presenter.id, presenter.path.display());
        presenter
            .ctx
            .host
            .show_modal(handle.clone(), &presenter.render());
        presenter.start_load();
        tokio::spawn(presenter.run(rx));
        handle
    }

    pub async fn run(mut self, mut events: UnboundedReceiver<ModalEvent>) {
        while let Some(event) = events.recv().await {
            if !self.handle(event) {
                break;
            }
        }
        self.release();
    }

    /// 处理一个事件；返回 `false` 表示弹窗已关闭。
    pub fn handle(&mut self, event: ModalEvent) -> bool {
        if self.closed {
            return false;
        }

        match event {
            ModalEvent::Loaded(result) => {
                self.image = match result {
                    Ok(image) => ImageSlot::Ready { image },
                    Err(err) => {
                        log::warn!("⚠️ 全图读取失败: {}", err);
                        ImageSlot::failed(err)
                    }
                };
                self.ctx.host.update_modal(&self.render());
            }
            ModalEvent::Wheel { delta_y, modifier } => {
                if self.zoom.apply_wheel(delta_y, modifier) {
                    self.ctx.host.update_modal(&self.render());
                }
            }
            ModalEvent::CopyToClipboard => {
                let clipboard = self.ctx.clipboard.clone();
                let host = Arc::clone(&self.ctx.host);
                let path = self.path.clone();
                tokio::spawn(async move {
                    clipboard.copy_and_notify(&path, host.as_ref()).await;
                });
            }
            ModalEvent::OpenExternally => self.ctx.host.open_with_default_app(&self.path),
            ModalEvent::Close => {
                self.release();
                self.ctx.host.close_modal(self.id);
                return false;
            }
        }
        true
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn image(&self) -> &ImageSlot {
        &self.image
    }

    pub fn render(&self) -> ModalRender {
        ModalRender {
            modal_id: self.id,
            title: base_name(&self.path),
            path: self.path.clone(),
            viewport_fraction: self.ctx.config.modal_viewport_fraction,
            image: self.image.clone(),
            zoom: self.zoom.factor(),
            transform: self.zoom.transform(),
            transform_origin: TRANSFORM_ORIGIN,
            actions: [COPY_ACTION, OPEN_ACTION],
        }
    }

    fn start_load(&self) {
        let materializer = self.ctx.materializer.clone();
        let events = self.events.clone();
        let path = self.path.clone();
        tokio::spawn(async move {
            let result = materializer.load(&path).await;
            if let Some(tx) = events.upgrade() {
                let _ = tx.send(ModalEvent::Loaded(result));
            }
        });
    }

    fn release(&mut self) {
        if !self.closed {
            log::debug!("🔎 关闭全图 #{}", self.id);
        }
        self.closed = true;
        self.image = ImageSlot::Pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, RecordingHost};
    use proptest::prelude::*;
    use std::path::Path;

    #[test]
    fn five_in_three_out_lands_on_one_point_two() {
        let mut zoom = Zoom::default();
        for _ in 0..5 {
            zoom.zoom_in();
        }
        for _ in 0..3 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.factor(), 1.2);
        assert_eq!(zoom.transform(), "scale(1.2)");
    }

    #[test]
    fn zoom_clamps_at_bounds() {
        let mut zoom = Zoom::default();
        for _ in 0..200 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.factor(), 8.0);
        for _ in 0..200 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.factor(), 0.1);
    }

    #[test]
    fn wheel_without_modifier_is_ignored() {
        let mut zoom = Zoom::default();
        assert!(!zoom.apply_wheel(-120.0, false));
        assert_eq!(zoom.factor(), 1.0);

        assert!(zoom.apply_wheel(-120.0, true));
        assert!(zoom.apply_wheel(0.0, true));
        assert!(zoom.apply_wheel(-1.0, true));
        assert_eq!(zoom.factor(), 1.1);
    }

    proptest! {
        #[test]
        fn zoom_never_leaves_bounds(deltas in proptest::collection::vec(-500.0f64..500.0, 0..300)) {
            let mut zoom = Zoom::default();
            for delta in deltas {
                zoom.apply_wheel(delta, true);
                prop_assert!((0.1..=8.0).contains(&zoom.factor()));
            }
        }
    }

    #[tokio::test]
    async fn close_discards_late_load_and_closes_host_modal() {
        let host = Arc::new(RecordingHost::new());
        let ctx = GalleryContext::new(host.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut presenter = FullViewPresenter::new(PathBuf::from("/pics/a.png"), ctx, &tx);

        assert_eq!(presenter.render().title, "a.png");
        assert_eq!(presenter.render().actions, [COPY_ACTION, OPEN_ACTION]);
        assert!(presenter.handle(ModalEvent::Wheel {
            delta_y: -1.0,
            modifier: true
        }));
        assert_eq!(host.last_modal_render().map(|r| r.transform), Some("scale(1.1)".to_string()));

        assert!(!presenter.handle(ModalEvent::Close));
        host.clear();
        let late = DisplayableImage::from_bytes(Path::new("/pics/a.png"), b"late");
        assert!(!presenter.handle(ModalEvent::Loaded(Ok(late))));
        assert!(host.calls().is_empty());
        assert!(presenter.image().is_pending());
    }

    #[tokio::test]
    async fn open_externally_goes_through_host() {
        let host = Arc::new(RecordingHost::new());
        let ctx = GalleryContext::new(host.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut presenter = FullViewPresenter::new(PathBuf::from("/pics/b.jpg"), ctx, &tx);

        presenter.handle(ModalEvent::OpenExternally);
        assert_eq!(
            host.calls(),
            vec![HostCall::OpenExternally(PathBuf::from("/pics/b.jpg"))]
        );
    }
}
