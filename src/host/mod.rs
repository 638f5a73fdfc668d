//! # 宿主契约
//!
//! ## 设计思路
//!
//! 图库核心不认识任何具体的界面框架。它只通过 [`HostSurface`] 与宿主交互：
//!
//! ```text
//! GalleryView / FullViewPresenter
//!    │  PanelRender / ThumbnailUpdate / ModalRender（可序列化快照）
//!    ↓
//! HostSurface ──┬─ RecordingHost   （测试 / 无头宿主）
//!               └─ TauriHost       （feature = "tauri-host"，推送到 WebView）
//! ```
//!
//! 用户输入反方向流动：宿主持有 [`GalleryHandle`] / [`ModalHandle`]，
//! 把点击、滚轮、按钮转成事件发回对应的事件循环。

mod recording;
mod render;
pub mod shell;
#[cfg(feature = "tauri-host")]
pub mod tauri_host;

use std::path::Path;
use std::sync::Arc;

use crate::gallery::{GalleryHandle, ModalHandle};

pub use recording::{HostCall, RecordingHost};
pub use render::{
    GridItem, ImageSlot, ModalRender, PLACEHOLDER_GLYPH, PanelBody, PanelRender, ThumbnailFit,
    ThumbnailUpdate,
};

/// 宿主请求打开面板时调用的工厂；插件已卸载时返回 `None`。
pub type PanelFactory = Arc<dyn Fn() -> Option<GalleryHandle> + Send + Sync>;

/// 命令面板回调。
pub type CommandCallback = Arc<dyn Fn() + Send + Sync>;

/// 宿主界面提供给插件的全部能力。
///
/// 所有方法都可能在任意 tokio 工作线程上被调用，实现不得阻塞。
pub trait HostSurface: Send + Sync {
    /// 注册一种面板类型。
    fn register_panel(&self, view_type: &str, factory: PanelFactory);

    /// 注册一条命令（如"打开侧边栏"）。
    fn register_command(&self, id: &str, name: &str, callback: CommandCallback);

    /// 确保 `view_type` 面板存在并可见。
    fn reveal_panel(&self, view_type: &str);

    fn render_panel(&self, render: &PanelRender);

    fn update_thumbnail(&self, update: &ThumbnailUpdate);

    /// 显示一个新弹窗；`handle` 用于把用户操作发回弹窗事件循环。
    fn show_modal(&self, handle: ModalHandle, render: &ModalRender);

    fn update_modal(&self, render: &ModalRender);

    fn close_modal(&self, modal_id: u64);

    /// 短暂的用户提示。
    fn notify_user(&self, message: &str);

    /// 用系统默认程序打开文件；失败时提示用户，不向上传播。
    fn open_with_default_app(&self, path: &Path) {
        if let Err(err) = shell::open_path(path) {
            log::warn!("⚠️ 打开外部程序失败: {}", err);
            self.notify_user(&format!("❌ {}", err));
        }
    }
}
