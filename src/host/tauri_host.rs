//! # Tauri 宿主适配层
//!
//! 渲染快照以 Tauri 事件推送给 WebView，用户操作经 `#[tauri::command]` 回到
//! 对应视图 / 弹窗的事件循环。
//!
//! | 事件 | 载荷 |
//! |------|------|
//! | `photo-sidebar://panel-render` | [`PanelRender`] |
//! | `photo-sidebar://thumbnail` | [`ThumbnailUpdate`] |
//! | `photo-sidebar://modal-show` / `modal-update` | [`ModalRender`] |
//! | `photo-sidebar://modal-close` | modal id |
//! | `photo-sidebar://reveal-panel` | view type |
//! | `photo-sidebar://notice` | 提示文字 |
//!
//! ```rust,ignore
//! tauri::Builder::default()
//!     .setup(|app| {
//!         photo_sidebar::host::tauri_host::manage(app.handle())?;
//!         Ok(())
//!     })
//!     .invoke_handler(tauri::generate_handler![
//!         photo_sidebar::host::tauri_host::photo_panel_open,
//!         photo_sidebar::host::tauri_host::photo_item_activate,
//!         // ...
//!     ])
//! ```
//!
//! 所有命令都是 `async`：视图事件循环需要在 Tauri 的 tokio 运行时中创建。

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tauri::{AppHandle, Emitter, Manager, State, Wry};

use super::{
    CommandCallback, HostSurface, ModalRender, PanelFactory, PanelRender, ThumbnailUpdate,
};
use crate::error::AppError;
use crate::gallery::{GalleryContext, GalleryHandle, ItemButton, ModalHandle};
use crate::plugin::{PhotoSidebarPlugin, SETTINGS_FILE_NAME, VIEW_TYPE};
use crate::settings::GallerySettings;

const EVENT_PANEL_RENDER: &str = "photo-sidebar://panel-render";
const EVENT_THUMBNAIL: &str = "photo-sidebar://thumbnail";
const EVENT_MODAL_SHOW: &str = "photo-sidebar://modal-show";
const EVENT_MODAL_UPDATE: &str = "photo-sidebar://modal-update";
const EVENT_MODAL_CLOSE: &str = "photo-sidebar://modal-close";
const EVENT_REVEAL_PANEL: &str = "photo-sidebar://reveal-panel";
const EVENT_NOTICE: &str = "photo-sidebar://notice";

fn lock_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct TauriHost {
    app: AppHandle<Wry>,
    panels: Mutex<HashMap<String, PanelFactory>>,
    commands: Mutex<HashMap<String, CommandCallback>>,
    modals: Mutex<HashMap<u64, ModalHandle>>,
}

impl TauriHost {
    pub fn new(app: AppHandle<Wry>) -> Self {
        Self {
            app,
            panels: Mutex::new(HashMap::new()),
            commands: Mutex::new(HashMap::new()),
            modals: Mutex::new(HashMap::new()),
        }
    }

    fn emit<S: Serialize + Clone>(&self, event: &str, payload: S) {
        if let Err(err) = self.app.emit(event, payload) {
            log::warn!("⚠️ 事件推送失败 {}: {}", event, err);
        }
    }

    fn open_panel(&self, view_type: &str) -> Option<GalleryHandle> {
        let factory = lock_recover(&self.panels).get(view_type).cloned()?;
        factory()
    }

    fn modal(&self, modal_id: u64) -> Result<ModalHandle, AppError> {
        lock_recover(&self.modals)
            .get(&modal_id)
            .cloned()
            .ok_or_else(|| AppError::Host(format!("modal #{} is not open", modal_id)))
    }
}

impl HostSurface for TauriHost {
    fn register_panel(&self, view_type: &str, factory: PanelFactory) {
        lock_recover(&self.panels).insert(view_type.to_string(), factory);
    }

    fn register_command(&self, id: &str, name: &str, callback: CommandCallback) {
        log::debug!("注册命令 {} ({})", id, name);
        lock_recover(&self.commands).insert(id.to_string(), callback);
    }

    fn reveal_panel(&self, view_type: &str) {
        self.emit(EVENT_REVEAL_PANEL, view_type);
    }

    fn render_panel(&self, render: &PanelRender) {
        self.emit(EVENT_PANEL_RENDER, render);
    }

    fn update_thumbnail(&self, update: &ThumbnailUpdate) {
        self.emit(EVENT_THUMBNAIL, update);
    }

    fn show_modal(&self, handle: ModalHandle, render: &ModalRender) {
        lock_recover(&self.modals).insert(render.modal_id, handle);
        self.emit(EVENT_MODAL_SHOW, render);
    }

    fn update_modal(&self, render: &ModalRender) {
        self.emit(EVENT_MODAL_UPDATE, render);
    }

    fn close_modal(&self, modal_id: u64) {
        lock_recover(&self.modals).remove(&modal_id);
        self.emit(EVENT_MODAL_CLOSE, modal_id);
    }

    fn notify_user(&self, message: &str) {
        self.emit(EVENT_NOTICE, message);
    }
}

/// 由 Tauri 托管的插件状态。
pub struct PhotoSidebarState {
    host: Arc<TauriHost>,
    plugin: Arc<PhotoSidebarPlugin>,
    panels: Mutex<HashMap<u64, GalleryHandle>>,
}

impl PhotoSidebarState {
    pub fn init(app: &AppHandle<Wry>) -> Result<Self, AppError> {
        let app_data_dir = app
            .path()
            .app_data_dir()
            .map_err(|e| AppError::Settings(format!("获取应用数据目录失败: {}", e)))?;

        let host = Arc::new(TauriHost::new(app.clone()));
        let ctx = GalleryContext::new(host.clone());
        let plugin = PhotoSidebarPlugin::load(ctx, Some(app_data_dir.join(SETTINGS_FILE_NAME)));
        plugin.register();

        Ok(Self {
            host,
            plugin,
            panels: Mutex::new(HashMap::new()),
        })
    }

    fn panel(&self, panel_id: u64) -> Result<GalleryHandle, AppError> {
        let mut panels = lock_recover(&self.panels);
        panels.retain(|_, handle| !handle.is_closed());
        panels
            .get(&panel_id)
            .cloned()
            .ok_or_else(|| AppError::Host(format!("panel #{} is not open", panel_id)))
    }
}

/// 初始化并托管插件状态，随后请求显示侧边栏。
pub fn manage(app: &AppHandle<Wry>) -> Result<(), AppError> {
    let state = PhotoSidebarState::init(app)?;
    state.plugin.activate_view();
    app.manage(state);
    log::info!("setup: photo sidebar state managed");
    Ok(())
}

fn sent(ok: bool, what: &str) -> Result<(), AppError> {
    if ok {
        Ok(())
    } else {
        Err(AppError::Host(format!("{} is already closed", what)))
    }
}

#[tauri::command]
pub async fn photo_panel_open(state: State<'_, PhotoSidebarState>) -> Result<u64, AppError> {
    let handle = state
        .host
        .open_panel(VIEW_TYPE)
        .ok_or_else(|| AppError::Host("photo sidebar is not registered".to_string()))?;
    let id = handle.id();
    lock_recover(&state.panels).insert(id, handle);
    Ok(id)
}

#[tauri::command]
pub async fn photo_panel_refresh(
    state: State<'_, PhotoSidebarState>,
    panel_id: u64,
) -> Result<(), AppError> {
    sent(state.panel(panel_id)?.refresh(), "panel")
}

#[tauri::command]
pub async fn photo_panel_close(
    state: State<'_, PhotoSidebarState>,
    panel_id: u64,
) -> Result<(), AppError> {
    let handle = lock_recover(&state.panels).remove(&panel_id);
    if let Some(handle) = handle {
        handle.close();
    }
    Ok(())
}

#[tauri::command]
pub async fn photo_item_activate(
    state: State<'_, PhotoSidebarState>,
    panel_id: u64,
    generation: u64,
    index: usize,
    button: ItemButton,
) -> Result<(), AppError> {
    sent(
        state.panel(panel_id)?.activate(generation, index, button),
        "panel",
    )
}

/// 返回 `true` 表示前端应阻止默认滚动。
#[tauri::command]
pub async fn photo_modal_wheel(
    state: State<'_, PhotoSidebarState>,
    modal_id: u64,
    delta_y: f64,
    modifier: bool,
) -> Result<bool, AppError> {
    Ok(state.host.modal(modal_id)?.wheel(delta_y, modifier))
}

#[tauri::command]
pub async fn photo_modal_copy(
    state: State<'_, PhotoSidebarState>,
    modal_id: u64,
) -> Result<(), AppError> {
    sent(state.host.modal(modal_id)?.copy_to_clipboard(), "modal")
}

#[tauri::command]
pub async fn photo_modal_open_externally(
    state: State<'_, PhotoSidebarState>,
    modal_id: u64,
) -> Result<(), AppError> {
    sent(state.host.modal(modal_id)?.open_externally(), "modal")
}

#[tauri::command]
pub async fn photo_modal_close(
    state: State<'_, PhotoSidebarState>,
    modal_id: u64,
) -> Result<(), AppError> {
    match state.host.modal(modal_id) {
        Ok(handle) => {
            handle.close();
            Ok(())
        }
        Err(_) => Ok(()),
    }
}

#[tauri::command]
pub async fn photo_run_command(
    state: State<'_, PhotoSidebarState>,
    id: String,
) -> Result<(), AppError> {
    let callback = lock_recover(&state.host.commands)
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::Host(format!("unknown command: {}", id)))?;
    callback();
    Ok(())
}

#[tauri::command]
pub async fn get_gallery_settings(
    state: State<'_, PhotoSidebarState>,
) -> Result<GallerySettings, AppError> {
    Ok(state.plugin.settings())
}

#[tauri::command]
pub async fn set_folder_path(
    state: State<'_, PhotoSidebarState>,
    value: String,
) -> Result<(), AppError> {
    state.plugin.set_folder_path(&value)
}

#[tauri::command]
pub async fn set_recursive(
    state: State<'_, PhotoSidebarState>,
    value: bool,
) -> Result<(), AppError> {
    state.plugin.set_recursive(value)
}

#[tauri::command]
pub async fn set_thumb_size(
    state: State<'_, PhotoSidebarState>,
    value: f64,
) -> Result<u32, AppError> {
    state.plugin.set_thumb_size(value)
}
