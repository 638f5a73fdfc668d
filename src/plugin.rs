//! # 插件入口
//!
//! 负责宿主侧的生命周期胶水：
//!
//! - 启动时读取设置（缺失字段取默认值）；
//! - 注册面板类型与"打开侧边栏"命令；
//! - 设置表单的三个编辑操作：保存后把新设置推送给所有打开的视图。
//!
//! 设置只有一份，由插件持有（`RwLock`），视图拿到的是快照。

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::error::AppError;
use crate::gallery::{GalleryContext, GalleryHandle, GalleryView};
use crate::settings::{self, GallerySettings, clamp_thumb_size};

pub const VIEW_TYPE: &str = "external-photo-sidebar-view";
pub const OPEN_COMMAND_ID: &str = "open-external-photo-sidebar";
pub const OPEN_COMMAND_NAME: &str = "Open Photo Sidebar";
pub const FOLDER_SAVED_NOTICE: &str = "Folder path saved";

/// 设置文件名（位于宿主的应用数据目录下）。
pub const SETTINGS_FILE_NAME: &str = "photo-sidebar.json";

pub struct PhotoSidebarPlugin {
    settings: RwLock<GallerySettings>,
    settings_path: Option<PathBuf>,
    ctx: GalleryContext,
    views: Mutex<Vec<GalleryHandle>>,
}

impl PhotoSidebarPlugin {
    /// 读取设置并创建插件。`settings_path` 为 `None` 时设置只保存在内存中。
    pub fn load(ctx: GalleryContext, settings_path: Option<PathBuf>) -> Arc<Self> {
        let settings = match &settings_path {
            Some(path) => settings::load_settings(path),
            None => GallerySettings::default(),
        };
        log::info!(
            "🔌 插件已加载 - folder={:?} recursive={} thumb={}",
            settings.folder_path,
            settings.recursive,
            settings.thumb_size
        );

        Arc::new(Self {
            settings: RwLock::new(settings),
            settings_path,
            ctx,
            views: Mutex::new(Vec::new()),
        })
    }

    /// 向宿主注册面板与命令。回调只持有弱引用，插件卸载后自动失效。
    pub fn register(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        self.ctx.host.register_panel(
            VIEW_TYPE,
            Arc::new(move || weak.upgrade().map(|plugin| plugin.open_view())),
        );

        let weak: Weak<Self> = Arc::downgrade(self);
        self.ctx.host.register_command(
            OPEN_COMMAND_ID,
            OPEN_COMMAND_NAME,
            Arc::new(move || {
                if let Some(plugin) = weak.upgrade() {
                    plugin.activate_view();
                }
            }),
        );
    }

    /// 让宿主显示侧边栏面板。
    pub fn activate_view(&self) {
        self.ctx.host.reveal_panel(VIEW_TYPE);
    }

    /// 创建一个新视图并立即加载。
    pub fn open_view(&self) -> GalleryHandle {
        let handle = GalleryView::spawn(self.ctx.clone(), self.settings());
        handle.open();

        let mut views = self.lock_views();
        views.retain(|view| !view.is_closed());
        views.push(handle.clone());
        handle
    }

    pub fn settings(&self) -> GallerySettings {
        match self.settings.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn open_views(&self) -> Vec<GalleryHandle> {
        let mut views = self.lock_views();
        views.retain(|view| !view.is_closed());
        views.clone()
    }

    /// 设置表单：文件夹路径。保存后提示并显示面板。
    pub fn set_folder_path(&self, value: &str) -> Result<(), AppError> {
        let folder_path = value.trim().to_string();
        self.update(|settings| settings.folder_path = folder_path)?;
        self.ctx.host.notify_user(FOLDER_SAVED_NOTICE);
        self.activate_view();
        Ok(())
    }

    /// 设置表单：是否递归。
    pub fn set_recursive(&self, recursive: bool) -> Result<(), AppError> {
        self.update(|settings| settings.recursive = recursive)
    }

    /// 设置表单：缩略图尺寸滑块。返回校正后的值。
    pub fn set_thumb_size(&self, value: f64) -> Result<u32, AppError> {
        let size = clamp_thumb_size(value);
        self.update(|settings| settings.thumb_size = size)?;
        Ok(size)
    }

    /// 关闭全部视图。
    pub fn unload(&self) {
        let views = std::mem::take(&mut *self.lock_views());
        for view in views {
            view.close();
        }
        log::info!("🔌 插件已卸载");
    }

    fn update(&self, edit: impl FnOnce(&mut GallerySettings)) -> Result<(), AppError> {
        let snapshot = {
            let mut settings = match self.settings.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            edit(&mut settings);
            *settings = settings.clone().normalized();
            settings.clone()
        };

        self.broadcast(&snapshot);

        match &self.settings_path {
            Some(path) => settings::save_settings(path, &snapshot).inspect_err(|err| {
                log::error!("❌ 保存设置失败: {}", err);
            }),
            None => Ok(()),
        }
    }

    fn broadcast(&self, settings: &GallerySettings) {
        let mut views = self.lock_views();
        views.retain(|view| view.apply_settings(settings.clone()));
    }

    fn lock_views(&self) -> std::sync::MutexGuard<'_, Vec<GalleryHandle>> {
        match self.views.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
