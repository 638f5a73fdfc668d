//! 记录型宿主：把每次调用按顺序记下来，不绘制任何界面。
//! 用于集成测试，也可作为无头环境下的宿主。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{CommandCallback, HostSurface, ModalRender, PanelFactory, PanelRender, ThumbnailUpdate};
use crate::gallery::{GalleryHandle, ModalHandle};

/// 一次宿主调用。
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    RegisterPanel(String),
    RegisterCommand { id: String, name: String },
    RevealPanel(String),
    RenderPanel(PanelRender),
    UpdateThumbnail(ThumbnailUpdate),
    ShowModal(ModalRender),
    UpdateModal(ModalRender),
    CloseModal(u64),
    Notify(String),
    OpenExternally(PathBuf),
}

#[derive(Default)]
struct Registry {
    panels: HashMap<String, PanelFactory>,
    commands: HashMap<String, CommandCallback>,
    modals: HashMap<u64, ModalHandle>,
}

#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    registry: Mutex<Registry>,
}

fn lock_recover<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: HostCall) {
        lock_recover(&self.calls).push(call);
    }

    pub fn calls(&self) -> Vec<HostCall> {
        lock_recover(&self.calls).clone()
    }

    pub fn clear(&self) {
        lock_recover(&self.calls).clear();
    }

    pub fn notices(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Notify(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn panel_renders(&self) -> Vec<PanelRender> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::RenderPanel(render) => Some(render),
                _ => None,
            })
            .collect()
    }

    pub fn last_panel_render(&self) -> Option<PanelRender> {
        self.panel_renders().pop()
    }

    pub fn thumbnail_updates(&self) -> Vec<ThumbnailUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::UpdateThumbnail(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    /// 弹窗最近一次的渲染（显示或更新）。
    pub fn last_modal_render(&self) -> Option<ModalRender> {
        self.calls().into_iter().rev().find_map(|call| match call {
            HostCall::ShowModal(render) | HostCall::UpdateModal(render) => Some(render),
            _ => None,
        })
    }

    /// 仍处于打开状态的弹窗句柄。
    pub fn modal(&self, modal_id: u64) -> Option<ModalHandle> {
        lock_recover(&self.registry).modals.get(&modal_id).cloned()
    }

    pub fn open_modal_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = lock_recover(&self.registry).modals.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// 模拟宿主打开一个已注册的面板。
    pub fn open_panel(&self, view_type: &str) -> Option<GalleryHandle> {
        let factory = lock_recover(&self.registry).panels.get(view_type).cloned()?;
        factory()
    }

    /// 模拟用户执行一条命令；命令不存在时返回 `false`。
    pub fn run_command(&self, id: &str) -> bool {
        let callback = lock_recover(&self.registry).commands.get(id).cloned();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl HostSurface for RecordingHost {
    fn register_panel(&self, view_type: &str, factory: PanelFactory) {
        lock_recover(&self.registry)
            .panels
            .insert(view_type.to_string(), factory);
        self.record(HostCall::RegisterPanel(view_type.to_string()));
    }

    fn register_command(&self, id: &str, name: &str, callback: CommandCallback) {
        lock_recover(&self.registry)
            .commands
            .insert(id.to_string(), callback);
        self.record(HostCall::RegisterCommand {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    fn reveal_panel(&self, view_type: &str) {
        self.record(HostCall::RevealPanel(view_type.to_string()));
    }

    fn render_panel(&self, render: &PanelRender) {
        self.record(HostCall::RenderPanel(render.clone()));
    }

    fn update_thumbnail(&self, update: &ThumbnailUpdate) {
        self.record(HostCall::UpdateThumbnail(update.clone()));
    }

    fn show_modal(&self, handle: ModalHandle, render: &ModalRender) {
        lock_recover(&self.registry)
            .modals
            .insert(render.modal_id, handle);
        self.record(HostCall::ShowModal(render.clone()));
    }

    fn update_modal(&self, render: &ModalRender) {
        self.record(HostCall::UpdateModal(render.clone()));
    }

    fn close_modal(&self, modal_id: u64) {
        lock_recover(&self.registry).modals.remove(&modal_id);
        self.record(HostCall::CloseModal(modal_id));
    }

    fn notify_user(&self, message: &str) {
        self.record(HostCall::Notify(message.to_string()));
    }

    fn open_with_default_app(&self, path: &Path) {
        self.record(HostCall::OpenExternally(path.to_path_buf()));
    }
}
