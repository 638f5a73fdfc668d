//! # 外部图片侧边栏 — 库入口
//!
//! 把宿主应用管理范围之外的一个图片目录镜像为可浏览的缩略图网格，
//! 支持全图查看（滚轮缩放）、复制到系统剪贴板、用系统默认程序打开。
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        宿主界面（Tauri WebView / 测试用 RecordingHost）    │
//! │                                                          │
//! │   PanelRender ─ ThumbnailUpdate ─ ModalRender ─ Notice    │
//! └───────┬──────────────────────────────────────▲───────────┘
//!         │ GalleryHandle / ModalHandle（事件）    │ HostSurface
//! ┌───────▼──────────────────────────────────────┴───────────┐
//! │                         Rust                              │
//! │                                                          │
//! │  ┌─ plugin ─────── 设置读写 · 面板/命令注册 · 设置推送      │
//! │  │                                                       │
//! │  ├─ gallery                                              │
//! │  │   ├─ classifier   扩展名 → 是否图片 / 内容类型          │
//! │  │   ├─ scanner      显式栈遍历 + 字节序排序               │
//! │  │   ├─ materializer 文件 → Data URL                      │
//! │  │   ├─ watcher      notify 订阅 + 节流                   │
//! │  │   ├─ view         Empty / Invalid / Loaded 状态机       │
//! │  │   └─ full_view    全图弹窗 + 缩放                       │
//! │  │                                                       │
//! │  ├─ clipboard ──── 读取 → 解码 → 写入剪贴板（带重试）       │
//! │  ├─ host ───────── HostSurface 契约 · 渲染模型 · shell     │
//! │  ├─ settings ───── GallerySettings JSON                   │
//! │  └─ error ──────── AppError                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，宿主命令的返回类型 |
//! | [`settings`] | 用户设置模型、默认值合并、持久化 |
//! | [`gallery`] | 扫描、物化、监听、视图与全图弹窗 |
//! | [`clipboard`] | 位图解码与系统剪贴板写入 |
//! | [`host`] | 宿主契约、渲染模型、外部打开；可选 Tauri 适配 |
//! | [`plugin`] | 生命周期胶水与设置表单操作 |

pub mod clipboard;
pub mod error;
pub mod gallery;
pub mod host;
pub mod plugin;
pub mod settings;
