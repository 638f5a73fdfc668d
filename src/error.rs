//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 图库与剪贴板各自有细粒度的错误枚举（[`GalleryError`]、[`CopyError`]），
//! 在插件边界与宿主命令处统一汇总为 `AppError`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为子模块错误与 `std::io::Error` 提供 `From` 转换，调用处直接用 `?`。
//! - 实现 `Serialize` 将错误序列化为字符串，满足 Tauri IPC 要求。

use serde::Serialize;

use crate::clipboard::CopyError;
use crate::gallery::GalleryError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 扫描 / 读取 / 监听
    #[error("{0}")]
    Gallery(#[from] GalleryError),

    /// 复制到剪贴板
    #[error("{0}")]
    Copy(#[from] CopyError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置读写失败
    #[error("设置错误: {0}")]
    Settings(String),

    /// 宿主操作失败（打开外部程序、窗口不存在等）
    #[error("{0}")]
    Host(String),
}

/// Tauri IPC 要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
