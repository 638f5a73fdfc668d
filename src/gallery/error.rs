//! # 图库错误模型
//!
//! 图库链路中的错误都只在局部被吸收：目录跳过、缩略图占位、监听降级、
//! 根目录缺失渲染为 `Invalid` 状态。没有任何一个分支允许让面板崩溃。

use std::path::PathBuf;

/// 扫描 / 读取 / 监听阶段的统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    /// 单个目录无法列出，扫描会跳过它继续进行。
    #[error("Cannot list directory {}: {source}", .path.display())]
    ScanStep {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 单个文件无法读取（权限、已删除、不是普通文件）。
    #[error("Cannot read {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    /// 文件超过允许的读取体积。
    #[error("{} is too large: {size} bytes (limit {limit} bytes)", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// 文件系统监听订阅失败或不支持。
    #[error("File watching unavailable: {0}")]
    WatchUnavailable(String),

    /// 已配置的根目录不存在。
    #[error("Folder not found: {}", .0.display())]
    RootMissing(PathBuf),
}

impl GalleryError {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
