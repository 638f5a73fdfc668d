//! # 复制错误模型
//!
//! 使用单一错误枚举承载复制链路的全部失败来源，调用侧可以按分支匹配，
//! 最终在边界处统一转换为用户通知。

/// 复制到剪贴板失败的原因。
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// 文件无法读取（不存在、权限、不是普通文件）。
    #[error("Cannot read image: {0}")]
    Read(String),

    /// 内容无法解码为位图（矢量格式、空图、未知编码）。
    #[error("Unsupported image format or empty buffer: {0}")]
    UnsupportedFormat(String),

    /// 体积或像素超过上限。
    #[error("Image too large: {0}")]
    ResourceLimit(String),

    /// 系统剪贴板写入失败。
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}

impl CopyError {
    /// 稳定的错误码，供前端分支处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read(_) => "read",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::ResourceLimit(_) => "resource_limit",
            Self::Clipboard(_) => "clipboard",
        }
    }
}
