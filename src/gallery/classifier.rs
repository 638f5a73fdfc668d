//! # 图片分类模块
//!
//! 纯函数：仅依据扩展名（大小写不敏感）判断是否为受支持图片，并给出内容类型。
//! 不做任何 I/O，也不会失败。

use std::path::Path;

/// 受支持的扩展名白名单（小写、不含点）。
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"];

/// 未知扩展名对应的通用二进制内容类型。
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// 受支持的图片种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
    Svg,
}

impl ImageKind {
    /// 从路径扩展名识别图片种类；不在白名单内返回 `None`。
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::Webp),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }

    /// 矢量格式无法直接作为位图写入剪贴板。
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Svg)
    }
}

/// 判断路径是否指向受支持的图片。
pub fn is_supported_image(path: impl AsRef<Path>) -> bool {
    ImageKind::from_path(path.as_ref()).is_some()
}

/// 返回路径对应的内容类型，未知扩展名回退为 `application/octet-stream`。
pub fn content_type_of(path: impl AsRef<Path>) -> &'static str {
    ImageKind::from_path(path.as_ref())
        .map(ImageKind::content_type)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}
