//! # 读取与解码流水线
//!
//! ## 设计思路
//!
//! 将"文件 → 字节 → 位图 → RGBA"的过程集中管理，并在关键节点做资源上限控制。
//! 优先做签名和尺寸检查，再进行完整解码，降低异常输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. metadata 校验（普通文件 + 体积上限），读取字节
//! 2. 矢量格式（SVG）直接拒绝：剪贴板图片接口只接受位图
//! 3. `infer` 识别文件签名，非图片直接拒绝
//! 4. 读取 header 尺寸，按像素 / 内存上限快速拒绝，空图拒绝
//! 5. 完整解码并转换为 RGBA，校验字节长度一致性

use image::{GenericImageView, ImageReader};
use std::io::Cursor;
use std::path::Path;

use super::{ClipboardConfig, CopyError};
use crate::gallery::ImageKind;

/// 读取阶段输出：原始字节与按扩展名识别的种类。
pub(crate) struct RawImageData {
    pub(crate) bytes: Vec<u8>,
    pub(crate) kind: Option<ImageKind>,
}

/// 解码阶段输出：可写入剪贴板的 RGBA 像素数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedClipboardImage {
    /// 图像宽度（像素）。
    pub width: usize,
    /// 图像高度（像素）。
    pub height: usize,
    /// RGBA 字节数组（`width * height * 4`）。
    pub bytes: Vec<u8>,
}

/// 从本地路径读取原始字节。
pub(crate) async fn load_from_file(
    path: &Path,
    config: &ClipboardConfig,
) -> Result<RawImageData, CopyError> {
    log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| CopyError::Read(format!("{}: {}", path.display(), e)))?;

    if !metadata.is_file() {
        return Err(CopyError::Read(format!("{}: not a regular file", path.display())));
    }

    if metadata.len() > config.max_file_size {
        return Err(CopyError::ResourceLimit(format!(
            "{:.2} MB (limit {:.2} MB)",
            metadata.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CopyError::Read(format!("{}: {}", path.display(), e)))?;

    Ok(RawImageData {
        bytes,
        kind: ImageKind::from_path(path),
    })
}

/// 将原始字节解码为可写入剪贴板的 RGBA 数据。
pub(crate) fn decode_for_clipboard(
    raw: &RawImageData,
    config: &ClipboardConfig,
) -> Result<PreparedClipboardImage, CopyError> {
    if let Some(kind) = raw.kind {
        if kind.is_vector() {
            return Err(CopyError::UnsupportedFormat(format!(
                "{} is a vector format",
                kind.content_type()
            )));
        }
    }

    validate_image_signature(&raw.bytes)?;

    let (header_width, header_height) = inspect_dimensions(&raw.bytes)?;
    if header_width == 0 || header_height == 0 {
        return Err(CopyError::UnsupportedFormat("image has no pixels".to_string()));
    }
    validate_pixel_limits(config, header_width, header_height)?;
    validate_decoded_memory_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(&raw.bytes)
        .map_err(|e| CopyError::UnsupportedFormat(e.to_string()))?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(CopyError::UnsupportedFormat("image has no pixels".to_string()));
    }

    let bytes = decoded.to_rgba8().into_raw();
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| CopyError::ResourceLimit("pixel buffer size overflows".to_string()))?;

    if bytes.len() != expected_len {
        return Err(CopyError::UnsupportedFormat(
            "decoded pixel buffer has unexpected length".to_string(),
        ));
    }

    log::info!("✅ 图片解码成功 - 尺寸: {}x{}", width, height);

    Ok(PreparedClipboardImage {
        width: width as usize,
        height: height as usize,
        bytes,
    })
}

/// 通过文件签名（magic bytes）校验输入是否为图片。
fn validate_image_signature(bytes: &[u8]) -> Result<(), CopyError> {
    if bytes.is_empty() {
        return Err(CopyError::UnsupportedFormat("file is empty".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| CopyError::UnsupportedFormat("unrecognized file signature".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(CopyError::UnsupportedFormat(format!(
            "file signature is {}",
            kind.mime_type()
        )));
    }

    Ok(())
}

/// 仅通过图片头信息读取宽高，用于完整解码前的上限检查。
fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), CopyError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CopyError::UnsupportedFormat(e.to_string()))?
        .into_dimensions()
        .map_err(|e| CopyError::UnsupportedFormat(e.to_string()))
}

fn validate_pixel_limits(config: &ClipboardConfig, width: u32, height: u32) -> Result<(), CopyError> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > config.max_decoded_pixels {
        return Err(CopyError::ResourceLimit(format!(
            "{} pixels (limit {} pixels)",
            pixels, config.max_decoded_pixels
        )));
    }
    Ok(())
}

fn validate_decoded_memory_limits(
    config: &ClipboardConfig,
    width: u32,
    height: u32,
) -> Result<(), CopyError> {
    let estimated = u64::from(width) * u64::from(height) * 4;
    if estimated > config.max_decoded_bytes {
        return Err(CopyError::ResourceLimit(format!(
            "decoding needs {:.2} MB (limit {:.2} MB)",
            estimated as f64 / 1024.0 / 1024.0,
            config.max_decoded_bytes as f64 / 1024.0 / 1024.0
        )));
    }
    Ok(())
}
