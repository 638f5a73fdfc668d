//! # 物化模块
//!
//! ## 设计思路
//!
//! 按需把磁盘上的图片转成可直接嵌入界面的数据（Data URL），
//! 从不预加载整个文件夹，也不跨扫描缓存。
//!
//! ## 实现思路
//!
//! - 先读 metadata：必须是普通文件，体积不超过上限，尽早失败。
//! - 再整体读取字节，Base64 编码，并附上分类器给出的内容类型。
//! - 全程使用 tokio 异步文件 I/O，不阻塞界面事件循环。

use base64::{Engine as _, engine::general_purpose};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::classifier::content_type_of;
use super::{GalleryConfig, GalleryError};

/// 可直接交给界面图片元素的图片数据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayableImage {
    content_type: &'static str,
    data: String,
}

impl DisplayableImage {
    /// 用文件路径的内容类型封装一段字节。
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Self {
        Self {
            content_type: content_type_of(path),
            data: general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Base64 编码后的载荷。
    pub fn base64(&self) -> &str {
        &self.data
    }

    /// `data:<content-type>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.data)
    }
}

/// 图片物化器。
///
/// 克隆体共享同一个计数器。
#[derive(Debug, Clone)]
pub struct Materializer {
    max_file_size: u64,
    started_loads: Arc<AtomicU64>,
}

impl Materializer {
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            started_loads: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 已发起的 [`load`](Self::load) 次数。
    pub fn started_loads(&self) -> u64 {
        self.started_loads.load(Ordering::Relaxed)
    }

    /// 读取文件并生成可显示的图片数据。
    ///
    /// 失败时返回 [`GalleryError::Read`] 或 [`GalleryError::TooLarge`]，
    /// 调用方应渲染占位符而不是向上传播。
    pub async fn load(&self, path: &Path) -> Result<DisplayableImage, GalleryError> {
        self.started_loads.fetch_add(1, Ordering::Relaxed);
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| GalleryError::read(path, e))?;

        if !metadata.is_file() {
            return Err(GalleryError::read(path, "not a regular file"));
        }

        if metadata.len() > self.max_file_size {
            return Err(GalleryError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.max_file_size,
            });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| GalleryError::read(path, e))?;

        log::debug!(
            "🖼️ 物化完成 - {} ({} 字节)",
            path.display(),
            bytes.len()
        );
        Ok(DisplayableImage::from_bytes(path, &bytes))
    }
}

impl Default for Materializer {
    fn default() -> Self {
        Self::new(&GalleryConfig::default())
    }
}
