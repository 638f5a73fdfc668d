//! # 图库配置模块
//!
//! 用户可编辑的设置见 [`crate::settings::GallerySettings`]；
//! 这里集中的是宿主可调但用户不可见的运行参数。

use std::time::Duration;

/// 图库运行参数。
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// 单个文件物化时允许读取的最大体积（字节）。
    pub max_file_size: u64,
    /// 同时进行的缩略图读取数上限，所有视图共享。
    pub max_concurrent_thumbnails: usize,
    /// 两次由监听触发的重载之间的最小间隔。
    pub reload_min_interval: Duration,
    /// 缩略图高度 = 宽度 × 该系数（固定的"书本"比例框）。
    pub thumb_aspect: f64,
    /// 每次滚轮缩放的步长。
    pub zoom_step: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// 全图弹窗占视口的比例。
    pub modal_viewport_fraction: f32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_concurrent_thumbnails: 8,
            reload_min_interval: Duration::from_millis(250),
            thumb_aspect: 1.4,
            zoom_step: 0.1,
            zoom_min: 0.1,
            zoom_max: 8.0,
            modal_viewport_fraction: 0.92,
        }
    }
}

impl GalleryConfig {
    /// 根据配置的宽度计算缩略图框的高度。
    pub fn thumb_height(&self, width: u32) -> u32 {
        (f64::from(width) * self.thumb_aspect).round() as u32
    }
}
