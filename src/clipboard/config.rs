//! # 复制配置
//!
//! 将读取、解码、写入三个阶段的可调阈值集中在 `ClipboardConfig`，
//! 默认值与图片工具链的平衡档位一致。

/// 剪贴板复制链路配置。
#[derive(Debug, Clone)]
pub struct ClipboardConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 写入剪贴板的最大尝试次数。
    pub clipboard_retries: u32,
    /// 首次重试前的等待（毫秒），之后按指数增长。
    pub clipboard_retry_delay_ms: u64,
    /// 单次退避延迟上限（毫秒）。
    pub clipboard_retry_max_delay_ms: u64,
    /// 单次写入流程允许的总重试预算（毫秒）。
    pub clipboard_retry_max_total_ms: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            clipboard_retries: 3,
            clipboard_retry_delay_ms: 100,
            clipboard_retry_max_delay_ms: 900,
            clipboard_retry_max_total_ms: 1_800,
        }
    }
}
