//! # 渲染模型
//!
//! 视图与弹窗不直接操作界面元素，只产出可序列化的渲染快照交给宿主绘制。
//! 每份面板快照都带有 `generation`，宿主据此丢弃过期的缩略图更新。

use serde::Serialize;
use std::path::PathBuf;

use crate::gallery::DisplayableImage;

/// 缩略图 / 全图读取失败时显示的占位符。
pub const PLACEHOLDER_GLYPH: &str = "⚠️";

/// 一个图片位的加载状态。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ImageSlot {
    Pending,
    Ready { image: DisplayableImage },
    Failed { glyph: &'static str, reason: String },
}

impl ImageSlot {
    pub fn failed(reason: impl ToString) -> Self {
        Self::Failed {
            glyph: PLACEHOLDER_GLYPH,
            reason: reason.to_string(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// 图片在固定尺寸框内的摆放方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ThumbnailFit {
    /// 等比缩放并留白，不拉伸。
    Contain,
}

/// 网格中的一张卡片。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridItem {
    pub index: usize,
    pub path: PathBuf,
    pub label: String,
    pub width_px: u32,
    pub height_px: u32,
    pub fit: ThumbnailFit,
    pub thumbnail: ImageSlot,
}

/// 面板主体。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PanelBody {
    /// 未配置或目录无效，提示文字在 `dir_info` 中。
    Blank,
    NoImages { message: &'static str },
    Grid { items: Vec<GridItem> },
}

/// 一次完整的面板渲染。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelRender {
    pub panel_id: u64,
    pub generation: u64,
    pub title: &'static str,
    pub dir_info: String,
    pub body: PanelBody,
}

impl PanelRender {
    pub fn items(&self) -> &[GridItem] {
        match &self.body {
            PanelBody::Grid { items } => items,
            _ => &[],
        }
    }
}

/// 单张缩略图的增量更新。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailUpdate {
    pub panel_id: u64,
    pub generation: u64,
    pub index: usize,
    pub thumbnail: ImageSlot,
}

/// 全图弹窗的渲染快照。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalRender {
    pub modal_id: u64,
    pub title: String,
    pub path: PathBuf,
    /// 占视口宽 / 高的比例。
    pub viewport_fraction: f32,
    pub image: ImageSlot,
    pub zoom: f64,
    /// CSS 变换，如 `scale(1.2)`。
    pub transform: String,
    pub transform_origin: &'static str,
    pub actions: [&'static str; 2],
}
