//! # 用户设置
//!
//! 设置文件是一个 JSON 对象：
//!
//! ```json
//! { "folderPath": "/pics", "recursive": true, "thumbSize": 96 }
//! ```
//!
//! 缺失字段取默认值；`thumbSize` 会被取整、按步长对齐并限制在 `[64, 256]`。
//! 每次修改都整体写回文件。

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AppError;

pub const THUMB_SIZE_MIN: u32 = 64;
pub const THUMB_SIZE_MAX: u32 = 256;
pub const THUMB_SIZE_STEP: u32 = 4;
pub const THUMB_SIZE_DEFAULT: u32 = 96;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GallerySettings {
    /// 外部图片目录；为空表示尚未配置。
    pub folder_path: String,
    /// 是否包含子目录。
    pub recursive: bool,
    /// 缩略图宽度（像素）。
    #[serde(deserialize_with = "lenient_thumb_size")]
    pub thumb_size: u32,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            folder_path: String::new(),
            recursive: true,
            thumb_size: THUMB_SIZE_DEFAULT,
        }
    }
}

impl GallerySettings {
    /// 去除路径首尾空白并校正缩略图尺寸。
    pub fn normalized(mut self) -> Self {
        self.folder_path = self.folder_path.trim().to_string();
        self.thumb_size = clamp_thumb_size(f64::from(self.thumb_size));
        self
    }

    /// 已配置的根目录。
    pub fn root(&self) -> Option<&Path> {
        let trimmed = self.folder_path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Path::new(trimmed))
        }
    }
}

/// 把滑块值校正为合法的缩略图尺寸；非正数或非数字回到默认值。
pub fn clamp_thumb_size(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return THUMB_SIZE_DEFAULT;
    }
    let step = f64::from(THUMB_SIZE_STEP);
    let snapped = ((value / step).round() * step) as u32;
    snapped.clamp(THUMB_SIZE_MIN, THUMB_SIZE_MAX)
}

fn lenient_thumb_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let size = match &value {
        serde_json::Value::Number(n) => n.as_f64().map(clamp_thumb_size),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(clamp_thumb_size),
        _ => None,
    };
    Ok(size.unwrap_or(THUMB_SIZE_DEFAULT))
}

/// 读取设置文件。文件不存在或内容无法解析时返回默认值。
pub fn load_settings(path: &Path) -> GallerySettings {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::warn!("⚠️ 读取设置文件失败 {}: {}", path.display(), err);
            }
            return GallerySettings::default();
        }
    };

    match serde_json::from_str::<GallerySettings>(&content) {
        Ok(settings) => settings.normalized(),
        Err(err) => {
            log::warn!("⚠️ 解析设置文件失败，使用默认设置: {}", err);
            GallerySettings::default()
        }
    }
}

/// 整体写回设置文件，必要时创建父目录。
pub fn save_settings(path: &Path, settings: &GallerySettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    log::debug!("💾 设置已保存到 {}", path.display());
    Ok(())
}
