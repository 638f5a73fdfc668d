//! # 目录扫描模块
//!
//! ## 设计思路
//!
//! 使用显式的待处理目录栈做迭代遍历，而不是递归调用，
//! 目录层级再深也不会增长调用栈。
//!
//! ## 实现思路
//!
//! - 根目录入栈；每弹出一个目录，列出其直接子项。
//! - 子目录仅在 `recursive` 时入栈；普通文件交给分类器判定。
//! - 无法列出的目录（权限不足、扫描中途被删）直接跳过，不中断整次扫描。
//! - 遍历结束后按路径字节序排序，结果与区域设置无关且稳定。
//! - 根目录不存在不是错误，返回空结果；调用方应先用 [`probe_root`] 区分状态。

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use super::GalleryError;
use super::classifier::is_supported_image;

/// 已配置根目录的探测结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootStatus {
    /// 目录存在且可列出。
    Ready,
    NotFound,
    NotADirectory,
    /// 目录存在但无法读取（通常是权限问题）。
    Unreadable(String),
}

/// 探测根目录状态，供视图区分"未找到"与"无法读取"。
pub fn probe_root(root: &Path) -> RootStatus {
    match fs::metadata(root) {
        Err(err) if err.kind() == ErrorKind::NotFound => RootStatus::NotFound,
        Err(err) => RootStatus::Unreadable(err.to_string()),
        Ok(meta) if !meta.is_dir() => RootStatus::NotADirectory,
        Ok(_) => match fs::read_dir(root) {
            Ok(_) => RootStatus::Ready,
            Err(err) => RootStatus::Unreadable(err.to_string()),
        },
    }
}

/// 扫描根目录，返回排序后的图片路径列表。
///
/// # 示例
/// ```rust,no_run
/// use std::path::Path;
/// use photo_sidebar::gallery::scan;
///
/// let images = scan(Path::new("/pics"), true);
/// for path in &images {
///     println!("{}", path.display());
/// }
/// ```
pub fn scan(root: &Path, recursive: bool) -> Vec<PathBuf> {
    walk(root, recursive, list_dir)
}

/// 目录中一个直接子项的类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
    Other,
}

/// 列出 `dir` 的直接子项；单个目录项出错时记录并跳过。
fn list_dir(dir: &Path) -> io::Result<Vec<(PathBuf, EntryKind)>> {
    let mut listed = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("⏭️ 目录项读取失败（{}）: {}", dir.display(), err);
                continue;
            }
        };
        let kind = match entry.file_type() {
            Ok(t) if t.is_dir() => EntryKind::Dir,
            Ok(t) if t.is_file() => EntryKind::File,
            Ok(_) => EntryKind::Other,
            Err(err) => {
                log::debug!("⏭️ 无法获取文件类型 {}: {}", entry.path().display(), err);
                continue;
            }
        };
        listed.push((entry.path(), kind));
    }
    Ok(listed)
}

fn walk<L>(root: &Path, recursive: bool, mut list: L) -> Vec<PathBuf>
where
    L: FnMut(&Path) -> io::Result<Vec<(PathBuf, EntryKind)>>,
{
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    let mut skipped = 0usize;

    while let Some(dir) = pending.pop() {
        let entries = match list(&dir) {
            Ok(entries) => entries,
            Err(source) => {
                // 根目录不存在属于调用方的职责，这里只当作空目录
                if dir.as_path() != root || source.kind() != ErrorKind::NotFound {
                    skipped += 1;
                    log::debug!("⏭️ {}", GalleryError::ScanStep { path: dir, source });
                }
                continue;
            }
        };

        for (path, kind) in entries {
            match kind {
                EntryKind::Dir if recursive => pending.push(path),
                EntryKind::File if is_supported_image(&path) => found.push(path),
                _ => {}
            }
        }
    }

    found.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    log::debug!(
        "🔍 扫描完成 - 根目录: {} 递归: {} 图片: {} 跳过目录: {}",
        root.display(),
        recursive,
        found.len(),
        skipped
    );
    found
}
