//! 图库视图端到端流程：RecordingHost + ManualWatchBackend + MemoryClipboard。

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use photo_sidebar::clipboard::{
    COPY_SUCCESS_NOTICE, ClipboardBridge, ClipboardConfig, MemoryClipboard,
};
use photo_sidebar::gallery::{
    GalleryConfig, GalleryContext, GalleryHandle, GalleryView, ItemButton, ManualWatchBackend,
    NO_IMAGES_MESSAGE, WatchMode,
};
use photo_sidebar::host::{HostCall, ImageSlot, PanelBody, PanelRender, RecordingHost};
use photo_sidebar::settings::GallerySettings;

struct Harness {
    host: Arc<RecordingHost>,
    watch: Arc<ManualWatchBackend>,
    clipboard: Arc<MemoryClipboard>,
    ctx: GalleryContext,
}

fn harness() -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let host = Arc::new(RecordingHost::new());
    let watch = Arc::new(ManualWatchBackend::new());
    let clipboard = Arc::new(MemoryClipboard::new());
    let ctx = GalleryContext::new(host.clone())
        .with_config(GalleryConfig {
            reload_min_interval: Duration::from_millis(100),
            ..GalleryConfig::default()
        })
        .with_watch_backend(watch.clone())
        .with_clipboard(ClipboardBridge::new(
            clipboard.clone(),
            ClipboardConfig::default(),
        ));

    Harness {
        host,
        watch,
        clipboard,
        ctx,
    }
}

fn settings(root: &Path, recursive: bool) -> GallerySettings {
    GallerySettings {
        folder_path: root.display().to_string(),
        recursive,
        ..GallerySettings::default()
    }
}

fn png_bytes() -> Vec<u8> {
    let img = ImageBuffer::from_fn(2, 2, |x, y| Rgba([x as u8 * 100, y as u8 * 100, 0, 255]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("encode png");
    cursor.into_inner()
}

/// `/pics` 下有 `b.png`、`A.JPG`、`sub/c.gif`。
fn pics_fixture() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("pics");
    fs::create_dir_all(root.join("sub")).expect("mkdir");
    fs::write(root.join("b.png"), png_bytes()).expect("write b.png");
    fs::write(root.join("A.JPG"), b"jpeg-bytes").expect("write A.JPG");
    fs::write(root.join("sub").join("c.gif"), b"GIF89a").expect("write c.gif");
    (dir, root)
}

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..300 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

fn labels(render: &PanelRender) -> Vec<String> {
    render.items().iter().map(|item| item.label.clone()).collect()
}

fn open(h: &Harness, settings: GallerySettings) -> GalleryHandle {
    let handle = GalleryView::spawn(h.ctx.clone(), settings);
    assert!(handle.open());
    handle
}

#[tokio::test]
async fn recursive_scan_renders_sorted_grid_and_thumbnails() {
    let h = harness();
    let (_dir, root) = pics_fixture();
    let view = open(&h, settings(&root, true));

    assert!(wait_until(|| h.host.thumbnail_updates().len() == 3).await);

    let render = h.host.last_panel_render().expect("panel rendered");
    assert_eq!(render.title, "External Photos");
    assert_eq!(render.dir_info, format!("Recursive: {}", root.display()));
    assert_eq!(labels(&render), vec!["A.JPG", "b.png", "c.gif"]);
    assert_eq!(render.items()[2].path, root.join("sub").join("c.gif"));
    assert!(render.items().iter().all(|item| item.height_px == 134));

    let mut updates = h.host.thumbnail_updates();
    updates.sort_by_key(|u| u.index);
    assert!(updates.iter().all(|u| u.generation == render.generation));
    match &updates[0].thumbnail {
        ImageSlot::Ready { image } => {
            assert_eq!(image.content_type(), "image/jpeg");
            assert!(image.to_data_url().starts_with("data:image/jpeg;base64,"));
        }
        other => panic!("unexpected thumbnail {:?}", other),
    }

    assert_eq!(h.watch.live(), vec![(root.clone(), WatchMode::Recursive)]);
    view.close();
}

#[tokio::test]
async fn flat_scan_skips_subfolders() {
    let h = harness();
    let (_dir, root) = pics_fixture();
    let view = open(&h, settings(&root, false));

    assert!(wait_until(|| h.host.last_panel_render().is_some()).await);
    let render = h.host.last_panel_render().expect("panel rendered");
    assert_eq!(render.dir_info, format!("Folder: {}", root.display()));
    assert_eq!(labels(&render), vec!["A.JPG", "b.png"]);
    assert_eq!(h.watch.live(), vec![(root.clone(), WatchMode::NonRecursive)]);
    view.close();
}

#[tokio::test]
async fn watch_burst_collapses_into_one_trailing_reload() {
    let h = harness();
    let (_dir, root) = pics_fixture();
    let view = open(&h, settings(&root, true));
    assert!(wait_until(|| h.host.panel_renders().len() == 1).await);

    fs::write(root.join("d.webp"), b"RIFF").expect("write d.webp");
    for _ in 0..5 {
        assert_eq!(h.watch.trigger(&root), 1);
    }

    assert!(wait_until(|| {
        h.host
            .last_panel_render()
            .is_some_and(|render| render.items().len() == 4)
    })
    .await);
    tokio::time::sleep(Duration::from_millis(300)).await;

    let renders = h.host.panel_renders();
    assert!(renders.len() <= 3, "burst caused {} renders", renders.len());
    assert_eq!(
        labels(renders.last().expect("render")),
        vec!["A.JPG", "b.png", "d.webp", "c.gif"]
    );
    view.close();
}

#[tokio::test]
async fn stale_generation_thumbnails_never_reach_host() {
    let h = harness();
    let (_dir, root) = pics_fixture();
    let view = open(&h, settings(&root, true));
    view.refresh();
    view.refresh();

    assert!(wait_until(|| h.host.panel_renders().len() == 3).await);
    let latest = h.host.last_panel_render().expect("render").generation;
    assert!(wait_until(|| {
        h.host
            .thumbnail_updates()
            .iter()
            .filter(|u| u.generation == latest)
            .count()
            == 3
    })
    .await);

    // 每条缩略图更新都属于它之前最近的一次渲染
    let calls = h.host.calls();
    let mut current = 0;
    for call in calls {
        match call {
            HostCall::RenderPanel(render) => current = render.generation,
            HostCall::UpdateThumbnail(update) => assert_eq!(update.generation, current),
            _ => {}
        }
    }
    view.close();
}

#[tokio::test]
async fn changing_root_replaces_the_subscription() {
    let h = harness();
    let (_dir, root) = pics_fixture();
    let other = tempfile::tempdir().expect("tempdir");
    let view = open(&h, settings(&root, true));
    assert!(wait_until(|| h.watch.live().len() == 1).await);

    view.apply_settings(settings(other.path(), true));
    assert!(wait_until(|| {
        h.host
            .last_panel_render()
            .is_some_and(|r| r.dir_info == format!("Recursive: {}", other.path().display()))
    })
    .await);

    assert_eq!(
        h.watch.live(),
        vec![(other.path().to_path_buf(), WatchMode::Recursive)]
    );
    let render = h.host.last_panel_render().expect("render");
    assert_eq!(
        render.body,
        PanelBody::NoImages {
            message: NO_IMAGES_MESSAGE
        }
    );
    assert_eq!(h.watch.trigger(&root), 0);
    view.close();
}

#[tokio::test]
async fn missing_folder_recovers_on_manual_refresh() {
    let h = harness();
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("later");
    let view = open(&h, settings(&root, true));

    assert!(wait_until(|| h.host.last_panel_render().is_some()).await);
    assert_eq!(
        h.host.last_panel_render().expect("render").dir_info,
        format!("Folder not found: {}", root.display())
    );
    assert!(h.watch.live().is_empty());

    fs::create_dir(&root).expect("mkdir");
    fs::write(root.join("x.bmp"), b"BM").expect("write");
    view.refresh();

    assert!(wait_until(|| {
        h.host
            .last_panel_render()
            .is_some_and(|r| labels(&r) == vec!["x.bmp"])
    })
    .await);
    assert_eq!(h.watch.live().len(), 1);
    view.close();
}

#[tokio::test]
async fn oversized_file_becomes_placeholder() {
    let h = harness();
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("big.png"), vec![0u8; 64]).expect("write");
    fs::write(dir.path().join("ok.png"), b"png").expect("write");

    let ctx = h.ctx.clone().with_config(GalleryConfig {
        max_file_size: 16,
        ..GalleryConfig::default()
    });
    let view = GalleryView::spawn(ctx, settings(dir.path(), false));
    view.open();

    assert!(wait_until(|| h.host.thumbnail_updates().len() == 2).await);
    let mut updates = h.host.thumbnail_updates();
    updates.sort_by_key(|u| u.index);
    match &updates[0].thumbnail {
        ImageSlot::Failed { glyph, reason } => {
            assert_eq!(*glyph, "⚠️");
            assert!(reason.contains("too large"));
        }
        other => panic!("expected placeholder, got {:?}", other),
    }
    assert!(matches!(updates[1].thumbnail, ImageSlot::Ready { .. }));
    view.close();
}

#[tokio::test]
async fn secondary_activation_copies_to_clipboard() {
    let h = harness();
    let (_dir, root) = pics_fixture();
    let view = open(&h, settings(&root, false));
    assert!(wait_until(|| h.host.last_panel_render().is_some()).await);
    let generation = h.host.last_panel_render().expect("render").generation;

    // 索引 1 是 b.png（真实 PNG）
    assert!(view.activate(generation, 1, ItemButton::Secondary));
    assert!(wait_until(|| !h.host.notices().is_empty()).await);
    assert_eq!(h.host.notices(), vec![COPY_SUCCESS_NOTICE.to_string()]);
    let copied = h.clipboard.last_image().expect("image on clipboard");
    assert_eq!((copied.width, copied.height), (2, 2));

    // 索引 0 是伪造的 JPG
    assert!(view.activate(generation, 0, ItemButton::Secondary));
    assert!(wait_until(|| h.host.notices().len() == 2).await);
    assert!(h.host.notices()[1].starts_with("❌ Copy failed: "));
    view.close();
}

#[tokio::test]
async fn primary_activation_opens_zoomable_modal() {
    let h = harness();
    let (_dir, root) = pics_fixture();
    let view = open(&h, settings(&root, false));
    assert!(wait_until(|| h.host.last_panel_render().is_some()).await);
    let generation = h.host.last_panel_render().expect("render").generation;

    assert!(view.activate(generation, 1, ItemButton::Primary));
    assert!(wait_until(|| h.host.open_modal_ids().len() == 1).await);
    let modal_id = h.host.open_modal_ids()[0];
    let modal = h.host.modal(modal_id).expect("modal handle");

    assert!(wait_until(|| {
        h.host
            .last_modal_render()
            .is_some_and(|r| matches!(r.image, ImageSlot::Ready { .. }))
    })
    .await);
    let render = h.host.last_modal_render().expect("modal render");
    assert_eq!(render.title, "b.png");
    assert_eq!(render.viewport_fraction, 0.92);
    assert_eq!(render.transform_origin, "0 0");

    assert!(!modal.wheel(-100.0, false));
    assert!(modal.wheel(-100.0, true));
    assert!(modal.wheel(-100.0, true));
    assert!(wait_until(|| {
        h.host
            .last_modal_render()
            .is_some_and(|r| r.transform == "scale(1.2)")
    })
    .await);

    assert!(modal.open_externally());
    assert!(modal.close());
    assert!(wait_until(|| h.host.open_modal_ids().is_empty()).await);
    assert!(h
        .host
        .calls()
        .contains(&HostCall::OpenExternally(root.join("b.png"))));
    assert!(h.host.calls().contains(&HostCall::CloseModal(modal_id)));
    view.close();
}

#[tokio::test]
async fn closing_the_view_tears_down_the_watch() {
    let h = harness();
    let (_dir, root) = pics_fixture();
    let view = open(&h, settings(&root, true));
    assert!(wait_until(|| h.watch.live().len() == 1).await);

    assert!(view.close());
    assert!(wait_until(|| view.is_closed()).await);
    assert!(h.watch.live().is_empty());
    assert!(!view.refresh());
}

#[tokio::test]
async fn click_on_grid_drawn_before_watch_reload_is_dropped() {
    let h = harness();
    let (_dir, root) = pics_fixture();
    let view = open(&h, settings(&root, false));
    assert!(wait_until(|| h.host.last_panel_render().is_some()).await);
    let drawn = h.host.last_panel_render().expect("render");
    assert_eq!(labels(&drawn), vec!["A.JPG", "b.png"]);

    fs::write(root.join("0.png"), png_bytes()).expect("write 0.png");
    h.watch.trigger(&root);
    assert!(wait_until(|| {
        h.host
            .last_panel_render()
            .is_some_and(|r| r.items().len() == 3)
    })
    .await);

    // 旧网格的索引 1 是 b.png，新网格的索引 1 已是 A.JPG
    assert!(view.activate(drawn.generation, 1, ItemButton::Primary));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.host.open_modal_ids().is_empty());

    let current = h.host.last_panel_render().expect("render");
    assert!(view.activate(current.generation, 2, ItemButton::Primary));
    assert!(wait_until(|| h.host.open_modal_ids().len() == 1).await);
    let modal = h.host.last_modal_render().expect("modal render");
    assert_eq!(modal.path, root.join("b.png"));
    view.close();
}
