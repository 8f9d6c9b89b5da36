use std::cell::Cell;

use image::{Rgba, RgbaImage};

use super::*;
use crate::codec::data_url;
use crate::config::{InkColor, SignatureOptions, StrokeHook};
use crate::domain::StrokeGroup;
use crate::surface::ContainerSurface;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid(w: u32, h: u32, px: [u8; 4]) -> String {
    codec::encode_data_url(
        &RgbaImage::from_pixel(w, h, Rgba(px)),
        ImageType::Png,
        &EncoderOptions::default(),
    )
    .unwrap()
}

fn decode(url: &str) -> RgbaImage {
    let bytes = data_url::decode(url).unwrap().data;
    image::load_from_memory(&bytes).unwrap().to_rgba8()
}

fn capture_options() -> SignatureOptions {
    SignatureOptions {
        throttle: 0,
        min_distance: 0.0,
        ..Default::default()
    }
}

fn mounted_with(
    config: PadConfig,
    width: f32,
    height: f32,
    ratio: Option<f64>,
) -> (SignaturePad, Rc<ContainerSurface>, Rc<ResizeEvents>) {
    let mut pad = SignaturePad::new(config);
    let surface = Rc::new(ContainerSurface::fixed(width, height, ratio));
    let events = ResizeEvents::new();
    pad.mount(surface.clone(), &events).unwrap();
    (pad, surface, events)
}

fn mounted(
    width: f32,
    height: f32,
    ratio: Option<f64>,
) -> (SignaturePad, Rc<ContainerSurface>, Rc<ResizeEvents>) {
    let config = PadConfig {
        options: capture_options(),
        ..Default::default()
    };
    mounted_with(config, width, height, ratio)
}

fn sample_record() -> DrawingRecord {
    let options = SignatureOptions::default();
    vec![
        StrokeGroup::from_points(
            &options,
            vec![
                StrokePoint::new(10.0, 10.0, 0),
                StrokePoint::new(40.0, 12.0, 16),
                StrokePoint::new(70.0, 30.0, 32),
            ],
        ),
        StrokeGroup::from_points(&options, vec![StrokePoint::new(20.0, 40.0, 100)]),
    ]
    .into()
}

#[test]
fn test_operations_fail_before_mount() {
    let mut pad = SignaturePad::new(PadConfig::default());
    assert!(matches!(pad.to_data(), Err(Error::NotInitialized)));
    assert!(matches!(pad.is_empty(), Err(Error::NotInitialized)));
    assert!(matches!(pad.undo(), Err(Error::NotInitialized)));
    assert!(matches!(pad.lock(), Err(Error::NotInitialized)));
    assert!(matches!(pad.resize(), Err(Error::NotInitialized)));
    assert!(matches!(
        pad.save(None, &EncoderOptions::default()),
        Err(Error::NotInitialized)
    ));
    assert!(matches!(
        pad.stroke_begin(StrokePoint::new(0.0, 0.0, 0)),
        Err(Error::NotInitialized)
    ));
}

#[test]
fn test_mount_registers_exactly_one_listener() {
    let (mut pad, surface, events) = mounted(100.0, 50.0, None);
    assert_eq!(events.listener_count(), 1);

    pad.mount(surface.clone(), &events).unwrap();
    assert_eq!(events.listener_count(), 1);

    pad.unmount();
    assert_eq!(events.listener_count(), 0);
    assert!(!pad.is_mounted());

    for _ in 0..3 {
        pad.mount(surface.clone(), &events).unwrap();
        pad.unmount();
    }
    assert_eq!(events.listener_count(), 0);
}

#[test]
fn test_drop_deregisters_listener() {
    let (pad, _surface, events) = mounted(100.0, 50.0, None);
    drop(pad);
    assert_eq!(events.listener_count(), 0);
}

#[test]
fn test_backing_store_follows_device_pixel_ratio() {
    let (pad, _surface, _events) = mounted(100.0, 50.0, Some(2.0));
    let engine = pad.engine().unwrap();
    assert_eq!(engine.backing_store_size(), (200, 100));
    assert_eq!(engine.scale(), 2.0);

    let (pad, _surface, _events) = mounted(100.0, 50.0, Some(0.5));
    assert_eq!(pad.engine().unwrap().backing_store_size(), (100, 50));
}

#[test]
fn test_resize_preserves_record() {
    let (mut pad, surface, _events) = mounted(100.0, 50.0, Some(1.0));
    let record = sample_record();
    pad.from_data(&record).unwrap();

    surface.set_device_pixel_ratio(Some(3.0));
    pad.resize().unwrap();
    assert_eq!(pad.to_data().unwrap(), record);
    assert_eq!(pad.engine().unwrap().backing_store_size(), (300, 150));
    assert!(!pad.is_empty().unwrap());
}

#[test]
fn test_repeated_resize_renders_identically() {
    let (mut pad, _surface, _events) = mounted(100.0, 50.0, Some(2.0));
    pad.from_data(&sample_record()).unwrap();
    let before = pad.engine().unwrap().to_image();
    for _ in 0..3 {
        pad.resize().unwrap();
    }
    assert_eq!(pad.engine().unwrap().to_image(), before);
}

#[test]
fn test_resize_resets_exported_signature() {
    let (mut pad, _surface, _events) = mounted(100.0, 50.0, None);
    pad.from_data(&sample_record()).unwrap();
    let status = pad.save(None, &EncoderOptions::default()).unwrap();
    assert!(!status.is_empty);
    assert!(!pad.signature().is_placeholder());

    pad.resize().unwrap();
    assert!(pad.signature().is_placeholder());
    assert!(!pad.is_empty().unwrap());
}

#[test]
fn test_resize_event_triggers_resize_once() {
    let (mut pad, surface, events) = mounted(100.0, 50.0, None);
    assert!(!pad.handle_resize_events().unwrap());

    surface.set_device_pixel_ratio(Some(2.0));
    assert_eq!(events.emit(), 1);
    assert!(pad.handle_resize_events().unwrap());
    assert!(!pad.handle_resize_events().unwrap());
    assert_eq!(pad.engine().unwrap().backing_store_size(), (200, 100));
}

#[test]
fn test_container_lengths_drive_display_size() {
    let config = PadConfig {
        width: "50%".parse().unwrap(),
        height: "120px".parse().unwrap(),
        ..Default::default()
    };
    let mut pad = SignaturePad::new(config.clone());
    let surface = Rc::new(ContainerSurface::new(&config, (800.0, 600.0), Some(1.0)));
    let events = ResizeEvents::new();
    pad.mount(surface.clone(), &events).unwrap();
    assert_eq!(pad.engine().unwrap().backing_store_size(), (400, 120));
    assert_eq!(pad.container_style()["width"], "50%");
}

#[test]
fn test_save_on_empty_canvas_for_every_format() {
    let (mut pad, _surface, _events) = mounted(100.0, 50.0, None);
    for format in ["image/png", "image/jpeg", "image/svg+xml"] {
        let status = pad.save(Some(format), &EncoderOptions::default()).unwrap();
        assert_eq!(
            status,
            SaveStatus {
                is_empty: true,
                data: None
            }
        );
    }
    assert!(pad.signature().is_placeholder());
}

#[test]
fn test_save_unsupported_format_changes_nothing() {
    let (mut pad, _surface, _events) = mounted(100.0, 50.0, None);
    pad.from_data(&sample_record()).unwrap();
    let err = pad
        .save(Some("image/gif"), &EncoderOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    assert!(err.to_string().contains("image/png, image/jpeg, image/svg+xml"));
    assert!(pad.signature().is_placeholder());
}

#[test]
fn test_save_stores_snapshot_per_format() {
    let (mut pad, _surface, _events) = mounted(100.0, 50.0, None);
    pad.from_data(&sample_record()).unwrap();

    let png = pad.save(None, &EncoderOptions::default()).unwrap();
    let data = png.data.unwrap();
    assert!(data.starts_with("data:image/png;base64,"));
    assert_eq!(pad.signature().src, data);
    assert_eq!(decode(&data).dimensions(), (100, 50));

    let jpeg = pad
        .save(Some("jpeg"), &EncoderOptions::with_quality(0.8))
        .unwrap();
    assert!(jpeg.data.unwrap().starts_with("data:image/jpeg;base64,"));

    let svg = pad.save(Some("svg"), &EncoderOptions::default()).unwrap();
    assert!(svg.data.unwrap().starts_with("data:image/svg+xml;base64,"));
}

#[test]
fn test_undo_drops_last_stroke() {
    let (mut pad, _surface, _events) = mounted(100.0, 50.0, None);
    let record = sample_record();
    pad.from_data(&record).unwrap();

    assert!(pad.undo().unwrap());
    let after = pad.to_data().unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after.groups()[0], record.groups()[0]);

    assert!(pad.undo().unwrap());
    assert!(pad.to_data().unwrap().is_empty());
    assert!(!pad.undo().unwrap());
    assert!(pad.is_empty().unwrap());
}

#[test]
fn test_lock_blocks_capture_and_keeps_strokes() {
    let (mut pad, _surface, _events) = mounted(100.0, 50.0, None);
    pad.from_data(&sample_record()).unwrap();

    pad.lock().unwrap();
    pad.lock().unwrap();
    assert!(pad.is_locked().unwrap());
    assert!(!pad.stroke_begin(StrokePoint::new(5.0, 5.0, 0)).unwrap());
    assert_eq!(pad.to_data().unwrap().len(), 2);

    pad.unlock().unwrap();
    pad.unlock().unwrap();
    assert!(!pad.is_locked().unwrap());
    assert!(pad.stroke_begin(StrokePoint::new(5.0, 5.0, 0)).unwrap());
    assert!(pad.stroke_update(StrokePoint::new(25.0, 5.0, 20)).unwrap());
    assert!(pad.stroke_end().unwrap());
    assert_eq!(pad.to_data().unwrap().len(), 3);
}

#[test]
fn test_clear_drawing_keeps_layers() {
    let config = PadConfig {
        images: vec![ImageLayer::new(solid(2, 2, RED))],
        ..Default::default()
    };
    let (mut pad, _surface, _events) = mounted_with(config, 100.0, 50.0, None);
    pad.from_data(&sample_record()).unwrap();
    pad.clear_drawing().unwrap();
    assert!(pad.is_empty().unwrap());
    assert_eq!(pad.background_and_cache_images().len(), 1);
}

#[test]
fn test_from_data_url_draws_onto_canvas() {
    let (mut pad, _surface, _events) = mounted(10.0, 10.0, Some(2.0));
    pad.from_data_url(&solid(1, 1, BLUE), &DataUrlOptions::default())
        .unwrap();
    assert!(!pad.is_empty().unwrap());
    let img = pad.engine().unwrap().to_image();
    assert!(img.get_pixel(10, 10)[2] > 200);
}

#[test]
fn test_update_options_before_and_after_mount() {
    let mut pad = SignaturePad::new(PadConfig::default());
    let patch = OptionsPatch::from_json(&serde_json::json!({"penColor": "red", "bogus": 1})).unwrap();
    assert_eq!(pad.update_options(&patch), vec!["penColor"]);

    let surface = Rc::new(ContainerSurface::fixed(50.0, 50.0, None));
    let events = ResizeEvents::new();
    pad.mount(surface, &events).unwrap();
    assert_eq!(
        pad.engine().unwrap().options().pen_color,
        InkColor::rgba(255, 0, 0, 255)
    );

    pad.update_options(&OptionsPatch {
        pen_color: Some(InkColor::rgba(0, 0, 255, 255)),
        ..Default::default()
    });
    pad.stroke_begin(StrokePoint::new(10.0, 10.0, 0)).unwrap();
    pad.stroke_end().unwrap();
    assert_eq!(
        pad.to_data().unwrap().groups()[0].pen_color,
        InkColor::rgba(0, 0, 255, 255)
    );
    assert_eq!(pad.config().options.pen_color, InkColor::rgba(0, 0, 255, 255));
}

#[test]
fn test_failed_first_resize_leaves_pad_unmounted() {
    let mut pad = SignaturePad::new(PadConfig::default()).with_resize_handler(
        |_engine: &mut dyn DrawingEngine, _surface: &dyn Surface| {
            Err(Error::Config("no backing store".into()))
        },
    );
    let events = ResizeEvents::new();
    let surface = Rc::new(ContainerSurface::fixed(10.0, 10.0, None));
    assert!(matches!(pad.mount(surface, &events), Err(Error::Config(_))));
    assert!(!pad.is_mounted());
    assert_eq!(events.listener_count(), 0);
    assert!(matches!(pad.to_data(), Err(Error::NotInitialized)));
}

#[test]
fn test_resize_during_stroke_keeps_stroke_open() {
    let ends = Rc::new(Cell::new(0));
    let counter = ends.clone();
    let (mut pad, surface, _events) = mounted(100.0, 50.0, Some(1.0));
    pad.update_options(&OptionsPatch {
        on_end: Some(StrokeHook::new(move || counter.set(counter.get() + 1))),
        ..Default::default()
    });

    pad.stroke_begin(StrokePoint::new(10.0, 10.0, 0)).unwrap();
    pad.stroke_update(StrokePoint::new(30.0, 10.0, 16)).unwrap();
    surface.set_device_pixel_ratio(Some(2.0));
    pad.resize().unwrap();

    assert!(pad.stroke_update(StrokePoint::new(60.0, 10.0, 32)).unwrap());
    assert!(pad.stroke_end().unwrap());
    assert_eq!(ends.get(), 1);
    let record = pad.to_data().unwrap();
    assert_eq!(record.len(), 1);
    assert_eq!(record.groups()[0].points.len(), 3);
}

#[test]
fn test_open_dot_is_exported() {
    let (mut pad, _surface, _events) = mounted(20.0, 20.0, None);
    pad.stroke_begin(StrokePoint::new(10.0, 10.0, 0)).unwrap();
    let status = pad.save(None, &EncoderOptions::default()).unwrap();
    assert!(!status.is_empty);
    let img = decode(&status.data.unwrap());
    assert!(img.get_pixel(10, 10)[3] > 0);
}

#[test]
fn test_custom_resize_handler_replaces_default() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let mut pad = SignaturePad::new(PadConfig::default()).with_resize_handler(
        move |engine: &mut dyn DrawingEngine, _surface: &dyn Surface| {
            counter.set(counter.get() + 1);
            engine.set_backing_store(10, 10, 1.0)
        },
    );
    let surface = Rc::new(ContainerSurface::fixed(300.0, 300.0, Some(2.0)));
    let events = ResizeEvents::new();
    pad.mount(surface, &events).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(pad.engine().unwrap().backing_store_size(), (10, 10));

    pad.layers.set_signature(ImageLayer::new("kept"));
    pad.resize().unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(pad.signature().src, "kept");
}

#[tokio::test]
async fn test_add_images_paints_in_declared_order() {
    let config = PadConfig {
        options: SignatureOptions {
            pen_color: InkColor::rgba(255, 255, 0, 255),
            ..capture_options()
        },
        images: vec![ImageLayer::new(solid(4, 4, RED))],
        ..Default::default()
    };
    let (mut pad, _surface, _events) = mounted_with(config, 4.0, 4.0, Some(1.0));
    pad.stroke_begin(StrokePoint::new(3.5, 0.5, 0)).unwrap();
    pad.stroke_end().unwrap();
    pad.save(None, &EncoderOptions::default()).unwrap();

    let img1 = ImageLayer::at(solid(2, 2, GREEN), 0, 0);
    let img2 = ImageLayer::at(solid(2, 2, BLUE), 1, 1);
    pad.add_images(vec![img1.clone()]).await.unwrap();
    pad.add_images(vec![img2.clone()]).await.unwrap();

    let layers = pad.background_and_cache_images();
    assert_eq!(layers[1..], [img1, img2]);

    let out = decode(&pad.export_flattened_image(None).await.unwrap());
    assert_eq!(out.dimensions(), (4, 4));
    assert_eq!(out.get_pixel(0, 0).0, GREEN);
    assert_eq!(out.get_pixel(1, 1).0, BLUE);
    assert_eq!(out.get_pixel(3, 3).0, RED);
    let top = out.get_pixel(3, 0).0;
    assert!(top[0] > 250 && top[1] > 250 && top[2] < 5);
}

#[tokio::test]
async fn test_clear_cache_images_leaves_backgrounds_and_signature() {
    let config = PadConfig {
        images: vec![ImageLayer::new(solid(3, 3, RED))],
        ..Default::default()
    };
    let (mut pad, _surface, _events) = mounted_with(config, 3.0, 3.0, None);
    pad.add_images(vec![ImageLayer::new(solid(3, 3, GREEN))])
        .await
        .unwrap();
    pad.add_images(vec![ImageLayer::new(solid(3, 3, BLUE))])
        .await
        .unwrap();

    assert!(pad.clear_cache_images().is_empty());
    assert_eq!(pad.background_and_cache_images().len(), 1);
    let out = decode(&pad.export_flattened_image(None).await.unwrap());
    assert_eq!(out.get_pixel(1, 1).0, RED);
}

#[tokio::test]
async fn test_add_images_defaults_to_nothing() {
    let (mut pad, _surface, _events) = mounted(10.0, 10.0, None);
    let out = decode(&pad.add_images(Vec::new()).await.unwrap());
    // only the placeholder signature
    assert_eq!(out.dimensions(), (1, 1));
    assert!(pad.background_and_cache_images().is_empty());
}

#[tokio::test]
async fn test_merge_with_signature_replaces_snapshot() {
    let config = PadConfig {
        images: vec![ImageLayer::new(solid(4, 4, RED))],
        ..Default::default()
    };
    let (mut pad, _surface, _events) = mounted_with(config, 4.0, 4.0, None);
    let custom = ImageLayer::at(solid(1, 1, BLUE), 2, 2);
    let out = decode(&pad.merge_with_signature(custom.clone()).await.unwrap());
    assert_eq!(out.get_pixel(2, 2).0, BLUE);
    assert_eq!(out.get_pixel(0, 0).0, RED);
    assert_eq!(pad.signature(), &custom);
}

#[tokio::test]
async fn test_export_with_extra_layer_mutates_nothing() {
    let config = PadConfig {
        images: vec![ImageLayer::new(solid(2, 2, RED))],
        ..Default::default()
    };
    let (pad, _surface, _events) = mounted_with(config, 2.0, 2.0, None);
    let out = decode(
        &pad.export_flattened_image(Some(ImageLayer::at(solid(1, 1, GREEN), 1, 1)))
            .await
            .unwrap(),
    );
    assert_eq!(out.get_pixel(1, 1).0, GREEN);
    assert!(pad.signature().is_placeholder());
    assert_eq!(pad.background_and_cache_images().len(), 1);
}

#[tokio::test]
async fn test_undecodable_layer_fails_export() {
    let (mut pad, _surface, _events) = mounted(10.0, 10.0, None);
    let err = pad
        .add_images(vec![ImageLayer::new("data:image/png;base64,AAAA")])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Composition(_)));
}

#[test]
#[should_panic]
fn test_export_outside_tokio_runtime_panics() {
    let (pad, _surface, _events) = mounted(10.0, 10.0, None);
    let _ = futures::executor::block_on(pad.export_flattened_image(None));
}
