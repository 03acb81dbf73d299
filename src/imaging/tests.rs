use super::{
    CoverageMap, ImageCaptureWorker, ImageSink, MapFileError, capture_file_name,
    parse_capture_name, stitch_zone,
};
use crate::flight_control::CameraAngle;
use crate::objective::ZonedObjective;
use crate::util::Vec2D;
use chrono::{TimeDelta, Utc};
use image::RgbImage;
use std::path::{Path, PathBuf};

fn write_photo(dir: &Path, angle: CameraAngle, x: i32, y: i32) -> PathBuf {
    let path = dir.join(capture_file_name(angle, Vec2D::new(x, y)));
    RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255])).save(&path).unwrap();
    path
}

#[test]
fn test_points_taken_exact_with_overlap_and_clipping() {
    let mut map = CoverageMap::new(2000, 1000);
    map.update_region(500, 500, CameraAngle::Narrow, true);
    assert_eq!(map.points_taken(), 601 * 601);
    map.update_region(700, 500, CameraAngle::Narrow, true);
    assert_eq!(map.points_taken(), map.count_ones());
    map.update_region(0, 0, CameraAngle::Wide, true);
    map.update_region(1999, 999, CameraAngle::Normal, true);
    assert_eq!(map.points_taken(), map.count_ones());
    map.update_region(600, 500, CameraAngle::Normal, false);
    assert_eq!(map.points_taken(), map.count_ones());
    assert!(!map.is_set(600, 500));
    assert!(map.is_set(1999, 999));
}

#[test]
fn test_window_fully_outside_is_noop() {
    let mut map = CoverageMap::new(100, 100);
    map.update_region(-1000, 50, CameraAngle::Narrow, true);
    assert_eq!(map.points_taken(), 0);
    assert_eq!(map.count_ones(), 0);
}

#[test]
fn test_round_trip_both_encodings() {
    let mut map = CoverageMap::new(333, 77);
    map.update_region(100, 30, CameraAngle::Narrow, true);
    for compress in [false, true] {
        let bytes = map.encode(compress).unwrap();
        assert_eq!(bytes[16], u8::from(compress));
        assert_eq!(CoverageMap::decode(&bytes).unwrap(), map);
    }
}

#[test]
fn test_round_trip_all_zero_and_all_one() {
    let empty = CoverageMap::new(64, 9);
    let mut full = CoverageMap::new(64, 9);
    full.update_region(32, 4, CameraAngle::Wide, true);
    assert_eq!(full.count_ones(), 64 * 9);
    for map in [empty, full] {
        for compress in [false, true] {
            let decoded = CoverageMap::decode(&map.encode(compress).unwrap()).unwrap();
            assert_eq!(decoded, map);
            assert_eq!(decoded.points_taken(), map.points_taken());
        }
    }
}

#[test]
fn test_save_and_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coverage.bmap");
    let mut map = CoverageMap::new(500, 250);
    map.update_region(250, 125, CameraAngle::Normal, true);
    map.save(&path, true).unwrap();
    assert_eq!(CoverageMap::load(&path).unwrap(), map);
}

#[test]
fn test_decode_repairs_counter_and_rejects_bad_input() {
    let mut map = CoverageMap::new(40, 40);
    map.update_region(20, 20, CameraAngle::Narrow, true);
    let mut bytes = map.encode(false).unwrap();
    bytes[8] = bytes[8].wrapping_add(1);
    let decoded = CoverageMap::decode(&bytes).unwrap();
    assert_eq!(decoded.points_taken(), decoded.count_ones());

    assert!(matches!(CoverageMap::decode(&bytes[..10]), Err(MapFileError::Truncated)));
    bytes.pop();
    assert!(matches!(CoverageMap::decode(&bytes), Err(MapFileError::SizeMismatch { .. })));
}

#[test]
fn test_restore_or_new_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let map = CoverageMap::restore_or_new(&dir.path().join("missing.bmap"));
    assert_eq!((map.width(), map.height()), (21600, 10800));
    assert_eq!(map.points_taken(), 0);
}

#[test]
fn test_window_queries() {
    let mut map = CoverageMap::new(3000, 3000);
    map.update_region(1000, 1000, CameraAngle::Wide, true);
    assert!(!map.window_has_unset(1000, 1000, CameraAngle::Narrow));
    assert!(map.window_has_unset(1400, 1000, CameraAngle::Narrow));
    assert!(map.vacant_fraction_around(1000, 1000, 400, 10) < f64::EPSILON);
    assert!((map.vacant_fraction_around(2500, 2500, 400, 10) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_capture_name_round_trip() {
    let name = capture_file_name(CameraAngle::Normal, Vec2D::new(10_432, 5120));
    assert_eq!(name, "lens8_10432_5120.png");
    let parsed = parse_capture_name(Path::new("images").join(&name).as_path());
    assert_eq!(parsed, Some((CameraAngle::Normal, Vec2D::new(10_432, 5120))));
    assert_eq!(parse_capture_name(Path::new("lens3_1_2.png")), None);
}

#[test]
fn test_image_sink_drops_when_full() {
    let (sink, mut rx) = ImageSink::new(2);
    assert!(sink.offer(PathBuf::from("a")));
    assert!(sink.offer(PathBuf::from("b")));
    assert!(!sink.offer(PathBuf::from("c")));
    assert_eq!(rx.try_recv().unwrap(), PathBuf::from("a"));
}

#[test]
fn test_compositor_pastes_and_writes_mosaic() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), CameraAngle::Wide, 1000, 1000);
    let mosaic_path = dir.path().join("mosaic.png");
    let mut worker = ImageCaptureWorker::new(mosaic_path.clone(), 100);
    worker.composite(&photo).unwrap();
    assert!(worker.mosaic().get_pixel(10, 10)[0] > 200);
    assert_eq!(worker.mosaic().get_pixel(100, 50), &image::Rgb([0, 0, 0]));

    let (sink, rx) = ImageSink::new(ImageSink::QUEUE_CAPACITY);
    let handle = ImageCaptureWorker::new(mosaic_path.clone(), 100).spawn(rx).unwrap();
    assert!(sink.offer(photo));
    drop(sink);
    handle.join().unwrap();
    assert!(mosaic_path.exists());
}

#[test]
fn test_stitch_zone_produces_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc::now();
    let obj = ZonedObjective::new(
        5,
        now,
        now + TimeDelta::hours(1),
        [1000, 1000, 2000, 1600],
        CameraAngle::Narrow,
        false,
        1.0,
    );
    let photos = vec![
        write_photo(dir.path(), CameraAngle::Narrow, 1300, 1300),
        write_photo(dir.path(), CameraAngle::Narrow, 1700, 1300),
    ];
    let png = stitch_zone(&obj, &photos).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (1000, 600));
    assert!(img.get_pixel(300, 300)[0] > 200);
}
