//! End-to-end runs against an in-memory archive.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use object_store::{memory::InMemory, path::Path, ObjectStore};

use archive::RadarArchive;
use radar_common::RadarError;
use radar_plot::config::RadarLocation;
use radar_plot::{pipeline, PlotConfig};
use test_utils::fixtures::{keys, sites};
use test_utils::{legacy_message1_volume, list_files, temp_test_dir, SyntheticVolume};

const ACQUISITION: &str = "2015-05-20T19:00:03Z";

async fn archive_with_volume(volume: Vec<u8>) -> RadarArchive {
    let store = InMemory::new();
    for key in keys::KHGX_20150520 {
        let payload = if *key == keys::KHGX_20150520_NEAREST {
            Bytes::from(volume.clone())
        } else {
            Bytes::from_static(b"not a volume")
        };
        store.put(&Path::from(*key), payload.into()).await.unwrap();
    }
    RadarArchive::with_store(Arc::new(store), "noaa-nexrad-level2")
}

fn config_for(output: &std::path::Path, scratch: &std::path::Path) -> PlotConfig {
    let mut config = PlotConfig::from_yaml("render:\n  width: 200\n").unwrap();
    config.output_dir = output.to_path_buf();
    config.scratch_dir = Some(scratch.to_path_buf());
    config
}

fn volume_start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 5, 20, 19, 0, 3).unwrap()
}

#[tokio::test]
async fn test_writes_four_plots_for_nearest_volume() {
    let volume = SyntheticVolume::khgx_split_cut(volume_start()).to_archive_bytes();
    let archive = archive_with_volume(volume).await;
    let output = temp_test_dir();
    let scratch = temp_test_dir();
    let config = config_for(output.path(), scratch.path());

    let written = pipeline::run(&config, &archive).await.unwrap();

    let expected: Vec<String> = [
        "reflectivity",
        "correlation_coefficent",
        "differential_reflectivity",
        "velocity",
    ]
    .iter()
    .map(|slug| format!("{}-{}.png", ACQUISITION, slug))
    .collect();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, expected);

    let mut sorted = expected.clone();
    sorted.sort();
    assert_eq!(list_files(output.path()), sorted);

    for path in &written {
        let img = image::open(path).unwrap();
        assert_eq!(img.width(), 220);
        assert!(img.height() > 200);
    }
}

#[tokio::test]
async fn test_scratch_file_is_removed() {
    let volume = SyntheticVolume::khgx_split_cut(volume_start()).to_archive_bytes();
    let archive = archive_with_volume(volume).await;
    let output = temp_test_dir();
    let scratch = temp_test_dir();
    let config = config_for(output.path(), scratch.path());

    pipeline::run(&config, &archive).await.unwrap();

    assert!(list_files(scratch.path()).is_empty());
}

#[tokio::test]
async fn test_gzip_volume_renders() {
    let volume = SyntheticVolume::khgx_split_cut(volume_start()).to_gzip_bytes();
    let archive = archive_with_volume(volume).await;
    let output = temp_test_dir();
    let scratch = temp_test_dir();
    let config = config_for(output.path(), scratch.path());

    let written = pipeline::run(&config, &archive).await.unwrap();
    assert_eq!(written.len(), 4);
}

#[tokio::test]
async fn test_empty_day_reports_no_candidates() {
    let archive = RadarArchive::with_store(Arc::new(InMemory::new()), "noaa-nexrad-level2");
    let output = temp_test_dir();
    let scratch = temp_test_dir();
    let config = config_for(output.path(), scratch.path());

    let err = pipeline::run(&config, &archive).await.unwrap_err();

    assert!(matches!(err, RadarError::NoCandidates { ref prefix } if prefix == keys::KHGX_20150520_PREFIX));
    assert!(list_files(output.path()).is_empty());
}

#[tokio::test]
async fn test_undecodable_volume_fails_before_rendering() {
    let archive = archive_with_volume(b"<html>Access Denied</html>".to_vec()).await;
    let output = temp_test_dir();
    let scratch = temp_test_dir();
    let config = config_for(output.path(), scratch.path());

    let err = pipeline::run(&config, &archive).await.unwrap_err();

    assert!(matches!(err, RadarError::Decode(_)));
    assert!(list_files(output.path()).is_empty());
    assert!(list_files(scratch.path()).is_empty());
}

#[tokio::test]
async fn test_volume_without_location_needs_override() {
    let archive = archive_with_volume(legacy_message1_volume(volume_start(), 36)).await;
    let output = temp_test_dir();
    let scratch = temp_test_dir();
    let config = config_for(output.path(), scratch.path());

    let err = pipeline::run(&config, &archive).await.unwrap_err();

    assert!(matches!(err, RadarError::Decode(ref msg) if msg.contains("radar_location")));
}

#[tokio::test]
async fn test_missing_field_stops_after_earlier_plots() {
    let archive = archive_with_volume(legacy_message1_volume(volume_start(), 36)).await;
    let output = temp_test_dir();
    let scratch = temp_test_dir();
    let mut config = config_for(output.path(), scratch.path());
    config.radar_location = Some(RadarLocation {
        latitude: sites::KHGX.0,
        longitude: sites::KHGX.1,
    });

    let err = pipeline::run(&config, &archive).await.unwrap_err();

    assert!(matches!(err, RadarError::FieldNotFound(ref f) if f.contains("cross_correlation_ratio")));
    assert_eq!(
        list_files(output.path()),
        vec![format!("{}-reflectivity.png", ACQUISITION)]
    );
}

#[test]
fn test_render_volume_without_archive() {
    let bytes = SyntheticVolume::khgx_split_cut(volume_start()).to_archive_bytes();
    let volume = level2::decode(&bytes).unwrap();
    let output = temp_test_dir();
    let scratch = temp_test_dir();
    let mut config = config_for(output.path(), scratch.path());
    config.render.graticule = false;
    config.render.colorbar = false;

    let written = radar_plot::render_volume(&config, &volume).unwrap();

    let img = image::open(&written[0]).unwrap();
    assert_eq!(img.width(), 220);
    assert_eq!(written.len(), 4);
}

#[test]
fn test_missing_font_fails_before_writing() {
    let bytes = SyntheticVolume::khgx_split_cut(volume_start()).to_archive_bytes();
    let volume = level2::decode(&bytes).unwrap();
    let output = temp_test_dir();
    let scratch = temp_test_dir();
    let mut config = config_for(output.path(), scratch.path());
    config.render.font_path = Some(output.path().join("missing.ttf"));

    let err = radar_plot::render_volume(&config, &volume).unwrap_err();

    assert!(matches!(err, RadarError::Io(_)));
    assert!(list_files(output.path()).is_empty());
}
