//! Plot configuration.
//!
//! Loaded once from an optional YAML file, validated once, then passed
//! around immutably. Every field defaults to the KHGX 2015-05-20 case.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use archive::ArchiveConfig;
use projection::{MercatorView, MAX_DIMENSION, MAX_LATITUDE};
use radar_common::{parse_target_time, BoundingBox, RadarError, RadarResult};

/// Configuration file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Four-letter radar identifier
    pub site: String,
    /// Requested volume time (RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYYMMDD_HHMMSS`)
    pub target_time: String,
    pub archive: ArchiveConfig,
    pub map: MapConfig,
    pub render: RenderConfig,
    /// Directory receiving the PNG files
    pub output_dir: PathBuf,
    /// Directory for the downloaded volume; system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
    /// Radar position to use instead of the one in the volume
    pub radar_location: Option<RadarLocation>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            site: "KHGX".to_string(),
            target_time: "20150520_190000".to_string(),
            archive: ArchiveConfig::default(),
            map: MapConfig::default(),
            render: RenderConfig::default(),
            output_dir: PathBuf::from("output"),
            scratch_dir: None,
            radar_location: None,
        }
    }
}

/// Map extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub center_lon: f64,
    pub center_lat: f64,
    /// Half-height of the map in degrees of latitude
    pub zoom: f64,
    /// Width-to-height ratio applied to the longitude half-span
    pub aspect: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lon: -95.3632700,
            center_lat: 29.4718835,
            zoom: 1.5,
            aspect: 25.0 / 18.0,
        }
    }
}

/// Image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Map width in pixels
    pub width: u32,
    /// TrueType font for titles and colorbar labels
    pub font_path: Option<PathBuf>,
    /// Degrees between graticule lines
    pub graticule_spacing: f64,
    pub graticule: bool,
    pub colorbar: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            font_path: None,
            graticule_spacing: 0.5,
            graticule: true,
            colorbar: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RadarLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub site: String,
    pub target: DateTime<Utc>,
    pub archive: ArchiveConfig,
    pub bbox: BoundingBox,
    pub render: RenderConfig,
    pub output_dir: PathBuf,
    pub scratch_dir: Option<PathBuf>,
    pub radar_location: Option<RadarLocation>,
}

impl PlotConfig {
    /// Load from `path`, or use the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> RadarResult<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    RadarError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                info!(path = %path.display(), "Loaded configuration file");
                Self::from_yaml(&content)
            }
            None => {
                debug!("No configuration file, using defaults");
                ConfigFile::default().try_into()
            }
        }
    }

    pub fn from_yaml(content: &str) -> RadarResult<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| RadarError::Config(format!("Failed to parse YAML: {}", e)))?;
        file.try_into()
    }
}

impl TryFrom<ConfigFile> for PlotConfig {
    type Error = RadarError;

    fn try_from(file: ConfigFile) -> RadarResult<Self> {
        let site = file.site.trim().to_ascii_uppercase();
        if site.len() != 4 || !site.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RadarError::Config(format!(
                "site must be a 4-character radar identifier, got '{}'",
                file.site
            )));
        }

        let target = parse_target_time(&file.target_time)
            .map_err(|e| RadarError::InvalidTime(e.to_string()))?;

        if file.archive.bucket.trim().is_empty() {
            return Err(RadarError::Config("archive.bucket must not be empty".into()));
        }

        let map = file.map;
        if map.zoom.is_nan() || map.zoom <= 0.0 {
            return Err(RadarError::Config(format!("map.zoom must be positive, got {}", map.zoom)));
        }
        if map.aspect.is_nan() || map.aspect <= 0.0 {
            return Err(RadarError::Config(format!(
                "map.aspect must be positive, got {}",
                map.aspect
            )));
        }

        let bbox = BoundingBox::around_center(map.center_lon, map.center_lat, map.zoom, map.aspect);
        if bbox.min_y < -MAX_LATITUDE || bbox.max_y > MAX_LATITUDE {
            return Err(RadarError::Config(format!(
                "map latitude range {:.3}..{:.3} exceeds ±{}",
                bbox.min_y, bbox.max_y, MAX_LATITUDE
            )));
        }

        if !(64..=MAX_DIMENSION).contains(&file.render.width) {
            return Err(RadarError::Config(format!(
                "render.width must be within 64..={}, got {}",
                MAX_DIMENSION, file.render.width
            )));
        }
        MercatorView::new(bbox, file.render.width)
            .map_err(|e| RadarError::Config(format!("map extent cannot be rendered: {}", e)))?;
        if file.render.graticule_spacing.is_nan() || file.render.graticule_spacing <= 0.0 {
            return Err(RadarError::Config(format!(
                "render.graticule_spacing must be positive, got {}",
                file.render.graticule_spacing
            )));
        }

        if let Some(location) = &file.radar_location {
            if location.latitude.abs() > 90.0 || location.longitude.abs() > 180.0 {
                return Err(RadarError::Config(format!(
                    "radar_location out of range: {:?}",
                    location
                )));
            }
        }

        Ok(Self {
            site,
            target,
            archive: file.archive,
            bbox,
            render: file.render,
            output_dir: file.output_dir,
            scratch_dir: file.scratch_dir,
            radar_location: file.radar_location,
        })
    }
}
