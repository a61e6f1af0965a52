//! Archive key classification.
//!
//! NEXRAD Level II objects are stored as `<YYYY>/<MM>/<DD>/<SITE>/<name>`
//! where the name encodes the volume start time. Two naming conventions carry
//! a timestamp:
//!
//! - gzip-wrapped volumes: `KHGX20110520_190003_V03.gz` (older archives also
//!   use `KHGX20050520_190239.gz`)
//! - bare Archive II build 6 volumes: `KHGX20150520_190003_V06`
//!
//! Anything else in the listing (`_MDM` metadata files, `.tar.gz`/`.tgz`
//! bundles) is skipped.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use radar_common::time::COMPACT_FORMAT;
use radar_common::{RadarError, RadarResult};
use serde::Serialize;

/// Length of `YYYYMMDD_HHMMSS`.
const TIMESTAMP_LEN: usize = 15;

/// Classification of a single archive key. Exactly one variant per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKey {
    /// Gzip-wrapped volume (`..._V0x.gz` or `....gz`)
    GzipVolume { timestamp: DateTime<Utc> },
    /// Uncompressed-name build 6 volume (`..._V06`)
    V06Volume { timestamp: DateTime<Utc> },
    /// Not a radar volume
    Unrecognized,
}

impl VolumeKey {
    /// Timestamp embedded in the key, if this is a volume.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            VolumeKey::GzipVolume { timestamp } | VolumeKey::V06Volume { timestamp } => {
                Some(*timestamp)
            }
            VolumeKey::Unrecognized => None,
        }
    }

    /// Volume kind, if this is a volume.
    pub fn kind(&self) -> Option<VolumeKind> {
        match self {
            VolumeKey::GzipVolume { .. } => Some(VolumeKind::Gzip),
            VolumeKey::V06Volume { .. } => Some(VolumeKind::V06),
            VolumeKey::Unrecognized => None,
        }
    }
}

/// Storage convention of a recognized volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeKind {
    Gzip,
    V06,
}

/// A volume key paired with its parsed acquisition time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub kind: VolumeKind,
}

/// Classify an archive key.
///
/// The gzip rule is checked first and takes precedence, so a key is never
/// counted twice. A key that matches a suffix rule but carries a malformed
/// timestamp is an error rather than a silent skip.
pub fn classify_key(key: &str) -> RadarResult<VolumeKey> {
    let name = key.rsplit('/').next().unwrap_or(key);

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        return Ok(VolumeKey::Unrecognized);
    }

    if key.contains("gz") {
        let stem = name
            .strip_suffix(".gz")
            .ok_or_else(|| RadarError::key_parse(key, "expected a '.gz' suffix"))?;
        let stem = strip_version(stem).unwrap_or(stem);
        let timestamp = parse_trailing_timestamp(key, stem)?;
        return Ok(VolumeKey::GzipVolume { timestamp });
    }

    if let Some(stem) = name.strip_suffix("_V06") {
        let timestamp = parse_trailing_timestamp(key, stem)?;
        return Ok(VolumeKey::V06Volume { timestamp });
    }

    if name.ends_with("V06") {
        return Err(RadarError::key_parse(key, "expected '_V06' after the timestamp"));
    }

    Ok(VolumeKey::Unrecognized)
}

/// Build the candidate set from a listing.
///
/// Keys that do not start with `prefix` are dropped before classification;
/// unrecognized keys are skipped; listing order is preserved.
pub fn build_candidates<I, S>(keys: I, prefix: &str) -> RadarResult<Vec<Candidate>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates = Vec::new();

    for key in keys {
        let key = key.as_ref();
        if !key.starts_with(prefix) {
            continue;
        }

        let classified = classify_key(key)?;
        if let (Some(timestamp), Some(kind)) = (classified.timestamp(), classified.kind()) {
            candidates.push(Candidate {
                key: key.to_string(),
                timestamp,
                kind,
            });
        }
    }

    Ok(candidates)
}

/// Strip a `_V0<digit>` version suffix.
fn strip_version(stem: &str) -> Option<&str> {
    let (rest, version) = stem.rsplit_once("_V0")?;
    let mut chars = version.chars();
    match (chars.next(), chars.next()) {
        (Some(d), None) if d.is_ascii_digit() => Some(rest),
        _ => None,
    }
}

/// Parse the `YYYYMMDD_HHMMSS` that ends `stem`, preceded by a site identifier.
fn parse_trailing_timestamp(key: &str, stem: &str) -> RadarResult<DateTime<Utc>> {
    if stem.len() <= TIMESTAMP_LEN || !stem.is_char_boundary(stem.len() - TIMESTAMP_LEN) {
        return Err(RadarError::key_parse(
            key,
            "expected <SITE>YYYYMMDD_HHMMSS before the suffix",
        ));
    }

    let (site, text) = stem.split_at(stem.len() - TIMESTAMP_LEN);
    if !site.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RadarError::key_parse(key, format!("invalid site '{}'", site)));
    }

    let naive = NaiveDateTime::parse_from_str(text, COMPACT_FORMAT)
        .map_err(|e| RadarError::key_parse(key, format!("bad timestamp '{}': {}", text, e)))?;

    Ok(Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 5, 20, h, m, s).unwrap()
    }

    #[test]
    fn test_classify_v06() {
        let key = classify_key("2015/05/20/KHGX/KHGX20150520_190003_V06").unwrap();
        assert_eq!(key, VolumeKey::V06Volume { timestamp: at(19, 0, 3) });
    }

    #[test]
    fn test_classify_versioned_gzip() {
        let key = classify_key("2015/05/20/KHGX/KHGX20150520_190003_V03.gz").unwrap();
        assert_eq!(key, VolumeKey::GzipVolume { timestamp: at(19, 0, 3) });
    }

    #[test]
    fn test_classify_legacy_gzip() {
        let key = classify_key("2005/05/20/KHGX/KHGX20050520_190239.gz").unwrap();
        assert_eq!(
            key.timestamp(),
            Some(Utc.with_ymd_and_hms(2005, 5, 20, 19, 2, 39).unwrap())
        );
    }

    #[test]
    fn test_gzip_rule_wins() {
        // Contains "gz" and would also look like a V06 name without the suffix
        let key = classify_key("2015/05/20/KHGX/KHGX20150520_190003_V06.gz").unwrap();
        assert_eq!(key.kind(), Some(VolumeKind::Gzip));
    }

    #[test]
    fn test_classify_unrecognized() {
        let key = classify_key("2015/05/20/KHGX/KHGX20150520_190003_MDM").unwrap();
        assert_eq!(key, VolumeKey::Unrecognized);
        assert_eq!(key.timestamp(), None);
    }

    #[test]
    fn test_tarball_is_skipped() {
        let key = classify_key("2015/05/20/KHGX/KHGX20150520.tar.gz").unwrap();
        assert_eq!(key, VolumeKey::Unrecognized);
        let key = classify_key("2015/05/20/KHGX/NWS_NEXRAD_NXL2DP_KHGX_20150520.tgz").unwrap();
        assert_eq!(key, VolumeKey::Unrecognized);
    }

    #[test]
    fn test_malformed_timestamp_is_error() {
        let err = classify_key("2015/05/20/KHGX/KHGX20151320_190003_V06").unwrap_err();
        assert!(matches!(err, RadarError::KeyParse { .. }));
    }

    #[test]
    fn test_short_key_is_error_not_panic() {
        assert!(classify_key("V06").is_err());
        assert!(classify_key("x.gz").is_err());
    }

    #[test]
    fn test_strip_version() {
        assert_eq!(strip_version("KHGX20150520_190003_V03"), Some("KHGX20150520_190003"));
        assert_eq!(strip_version("KHGX20150520_190003"), None);
        assert_eq!(strip_version("KHGX20150520_190003_V0"), None);
    }
}
