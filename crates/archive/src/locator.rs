//! Nearest-volume lookup against the archive.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use radar_common::RadarResult;

use crate::key::{build_candidates, Candidate};
use crate::nearest::select_nearest;
use crate::object_store::RadarArchive;

/// Archive prefix for a site on the UTC day of `at`.
/// Format: {YYYY}/{MM}/{DD}/{SITE}
pub fn day_prefix(site: &str, at: &DateTime<Utc>) -> String {
    format!("{}{}", at.format("%Y/%m/%d/"), site)
}

/// Find the archived volume closest in time to `target`.
///
/// Only the target's UTC day is listed; the candidate set is rebuilt on every
/// call.
#[instrument(skip(archive), fields(bucket = %archive.bucket()))]
pub async fn locate_nearest(
    archive: &RadarArchive,
    site: &str,
    target: DateTime<Utc>,
) -> RadarResult<Candidate> {
    let prefix = day_prefix(site, &target);
    let keys = archive.list(&prefix).await?;
    let candidates = build_candidates(&keys, &prefix)?;

    let selected = select_nearest(&candidates, target, &prefix)?.clone();

    info!(
        prefix = %prefix,
        listed = keys.len(),
        candidates = candidates.len(),
        key = %selected.key,
        offset_secs = (selected.timestamp - target).num_seconds(),
        "Selected nearest volume"
    );

    Ok(selected)
}
