//! Nearest-timestamp selection.

use chrono::{DateTime, Utc};
use radar_common::{RadarError, RadarResult};

use crate::key::Candidate;

/// Index of the timestamp closest to `pivot`.
///
/// Ties resolve to the earliest index, matching a linear-scan minimum.
/// Returns `None` for an empty slice.
pub fn nearest_index(dates: &[DateTime<Utc>], pivot: DateTime<Utc>) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;

    for (idx, date) in dates.iter().enumerate() {
        let distance = (*date - pivot).num_milliseconds().abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((idx, distance)),
        }
    }

    best.map(|(idx, _)| idx)
}

/// Pick the candidate whose timestamp is closest to `pivot`.
///
/// `prefix` is only used to describe an empty candidate set in the error.
pub fn select_nearest<'a>(
    candidates: &'a [Candidate],
    pivot: DateTime<Utc>,
    prefix: &str,
) -> RadarResult<&'a Candidate> {
    let dates: Vec<DateTime<Utc>> = candidates.iter().map(|c| c.timestamp).collect();

    nearest_index(&dates, pivot)
        .map(|idx| &candidates[idx])
        .ok_or_else(|| RadarError::NoCandidates {
            prefix: prefix.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 5, 20, h, m, s).unwrap()
    }

    #[test]
    fn test_nearest_simple() {
        let dates = [at(18, 50, 0), at(18, 59, 0), at(19, 8, 0)];
        assert_eq!(nearest_index(&dates, at(19, 0, 0)), Some(1));
    }

    #[test]
    fn test_tie_prefers_first() {
        let dates = [at(11, 59, 50), at(12, 0, 10)];
        assert_eq!(nearest_index(&dates, at(12, 0, 0)), Some(0));

        let reversed = [at(12, 0, 10), at(11, 59, 50)];
        assert_eq!(nearest_index(&reversed, at(12, 0, 0)), Some(0));
    }

    #[test]
    fn test_duplicate_timestamps_first_wins() {
        let dates = [at(10, 0, 0), at(12, 0, 0), at(12, 0, 0)];
        assert_eq!(nearest_index(&dates, at(12, 0, 0)), Some(1));
    }

    #[test]
    fn test_empty() {
        assert_eq!(nearest_index(&[], at(12, 0, 0)), None);
    }

    #[test]
    fn test_select_nearest_empty_is_error() {
        let err = select_nearest(&[], at(12, 0, 0), "2015/05/20/KHGX").unwrap_err();
        assert!(matches!(err, RadarError::NoCandidates { ref prefix } if prefix == "2015/05/20/KHGX"));
    }

    #[test]
    fn test_nearest_minimizes_distance_for_all_pivots() {
        let dates: Vec<_> = [3, 17, 17, 29, 41, 58]
            .iter()
            .map(|&m| at(19, m, 0))
            .collect();

        for minute in 0..60 {
            for second in [0, 30] {
                let pivot = at(19, minute, second);
                let idx = nearest_index(&dates, pivot).unwrap();
                let best = (dates[idx] - pivot).num_seconds().abs();

                for (i, d) in dates.iter().enumerate() {
                    let dist = (*d - pivot).num_seconds().abs();
                    assert!(best <= dist);
                    if dist == best {
                        assert!(idx <= i, "tie must resolve to earliest index");
                    }
                }
            }
        }
    }
}
