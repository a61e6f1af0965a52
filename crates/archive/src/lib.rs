//! Access to the public NEXRAD Level II archive.
//!
//! Provides:
//! - Object store listing and retrieval (anonymous S3 or any `ObjectStore`)
//! - Archive key classification and timestamp extraction
//! - Nearest-timestamp selection among candidate volumes

pub mod key;
pub mod locator;
pub mod nearest;
pub mod object_store;

pub use self::object_store::{ArchiveConfig, RadarArchive};
pub use key::{build_candidates, classify_key, Candidate, VolumeKey, VolumeKind};
pub use locator::{day_prefix, locate_nearest};
pub use nearest::{nearest_index, select_nearest};
