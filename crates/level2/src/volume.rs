//! In-memory radar volume assembled from decoded radials.

use chrono::{DateTime, DurationRound, Utc};

use radar_common::time::{acquisition_label, time_units};
use radar_common::{RadarError, RadarResult};

use crate::message::{Moment, Radial, SiteInfo};

/// Volume field names.
pub mod fields {
    pub const REFLECTIVITY: &str = "reflectivity";
    pub const VELOCITY: &str = "velocity";
    pub const SPECTRUM_WIDTH: &str = "spectrum_width";
    pub const DIFFERENTIAL_REFLECTIVITY: &str = "differential_reflectivity";
    pub const DIFFERENTIAL_PHASE: &str = "differential_phase";
    pub const CROSS_CORRELATION_RATIO: &str = "cross_correlation_ratio";
    pub const CLUTTER_FILTER_POWER_REMOVED: &str = "clutter_filter_power_removed";
}

/// Map a message 31 moment name to its volume field name.
pub fn field_name_for_moment(moment: &str) -> Option<&'static str> {
    match moment {
        "REF" => Some(fields::REFLECTIVITY),
        "VEL" => Some(fields::VELOCITY),
        "SW" => Some(fields::SPECTRUM_WIDTH),
        "ZDR" => Some(fields::DIFFERENTIAL_REFLECTIVITY),
        "PHI" => Some(fields::DIFFERENTIAL_PHASE),
        "RHO" => Some(fields::CROSS_CORRELATION_RATIO),
        "CFP" => Some(fields::CLUTTER_FILTER_POWER_REMOVED),
        _ => None,
    }
}

/// A single ray of a sweep.
#[derive(Debug, Clone)]
pub struct Ray {
    pub time: DateTime<Utc>,
    pub azimuth: f32,
    pub elevation: f32,
    pub nyquist_velocity: Option<f32>,
    moments: Vec<(&'static str, Moment)>,
}

impl Ray {
    /// Moment data for a field on this ray.
    pub fn moment(&self, field: &str) -> Option<&Moment> {
        self.moments
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, moment)| moment)
    }

    /// Field names present on this ray.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.moments.iter().map(|(name, _)| *name)
    }
}

/// One elevation cut.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub elevation_number: u8,
    pub rays: Vec<Ray>,
}

impl Sweep {
    /// Mean elevation angle of the rays, degrees.
    pub fn fixed_angle(&self) -> f32 {
        if self.rays.is_empty() {
            return 0.0;
        }
        self.rays.iter().map(|r| r.elevation).sum::<f32>() / self.rays.len() as f32
    }

    /// Whether any ray carries `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.rays.iter().any(|r| r.moment(field).is_some())
    }
}

/// Radar location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level
    pub altitude: f64,
}

/// Per-ray instrument parameters, in volume ray order.
#[derive(Debug, Clone, Default)]
pub struct InstrumentParameters {
    pub nyquist_velocity: Vec<f32>,
    pub unambiguous_range: Vec<f32>,
}

/// A decoded radar volume.
#[derive(Debug, Clone)]
pub struct RadarVolume {
    /// ICAO identifier
    pub site: String,
    /// Radar location, absent for legacy volumes without a volume block
    pub location: Option<Location>,
    /// Volume coverage pattern
    pub vcp: Option<u16>,
    /// Time of the first radial, whole seconds
    pub start_time: DateTime<Utc>,
    /// `seconds since <start_time>`
    pub time_units: String,
    pub sweeps: Vec<Sweep>,
    pub instrument_parameters: InstrumentParameters,
}

impl RadarVolume {
    /// Assemble a volume from radials in stream order.
    ///
    /// Radials are grouped into sweeps by elevation number in order of first
    /// appearance.
    pub fn from_radials(site: String, radials: Vec<Radial>) -> RadarResult<Self> {
        let first = radials
            .first()
            .ok_or_else(|| RadarError::decode("volume contains no radials"))?;

        let start_time = first
            .time
            .duration_trunc(chrono::Duration::seconds(1))
            .map_err(|e| RadarError::decode(format!("bad radial time: {}", e)))?;

        let site_info: Option<SiteInfo> = radials.iter().find_map(|r| r.site);
        let location = site_info.map(|s| Location {
            latitude: s.latitude,
            longitude: s.longitude,
            altitude: s.altitude,
        });

        let mut instrument_parameters = InstrumentParameters::default();
        let mut sweeps: Vec<Sweep> = Vec::new();

        for radial in radials {
            instrument_parameters
                .nyquist_velocity
                .push(radial.nyquist_velocity.unwrap_or(f32::NAN));
            instrument_parameters
                .unambiguous_range
                .push(radial.unambiguous_range.unwrap_or(f32::NAN));

            let ray = Ray {
                time: radial.time,
                azimuth: radial.azimuth,
                elevation: radial.elevation,
                nyquist_velocity: radial.nyquist_velocity,
                moments: radial.moments,
            };

            match sweeps
                .iter_mut()
                .find(|s| s.elevation_number == radial.elevation_number)
            {
                Some(sweep) => sweep.rays.push(ray),
                None => sweeps.push(Sweep {
                    elevation_number: radial.elevation_number,
                    rays: vec![ray],
                }),
            }
        }

        Ok(Self {
            site,
            location,
            vcp: site_info.map(|s| s.vcp),
            time_units: time_units(&start_time),
            start_time,
            sweeps,
            instrument_parameters,
        })
    }

    /// Sweep by index.
    pub fn sweep(&self, index: usize) -> RadarResult<&Sweep> {
        self.sweeps.get(index).ok_or(RadarError::SweepNotFound {
            index,
            available: self.sweeps.len(),
        })
    }

    /// Total number of rays.
    pub fn ray_count(&self) -> usize {
        self.sweeps.iter().map(|s| s.rays.len()).sum()
    }

    /// Whether any sweep carries `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.sweeps.iter().any(|s| s.has_field(field))
    }

    /// Distinct field names in first-seen order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for name in self
            .sweeps
            .iter()
            .flat_map(|s| s.rays.iter())
            .flat_map(|r| r.field_names())
        {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Largest Nyquist velocity in the volume, m/s.
    pub fn max_nyquist_velocity(&self) -> Option<f32> {
        self.instrument_parameters
            .nyquist_velocity
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f32| a.max(v))))
    }

    /// Acquisition timestamp, the third token of the time units.
    pub fn acquisition_label(&self) -> &str {
        acquisition_label(&self.time_units).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn radial(elevation_number: u8, azimuth: f32, nyquist: Option<f32>) -> Radial {
        Radial {
            time: Utc.with_ymd_and_hms(2015, 5, 20, 19, 0, 3).unwrap()
                + chrono::Duration::milliseconds(480),
            azimuth,
            elevation: 0.5 * elevation_number as f32,
            azimuth_number: 1,
            elevation_number,
            radial_status: 1,
            nyquist_velocity: nyquist,
            unambiguous_range: Some(466_000.0),
            site: None,
            moments: vec![(
                fields::REFLECTIVITY,
                Moment {
                    first_gate: 2125.0,
                    gate_spacing: 250.0,
                    values: vec![20.0],
                },
            )],
        }
    }

    #[test]
    fn test_groups_by_elevation_number() {
        let radials = vec![
            radial(1, 0.0, None),
            radial(1, 1.0, None),
            radial(2, 0.0, Some(26.5)),
            radial(1, 2.0, None),
        ];
        let volume = RadarVolume::from_radials("KHGX".into(), radials).unwrap();
        assert_eq!(volume.sweeps.len(), 2);
        assert_eq!(volume.sweeps[0].rays.len(), 3);
        assert_eq!(volume.sweeps[1].elevation_number, 2);
        assert_eq!(volume.ray_count(), 4);
    }

    #[test]
    fn test_time_units_truncated_to_seconds() {
        let volume = RadarVolume::from_radials("KHGX".into(), vec![radial(1, 0.0, None)]).unwrap();
        assert_eq!(volume.time_units, "seconds since 2015-05-20T19:00:03Z");
        assert_eq!(volume.acquisition_label(), "2015-05-20T19:00:03Z");
    }

    #[test]
    fn test_max_nyquist_ignores_missing() {
        let radials = vec![
            radial(1, 0.0, None),
            radial(2, 0.0, Some(8.0)),
            radial(2, 1.0, Some(26.5)),
        ];
        let volume = RadarVolume::from_radials("KHGX".into(), radials).unwrap();
        assert_eq!(volume.max_nyquist_velocity(), Some(26.5));
        assert_eq!(volume.instrument_parameters.nyquist_velocity.len(), 3);
    }

    #[test]
    fn test_empty_volume_is_error() {
        assert!(RadarVolume::from_radials("KHGX".into(), Vec::new()).is_err());
    }

    #[test]
    fn test_missing_sweep() {
        let volume = RadarVolume::from_radials("KHGX".into(), vec![radial(1, 0.0, None)]).unwrap();
        let err = volume.sweep(3).unwrap_err();
        assert!(matches!(err, RadarError::SweepNotFound { index: 3, available: 1 }));
    }

    #[test]
    fn test_field_name_mapping() {
        assert_eq!(field_name_for_moment("RHO"), Some(fields::CROSS_CORRELATION_RATIO));
        assert_eq!(field_name_for_moment("ZDR"), Some(fields::DIFFERENTIAL_REFLECTIVITY));
        assert_eq!(field_name_for_moment("XYZ"), None);
    }
}
