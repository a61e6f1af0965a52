//! Common test fixtures: archive key listings, sites and target times.

/// Keys as they appear in the `noaa-nexrad-level2` bucket.
pub mod keys {
    /// Day prefix for KHGX on 2015-05-20.
    pub const KHGX_20150520_PREFIX: &str = "2015/05/20/KHGX";

    /// Volume nearest to [`super::times::KHGX_TARGET`].
    pub const KHGX_20150520_NEAREST: &str = "2015/05/20/KHGX/KHGX20150520_190003_V06";

    /// A slice of the KHGX 2015-05-20 listing, including an MDM sidecar.
    pub const KHGX_20150520: &[&str] = &[
        "2015/05/20/KHGX/KHGX20150520_184152_V06",
        "2015/05/20/KHGX/KHGX20150520_184636_V06",
        "2015/05/20/KHGX/KHGX20150520_185120_V06",
        "2015/05/20/KHGX/KHGX20150520_185120_V06_MDM",
        "2015/05/20/KHGX/KHGX20150520_185604_V06",
        "2015/05/20/KHGX/KHGX20150520_190003_V06",
        "2015/05/20/KHGX/KHGX20150520_190446_V06",
        "2015/05/20/KHGX/KHGX20150520_190930_V06",
    ];

    /// Gzip-era listing for KHGX on 2011-05-20.
    pub const KHGX_20110520: &[&str] = &[
        "2011/05/20/KHGX/KHGX20110520_185604_V03.gz",
        "2011/05/20/KHGX/KHGX20110520_190133_V03.gz",
        "2011/05/20/KHGX/KHGX20110520_190702_V03.gz",
    ];

    /// Pre-versioned gzip listing for KHGX on 2005-05-20.
    pub const KHGX_20050520: &[&str] = &[
        "2005/05/20/KHGX/KHGX20050520_185805.gz",
        "2005/05/20/KHGX/KHGX20050520_190239.gz",
    ];

    /// A key from the following day, outside the 2015-05-20 prefix.
    pub const KHGX_NEXT_DAY: &str = "2015/05/21/KHGX/KHGX20150521_000104_V06";
}

/// Radar sites.
pub mod sites {
    /// KHGX (Houston/Galveston): latitude, longitude, altitude in meters.
    pub const KHGX: (f64, f64, f64) = (29.4719, -95.0792, 25.0);
}

/// Target times.
pub mod times {
    /// Default target in compact form.
    pub const KHGX_TARGET: &str = "20150520_190000";
}
