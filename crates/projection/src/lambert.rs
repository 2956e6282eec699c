//! Lambert Conformal Conic projection.
//!
//! Commonly used for mid-latitude satellite and weather products. It maps a
//! cone tangent or secant to the Earth's surface onto a flat plane.
//!
//! The projection parameters are:
//! - Central meridian: the reference longitude
//! - Latitude of origin: the latitude where y = 0
//! - Standard parallel(s): one or two (equal for a tangent cone)
//! - Earth radius

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS: f64 = 6371229.0;

/// Lambert Conformal Conic projection parameters, angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambertConformal {
    /// Central meridian (degrees)
    pub central_meridian: f64,
    /// Latitude of projection origin (degrees)
    pub latitude_origin: f64,
    /// First standard parallel (degrees)
    pub standard_parallel1: f64,
    /// Second standard parallel (degrees)
    pub standard_parallel2: f64,
    /// Earth radius (meters)
    pub earth_radius: f64,
}

impl LambertConformal {
    /// Create a new Lambert Conformal projection.
    pub fn new(
        central_meridian: f64,
        latitude_origin: f64,
        standard_parallel1: f64,
        standard_parallel2: f64,
    ) -> Self {
        Self {
            central_meridian,
            latitude_origin,
            standard_parallel1,
            standard_parallel2,
            earth_radius: EARTH_RADIUS,
        }
    }

    /// Cone constant n, the F constant and rho at the projection origin.
    fn cone_constants(&self) -> (f64, f64, f64) {
        let latin1 = self.standard_parallel1.to_radians();
        let latin2 = self.standard_parallel2.to_radians();
        let lat0 = self.latitude_origin.to_radians();

        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = self.earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        (n, f, rho0)
    }

    /// Convert geographic coordinates (degrees) to projection coordinates
    /// (meters from the projection origin).
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let (n, f, rho0) = self.cone_constants();
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        let lon0 = self.central_meridian.to_radians();

        let dlon = normalize_radians(lon - lon0);
        let rho = self.earth_radius * f / (PI / 4.0 + lat / 2.0).tan().powf(n);
        let theta = n * dlon;

        (rho * theta.sin(), rho0 - rho * theta.cos())
    }

    /// Convert projection coordinates (meters) to geographic coordinates
    /// (lon/lat in degrees).
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let (n, f, rho0) = self.cone_constants();
        let lon0 = self.central_meridian.to_radians();

        let rho = (x * x + (rho0 - y) * (rho0 - y)).sqrt();
        let rho = if n < 0.0 { -rho } else { rho };
        let theta = (x / (rho0 - y)).atan();

        let lat = 2.0 * ((self.earth_radius * f / rho).powf(1.0 / n)).atan() - PI / 2.0;
        let lon = normalize_radians(lon0 + theta / n);

        (lon.to_degrees(), lat.to_degrees())
    }
}

fn normalize_radians(mut value: f64) -> f64 {
    while value > PI {
        value -= 2.0 * PI;
    }
    while value < -PI {
        value += 2.0 * PI;
    }
    value
}
