//! Geostationary satellite projection.
//!
//! Used for full-disk and regional imagery from geostationary imagers
//! (GOES-R ABI, Meteosat SEVIRI). The satellite views Earth from a fixed
//! position above the equator; projection coordinates are scan angles
//! multiplied by the satellite height, giving meters.
//!
//! Reference: GOES-R Product Definition and Users' Guide (PUG) Volume 4,
//! Section 4.2.8.

use serde::{Deserialize, Serialize};

/// Geostationary projection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geostationary {
    /// Satellite height above the Earth surface (meters)
    pub perspective_point_height: f64,
    /// Semi-major axis of the Earth ellipsoid (meters)
    pub semi_major_axis: f64,
    /// Semi-minor axis of the Earth ellipsoid (meters)
    pub semi_minor_axis: f64,
    /// Longitude of the satellite nadir point (degrees)
    pub longitude_origin: f64,
    /// Sweep angle axis: true for "x" (GOES-R), false for "y" (Meteosat)
    pub sweep_x: bool,
}

impl Default for Geostationary {
    fn default() -> Self {
        Self {
            perspective_point_height: 35786023.0,
            semi_major_axis: 6378137.0,
            semi_minor_axis: 6356752.31414,
            longitude_origin: -75.0,
            sweep_x: true,
        }
    }
}

impl Geostationary {
    /// Projection for GOES-East at 75.2°W.
    pub fn goes_east() -> Self {
        Self {
            longitude_origin: -75.2,
            ..Default::default()
        }
    }

    /// Projection for GOES-West at 137.2°W.
    pub fn goes_west() -> Self {
        Self {
            longitude_origin: -137.2,
            ..Default::default()
        }
    }

    /// The CF sweep-angle axis name.
    pub fn sweep_angle_axis(&self) -> &'static str {
        if self.sweep_x {
            "x"
        } else {
            "y"
        }
    }

    /// Convert scan angles (radians from nadir) to geographic coordinates
    /// (lon/lat in degrees). Returns `None` when the scan angle points past
    /// the Earth's limb.
    pub fn scan_to_geographic(&self, x_rad: f64, y_rad: f64) -> Option<(f64, f64)> {
        // A "y" sweep applies the scan angles in the opposite order.
        let (x_rad, y_rad) = if self.sweep_x {
            (x_rad, y_rad)
        } else {
            (y_rad, x_rad)
        };

        let h = self.perspective_point_height;
        let req = self.semi_major_axis;
        let rpol = self.semi_minor_axis;
        let lambda_0 = self.longitude_origin.to_radians();
        let h_total = h + req;

        let sin_x = x_rad.sin();
        let cos_x = x_rad.cos();
        let sin_y = y_rad.sin();
        let cos_y = y_rad.cos();

        // Quadratic coefficients for the distance to the Earth surface
        let a = sin_x.powi(2)
            + cos_x.powi(2) * (cos_y.powi(2) + (req / rpol).powi(2) * sin_y.powi(2));
        let b = -2.0 * h_total * cos_x * cos_y;
        let c = h_total.powi(2) - req.powi(2);

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None; // Scan angle points to space
        }

        let rs = (-b - discriminant.sqrt()) / (2.0 * a);

        // 3D coordinates, satellite-centered and Earth-fixed
        let sx = rs * cos_x * cos_y;
        let sy = -rs * sin_x;
        let sz = rs * cos_x * sin_y;

        let lat = ((req / rpol).powi(2) * sz / (h_total - sx).hypot(sy)).atan();
        let lon = lambda_0 - sy.atan2(h_total - sx);

        Some((lon.to_degrees(), lat.to_degrees()))
    }

    /// Convert geographic coordinates (degrees) to scan angles (radians).
    /// Returns `None` for points on the far side of the Earth.
    pub fn geographic_to_scan(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let h = self.perspective_point_height;
        let req = self.semi_major_axis;
        let rpol = self.semi_minor_axis;
        let lambda_0 = self.longitude_origin.to_radians();
        let h_total = h + req;

        let lat_rad = lat.to_radians();
        let lon_rad = lon.to_radians();

        // Geocentric latitude, accounting for the Earth's oblateness
        let phi_c = ((rpol / req).powi(2) * lat_rad.tan()).atan();

        let e2 = 1.0 - (rpol / req).powi(2);
        let rc = rpol / (1.0 - e2 * phi_c.cos().powi(2)).sqrt();

        let sx = h_total - rc * phi_c.cos() * (lon_rad - lambda_0).cos();
        let sy = -rc * phi_c.cos() * (lon_rad - lambda_0).sin();
        let sz = rc * phi_c.sin();

        // Visibility condition per the PUG: the satellite-to-point ray must
        // not pass through the Earth first.
        if h_total * (h_total - sx) < sy * sy + (req / rpol).powi(2) * sz * sz {
            return None;
        }

        let s_xy = sx.hypot(sy);
        let y_rad = sz.atan2(s_xy);
        let x_rad = (-sy).atan2(sx);

        let (x_rad, y_rad) = if self.sweep_x {
            (x_rad, y_rad)
        } else {
            (y_rad, x_rad)
        };
        Some((x_rad, y_rad))
    }

    /// Convert projection coordinates (meters) to geographic coordinates.
    ///
    /// Projection meters relate to scan angles by the satellite height.
    pub fn unproject(&self, x_m: f64, y_m: f64) -> Option<(f64, f64)> {
        let h = self.perspective_point_height;
        self.scan_to_geographic(x_m / h, y_m / h)
    }

    /// Convert geographic coordinates to projection coordinates (meters).
    pub fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let h = self.perspective_point_height;
        self.geographic_to_scan(lon, lat)
            .map(|(x_rad, y_rad)| (x_rad * h, y_rad * h))
    }
}
