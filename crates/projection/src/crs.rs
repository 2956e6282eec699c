//! Coordinate reference systems.
//!
//! `Crs` is a closed sum over the reference systems the pipeline understands.
//! Every variant can classify itself as projected or geographic, invert
//! projection coordinates to lon/lat, and export its CF grid-mapping
//! attributes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::geostationary::Geostationary;
use crate::lambert::{LambertConformal, EARTH_RADIUS};

/// A coordinate reference system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Crs {
    /// Geographic lon/lat on a spherical Earth; x/y are degrees.
    Geographic {
        /// Earth radius (meters)
        earth_radius: f64,
    },
    /// Lambert Conformal Conic; x/y are meters.
    LambertConformal(LambertConformal),
    /// Geostationary perspective; x/y are meters.
    Geostationary(Geostationary),
}

impl Crs {
    /// Geographic CRS with the standard Earth radius.
    pub fn geographic() -> Self {
        Crs::Geographic {
            earth_radius: EARTH_RADIUS,
        }
    }

    /// Whether projection coordinates are in meters rather than degrees.
    pub fn is_projected(&self) -> bool {
        !matches!(self, Crs::Geographic { .. })
    }

    /// The CF grid-mapping name for this reference system.
    pub fn grid_mapping_name(&self) -> &'static str {
        match self {
            Crs::Geographic { .. } => "latitude_longitude",
            Crs::LambertConformal(_) => "lambert_conformal_conic",
            Crs::Geostationary(_) => "geostationary",
        }
    }

    /// Convert projection coordinates to geographic lon/lat in degrees.
    ///
    /// Geostationary scan positions past the Earth's limb come back as NaN.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Crs::Geographic { .. } => (x, y),
            Crs::LambertConformal(p) => p.unproject(x, y),
            Crs::Geostationary(p) => p.unproject(x, y).unwrap_or((f64::NAN, f64::NAN)),
        }
    }

    /// Export the CF grid-mapping attributes for this reference system.
    pub fn to_cf(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert(
            "grid_mapping_name".to_string(),
            json!(self.grid_mapping_name()),
        );
        match self {
            Crs::Geographic { earth_radius } => {
                attrs.insert("earth_radius".to_string(), json!(earth_radius));
            }
            Crs::LambertConformal(p) => {
                let parallels = if (p.standard_parallel1 - p.standard_parallel2).abs() < 1e-10 {
                    json!(p.standard_parallel1)
                } else {
                    json!([p.standard_parallel1, p.standard_parallel2])
                };
                attrs.insert("standard_parallel".to_string(), parallels);
                attrs.insert(
                    "longitude_of_central_meridian".to_string(),
                    json!(p.central_meridian),
                );
                attrs.insert(
                    "latitude_of_projection_origin".to_string(),
                    json!(p.latitude_origin),
                );
                attrs.insert("earth_radius".to_string(), json!(p.earth_radius));
            }
            Crs::Geostationary(p) => {
                attrs.insert(
                    "perspective_point_height".to_string(),
                    json!(p.perspective_point_height),
                );
                attrs.insert("semi_major_axis".to_string(), json!(p.semi_major_axis));
                attrs.insert("semi_minor_axis".to_string(), json!(p.semi_minor_axis));
                attrs.insert(
                    "longitude_of_projection_origin".to_string(),
                    json!(p.longitude_origin),
                );
                attrs.insert("latitude_of_projection_origin".to_string(), json!(0.0));
                attrs.insert(
                    "sweep_angle_axis".to_string(),
                    json!(p.sweep_angle_axis()),
                );
            }
        }
        attrs
    }
}
