//! Spatial references for imagery arrays.
//!
//! Two shapes of geolocation exist in practice: gridded areas with a regular
//! mapping from pixel indices to projection coordinates, and swaths where
//! every pixel carries its own longitude and latitude. `SpatialReference`
//! closes over both; either way `derive_coordinates` yields per-pixel
//! lon/lat arrays.

use ndarray::{Array1, Array2};

use crate::crs::Crs;
use crate::error::{ProjectionError, Result};

/// Projection-coordinate extent of a grid: the outer edges of the corner
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AreaExtent {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl AreaExtent {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

/// A gridded area: uniform x/y axes in a coordinate reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinition {
    /// Identifier, also the name of the exported grid-mapping variable.
    pub area_id: String,
    /// Human-readable description.
    pub description: String,
    pub crs: Crs,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    pub extent: AreaExtent,
}

impl GridDefinition {
    /// Create a grid definition, validating its geometry.
    pub fn new(
        area_id: impl Into<String>,
        description: impl Into<String>,
        crs: Crs,
        width: usize,
        height: usize,
        extent: AreaExtent,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ProjectionError::InvalidGrid(format!(
                "grid must have nonzero size, got {width}x{height}"
            )));
        }
        if extent.x_max <= extent.x_min || extent.y_max <= extent.y_min {
            return Err(ProjectionError::InvalidGrid(format!(
                "extent must be ordered, got {extent:?}"
            )));
        }
        Ok(Self {
            area_id: area_id.into(),
            description: description.into(),
            crs,
            width,
            height,
            extent,
        })
    }

    /// Pixel-center x coordinates, west to east.
    pub fn x_coords(&self) -> Array1<f64> {
        let dx = (self.extent.x_max - self.extent.x_min) / self.width as f64;
        Array1::from_iter(
            (0..self.width).map(|i| self.extent.x_min + (i as f64 + 0.5) * dx),
        )
    }

    /// Pixel-center y coordinates, top row first.
    pub fn y_coords(&self) -> Array1<f64> {
        let dy = (self.extent.y_max - self.extent.y_min) / self.height as f64;
        Array1::from_iter(
            (0..self.height).map(|j| self.extent.y_max - (j as f64 + 0.5) * dy),
        )
    }

    /// Per-pixel longitudes and latitudes, shaped `(height, width)`.
    pub fn lonlats(&self) -> (Array2<f64>, Array2<f64>) {
        let xs = self.x_coords();
        let ys = self.y_coords();
        let mut lons = Array2::zeros((self.height, self.width));
        let mut lats = Array2::zeros((self.height, self.width));
        for (j, &y) in ys.iter().enumerate() {
            for (i, &x) in xs.iter().enumerate() {
                let (lon, lat) = self.crs.unproject(x, y);
                lons[[j, i]] = lon;
                lats[[j, i]] = lat;
            }
        }
        (lons, lats)
    }
}

/// A swath: explicit per-pixel longitude/latitude arrays, no affine mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct SwathDefinition {
    pub lons: Array2<f64>,
    pub lats: Array2<f64>,
    /// Reference system of the underlying geolocation, when known.
    pub crs: Option<Crs>,
}

impl SwathDefinition {
    /// Create a swath from matching lon/lat arrays.
    pub fn new(lons: Array2<f64>, lats: Array2<f64>) -> Result<Self> {
        if lons.shape() != lats.shape() {
            return Err(ProjectionError::SwathShapeMismatch {
                lons: lons.shape().to_vec(),
                lats: lats.shape().to_vec(),
            });
        }
        Ok(Self {
            lons,
            lats,
            crs: None,
        })
    }

    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = Some(crs);
        self
    }
}

/// Where an array's pixels live on the Earth.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialReference {
    Grid(GridDefinition),
    Swath(SwathDefinition),
}

impl SpatialReference {
    /// Per-pixel longitudes and latitudes, shaped `(height, width)`.
    pub fn derive_coordinates(&self) -> (Array2<f64>, Array2<f64>) {
        match self {
            SpatialReference::Grid(grid) => grid.lonlats(),
            SpatialReference::Swath(swath) => (swath.lons.clone(), swath.lats.clone()),
        }
    }

    /// The reference system, when one is declared.
    pub fn crs(&self) -> Option<&Crs> {
        match self {
            SpatialReference::Grid(grid) => Some(&grid.crs),
            SpatialReference::Swath(swath) => swath.crs.as_ref(),
        }
    }

    /// Identifier of a gridded area; swaths have none.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            SpatialReference::Grid(grid) => Some(&grid.area_id),
            SpatialReference::Swath(_) => None,
        }
    }

    pub fn is_swath(&self) -> bool {
        matches!(self, SpatialReference::Swath(_))
    }

    pub fn is_grid(&self) -> bool {
        matches!(self, SpatialReference::Grid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lambert::LambertConformal;
    use ndarray::array;

    fn geo_grid() -> GridDefinition {
        GridDefinition::new(
            "global_ll",
            "Geographic test grid",
            Crs::geographic(),
            4,
            2,
            AreaExtent::new(-180.0, -90.0, 180.0, 90.0),
        )
        .expect("valid grid")
    }

    #[test]
    fn test_grid_validation() {
        let bad = GridDefinition::new(
            "bad",
            "",
            Crs::geographic(),
            0,
            2,
            AreaExtent::new(0.0, 0.0, 1.0, 1.0),
        );
        assert!(bad.is_err());

        let inverted = GridDefinition::new(
            "bad",
            "",
            Crs::geographic(),
            2,
            2,
            AreaExtent::new(1.0, 0.0, 0.0, 1.0),
        );
        assert!(inverted.is_err());
    }

    #[test]
    fn test_pixel_center_axes() {
        let grid = geo_grid();
        let xs = grid.x_coords();
        let ys = grid.y_coords();
        assert_eq!(xs.len(), 4);
        assert_eq!(ys.len(), 2);
        assert!((xs[0] - -135.0).abs() < 1e-10);
        assert!((xs[3] - 135.0).abs() < 1e-10);
        // Top row first
        assert!((ys[0] - 45.0).abs() < 1e-10);
        assert!((ys[1] - -45.0).abs() < 1e-10);
    }

    #[test]
    fn test_geographic_lonlats_match_axes() {
        let grid = geo_grid();
        let (lons, lats) = grid.lonlats();
        assert_eq!(lons.shape(), &[2, 4]);
        assert!((lons[[0, 0]] - -135.0).abs() < 1e-10);
        assert!((lats[[0, 0]] - 45.0).abs() < 1e-10);
        assert!((lats[[1, 2]] - -45.0).abs() < 1e-10);
    }

    #[test]
    fn test_projected_lonlats_agree_with_inverse() {
        let crs = Crs::LambertConformal(LambertConformal::new(-97.5, 38.5, 38.5, 38.5));
        let grid = GridDefinition::new(
            "conus",
            "Lambert test grid",
            crs.clone(),
            3,
            3,
            AreaExtent::new(-1.5e6, -1.5e6, 1.5e6, 1.5e6),
        )
        .expect("valid grid");

        let (lons, lats) = grid.lonlats();
        let x = grid.x_coords()[1];
        let y = grid.y_coords()[1];
        let (lon, lat) = crs.unproject(x, y);
        assert!((lons[[1, 1]] - lon).abs() < 1e-12);
        assert!((lats[[1, 1]] - lat).abs() < 1e-12);
    }

    #[test]
    fn test_swath_shape_mismatch() {
        let lons = array![[0.0, 1.0], [0.0, 1.0]];
        let lats = array![[0.0, 1.0]];
        assert!(SwathDefinition::new(lons, lats).is_err());
    }

    #[test]
    fn test_swath_derive_coordinates_returns_data() {
        let lons = array![[0.0, 1.0], [0.0, 1.0]];
        let lats = array![[50.0, 50.0], [49.0, 49.0]];
        let swath = SwathDefinition::new(lons.clone(), lats.clone()).expect("matching shapes");
        let area = SpatialReference::Swath(swath);
        let (got_lons, got_lats) = area.derive_coordinates();
        assert_eq!(got_lons, lons);
        assert_eq!(got_lats, lats);
        assert!(area.is_swath());
        assert_eq!(area.identifier(), None);
    }
}
