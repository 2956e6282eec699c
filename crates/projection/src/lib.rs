//! Coordinate reference system transformations and spatial references.
//!
//! Implements map projections from scratch without external dependencies.

pub mod area;
pub mod crs;
pub mod error;
pub mod geostationary;
pub mod lambert;

pub use area::{AreaExtent, GridDefinition, SpatialReference, SwathDefinition};
pub use crs::Crs;
pub use error::{ProjectionError, Result};
pub use geostationary::Geostationary;
pub use lambert::{LambertConformal, EARTH_RADIUS};
