//! Tank drive path generation
//!
//! Turns a reference curve into one trajectory per drive wheel of a
//! differential-drive vehicle, each sample carrying a position, a target
//! velocity and a display coordinate, and moves those paths over the wire.
//!
//! ```no_run
//! use tank_path_core::common::types::Point2D;
//! use tank_path_core::curve::CubicSpline2D;
//! use tank_path_core::generate_from_curve;
//!
//! let spline = CubicSpline2D::new(&[
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(2.0, 1.0),
//!     Point2D::new(4.0, 0.0),
//! ])?;
//! let path = generate_from_curve(&spline, 0.6, 0.05)?;
//! let bytes = tank_path_core::path::codec::encode_to_vec(&path)?;
//! assert_eq!(&bytes[..4], b"TKPH");
//! # Ok::<(), tank_path_core::PathError>(())
//! ```

pub mod common;
pub mod curve;
pub mod error;
pub mod path;
pub mod render;
pub mod sampling;

pub use error::{PathError, Result};
pub use path::codec::{decode_from_stream, encode_to_stream};
pub use path::generator::{generate_from_curve, DisplayTransform, GeneratorConfig, PathGenerator};
pub use path::{Path, PrimitivePoint, WheelPathPoint};
pub use render::{Renderable, Renderer};
pub use sampling::StepMode;

use std::collections::HashMap;

/// Parse `key=value` arguments into a generator parameter map
pub fn parse_parameters<I, S>(args: I) -> Result<HashMap<String, f64>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut params = HashMap::new();
    for arg in args {
        let arg = arg.as_ref();
        let (key, value) = arg.split_once('=').ok_or_else(|| {
            PathError::InvalidParameter(format!("expected key=value, got {:?}", arg))
        })?;
        let value: f64 = value.trim().parse().map_err(|_| {
            PathError::InvalidParameter(format!("value of {:?} is not a number", key))
        })?;
        params.insert(key.trim().to_string(), value);
    }
    Ok(params)
}
