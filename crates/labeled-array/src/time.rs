//! Conversions between timestamps and nanosecond offsets.

use chrono::{DateTime, TimeZone, Utc};
use ndarray::{Array1, ArrayD};

use crate::array::ArrayData;

/// Nanoseconds since the Unix epoch for a timestamp.
pub fn datetime_to_ns(value: DateTime<Utc>) -> i64 {
    value.timestamp_nanos_opt().unwrap_or_default()
}

/// Timestamp for a nanosecond offset since the Unix epoch.
pub fn ns_to_datetime(ns: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(ns)
}

/// One-dimensional time array from timestamps.
pub fn time_array(values: &[DateTime<Utc>]) -> ArrayData {
    let ns: Vec<i64> = values.iter().map(|v| datetime_to_ns(*v)).collect();
    ArrayData::time(Array1::from_vec(ns).into_dyn())
}

/// Scalar (zero-dimensional) time array from one timestamp.
pub fn time_scalar(value: DateTime<Utc>) -> ArrayData {
    ArrayData::time(ArrayD::from_elem(ndarray::IxDyn(&[]), datetime_to_ns(value)))
}
