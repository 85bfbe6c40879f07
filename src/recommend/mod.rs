//! Nearest-neighbor recommendations in the embedding space.

use std::cmp::Ordering;

use num_traits::{Float, ToPrimitive};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::features::Record;
use crate::pipeline::EmbeddingResult;

/// Default number of recommendations returned.
pub const DEFAULT_TOP_K: usize = 5;

/// A recommendation query: an existing track or an explicit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Track(i64),
    Point([f64; 3]),
}

/// Euclidean distance between two coordinate slices.
///
/// Only the overlapping prefix is compared when lengths differ.
pub fn euclidean_distance<T>(a: &[T], b: &[T]) -> f64
where
    T: Float + ToPrimitive,
{
    let mut squared = T::zero();
    for i in 0..a.len().min(b.len()) {
        let diff = a[i] - b[i];
        squared = squared + diff * diff;
    }
    squared.sqrt().to_f64().unwrap()
}

/// Ranks the embedded tracks by distance to `target` and returns the
/// closest `top_k`, each annotated with its `distance`.
///
/// Track queries exclude the query track itself; point queries never
/// self-exclude, so a track at distance 0 can be returned. Ties keep the
/// original row order (stable sort). An unknown track id is a
/// [`Error::TrackNotFound`].
pub fn recommend(result: &EmbeddingResult, target: Target, top_k: usize) -> Result<Vec<Record>> {
    let (query_point, exclude_id) = match target {
        Target::Track(id) => {
            let record = result
                .data
                .iter()
                .find(|r| track_id(r) == Some(id))
                .ok_or(Error::TrackNotFound { id })?;
            let point = coords_of(record).ok_or(Error::TrackNotFound { id })?;
            (point, Some(id))
        }
        Target::Point(point) => (point, None),
    };

    let mut ranked: Vec<(f64, &Record)> = result
        .data
        .iter()
        .filter(|record| exclude_id.is_none() || track_id(record) != exclude_id)
        .filter_map(|record| {
            coords_of(record).map(|point| (euclidean_distance(&point, &query_point), record))
        })
        .collect();

    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    ranked.truncate(top_k);

    Ok(ranked
        .into_iter()
        .map(|(distance, record)| {
            let mut out = record.clone();
            out.insert("distance".to_string(), Value::from(distance));
            out
        })
        .collect())
}

fn track_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

fn coords_of(record: &Record) -> Option<[f64; 3]> {
    Some([
        record.get("x")?.as_f64()?,
        record.get("y")?.as_f64()?,
        record.get("z")?.as_f64()?,
    ])
}
