//! Put irregular profiles onto a fixed altitude grid.
use super::config::GridSpec;
use crate::{errors::RaobErr, sounding::Level};

/// Evenly spaced altitudes, bottom to top inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct AltitudeGrid {
    levels: Vec<f64>,
}

impl AltitudeGrid {
    /// Build the grid described by `spec`.
    pub fn new(spec: &GridSpec) -> Result<Self, RaobErr> {
        if !(spec.step_m > 0.0) || !(spec.top_m > spec.bottom_m) {
            return Err(RaobErr::InvalidConfig(format!(
                "bad altitude grid {} to {} by {}",
                spec.bottom_m, spec.top_m, spec.step_m
            )));
        }

        // Small tolerance so a top that is a whole number of steps is included.
        let n = ((spec.top_m - spec.bottom_m) / spec.step_m + 1e-9).floor() as usize + 1;
        let levels = (0..n)
            .map(|i| spec.bottom_m + i as f64 * spec.step_m)
            .collect();

        Ok(AltitudeGrid { levels })
    }

    /// Altitudes in meters.
    pub fn altitudes(&self) -> &[f64] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// A level with everything the gridded profile needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub height: f64,
    pub pressure: f64,
    pub temperature: f64,
    pub dew_point: Option<f64>,
    pub relative_humidity: f64,
}

impl Sample {
    /// `None` unless the level is usable.
    pub fn from_level(lvl: &Level) -> Option<Self> {
        Some(Sample {
            height: lvl.height?,
            pressure: lvl.pressure?,
            temperature: lvl.temperature?,
            dew_point: lvl.dew_point,
            relative_humidity: lvl.humidity()?,
        })
    }
}

/// Sort samples by height and drop repeated heights, keeping the first seen.
pub fn prepare(samples: &[Sample]) -> Vec<Sample> {
    let mut sorted: Vec<Sample> = samples
        .iter()
        .cloned()
        .filter(|s| s.height.is_finite() && s.pressure > 0.0)
        .collect();
    sorted.sort_by(|a, b| {
        a.height
            .partial_cmp(&b.height)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.dedup_by(|b, a| a.height == b.height);

    sorted
}

/// Linear interpolation of `(x, y)` pairs sorted by strictly increasing x. Returns `None`
/// outside the range of the data.
pub fn linear(points: &[(f64, f64)], x: f64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if x < first.0 || x > last.0 {
        return None;
    }

    let idx = points.partition_point(|&(px, _)| px < x);
    let (x1, y1) = points[idx];
    if x1 == x || idx == 0 {
        return Some(y1);
    }

    let (x0, y0) = points[idx - 1];
    Some(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}

/// The sampled variables on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedFields {
    pub pressure: Vec<Option<f64>>,
    pub temperature: Vec<Option<f64>>,
    pub dew_point: Vec<Option<f64>>,
    pub relative_humidity: Vec<Option<f64>>,
}

/// Interpolate prepared samples onto the grid. Pressure is interpolated in ln(p), the rest
/// linearly in height. Nothing is extrapolated.
pub fn to_grid(samples: &[Sample], grid: &AltitudeGrid) -> GriddedFields {
    let series = |f: &dyn Fn(&Sample) -> Option<f64>| -> Vec<(f64, f64)> {
        samples
            .iter()
            .filter_map(|s| f(s).map(|v| (s.height, v)))
            .collect()
    };

    let ln_p = series(&|s| Some(s.pressure.ln()));
    let t = series(&|s| Some(s.temperature));
    let dp = series(&|s| s.dew_point);
    let rh = series(&|s| Some(s.relative_humidity));

    let on_grid = |pts: &[(f64, f64)]| -> Vec<Option<f64>> {
        grid.altitudes().iter().map(|&z| linear(pts, z)).collect()
    };

    GriddedFields {
        pressure: on_grid(&ln_p).into_iter().map(|v| v.map(f64::exp)).collect(),
        temperature: on_grid(&t),
        dew_point: on_grid(&dp),
        relative_humidity: on_grid(&rh),
    }
}
