//! Smooth band boundaries for rendering
//!
//! Band bounds are interpolated with a monotone cubic (PCHIP) so that the
//! smoothed outline never overshoots the stacked values between knots.

use super::error::{Result, StreamError};

/// Minimum number of interpolated points when no resolution is given
pub const MIN_AUTO_RESOLUTION: usize = 1000;

/// Largest explicit resolution accepted, unless the axis itself is longer
pub const MAX_RESOLUTION: usize = 10_000_000;

/// Interpolates a curve through knots, evaluated at arbitrary positions
pub trait MonotoneInterpolator {
    /// Evaluate the curve through `(x[i], y[i])` at every `at` position
    ///
    /// `x` must be strictly increasing with at least two points.
    fn interpolate(&self, x: &[f64], y: &[f64], at: &[f64]) -> Result<Vec<f64>>;
}

/// Piecewise cubic Hermite interpolation with shape-preserving slopes
#[derive(Debug, Clone, Copy, Default)]
pub struct Pchip;

impl MonotoneInterpolator for Pchip {
    fn interpolate(&self, x: &[f64], y: &[f64], at: &[f64]) -> Result<Vec<f64>> {
        if x.len() != y.len() {
            return Err(StreamError::invalid(format!(
                "interpolation needs matching knots, got {} x and {} y",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(StreamError::invalid(
                "interpolation needs at least two distinct x positions",
            ));
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(StreamError::invalid(
                "interpolation x positions must be strictly increasing",
            ));
        }

        let slopes = pchip_slopes(x, y);
        Ok(at.iter().map(|&t| hermite(x, y, &slopes, t)).collect())
    }
}

/// Knot derivatives for PCHIP
fn pchip_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|k| (y[k + 1] - y[k]) / h[k]).collect();

    if n == 2 {
        return vec![delta[0]; 2];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (m0, m1) = (delta[k - 1], delta[k]);
        if m0 == 0.0 || m1 == 0.0 || m0.signum() != m1.signum() {
            continue;
        }
        // Weighted harmonic mean of neighbouring secants
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / m0 + w2 / m1);
    }

    d[0] = edge_slope(h[0], h[1], delta[0], delta[1]);
    d[n - 1] = edge_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    d
}

/// One-sided three-point end slope, clipped to preserve shape
fn edge_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if d.signum() != m0.signum() || m0 == 0.0 {
        0.0
    } else if m0.signum() != m1.signum() && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

/// Evaluate the cubic Hermite segment containing `t` (clamped to the knot range)
fn hermite(x: &[f64], y: &[f64], d: &[f64], t: f64) -> f64 {
    let n = x.len();
    let t = t.clamp(x[0], x[n - 1]);
    let k = x.partition_point(|&xi| xi <= t).clamp(1, n - 1) - 1;

    let h = x[k + 1] - x[k];
    let s = (t - x[k]) / h;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * y[k] + h10 * h * d[k] + h01 * y[k + 1] + h11 * h * d[k + 1]
}

/// Number of interpolated points for an axis of `n_x` distinct values
///
/// An explicit resolution is rounded up, must cover every distinct x and may
/// not exceed `max(MAX_RESOLUTION, n_x)`. Without one, the resolution is
/// `max(1.2 * n_x, MIN_AUTO_RESOLUTION)`.
pub fn resolve_resolution(n_x: usize, requested: Option<f64>) -> Result<usize> {
    let limit = MAX_RESOLUTION.max(n_x);
    match requested {
        Some(res) if !res.is_finite() || res.ceil() < n_x as f64 => {
            Err(StreamError::invalid(format!(
                "interpolation resolution must be a number greater or equal to the \
                 number of distinct x values ({}), got {}",
                n_x, res
            )))
        }
        Some(res) if res.ceil() > limit as f64 => Err(StreamError::invalid(format!(
            "interpolation resolution must be at most {}, got {}",
            limit, res
        ))),
        Some(res) => Ok(res.ceil() as usize),
        None => Ok(((n_x as f64 * 1.2).ceil() as usize).max(MIN_AUTO_RESOLUTION)),
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
