//! Correlated scatter samples and the statistics drawn over them.

use tracing::warn;

use crate::rng::Mulberry32;

/// Scatter x values land in this range after generation.
pub const X_RANGE: (f64, f64) = (0.0, 100.0);
/// Scatter y values land in this range after generation.
pub const Y_RANGE: (f64, f64) = (-60.0, 60.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

/// Least-squares line evaluated at both ends of the x range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegressionLine {
    pub start: SamplePoint,
    pub end: SamplePoint,
}

impl RegressionLine {
    pub fn slope(&self) -> f64 {
        (self.end.y - self.start.y) / (self.end.x - self.start.x)
    }

    pub fn intercept(&self) -> f64 {
        self.start.y
    }
}

/// How the second normal series is combined with the first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CorrelationMode {
    /// Plain `r*z1 + sqrt(1-r^2)*z2`; the sample coefficient drifts with n.
    #[default]
    Sampled,
    /// Orthogonalise the noise series in-sample so the sample Pearson
    /// coefficient equals the target.
    Exact,
}

/// `count` points whose correlation approximates `correlation`, with x in
/// [0,100] and y in [-60,60]. Same arguments, same points.
pub fn generate_correlated_samples(correlation: f64, count: usize, seed: u32) -> Vec<SamplePoint> {
    generate_correlated_samples_with(correlation, count, seed, CorrelationMode::default())
}

pub fn generate_correlated_samples_with(
    correlation: f64,
    count: usize,
    seed: u32,
    mode: CorrelationMode,
) -> Vec<SamplePoint> {
    let (xs, ys) = standardized_series(correlation, count, seed, mode);
    let xs = rescale(&xs, X_RANGE);
    let ys = rescale(&ys, Y_RANGE);
    xs.into_iter()
        .zip(ys)
        .map(|(x, y)| SamplePoint { x, y })
        .collect()
}

/// Zero-mean, unit-variance x and y series before min-max rescaling.
pub fn standardized_series(
    correlation: f64,
    count: usize,
    seed: u32,
    mode: CorrelationMode,
) -> (Vec<f64>, Vec<f64>) {
    let r = clamp_correlation(correlation);
    let mut rng = Mulberry32::new(seed);
    let mut z1 = Vec::with_capacity(count);
    let mut z2 = Vec::with_capacity(count);
    for _ in 0..count {
        z1.push(rng.next_normal());
        z2.push(rng.next_normal());
    }

    let (base, noise) = match mode {
        CorrelationMode::Sampled => (z1, z2),
        CorrelationMode::Exact => {
            let base = standardize(&z1);
            let noise = standardize(&orthogonalize(&z2, &base));
            (base, noise)
        }
    };

    let cross = (1.0 - r * r).sqrt();
    let ys: Vec<f64> = base
        .iter()
        .zip(&noise)
        .map(|(x, z)| r * x + cross * z)
        .collect();
    (standardize(&base), standardize(&ys))
}

/// Ordinary least squares over the points, evaluated at x = 0 and x = 100.
///
/// Empty input yields a flat line at zero. When every x is identical the
/// slope is undefined; the line is flat through the mean of y instead.
pub fn fit_linear_regression(points: &[SamplePoint]) -> RegressionLine {
    let (lo, hi) = X_RANGE;
    if points.is_empty() {
        return RegressionLine {
            start: SamplePoint { x: lo, y: 0.0 },
            end: SamplePoint { x: hi, y: 0.0 },
        };
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let first_x = points[0].x;
    let slope = if points.iter().all(|p| p.x == first_x) {
        0.0
    } else {
        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for p in points {
            let dx = p.x - mean_x;
            sxy += dx * (p.y - mean_y);
            sxx += dx * dx;
        }
        let slope = sxy / sxx;
        if slope.is_finite() {
            slope
        } else {
            0.0
        }
    };
    let intercept = mean_y - slope * mean_x;
    RegressionLine {
        start: SamplePoint {
            x: lo,
            y: slope * lo + intercept,
        },
        end: SamplePoint {
            x: hi,
            y: slope * hi + intercept,
        },
    }
}

/// Sample Pearson coefficient; zero when either series has no spread.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom > 0.0 {
        sxy / denom
    } else {
        0.0
    }
}

/// Pearson coefficient of a generated point set.
pub fn sample_correlation(points: &[SamplePoint]) -> f64 {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    pearson(&xs, &ys)
}

fn clamp_correlation(r: f64) -> f64 {
    if !r.is_finite() {
        warn!(correlation = r, "non-finite correlation target, using 0");
        return 0.0;
    }
    if !(-1.0..=1.0).contains(&r) {
        warn!(correlation = r, "correlation target outside [-1, 1], clamping");
        return r.clamp(-1.0, 1.0);
    }
    r
}

// Population standard deviation; zero spread divides by 1.
fn standardize(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let sd = var.sqrt();
    let sd = if sd > 0.0 { sd } else { 1.0 };
    values.iter().map(|v| (v - mean) / sd).collect()
}

// Removes the component of `values` along the zero-mean `basis`.
fn orthogonalize(values: &[f64], basis: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    let mean = if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / n
    };
    let centered: Vec<f64> = values.iter().map(|v| v - mean).collect();
    let dot: f64 = centered.iter().zip(basis).map(|(v, b)| v * b).sum();
    let norm: f64 = basis.iter().map(|b| b * b).sum();
    if norm <= 0.0 {
        return centered;
    }
    let k = dot / norm;
    centered.iter().zip(basis).map(|(v, b)| v - k * b).collect()
}

// Min-max into `range`; a series with no spread sits at the midpoint.
fn rescale(values: &[f64], range: (f64, f64)) -> Vec<f64> {
    let (lo, hi) = range;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if !(span > 0.0) {
        let mid = 0.5 * (lo + hi);
        return vec![mid; values.len()];
    }
    values
        .iter()
        .map(|v| ((v - min) / span) * (hi - lo) + lo)
        .collect()
}
