//! Data core for a scroll-driven story about economic mobility.
//!
//! The page reports which narrative panels are on screen; [`Story`] decides
//! which step is current, whether the chart should show, and hands out a
//! reproducible dataset for each step. Drawing is left to the page.

use js_sys::{Array, Float64Array, Object, Reflect, Uint8Array, JSON};
use wasm_bindgen::prelude::*;

pub mod datasets;
pub mod error;
pub mod frame;
pub mod rng;
pub mod samples;
pub mod steps;
pub mod story;
pub mod tracker;

pub use datasets::{
    generate_bubble_dataset, BarDatum, BubbleDatum, Dataset, DatasetCache, Quadrant,
    RENT_MOBILITY_BARS,
};
pub use error::ConfigError;
pub use frame::ChartFrame;
pub use rng::{bubble_seed, hash_seed, scatter_seed, Mulberry32};
pub use samples::{
    fit_linear_regression, generate_correlated_samples, generate_correlated_samples_with,
    CorrelationMode, RegressionLine, SamplePoint,
};
pub use steps::{default_steps, StepDescriptor, StepKind, StoryConfig};
pub use story::{Story, StoryUpdate};
pub use tracker::{StepBounds, StepChanged, StepTracker, VisibilityEntry};

#[wasm_bindgen]
impl Story {
    /// Accepts nothing (built-in story), a JSON string, or a plain object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Story, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            StoryConfig::default()
        } else if let Some(json) = config.as_string() {
            StoryConfig::from_json(&json)?
        } else {
            let json = JSON::stringify(&config)
                .ok()
                .and_then(|s| s.as_string())
                .ok_or_else(|| JsError::new("story config is not JSON-serializable"))?;
            StoryConfig::from_json(&json)?
        };
        Ok(Story::from_config(config)?)
    }

    #[wasm_bindgen(js_name = stepCount)]
    pub fn step_count(&self) -> usize {
        self.steps().len()
    }

    /// -1 when no step is active.
    #[wasm_bindgen(js_name = currentStep)]
    pub fn current_step(&self) -> i32 {
        self.current_index()
    }

    pub fn visible(&self) -> bool {
        self.is_visible()
    }

    /// Parallel arrays, one slot per observed step element.
    #[wasm_bindgen(js_name = onIntersections)]
    pub fn on_intersections(&mut self, indices: &[u32], ratios: &[f64], intersecting: &[u8]) -> Object {
        let entries: Vec<VisibilityEntry> = indices
            .iter()
            .enumerate()
            .map(|(k, &index)| {
                VisibilityEntry::new(
                    index as usize,
                    intersecting.get(k).map_or(false, |&v| v != 0),
                    ratios.get(k).copied().unwrap_or(0.0),
                )
            })
            .collect();
        let update = self.apply_visibility(&entries);
        let previous = update
            .change
            .and_then(|c| c.previous)
            .map_or(-1.0, |i| i as f64);
        let o = Object::new();
        set(&o, "changed", &JsValue::from_bool(update.change.is_some()));
        set(&o, "step", &JsValue::from_f64(self.current_index() as f64));
        set(&o, "previous", &JsValue::from_f64(previous));
        set(&o, "visible", &JsValue::from_bool(update.visible));
        o
    }

    /// Bounding tops and bottoms of every step element, in step order.
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&mut self, tops: &[f64], bottoms: &[f64], viewport_height: f64) -> bool {
        self.apply_geometry(&bounds(tops, bottoms), viewport_height)
    }

    /// Returns the step to redraw after a resize.
    #[wasm_bindgen(js_name = onResize)]
    pub fn on_resize(&mut self, tops: &[f64], bottoms: &[f64], viewport_height: f64) -> u32 {
        self.resize(&bounds(tops, bottoms), viewport_height) as u32
    }

    /// Chart frame and dataset for a step, or `null` for title steps.
    pub fn frame(&mut self, index: usize) -> JsValue {
        let Some(chart) = self.chart_frame(index) else {
            return JsValue::NULL;
        };
        let o = Object::new();
        set(&o, "index", &JsValue::from_f64(index as f64));
        set(&o, "kind", &JsValue::from_str(chart.kind));
        set(&o, "title", &JsValue::from_str(&chart.title));
        set(&o, "color", &JsValue::from_str(&chart.color));
        set(&o, "xLabel", &opt_str(chart.x_label.as_deref()));
        set(&o, "yLabel", &opt_str(chart.y_label));
        set(&o, "correlationLabel", &opt_str(chart.correlation_label.as_deref()));
        set(&o, "xDomain", &domain(chart.x_domain));
        set(&o, "yDomain", &domain(chart.y_domain));

        match self.dataset(index) {
            Some(Dataset::Scatter { points, line }) => {
                let mut flat: Vec<f64> = Vec::with_capacity(points.len() * 2);
                for p in points {
                    flat.push(p.x);
                    flat.push(p.y);
                }
                let ends = [line.start.x, line.start.y, line.end.x, line.end.y];
                set(&o, "points", &Float64Array::from(flat.as_slice()));
                set(&o, "line", &Float64Array::from(&ends[..]));
            }
            Some(Dataset::Bars(bars)) => {
                let list = Array::new();
                for bar in bars.iter() {
                    let b = Object::new();
                    set(&b, "category", &JsValue::from_str(bar.category));
                    set(&b, "value", &JsValue::from_f64(bar.value));
                    set(&b, "color", &JsValue::from_str(bar.color));
                    set(&b, "label", &JsValue::from_str(bar.label));
                    list.push(&b);
                }
                set(&o, "bars", &list);
            }
            Some(Dataset::Bubbles(bubbles)) => {
                let rent: Vec<f64> = bubbles.iter().map(|b| b.rent).collect();
                let mobility: Vec<f64> = bubbles.iter().map(|b| b.mobility).collect();
                let population: Vec<f64> = bubbles.iter().map(|b| b.population).collect();
                let radius: Vec<f64> = population.iter().map(|&p| frame::bubble_radius(p)).collect();
                let quadrant: Vec<u8> = bubbles.iter().map(|b| b.quadrant.code()).collect();
                let labels = Array::new();
                let colors = Array::new();
                for q in Quadrant::ALL {
                    labels.push(&JsValue::from_str(q.label()));
                    colors.push(&JsValue::from_str(q.color()));
                }
                set(&o, "rent", &Float64Array::from(rent.as_slice()));
                set(&o, "mobility", &Float64Array::from(mobility.as_slice()));
                set(&o, "population", &Float64Array::from(population.as_slice()));
                set(&o, "radius", &Float64Array::from(radius.as_slice()));
                set(&o, "quadrant", &Uint8Array::from(quadrant.as_slice()));
                set(&o, "quadrantLabels", &labels);
                set(&o, "quadrantColors", &colors);
                set(&o, "rentThreshold", &JsValue::from_f64(datasets::RENT_THRESHOLD));
                set(&o, "mobilityThreshold", &JsValue::from_f64(datasets::MOBILITY_THRESHOLD));
            }
            Some(Dataset::External) => {
                set(&o, "external", &JsValue::TRUE);
            }
            None => {}
        }
        o.into()
    }
}

#[wasm_bindgen(js_name = seedFor)]
pub fn seed_for(title: &str, correlation: f64) -> u32 {
    scatter_seed(title, correlation)
}

/// Interleaved `[x0, y0, x1, y1, ...]`.
#[wasm_bindgen(js_name = correlatedSamples)]
pub fn correlated_samples(correlation: f64, count: usize, seed: u32) -> Float64Array {
    let points = generate_correlated_samples(correlation, count, seed);
    let mut flat: Vec<f64> = Vec::with_capacity(points.len() * 2);
    for p in &points {
        flat.push(p.x);
        flat.push(p.y);
    }
    Float64Array::from(flat.as_slice())
}

fn bounds(tops: &[f64], bottoms: &[f64]) -> Vec<StepBounds> {
    tops.iter()
        .zip(bottoms)
        .map(|(&top, &bottom)| StepBounds::new(top, bottom))
        .collect()
}

fn set(obj: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), value);
}

fn opt_str(value: Option<&str>) -> JsValue {
    value.map_or(JsValue::NULL, JsValue::from_str)
}

fn domain(value: Option<(f64, f64)>) -> JsValue {
    match value {
        Some((lo, hi)) => Float64Array::from(&[lo, hi][..]).into(),
        None => JsValue::NULL,
    }
}
