//! The story controller: step tracking, visibility and cached datasets.

use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::datasets::{Dataset, DatasetCache};
use crate::error::Result;
use crate::frame::ChartFrame;
use crate::steps::{ActivationConfig, GeneratorConfig, StepDescriptor, StoryConfig};
use crate::tracker::{any_step_in_view, StepBounds, StepChanged, StepTracker, VisibilityEntry};

/// Everything that lives for a presentation session. One instance per
/// page; nothing here is global.
#[wasm_bindgen]
pub struct Story {
    steps: Vec<StepDescriptor>,
    generator: GeneratorConfig,
    activation: ActivationConfig,
    tracker: StepTracker,
    cache: DatasetCache,
    visible: bool,
}

/// Result of one visibility report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoryUpdate {
    pub change: Option<StepChanged>,
    pub visible: bool,
}

impl Story {
    pub fn from_config(config: StoryConfig) -> Result<Self> {
        config.validate()?;
        let StoryConfig {
            steps,
            generator,
            activation,
        } = config;
        let initial = activation.initial_step;
        let tracker = StepTracker::new(steps.len(), Some(initial));
        let mut story = Story {
            steps,
            generator,
            activation,
            tracker,
            cache: DatasetCache::new(),
            visible: false,
        };
        // The initial step renders before any visibility report arrives.
        story.visible = story.shows_chart(initial);
        story.dataset(initial);
        Ok(story)
    }

    pub fn with_steps(steps: Vec<StepDescriptor>) -> Result<Self> {
        Self::from_config(StoryConfig {
            steps,
            ..StoryConfig::default()
        })
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }

    pub fn current(&self) -> Option<usize> {
        self.tracker.current()
    }

    pub fn current_index(&self) -> i32 {
        self.tracker.current_index()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Feeds a visibility report to the tracker. A change to a chart step
    /// shows the chart and fills its dataset; a change to a title step
    /// hides it.
    pub fn apply_visibility(&mut self, entries: &[VisibilityEntry]) -> StoryUpdate {
        let change = self.tracker.observe(entries);
        if let Some(change) = change {
            self.visible = self.shows_chart(change.index);
            self.dataset(change.index);
        }
        StoryUpdate {
            change,
            visible: self.visible,
        }
    }

    /// Scroll-geometry check: the chart is shown only while some step
    /// covers enough of the viewport and the current step is not a title.
    pub fn apply_geometry(&mut self, bounds: &[StepBounds], viewport_height: f64) -> bool {
        let in_view = any_step_in_view(bounds, viewport_height, self.activation.coverage_threshold);
        let visible = in_view && self.current().map_or(false, |i| self.shows_chart(i));
        if visible != self.visible {
            debug!(visible, "chart visibility changed");
        }
        self.visible = visible;
        visible
    }

    /// Re-runs the geometry check and returns the step to redraw. Cached
    /// datasets make the redraw identical.
    pub fn resize(&mut self, bounds: &[StepBounds], viewport_height: f64) -> usize {
        let index = self.current().unwrap_or(0);
        self.apply_geometry(bounds, viewport_height);
        index
    }

    /// The step's dataset, generated on first request.
    pub fn dataset(&mut self, index: usize) -> Option<&Dataset> {
        let step = self.steps.get(index)?;
        self.cache.get_or_generate(index, step, &self.generator)
    }

    pub fn chart_frame(&self, index: usize) -> Option<ChartFrame> {
        self.steps.get(index).and_then(ChartFrame::for_step)
    }

    fn shows_chart(&self, index: usize) -> bool {
        self.steps
            .get(index)
            .map_or(false, |s| !s.kind.is_title())
    }
}
