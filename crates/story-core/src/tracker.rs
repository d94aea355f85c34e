//! Which step is current, driven by visibility reports from the host.

use tracing::debug;

/// One observed step element in a visibility report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEntry {
    pub index: usize,
    pub is_intersecting: bool,
    pub ratio: f64,
}

impl VisibilityEntry {
    pub fn new(index: usize, is_intersecting: bool, ratio: f64) -> Self {
        Self {
            index,
            is_intersecting,
            ratio,
        }
    }
}

/// Emitted when the current step moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepChanged {
    pub previous: Option<usize>,
    pub index: usize,
}

/// Vertical extent of a step element in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepBounds {
    pub top: f64,
    pub bottom: f64,
}

impl StepBounds {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Visible part of the element over the smaller of the viewport
    /// height and its own height.
    pub fn coverage(&self, viewport_height: f64) -> f64 {
        let overlap = (self.bottom.min(viewport_height) - self.top.max(0.0)).max(0.0);
        let denom = viewport_height.min(self.height());
        if denom > 0.0 {
            overlap / denom
        } else {
            0.0
        }
    }
}

/// Whether any step covers at least `threshold` of the view.
pub fn any_step_in_view(bounds: &[StepBounds], viewport_height: f64, threshold: f64) -> bool {
    bounds
        .iter()
        .any(|b| b.coverage(viewport_height) >= threshold)
}

#[derive(Clone, Debug)]
pub struct StepTracker {
    step_count: usize,
    current: Option<usize>,
}

impl StepTracker {
    pub fn new(step_count: usize, initial: Option<usize>) -> Self {
        Self {
            step_count,
            current: initial.filter(|&i| i < step_count),
        }
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Current index for hosts that want `-1` for none.
    pub fn current_index(&self) -> i32 {
        self.current.map_or(-1, |i| i as i32)
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Applies one visibility report.
    ///
    /// Reports with nothing intersecting leave the state alone, so a gap
    /// between panels mid-scroll does not flicker the chart. The highest
    /// ratio wins; equal ratios go to the lowest index. Entries with an
    /// index outside the story are skipped.
    pub fn observe(&mut self, entries: &[VisibilityEntry]) -> Option<StepChanged> {
        let mut best: Option<(usize, f64)> = None;
        for entry in entries {
            if !entry.is_intersecting {
                continue;
            }
            if entry.index >= self.step_count {
                debug!(index = entry.index, "ignoring visibility entry outside the story");
                continue;
            }
            let ratio = if entry.ratio.is_finite() {
                entry.ratio
            } else {
                0.0
            };
            best = match best {
                Some((i, r)) if r > ratio || (r == ratio && i < entry.index) => Some((i, r)),
                _ => Some((entry.index, ratio)),
            };
        }

        let (index, _) = best?;
        if self.current == Some(index) {
            return None;
        }
        let change = StepChanged {
            previous: self.current,
            index,
        };
        self.current = Some(index);
        debug!(previous = ?change.previous, index, "active step changed");
        Some(change)
    }
}
