//! Bar and bubble data, plus the per-step cache of generated datasets.

use std::collections::BTreeMap;

use tracing::trace;

use crate::rng::{bubble_seed, scatter_seed, Mulberry32};
use crate::samples::{
    fit_linear_regression, generate_correlated_samples_with, CorrelationMode, RegressionLine,
    SamplePoint,
};
use crate::steps::{GeneratorConfig, StepDescriptor, StepKind};

/// Rent below this is "low rent".
pub const RENT_THRESHOLD: f64 = 1500.0;
/// Mobility above this is "high mobility".
pub const MOBILITY_THRESHOLD: f64 = 50.0;

pub const RENT_RANGE: (f64, f64) = (500.0, 3000.0);
pub const MOBILITY_RANGE: (f64, f64) = (20.0, 80.0);
pub const POPULATION_RANGE: (f64, f64) = (2000.0, 10000.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    LowRentHighMobility,
    LowRentLowMobility,
    HighRentHighMobility,
    HighRentLowMobility,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::LowRentHighMobility,
        Quadrant::LowRentLowMobility,
        Quadrant::HighRentHighMobility,
        Quadrant::HighRentLowMobility,
    ];

    pub fn classify(rent: f64, mobility: f64) -> Self {
        match (rent < RENT_THRESHOLD, mobility > MOBILITY_THRESHOLD) {
            (true, true) => Quadrant::LowRentHighMobility,
            (true, false) => Quadrant::LowRentLowMobility,
            (false, true) => Quadrant::HighRentHighMobility,
            (false, false) => Quadrant::HighRentLowMobility,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::LowRentHighMobility => "Low Rent, High Mobility",
            Quadrant::LowRentLowMobility => "Low Rent, Low Mobility",
            Quadrant::HighRentHighMobility => "High Rent, High Mobility",
            Quadrant::HighRentLowMobility => "High Rent, Low Mobility",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Quadrant::LowRentHighMobility => "#1a5f4a",
            Quadrant::LowRentLowMobility => "#8b2e2e",
            Quadrant::HighRentHighMobility => "#8b5a2b",
            Quadrant::HighRentLowMobility => "#cd7f32",
        }
    }

    /// Stable small code for typed-array transport.
    pub fn code(self) -> u8 {
        match self {
            Quadrant::LowRentHighMobility => 0,
            Quadrant::LowRentLowMobility => 1,
            Quadrant::HighRentHighMobility => 2,
            Quadrant::HighRentLowMobility => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarDatum {
    pub category: &'static str,
    pub value: f64,
    pub color: &'static str,
    pub label: &'static str,
}

/// Share of neighborhoods in each rent/mobility bucket.
pub const RENT_MOBILITY_BARS: [BarDatum; 4] = [
    BarDatum {
        category: "Low Rent\nHigh Mobility",
        value: 28.0,
        color: "#1a5f4a",
        label: "Opportunity\nBargains",
    },
    BarDatum {
        category: "Low Rent\nLow Mobility",
        value: 22.0,
        color: "#8b2e2e",
        label: "Low Opportunity",
    },
    BarDatum {
        category: "High Rent\nHigh Mobility",
        value: 31.0,
        color: "#8b5a2b",
        label: "Expected\nOutcome",
    },
    BarDatum {
        category: "High Rent\nLow Mobility",
        value: 19.0,
        color: "#cd7f32",
        label: "Expensive but\nLimited",
    },
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BubbleDatum {
    pub rent: f64,
    pub mobility: f64,
    pub population: f64,
    pub quadrant: Quadrant,
}

impl BubbleDatum {
    pub fn color(&self) -> &'static str {
        self.quadrant.color()
    }

    pub fn quadrant_label(&self) -> &'static str {
        self.quadrant.label()
    }
}

/// Default bubble count per bubble step.
pub const BUBBLE_COUNT: usize = 50;

pub fn generate_bubble_dataset(seed: u32) -> Vec<BubbleDatum> {
    generate_bubbles(seed, BUBBLE_COUNT)
}

/// Independent uniform draws per field, in rent, mobility, population order.
pub fn generate_bubbles(seed: u32, count: usize) -> Vec<BubbleDatum> {
    let mut rng = Mulberry32::new(seed);
    let span = |(lo, hi): (f64, f64)| (lo, hi - lo);
    let (rent_lo, rent_span) = span(RENT_RANGE);
    let (mob_lo, mob_span) = span(MOBILITY_RANGE);
    let (pop_lo, pop_span) = span(POPULATION_RANGE);
    (0..count)
        .map(|_| {
            let rent = rng.next_in(rent_lo, rent_span);
            let mobility = rng.next_in(mob_lo, mob_span);
            let population = rng.next_in(pop_lo, pop_span);
            BubbleDatum {
                rent,
                mobility,
                population,
                quadrant: Quadrant::classify(rent, mobility),
            }
        })
        .collect()
}

/// What a step hands to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum Dataset {
    Scatter {
        points: Vec<SamplePoint>,
        line: RegressionLine,
    },
    Bars(&'static [BarDatum]),
    Bubbles(Vec<BubbleDatum>),
    /// Tabular and geographic data are loaded by the renderer itself.
    External,
}

impl Dataset {
    pub fn for_step(step: &StepDescriptor, generator: &GeneratorConfig) -> Option<Dataset> {
        match &step.kind {
            StepKind::Title => None,
            StepKind::Scatter { correlation, .. } => {
                let seed = scatter_seed(&step.title, *correlation);
                let mode = if generator.exact_correlation {
                    CorrelationMode::Exact
                } else {
                    CorrelationMode::Sampled
                };
                let points =
                    generate_correlated_samples_with(*correlation, generator.sample_count, seed, mode);
                let line = fit_linear_regression(&points);
                Some(Dataset::Scatter { points, line })
            }
            StepKind::Bars { .. } => Some(Dataset::Bars(&RENT_MOBILITY_BARS)),
            StepKind::Bubble { .. } => Some(Dataset::Bubbles(generate_bubbles(
                bubble_seed(&step.title),
                generator.bubble_count,
            ))),
            StepKind::Maps { .. } => Some(Dataset::External),
        }
    }
}

/// Step index to dataset. Entries are generated once and never replaced.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: BTreeMap<usize, Dataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<&Dataset> {
        self.entries.get(&index)
    }

    pub fn get_or_generate(
        &mut self,
        index: usize,
        step: &StepDescriptor,
        generator: &GeneratorConfig,
    ) -> Option<&Dataset> {
        if !self.entries.contains_key(&index) {
            let dataset = Dataset::for_step(step, generator)?;
            trace!(index, title = %step.title, "generated step dataset");
            self.entries.insert(index, dataset);
        }
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
