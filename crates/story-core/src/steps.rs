//! Step descriptors and the story configuration they are loaded from.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

const INK: &str = "#2c1810";
const RED: &str = "#8b2e2e";
const GREEN: &str = "#1a5f4a";
const BROWN: &str = "#8b5a2b";

/// One narrative panel. Its position in the story is its identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepDescriptor {
    pub title: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

/// Chart kind with the attributes that kind actually uses.
///
/// Fields a kind does not use (a `correlation` on a bar step, say) are
/// accepted in JSON and dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepKind {
    Title,
    Scatter {
        correlation: f64,
        #[serde(default = "default_color")]
        color: String,
        #[serde(rename = "axisX", default, skip_serializing_if = "Option::is_none")]
        axis_x: Option<String>,
    },
    Bars {
        #[serde(default = "default_color")]
        color: String,
        #[serde(rename = "axisX", default, skip_serializing_if = "Option::is_none")]
        axis_x: Option<String>,
    },
    Bubble {
        #[serde(default = "default_color")]
        color: String,
        #[serde(rename = "axisX", default, skip_serializing_if = "Option::is_none")]
        axis_x: Option<String>,
    },
    Maps {
        #[serde(default = "default_color")]
        color: String,
        #[serde(rename = "axisX", default, skip_serializing_if = "Option::is_none")]
        axis_x: Option<String>,
    },
}

fn default_color() -> String {
    INK.to_string()
}

impl StepKind {
    pub fn name(&self) -> &'static str {
        match self {
            StepKind::Title => "title",
            StepKind::Scatter { .. } => "scatter",
            StepKind::Bars { .. } => "bars",
            StepKind::Bubble { .. } => "bubble",
            StepKind::Maps { .. } => "maps",
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, StepKind::Title)
    }

    pub fn correlation(&self) -> Option<f64> {
        match self {
            StepKind::Scatter { correlation, .. } => Some(*correlation),
            _ => None,
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            StepKind::Title => None,
            StepKind::Scatter { color, .. }
            | StepKind::Bars { color, .. }
            | StepKind::Bubble { color, .. }
            | StepKind::Maps { color, .. } => Some(color.as_str()),
        }
    }

    /// Non-empty x-axis label, if any.
    pub fn axis_label(&self) -> Option<&str> {
        let label = match self {
            StepKind::Title => None,
            StepKind::Scatter { axis_x, .. }
            | StepKind::Bars { axis_x, .. }
            | StepKind::Bubble { axis_x, .. }
            | StepKind::Maps { axis_x, .. } => axis_x.as_deref(),
        };
        label.filter(|s| !s.is_empty())
    }
}

impl StepDescriptor {
    pub fn title_slide(title: &str) -> Self {
        Self {
            title: title.to_string(),
            kind: StepKind::Title,
        }
    }

    pub fn scatter(title: &str, correlation: f64, color: &str, axis_x: &str) -> Self {
        Self {
            title: title.to_string(),
            kind: StepKind::Scatter {
                correlation,
                color: color.to_string(),
                axis_x: Some(axis_x.to_string()),
            },
        }
    }

    pub fn bars(title: &str, color: &str, axis_x: &str) -> Self {
        Self {
            title: title.to_string(),
            kind: StepKind::Bars {
                color: color.to_string(),
                axis_x: Some(axis_x.to_string()),
            },
        }
    }

    pub fn bubble(title: &str, color: &str, axis_x: &str) -> Self {
        Self {
            title: title.to_string(),
            kind: StepKind::Bubble {
                color: color.to_string(),
                axis_x: Some(axis_x.to_string()),
            },
        }
    }
}

/// The twelve panels of the mobility story.
pub fn default_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::title_slide("The American Dream?"),
        StepDescriptor::scatter("The Myth of Job Growth", 0.05, RED, "Job growth (%)"),
        StepDescriptor::scatter("Higher Wages Aren't Enough", 0.08, RED, "Wage growth (%)"),
        StepDescriptor::scatter("GDP Doesn't Predict Mobility", 0.12, RED, "GDP per capita ($)"),
        StepDescriptor::scatter("The Reality: Poverty Matters", -0.55, RED, "Poverty rate (%)"),
        StepDescriptor::scatter(
            "Education Opens Doors",
            0.52,
            GREEN,
            "Adults with college degree (%)",
        ),
        StepDescriptor::scatter("Family Stability", 0.48, GREEN, "Two-parent households (%)"),
        StepDescriptor::scatter("Environmental Justice", -0.42, RED, "PM2.5 (μg/m³)"),
        StepDescriptor::scatter("Community Roots", 0.36, GREEN, "Homeownership (%)"),
        StepDescriptor::bars("The Rent Paradox", BROWN, "Rent Category"),
        StepDescriptor::bubble("Opportunity Bargains Exist", BROWN, "Monthly Rent ($)"),
        StepDescriptor::scatter(
            "Rent's Moderate Impact",
            0.36,
            GREEN,
            "Rent level (percentile)",
        ),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default = "GeneratorConfig::default_sample_count")]
    pub sample_count: usize,
    #[serde(default = "GeneratorConfig::default_bubble_count")]
    pub bubble_count: usize,
    #[serde(default = "GeneratorConfig::default_exact_correlation")]
    pub exact_correlation: bool,
}

impl GeneratorConfig {
    fn default_sample_count() -> usize {
        90
    }
    fn default_bubble_count() -> usize {
        50
    }
    fn default_exact_correlation() -> bool {
        false
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_count: Self::default_sample_count(),
            bubble_count: Self::default_bubble_count(),
            exact_correlation: Self::default_exact_correlation(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationConfig {
    /// Fraction of the viewport (or of the step, if shorter) a step must
    /// cover for the chart to stay visible.
    #[serde(default = "ActivationConfig::default_coverage_threshold")]
    pub coverage_threshold: f64,
    #[serde(default)]
    pub initial_step: usize,
}

impl ActivationConfig {
    fn default_coverage_threshold() -> f64 {
        0.55
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: Self::default_coverage_threshold(),
            initial_step: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryConfig {
    #[serde(default = "default_steps")]
    pub steps: Vec<StepDescriptor>,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub activation: ActivationConfig,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            generator: GeneratorConfig::default(),
            activation: ActivationConfig::default(),
        }
    }
}

impl StoryConfig {
    /// Parses either a full config object or a bare array of steps, then
    /// validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let config = if value.is_array() {
            StoryConfig {
                steps: serde_json::from_value(value)?,
                ..StoryConfig::default()
            }
        } else {
            serde_json::from_value(value)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(ConfigError::NoSteps);
        }
        for (index, step) in self.steps.iter().enumerate() {
            if let Some(value) = step.kind.correlation() {
                if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                    return Err(ConfigError::CorrelationOutOfRange {
                        index,
                        title: step.title.clone(),
                        value,
                    });
                }
            }
        }
        if self.generator.sample_count < 2 {
            return Err(ConfigError::SampleCount(self.generator.sample_count));
        }
        let threshold = self.activation.coverage_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::CoverageThreshold(threshold));
        }
        if self.activation.initial_step >= self.steps.len() {
            return Err(ConfigError::InitialStep {
                index: self.activation.initial_step,
                len: self.steps.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_shape() {
        let steps = default_steps();
        assert_eq!(steps.len(), 12);
        assert!(steps[0].kind.is_title());
        assert_eq!(steps[4].kind.correlation(), Some(-0.55));
        assert_eq!(steps[9].kind.name(), "bars");
        assert_eq!(steps[10].kind.name(), "bubble");
        assert_eq!(steps[11].kind.axis_label(), Some("Rent level (percentile)"));
        StoryConfig::default().validate().unwrap();
    }

    #[test]
    fn parses_loose_step_records() {
        let json = r##"[
            { "title": "The American Dream?", "type": "title", "correlation": 0, "axisX": "" },
            { "title": "Family Stability", "type": "scatter", "correlation": 0.48,
              "color": "#1a5f4a", "axisX": "Two-parent households (%)" },
            { "title": "The Rent Paradox", "type": "bars", "correlation": 0.44,
              "color": "#8b5a2b", "axisX": "Rent Category" }
        ]"##;
        let config = StoryConfig::from_json(json).unwrap();
        assert_eq!(config.steps.len(), 3);
        assert_eq!(config.steps[0], StepDescriptor::title_slide("The American Dream?"));
        assert_eq!(
            config.steps[1],
            StepDescriptor::scatter("Family Stability", 0.48, GREEN, "Two-parent households (%)")
        );
        assert_eq!(
            config.steps[2],
            StepDescriptor::bars("The Rent Paradox", BROWN, "Rent Category")
        );
        assert_eq!(config.generator.sample_count, 90);
    }

    #[test]
    fn empty_axis_label_is_absent() {
        let json = r#"[{ "title": "t", "type": "scatter", "correlation": 0.1, "axisX": "" }]"#;
        let config = StoryConfig::from_json(json).unwrap();
        assert_eq!(config.steps[0].kind.axis_label(), None);
        assert_eq!(config.steps[0].kind.color(), Some(INK));
    }

    #[test]
    fn full_config_with_sections() {
        let json = r#"{
            "steps": [{ "title": "t", "type": "maps" }],
            "generator": { "sampleCount": 30, "exactCorrelation": true },
            "activation": { "coverageThreshold": 0.6 }
        }"#;
        let config = StoryConfig::from_json(json).unwrap();
        assert_eq!(config.steps[0].kind.name(), "maps");
        assert_eq!(config.generator.sample_count, 30);
        assert_eq!(config.generator.bubble_count, 50);
        assert!(config.generator.exact_correlation);
        assert!((config.activation.coverage_threshold - 0.6).abs() < 1e-12);
        assert_eq!(config.activation.initial_step, 0);
    }

    #[test]
    fn missing_steps_fall_back_to_catalog() {
        let config = StoryConfig::from_json("{}").unwrap();
        assert_eq!(config.steps.len(), 12);
        assert!(!config.generator.exact_correlation);
    }

    #[test]
    fn json_round_trip_keeps_steps() {
        let config = StoryConfig::default();
        let json = config.to_json().unwrap();
        let back = StoryConfig::from_json(&json).unwrap();
        assert_eq!(back.steps, config.steps);
    }

    #[test]
    fn rejects_invalid_configs() {
        assert!(matches!(StoryConfig::from_json("[]"), Err(ConfigError::NoSteps)));
        assert!(matches!(
            StoryConfig::from_json(r#"[{ "title": "t", "type": "scatter", "correlation": 1.5 }]"#),
            Err(ConfigError::CorrelationOutOfRange { index: 0, .. })
        ));
        assert!(matches!(
            StoryConfig::from_json(r#"{ "generator": { "sampleCount": 1 } }"#),
            Err(ConfigError::SampleCount(1))
        ));
        assert!(matches!(
            StoryConfig::from_json(r#"{ "activation": { "coverageThreshold": 0 } }"#),
            Err(ConfigError::CoverageThreshold(_))
        ));
        assert!(matches!(
            StoryConfig::from_json(r#"{ "activation": { "initialStep": 12 } }"#),
            Err(ConfigError::InitialStep { index: 12, len: 12 })
        ));
        assert!(matches!(
            StoryConfig::from_json(r#"[{ "title": "t", "type": "pie" }]"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(StoryConfig::from_json("not json"), Err(ConfigError::Parse(_))));
    }
}
