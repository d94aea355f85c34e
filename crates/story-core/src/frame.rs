//! Axis domains and captions the renderer needs for each chart kind.

use crate::datasets::POPULATION_RANGE;
use crate::samples::{X_RANGE, Y_RANGE};
use crate::steps::{StepDescriptor, StepKind};

pub const SCATTER_Y_LABEL: &str = "Economic Mobility Index";
pub const BARS_Y_LABEL: &str = "% of Neighborhoods";
pub const BUBBLE_Y_LABEL: &str = "Economic Mobility Score";

pub const BARS_Y_DOMAIN: (f64, f64) = (0.0, 35.0);
pub const BUBBLE_X_DOMAIN: (f64, f64) = (400.0, 3100.0);
pub const BUBBLE_Y_DOMAIN: (f64, f64) = (15.0, 85.0);
pub const BUBBLE_RADIUS_RANGE: (f64, f64) = (6.0, 25.0);

#[derive(Clone, Debug, PartialEq)]
pub struct ChartFrame {
    pub kind: &'static str,
    pub title: String,
    pub color: String,
    pub x_label: Option<String>,
    pub y_label: Option<&'static str>,
    pub correlation_label: Option<String>,
    /// Numeric x domain; `None` for categorical or map axes.
    pub x_domain: Option<(f64, f64)>,
    pub y_domain: Option<(f64, f64)>,
}

impl ChartFrame {
    /// `None` for title steps, which show no chart.
    pub fn for_step(step: &StepDescriptor) -> Option<Self> {
        let color = step.kind.color().unwrap_or_default().to_string();
        let title = step.title.clone();
        let frame = match &step.kind {
            StepKind::Title => return None,
            StepKind::Scatter { correlation, .. } => ChartFrame {
                kind: step.kind.name(),
                x_label: Some(
                    step.kind
                        .axis_label()
                        .map(str::to_string)
                        .unwrap_or_else(|| title.clone()),
                ),
                y_label: Some(SCATTER_Y_LABEL),
                correlation_label: Some(format_correlation(*correlation)),
                x_domain: Some(X_RANGE),
                y_domain: Some(Y_RANGE),
                title,
                color,
            },
            StepKind::Bars { .. } => ChartFrame {
                kind: step.kind.name(),
                x_label: None,
                y_label: Some(BARS_Y_LABEL),
                correlation_label: None,
                x_domain: None,
                y_domain: Some(BARS_Y_DOMAIN),
                title,
                color,
            },
            StepKind::Bubble { .. } => ChartFrame {
                kind: step.kind.name(),
                x_label: step.kind.axis_label().map(str::to_string),
                y_label: Some(BUBBLE_Y_LABEL),
                correlation_label: None,
                x_domain: Some(BUBBLE_X_DOMAIN),
                y_domain: Some(BUBBLE_Y_DOMAIN),
                title,
                color,
            },
            StepKind::Maps { .. } => ChartFrame {
                kind: step.kind.name(),
                x_label: None,
                y_label: None,
                correlation_label: None,
                x_domain: None,
                y_domain: None,
                title,
                color,
            },
        };
        Some(frame)
    }
}

/// `r = +0.50`, `r = -0.55`: sign always shown, two decimals.
pub fn format_correlation(r: f64) -> String {
    if r >= 0.0 {
        // Also catches negative zero.
        format!("r = +{:.2}", r.abs())
    } else {
        format!("r = {:.2}", r)
    }
}

/// Square-root scale from population to bubble radius in pixels.
pub fn bubble_radius(population: f64) -> f64 {
    let (d0, d1) = POPULATION_RANGE;
    let (r0, r1) = BUBBLE_RADIUS_RANGE;
    let t = (population.max(0.0).sqrt() - d0.sqrt()) / (d1.sqrt() - d0.sqrt());
    r0 + t * (r1 - r0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::default_steps;

    #[test]
    fn correlation_caption() {
        assert_eq!(format_correlation(0.5), "r = +0.50");
        assert_eq!(format_correlation(-0.55), "r = -0.55");
        assert_eq!(format_correlation(0.0), "r = +0.00");
        assert_eq!(format_correlation(-0.0), "r = +0.00");
        assert_eq!(format_correlation(0.05), "r = +0.05");
    }

    #[test]
    fn bubble_radius_scale() {
        assert!((bubble_radius(2000.0) - 6.0).abs() < 1e-12);
        assert!((bubble_radius(10000.0) - 25.0).abs() < 1e-12);
        assert!((bubble_radius(5000.0) - 14.932872602956405).abs() < 1e-9);
    }

    #[test]
    fn frames_per_kind() {
        let steps = default_steps();
        assert!(ChartFrame::for_step(&steps[0]).is_none());

        let scatter = ChartFrame::for_step(&steps[4]).unwrap();
        assert_eq!(scatter.kind, "scatter");
        assert_eq!(scatter.x_label.as_deref(), Some("Poverty rate (%)"));
        assert_eq!(scatter.y_label, Some(SCATTER_Y_LABEL));
        assert_eq!(scatter.correlation_label.as_deref(), Some("r = -0.55"));
        assert_eq!(scatter.x_domain, Some((0.0, 100.0)));
        assert_eq!(scatter.y_domain, Some((-60.0, 60.0)));
        assert_eq!(scatter.color, "#8b2e2e");

        let bars = ChartFrame::for_step(&steps[9]).unwrap();
        assert_eq!(bars.x_label, None);
        assert_eq!(bars.y_label, Some(BARS_Y_LABEL));
        assert_eq!(bars.correlation_label, None);

        let bubble = ChartFrame::for_step(&steps[10]).unwrap();
        assert_eq!(bubble.x_label.as_deref(), Some("Monthly Rent ($)"));
        assert_eq!(bubble.x_domain, Some(BUBBLE_X_DOMAIN));
    }

    #[test]
    fn scatter_without_axis_label_uses_title() {
        let step = StepDescriptor {
            title: "Unlabelled".to_string(),
            kind: StepKind::Scatter {
                correlation: 0.2,
                color: "#000".to_string(),
                axis_x: Some(String::new()),
            },
        };
        let frame = ChartFrame::for_step(&step).unwrap();
        assert_eq!(frame.x_label.as_deref(), Some("Unlabelled"));
    }
}
