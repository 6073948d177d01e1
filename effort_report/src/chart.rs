use log::debug;

use crate::config::*;

#[derive(PartialEq, Debug, Clone)]
pub struct Bar {
    pub label: String,
    /// Person-months.
    pub value: f64,
    /// Rounded percentage, printed after the value.
    pub confidence: Option<u8>,
    pub color: Color,
}

/// A bar chart of the effort per model.
///
/// A chart is never modified after construction: changing the scale builds a
/// new chart with a new generation number.
#[derive(PartialEq, Debug, Clone)]
pub struct BarChart {
    pub generation: u64,
    pub scale: AxisScale,
    pub bars: Vec<Bar>,
}

pub const CHART_TITLE: &str = "Effort (Person-months)";

const BAR_CHAR: char = '█';

impl BarChart {
    pub fn new(generation: u64, models: &[ModelEstimate], scale: AxisScale) -> BarChart {
        let bars = models
            .iter()
            .map(|m| Bar {
                label: m.name.clone(),
                value: m.effort,
                confidence: m.confidence_percent(),
                color: m.color(),
            })
            .collect();
        BarChart {
            generation,
            scale,
            bars,
        }
    }

    fn axis_position(&self, value: f64) -> f64 {
        if value <= 0.0 {
            return 0.0;
        }
        match self.scale {
            AxisScale::Linear => value,
            // Shifted by one so that values below one person-month still show up
            // and zero stays at the origin.
            AxisScale::Logarithmic => (1.0 + value).log10(),
        }
    }

    /// The length of the bar for `value`, the largest bar taking `width` characters.
    pub fn bar_length(&self, value: f64, width: usize) -> usize {
        let max = self
            .bars
            .iter()
            .map(|b| self.axis_position(b.value))
            .fold(0.0, f64::max);
        if max <= 0.0 {
            return 0;
        }
        let len = (self.axis_position(value) / max * width as f64).round() as usize;
        len.min(width)
    }

    /// Draws the chart as lines of text.
    pub fn draw(&self, width: usize, colored: bool) -> Vec<String> {
        let scale_name = match self.scale {
            AxisScale::Linear => "linear",
            AxisScale::Logarithmic => "logarithmic",
        };
        let mut lines = vec![format!("{} [{} scale]", CHART_TITLE, scale_name)];
        if self.bars.is_empty() {
            lines.push("(no data)".to_string());
            return lines;
        }
        let label_width = self
            .bars
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0);
        for bar in self.bars.iter() {
            let len = self.bar_length(bar.value, width);
            let body: String = std::iter::repeat(BAR_CHAR).take(len).collect();
            let body = if colored && !body.is_empty() {
                bar.color.paint(&body)
            } else {
                body
            };
            let padding = " ".repeat(width - len);
            let confidence = match bar.confidence {
                Some(c) => format!(" ({}%)", c),
                None => String::new(),
            };
            lines.push(format!(
                "{:<lw$} | {}{} {:.2}{}",
                bar.label,
                body,
                padding,
                bar.value,
                confidence,
                lw = label_width
            ));
        }
        debug!(
            "BarChart::draw: generation {} drew {} bars",
            self.generation,
            self.bars.len()
        );
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(key: &str, effort: f64) -> ModelEstimate {
        ModelEstimate {
            key: key.to_string(),
            name: key.to_string(),
            effort,
            confidence: None,
            model_type: ModelFamily::infer(key).label().to_string(),
            description: None,
        }
    }

    #[test]
    fn linear_lengths_are_proportional() {
        let models = vec![model("cocomo", 10.0), model("loc", 5.0), model("x", 0.0)];
        let chart = BarChart::new(1, &models, AxisScale::Linear);
        assert_eq!(chart.bar_length(10.0, 40), 40);
        assert_eq!(chart.bar_length(5.0, 40), 20);
        assert_eq!(chart.bar_length(0.0, 40), 0);
    }

    #[test]
    fn log_scale_compresses_large_values() {
        let models = vec![model("cocomo", 999.0), model("ml_a", 9.0)];
        let chart = BarChart::new(1, &models, AxisScale::Logarithmic);
        // log10(1000) = 3, log10(10) = 1
        assert_eq!(chart.bar_length(999.0, 30), 30);
        assert_eq!(chart.bar_length(9.0, 30), 10);
        let linear = BarChart::new(2, &models, AxisScale::Linear);
        assert!(linear.bar_length(9.0, 30) < chart.bar_length(9.0, 30));
    }

    #[test]
    fn all_zero_chart_has_no_bars() {
        let models = vec![model("cocomo", 0.0), model("ml_a", -3.0)];
        let chart = BarChart::new(1, &models, AxisScale::Logarithmic);
        assert_eq!(chart.bar_length(0.0, 30), 0);
        assert_eq!(chart.bar_length(-3.0, 30), 0);
    }

    #[test]
    fn draw_uses_model_names_and_colors() {
        let mut m = model("ml_linear", 4.0);
        m.name = "ML Linear".to_string();
        let chart = BarChart::new(7, &[model("cocomo", 8.0), m], AxisScale::Linear);
        assert_eq!(chart.bars[1].color, Color::Red);
        let lines = chart.draw(8, false);
        assert_eq!(lines[0], "Effort (Person-months) [linear scale]");
        assert_eq!(lines[1], "cocomo    | ████████ 8.00");
        assert_eq!(lines[2], "ML Linear | ████     4.00");
    }

    #[test]
    fn confidence_follows_the_value() {
        let mut cocomo = model("cocomo", 8.0);
        cocomo.confidence = Some(74.6);
        let chart = BarChart::new(1, &[cocomo, model("loc", 4.0)], AxisScale::Linear);
        assert_eq!(chart.bars[0].confidence, Some(75));
        assert_eq!(chart.bars[1].confidence, None);
        let lines = chart.draw(4, false);
        assert_eq!(lines[1], "cocomo | ████ 8.00 (75%)");
        assert_eq!(lines[2], "loc    | ██   4.00");
    }

    #[test]
    fn empty_chart() {
        let chart = BarChart::new(1, &[], AxisScale::Linear);
        assert_eq!(chart.draw(10, true).len(), 2);
    }
}
