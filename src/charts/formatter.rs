//! Tick Formatter Module
//! Scientific-notation tick labels with a pinned order of magnitude.

/// Order of magnitude implied by an axis scale: `-log10(scale)`.
pub fn fixed_order_of_magnitude(scale: f64) -> f64 {
    let order = -scale.log10();
    // Avoid printing "-0"
    if order == 0.0 {
        0.0
    } else {
        order
    }
}

// Decimals used before a tick step is known
const DEFAULT_DECIMALS: usize = 3;
const MAX_DECIMALS: usize = 15;

/// Decimals needed to tell apart labels spaced `step` apart.
pub fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 {
        return DEFAULT_DECIMALS;
    }
    let digits = -step.log10().floor();
    if digits <= 0.0 {
        0
    } else {
        (digits as usize).min(MAX_DECIMALS)
    }
}

/// Formats tick values as `value / 10^order` and reports the shared
/// `×10^order` offset separately.
///
/// The order is fixed at construction and never recomputed from the visible
/// range, so labels stay consistent while the view is panned or zoomed.
/// Only the number of decimals follows the tick spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedOrderFormatter {
    order_of_mag: f64,
    decimals: usize,
}

impl Default for FixedOrderFormatter {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl FixedOrderFormatter {
    pub fn new(order_of_mag: f64) -> Self {
        Self {
            order_of_mag,
            decimals: DEFAULT_DECIMALS,
        }
    }

    /// Formatter for data drawn at the given scale.
    pub fn for_scale(scale: f64) -> Self {
        Self::new(fixed_order_of_magnitude(scale))
    }

    pub fn order_of_magnitude(&self) -> f64 {
        self.order_of_mag
    }

    pub fn decimals(&self) -> usize {
        self.decimals
    }

    /// Same order, with precision fitted to ticks `step` apart in data units.
    pub fn with_tick_step(mut self, step: f64) -> Self {
        self.decimals = decimals_for_step(step / self.divisor());
        self
    }

    fn divisor(&self) -> f64 {
        10f64.powf(self.order_of_mag)
    }

    /// Tick label for a raw data value.
    pub fn format(&self, value: f64) -> String {
        trim_number(value / self.divisor(), self.decimals)
    }

    /// Labels for a full set of ticks, precision taken from their smallest
    /// spacing.
    pub fn format_ticks(&self, ticks: &[f64]) -> Vec<String> {
        let step = ticks
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .filter(|d| *d > 0.0)
            .fold(f64::INFINITY, f64::min);
        let formatter = if step.is_finite() {
            self.with_tick_step(step)
        } else {
            *self
        };
        ticks.iter().map(|v| formatter.format(*v)).collect()
    }

    /// Offset text drawn at the axis end, empty when the order is zero.
    pub fn offset_text(&self) -> String {
        if self.order_of_mag == 0.0 {
            return String::new();
        }
        if self.order_of_mag.fract() == 0.0 {
            format!("×10{}", superscript(self.order_of_mag as i64))
        } else {
            format!("×10^{}", trim_number(self.order_of_mag, 3))
        }
    }
}

/// Fixed-precision number with trailing zeros removed.
fn trim_number(value: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, value);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn superscript(exponent: i64) -> String {
    exponent
        .to_string()
        .chars()
        .map(|c| match c {
            '-' => '⁻',
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_scale() {
        assert_eq!(fixed_order_of_magnitude(1.0), 0.0);
        assert_eq!(fixed_order_of_magnitude(1e3), -3.0);
        assert_eq!(fixed_order_of_magnitude(1e-3), 3.0);
        assert_eq!(fixed_order_of_magnitude(100.0), -2.0);
    }

    #[test]
    fn test_format_divides_by_order() {
        let fmt = FixedOrderFormatter::new(3.0);
        assert_eq!(fmt.format(2500.0), "2.5");
        assert_eq!(fmt.format(0.0), "0");
        assert_eq!(fmt.format(-1000.0), "-1");

        let fmt = FixedOrderFormatter::for_scale(1.0);
        assert_eq!(fmt.format(80.0), "80");
        assert_eq!(fmt.format(12.345), "12.345");
    }

    #[test]
    fn test_order_is_pinned_regardless_of_value_range() {
        let fmt = FixedOrderFormatter::for_scale(1e-3);
        assert_eq!(fmt.format(1e3), "1");
        assert_eq!(fmt.format(1e6), "1000");
        assert_eq!(fmt.format(1.0), "0.001");
    }

    #[test]
    fn test_decimals_for_step() {
        assert_eq!(decimals_for_step(20.0), 0);
        assert_eq!(decimals_for_step(1.0), 0);
        assert_eq!(decimals_for_step(0.5), 1);
        assert_eq!(decimals_for_step(2e-4), 4);
        assert_eq!(decimals_for_step(1e-4), 4);
        assert_eq!(decimals_for_step(0.0), 3);
    }

    #[test]
    fn test_fine_ticks_stay_distinct() {
        let fmt = FixedOrderFormatter::for_scale(1.0);
        let labels = fmt.format_ticks(&[0.0, 0.0002, 0.0004, 0.0006, 0.0008]);
        assert_eq!(labels, vec!["0", "0.0002", "0.0004", "0.0006", "0.0008"]);

        let fmt = fmt.with_tick_step(2e-4);
        assert_eq!(fmt.order_of_magnitude(), 0.0);
        assert_ne!(fmt.format(0.0002), fmt.format(0.0004));
    }

    #[test]
    fn test_tick_step_is_measured_after_scaling() {
        // 1e3 order: ticks 200 apart read 0.2 apart
        let fmt = FixedOrderFormatter::new(3.0).with_tick_step(200.0);
        assert_eq!(fmt.decimals(), 1);
        assert_eq!(fmt.format(2200.0), "2.2");
        assert_eq!(fmt.order_of_magnitude(), 3.0);
    }

    #[test]
    fn test_offset_text() {
        assert_eq!(FixedOrderFormatter::new(0.0).offset_text(), "");
        assert_eq!(FixedOrderFormatter::new(3.0).offset_text(), "×10³");
        assert_eq!(FixedOrderFormatter::new(-12.0).offset_text(), "×10⁻¹²");
        assert_eq!(FixedOrderFormatter::for_scale(2.0).offset_text(), "×10^-0.301");
    }
}
