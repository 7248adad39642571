//! Streaming per-row statistics.

use super::number::MISSING;

/// Aggregates derived from one point's row of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowStats {
    pub mean: f32,
    pub min: f32,
    pub max: f32,
    pub range: f32,
    pub std_dev: f32,
}

impl RowStats {
    /// Statistics of a row without a single valid reading.
    pub const MISSING: Self = Self {
        mean: MISSING,
        min: MISSING,
        max: MISSING,
        range: MISSING,
        std_dev: MISSING,
    };

    pub fn is_missing(&self) -> bool {
        self.mean.is_nan()
    }
}

/// Running aggregation over the readings of the current row.
///
/// Min, max and the sum update as readings arrive; valid readings are kept in
/// a length-tracked scratch buffer so the deviation pass only sees values
/// written for the current row. Missing readings are skipped entirely, so
/// every divisor is the count of valid readings.
#[derive(Debug, Clone)]
pub struct RowAccumulator {
    scratch: Vec<f32>,
    sum: f64,
    min: f32,
    max: f32,
}

impl RowAccumulator {
    /// Create an accumulator sized for rows of `width` readings.
    pub fn with_width(width: usize) -> Self {
        Self {
            scratch: Vec::with_capacity(width),
            sum: 0.0,
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }

    /// Feed one reading. Missing readings are ignored.
    #[inline]
    pub fn push(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.sum += f64::from(value);
        self.scratch.push(value);
    }

    /// Number of valid readings seen since the last [`finish`](Self::finish).
    #[inline]
    pub fn valid_count(&self) -> usize {
        self.scratch.len()
    }

    /// Close the current row and reset for the next one.
    pub fn finish(&mut self) -> RowStats {
        let stats = if self.scratch.is_empty() {
            RowStats::MISSING
        } else {
            let count = self.scratch.len() as f64;
            let mean = self.sum / count;
            let variance = self
                .scratch
                .iter()
                .map(|&v| {
                    let diff = f64::from(v) - mean;
                    diff * diff
                })
                .sum::<f64>()
                / count;

            RowStats {
                mean: mean as f32,
                min: self.min,
                max: self.max,
                range: self.max - self.min,
                std_dev: variance.sqrt() as f32,
            }
        };

        self.reset();
        stats
    }

    fn reset(&mut self) {
        self.scratch.clear();
        self.sum = 0.0;
        self.min = f32::INFINITY;
        self.max = f32::NEG_INFINITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[f32]) -> RowStats {
        let mut acc = RowAccumulator::with_width(values.len());
        for &v in values {
            acc.push(v);
        }
        acc.finish()
    }

    #[test]
    fn test_full_row() {
        let stats = row(&[10.0, 20.0, 30.0]);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.range, 20.0);
        assert!((stats.std_dev - (200.0f32 / 3.0).sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_missing_readings_shrink_divisor() {
        let stats = row(&[f32::NAN, 20.0, 30.0]);
        assert_eq!(stats.min, 20.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.mean, 25.0);
        assert!((stats.std_dev - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_all_missing_row() {
        let stats = row(&[f32::NAN, f32::NAN]);
        assert!(stats.is_missing());
        assert!(stats.std_dev.is_nan());
        assert!(stats.range.is_nan());
    }

    #[test]
    fn test_no_contamination_from_previous_row() {
        let mut acc = RowAccumulator::with_width(4);
        for v in [100.0, -100.0, 100.0, -100.0] {
            acc.push(v);
        }
        let wide = acc.finish();
        assert_eq!(wide.std_dev, 100.0);

        acc.push(7.0);
        assert_eq!(acc.valid_count(), 1);
        let narrow = acc.finish();
        assert_eq!(narrow.mean, 7.0);
        assert_eq!(narrow.std_dev, 0.0);
        assert_eq!(narrow.range, 0.0);
    }

    #[test]
    fn test_single_reading() {
        let stats = row(&[-3.5]);
        assert_eq!(stats.min, -3.5);
        assert_eq!(stats.max, -3.5);
        assert_eq!(stats.std_dev, 0.0);
    }
}
