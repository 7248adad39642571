//! Multi-frame per-point measurement decoding.
//!
//! The frame series format carries one row of comma separated readings per
//! point. The row width is not declared anywhere: it is inferred from the
//! first line, after which the whole buffer is decoded in one pass while the
//! per-point statistics are accumulated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DecodeError;
use super::number::{MISSING, parse_reading};
use super::scanner::{ByteCursor, Delimiter, DelimiterSet};
use super::stats::{RowAccumulator, RowStats};

/// Per-point statistic buffers held by a [`VertexDataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Mean,
    Min,
    Max,
    Range,
    StdDev,
}

impl Statistic {
    pub const ALL: [Statistic; 5] = [
        Statistic::Mean,
        Statistic::Min,
        Statistic::Max,
        Statistic::Range,
        Statistic::StdDev,
    ];

    /// Human-readable label used in exported reports.
    pub fn label(self) -> &'static str {
        match self {
            Statistic::Mean => "Mean",
            Statistic::Min => "Min",
            Statistic::Max => "Max",
            Statistic::Range => "Range",
            Statistic::StdDev => "Standard Deviation",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognized statistic name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown statistic: {0}")]
pub struct UnknownStatistic(pub String);

impl FromStr for Statistic {
    type Err = UnknownStatistic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Statistic::Mean),
            "min" | "minimum" => Ok(Statistic::Min),
            "max" | "maximum" => Ok(Statistic::Max),
            "range" => Ok(Statistic::Range),
            "std_dev" | "stddev" | "std" | "standard deviation" => Ok(Statistic::StdDev),
            _ => Err(UnknownStatistic(s.to_string())),
        }
    }
}

/// Decoded readings plus per-point statistics for N points.
///
/// `frames[p * frames_per_point + f]` is point `p`'s reading at frame `f`;
/// a missing reading is NaN. All statistic buffers have length N.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexDataset {
    frames_per_point: usize,
    frames: Vec<f32>,
    mean: Vec<f32>,
    min: Vec<f32>,
    max: Vec<f32>,
    range: Vec<f32>,
    std_dev: Vec<f32>,
}

impl VertexDataset {
    /// Dataset with zero frames per point; every statistic is missing.
    pub fn empty(num_points: usize) -> Self {
        Self {
            frames_per_point: 0,
            frames: Vec::new(),
            mean: vec![MISSING; num_points],
            min: vec![MISSING; num_points],
            max: vec![MISSING; num_points],
            range: vec![MISSING; num_points],
            std_dev: vec![MISSING; num_points],
        }
    }

    fn with_shape(num_points: usize, frames_per_point: usize) -> Self {
        Self {
            frames_per_point,
            frames: vec![MISSING; num_points * frames_per_point],
            mean: vec![0.0; num_points],
            min: vec![0.0; num_points],
            max: vec![0.0; num_points],
            range: vec![0.0; num_points],
            std_dev: vec![0.0; num_points],
        }
    }

    /// Reassemble a dataset from its buffers, checking every length.
    pub fn from_parts(
        frames_per_point: usize,
        frames: Vec<f32>,
        [mean, min, max, range, std_dev]: [Vec<f32>; 5],
    ) -> Result<Self, DecodeError> {
        let num_points = mean.len();
        for buffer in [&min, &max, &range, &std_dev] {
            if buffer.len() != num_points {
                return Err(DecodeError::SizeMismatch {
                    positions: num_points,
                    statistics: buffer.len(),
                });
            }
        }
        if frames.len() != num_points * frames_per_point {
            return Err(DecodeError::SizeMismatch {
                positions: num_points,
                statistics: frames.len() / frames_per_point.max(1),
            });
        }

        Ok(Self {
            frames_per_point,
            frames,
            mean,
            min,
            max,
            range,
            std_dev,
        })
    }

    fn set_row(&mut self, p: usize, stats: RowStats) {
        self.mean[p] = stats.mean;
        self.min[p] = stats.min;
        self.max[p] = stats.max;
        self.range[p] = stats.range;
        self.std_dev[p] = stats.std_dev;
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.mean.len()
    }

    #[inline]
    pub fn frames_per_point(&self) -> usize {
        self.frames_per_point
    }

    /// Flat row-major frame buffer.
    #[inline]
    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    pub fn min(&self) -> &[f32] {
        &self.min
    }

    pub fn max(&self) -> &[f32] {
        &self.max
    }

    pub fn range(&self) -> &[f32] {
        &self.range
    }

    pub fn std_dev(&self) -> &[f32] {
        &self.std_dev
    }

    pub fn statistic(&self, statistic: Statistic) -> &[f32] {
        match statistic {
            Statistic::Mean => &self.mean,
            Statistic::Min => &self.min,
            Statistic::Max => &self.max,
            Statistic::Range => &self.range,
            Statistic::StdDev => &self.std_dev,
        }
    }

    /// Readings of point `p`.
    pub fn row(&self, p: usize) -> Option<&[f32]> {
        if p >= self.num_points() {
            return None;
        }
        let start = p * self.frames_per_point;
        Some(&self.frames[start..start + self.frames_per_point])
    }

    /// Reading of point `p` at frame `f`.
    pub fn reading(&self, p: usize, f: usize) -> Option<f32> {
        if f >= self.frames_per_point {
            return None;
        }
        self.row(p).map(|row| row[f])
    }

    /// One reading per point for frame `f`.
    pub fn frame(&self, f: usize) -> Option<Vec<f32>> {
        if f >= self.frames_per_point {
            return None;
        }
        Some(
            self.frames
                .iter()
                .skip(f)
                .step_by(self.frames_per_point)
                .copied()
                .collect(),
        )
    }

    /// Smallest and largest finite reading across every frame.
    pub fn extrema(&self) -> Option<(f32, f32)> {
        finite_extrema(&self.frames)
    }

    /// Count of missing readings in the frame buffer.
    pub fn missing_readings(&self) -> usize {
        self.frames.iter().filter(|v| v.is_nan()).count()
    }

    pub fn summary(&self) -> DatasetSummary {
        let extrema = self.extrema();
        DatasetSummary {
            num_points: self.num_points(),
            frames_per_point: self.frames_per_point,
            missing_readings: self.missing_readings(),
            min_reading: extrema.map(|(lo, _)| lo),
            max_reading: extrema.map(|(_, hi)| hi),
        }
    }
}

/// Smallest and largest finite values in `values`.
pub fn finite_extrema(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Shape and coverage of a decoded dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub num_points: usize,
    pub frames_per_point: usize,
    pub missing_readings: usize,
    pub min_reading: Option<f32>,
    pub max_reading: Option<f32>,
}

/// Infer the number of readings per point from the first line.
///
/// Every field delimiter on the line opens another reading, except one at the
/// very end of the line, which is trailing. Returns 0 when the first line is
/// empty, or when the buffer holds neither a field nor a point delimiter.
pub fn infer_frames_per_point(bytes: &[u8], delimiters: &DelimiterSet) -> usize {
    let line_end = bytes.iter().position(|&b| delimiters.is_point(b));
    let line = &bytes[..line_end.unwrap_or(bytes.len())];

    let count = line.iter().filter(|&&b| delimiters.is_field(b)).count();

    if line.is_empty() || (count == 0 && line_end.is_none()) {
        return 0;
    }

    match line.last() {
        Some(&b) if delimiters.is_field(b) => count,
        _ => count + 1,
    }
}

/// Length of `bytes` without its trailing blank lines.
fn trim_trailing_blank_lines(bytes: &[u8], delimiters: &DelimiterSet) -> usize {
    bytes
        .iter()
        .rposition(|&b| {
            !delimiters.is_point(b) && (delimiters.is_field(b) || !b.is_ascii_whitespace())
        })
        .map_or(0, |last| last + 1)
}

/// Decoder for the frame series format.
#[derive(Debug, Clone, Default)]
pub struct FrameSeriesDecoder {
    delimiters: DelimiterSet,
}

impl FrameSeriesDecoder {
    pub fn new(delimiters: DelimiterSet) -> Self {
        Self { delimiters }
    }

    /// Decode readings for exactly `num_points` points.
    ///
    /// Rows may be shorter than the inferred width; unwritten slots stay
    /// missing and statistics use only the valid readings of that row.
    pub fn decode(&self, bytes: &[u8], num_points: usize) -> Result<VertexDataset, DecodeError> {
        let frames_per_point = infer_frames_per_point(bytes, &self.delimiters);
        if frames_per_point == 0 {
            log::warn!("Frame series has no readings on its first line; using an empty dataset");
            return Ok(VertexDataset::empty(num_points));
        }

        let mut dataset = VertexDataset::with_shape(num_points, frames_per_point);
        let mut accumulator = RowAccumulator::with_width(frames_per_point);
        let body = &bytes[..trim_trailing_blank_lines(bytes, &self.delimiters)];
        let mut cursor = ByteCursor::new(body);
        let mut rows = 0usize;
        let mut slot = 0usize;
        let mut empty_rows = 0usize;

        while let Some(token) = cursor.next_token(&self.delimiters) {
            if token.offset == body.len() && token.is_blank() {
                break;
            }

            // Past the last point only rows are counted, so the error can
            // report how many the input really has.
            if rows < num_points {
                if slot == frames_per_point {
                    return Err(DecodeError::RowOverflow {
                        point: rows,
                        frames_per_point,
                    });
                }
                let value = parse_reading(&token)?;
                dataset.frames[rows * frames_per_point + slot] = value;
                accumulator.push(value);
            }
            slot += 1;

            if token.delimiter != Delimiter::Field {
                if rows < num_points {
                    let stats = accumulator.finish();
                    if stats.is_missing() {
                        empty_rows += 1;
                    }
                    dataset.set_row(rows, stats);
                }
                rows += 1;
                slot = 0;
            }
        }

        if rows != num_points {
            return Err(DecodeError::PointCountMismatch {
                expected: num_points,
                found: rows,
            });
        }

        if empty_rows > 0 {
            log::warn!("{empty_rows} of {num_points} points have no valid readings");
        }
        log::debug!("Decoded {num_points} points x {frames_per_point} frames");

        Ok(dataset)
    }
}
