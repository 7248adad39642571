//! Plain-text point report.
//!
//! ```text
//! x y z
//! Max: <value>
//! Min: <value>
//! Mean: <value>
//! Standard Deviation: <value>
//! ```
//!
//! One block per point, in point order, every line newline-terminated.

use crate::decode::{DecodeError, PositionSet, Statistic, VertexDataset, format_value};

/// Labeled statistics written after each coordinate line, in order.
pub const REPORT_STATISTICS: [Statistic; 4] = [
    Statistic::Max,
    Statistic::Min,
    Statistic::Mean,
    Statistic::StdDev,
];

/// Serialize positions and their statistics into a report.
pub fn serialize(positions: &PositionSet, stats: &VertexDataset) -> Result<Vec<u8>, DecodeError> {
    if positions.point_count() != stats.num_points() {
        return Err(DecodeError::SizeMismatch {
            positions: positions.point_count(),
            statistics: stats.num_points(),
        });
    }

    let mut out = String::with_capacity(positions.point_count() * 96);
    for (p, [x, y, z]) in positions.points().enumerate() {
        out.push_str(&format!(
            "{} {} {}\n",
            format_value(x),
            format_value(y),
            format_value(z)
        ));
        for statistic in REPORT_STATISTICS {
            out.push_str(&format!(
                "{}: {}\n",
                statistic.label(),
                format_value(stats.statistic(statistic)[p])
            ));
        }
    }

    Ok(out.into_bytes())
}

/// One point block read back from a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportEntry {
    pub position: [f32; 3],
    pub max: f32,
    pub min: f32,
    pub mean: f32,
    pub std_dev: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("Report is not valid UTF-8")]
    NotUtf8,
    #[error("Line {line}: expected three coordinates")]
    BadCoordinates { line: usize },
    #[error("Line {line}: expected \"{expected}: <value>\"")]
    BadStatistic { line: usize, expected: &'static str },
    #[error("Report ends inside the block starting at line {line}")]
    Truncated { line: usize },
}

/// Parse a report produced by [`serialize`].
pub fn parse_report(bytes: &[u8]) -> Result<Vec<ReportEntry>, ReportError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ReportError::NotUtf8)?;
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));
    let mut entries = Vec::new();

    while let Some((line, coords)) = lines.next() {
        if coords.trim().is_empty() {
            continue;
        }
        let position = parse_coordinates(coords).ok_or(ReportError::BadCoordinates { line })?;

        let mut values = [0.0f32; 4];
        for (slot, statistic) in values.iter_mut().zip(REPORT_STATISTICS) {
            let (stat_line, text) = lines.next().ok_or(ReportError::Truncated { line })?;
            *slot = parse_labeled(text, statistic.label()).ok_or(ReportError::BadStatistic {
                line: stat_line,
                expected: statistic.label(),
            })?;
        }

        let [max, min, mean, std_dev] = values;
        entries.push(ReportEntry {
            position,
            max,
            min,
            mean,
            std_dev,
        });
    }

    Ok(entries)
}

fn parse_coordinates(line: &str) -> Option<[f32; 3]> {
    let mut parts = line.split_ascii_whitespace().map(str::parse::<f32>);
    let coords = [
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        parts.next()?.ok()?,
    ];
    parts.next().is_none().then_some(coords)
}

fn parse_labeled(line: &str, label: &str) -> Option<f32> {
    let (name, value) = line.split_once(':')?;
    if name.trim() != label {
        return None;
    }
    value.trim().parse().ok()
}
