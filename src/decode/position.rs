//! Point-cloud position decoding.

use serde::Serialize;

use super::DecodeError;
use super::number::parse_value;
use super::scanner::{ByteCursor, Delimiter, DelimiterSet};

/// Flat `x, y, z` coordinate buffer for N points.
///
/// The length is always a multiple of 3.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PositionSet {
    coords: Vec<f32>,
}

impl PositionSet {
    /// Wrap a flat coordinate buffer, such as a mesh loader's vertex buffer.
    pub fn from_flat(coords: Vec<f32>) -> Result<Self, DecodeError> {
        if coords.len() % 3 != 0 {
            return Err(DecodeError::MalformedPointCount {
                values: coords.len(),
            });
        }
        Ok(Self { coords })
    }

    /// Number of points.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.coords.len() / 3
    }

    /// Number of coordinate values (`3 * point_count`).
    #[inline]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Raw coordinate buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.coords
    }

    /// Coordinates of point `p`.
    pub fn point(&self, p: usize) -> Option<[f32; 3]> {
        let c = self.coords.get(p * 3..p * 3 + 3)?;
        Some([c[0], c[1], c[2]])
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = [f32; 3]> + '_ {
        self.coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Axis-aligned bounds `(min, max)` over finite coordinates.
    pub fn bounding_box(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut lo = [f32::INFINITY; 3];
        let mut hi = [f32::NEG_INFINITY; 3];
        let mut any = false;

        for p in self.points().filter(|p| p.iter().all(|v| v.is_finite())) {
            any = true;
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
        }

        any.then_some((lo, hi))
    }

    /// Copy translated so the bounding-box center sits at the origin.
    pub fn centered(&self) -> Self {
        let Some((lo, hi)) = self.bounding_box() else {
            return self.clone();
        };
        let center = [
            (lo[0] + hi[0]) * 0.5,
            (lo[1] + hi[1]) * 0.5,
            (lo[2] + hi[2]) * 0.5,
        ];

        let coords = self
            .coords
            .iter()
            .enumerate()
            .map(|(i, &v)| v - center[i % 3])
            .collect();
        Self { coords }
    }
}

/// Decoder for comma/newline separated `x,y,z` text.
#[derive(Debug, Clone, Default)]
pub struct PositionDecoder {
    delimiters: DelimiterSet,
}

impl PositionDecoder {
    pub fn new(delimiters: DelimiterSet) -> Self {
        Self { delimiters }
    }

    /// Decode a position byte stream.
    ///
    /// Blank lines and trailing delimiters are tolerated. A blank token in
    /// front of a field delimiter is an [`DecodeError::InvalidNumber`].
    pub fn decode(&self, bytes: &[u8]) -> Result<PositionSet, DecodeError> {
        // Every coordinate takes at least two bytes.
        let mut coords = Vec::with_capacity(bytes.len() / 2);
        let mut cursor = ByteCursor::new(bytes);

        while let Some(token) = cursor.next_token(&self.delimiters) {
            if token.is_blank() && token.delimiter != Delimiter::Field {
                continue;
            }
            coords.push(parse_value(&token)?);
        }

        coords.shrink_to_fit();
        let positions = PositionSet::from_flat(coords)?;
        log::debug!(
            "Decoded {} points from {} bytes",
            positions.point_count(),
            bytes.len()
        );
        Ok(positions)
    }
}
