//! Binary snapshot of a decoded point cloud and its frame statistics.
//!
//! ```text
//! Header (32 bytes):
//!   Magic: "PSTS" (4 bytes)
//!   Version: u16
//!   Flags: u16 (compression)
//!   Point count: u64
//!   Frames per point: u32
//!   Reserved: 12 bytes
//!
//! Body (little-endian f32, optionally LZ4 compressed):
//!   coords (3N) | frames (N*F) | mean | min | max | range | std_dev (N each)
//! ```

use std::io::{self, Read, Write};

use crate::decode::{DecodeError, PositionSet, Statistic, VertexDataset};

/// Magic bytes identifying a snapshot.
pub const SNAPSHOT_MAGIC: &[u8; 4] = b"PSTS";

/// Current format version.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Compression applied to the snapshot body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CompressionType {
    /// Raw f32 data.
    #[default]
    None = 0,
    /// LZ4 fast compression.
    Lz4 = 1,
}

impl CompressionType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Lz4),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid PSTS magic bytes")]
    BadMagic,
    #[error("Unsupported PSTS version: {0}")]
    UnsupportedVersion(u16),
    #[error("Unknown compression type: {0}")]
    UnknownCompression(u8),
    #[error("Snapshot is LZ4 compressed but LZ4 support is not compiled in")]
    CompressionUnavailable,
    #[error("Snapshot body is {found} bytes, expected {expected}")]
    BodyLength { expected: usize, found: usize },
    #[error("Snapshot point count does not fit in memory: {0}")]
    TooLarge(u64),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Snapshot header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub point_count: u64,
    pub frames_per_point: u32,
    pub compression: CompressionType,
}

impl SnapshotHeader {
    /// Magic(4) + Version(2) + Flags(2) + PointCount(8) + FramesPerPoint(4) + Reserved(12) = 32
    pub const SIZE: usize = 32;

    /// Uncompressed body size in bytes.
    pub fn body_size(&self) -> Option<usize> {
        let n = usize::try_from(self.point_count).ok()?;
        let f = self.frames_per_point as usize;
        let values = n.checked_mul(3 + f + Statistic::ALL.len())?;
        values.checked_mul(4)
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(SNAPSHOT_MAGIC)?;
        w.write_all(&SNAPSHOT_VERSION.to_le_bytes())?;
        w.write_all(&u16::from(self.compression as u8).to_le_bytes())?;
        w.write_all(&self.point_count.to_le_bytes())?;
        w.write_all(&self.frames_per_point.to_le_bytes())?;
        // Reserved bytes
        w.write_all(&[0u8; 12])?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, SnapshotError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic);
        }

        let mut buf2 = [0u8; 2];
        let mut buf4 = [0u8; 4];
        let mut buf8 = [0u8; 8];

        r.read_exact(&mut buf2)?;
        let version = u16::from_le_bytes(buf2);
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version));
        }

        r.read_exact(&mut buf2)?;
        let flags = u16::from_le_bytes(buf2);
        let compression = CompressionType::from_u8((flags & 0x0F) as u8)
            .ok_or(SnapshotError::UnknownCompression((flags & 0x0F) as u8))?;

        r.read_exact(&mut buf8)?;
        let point_count = u64::from_le_bytes(buf8);

        r.read_exact(&mut buf4)?;
        let frames_per_point = u32::from_le_bytes(buf4);

        // Skip reserved bytes
        let mut reserved = [0u8; 12];
        r.read_exact(&mut reserved)?;

        Ok(Self {
            point_count,
            frames_per_point,
            compression,
        })
    }
}

/// Write a snapshot of `positions` and `dataset`.
pub fn write_snapshot<W: Write>(
    w: &mut W,
    positions: &PositionSet,
    dataset: &VertexDataset,
    compression: CompressionType,
) -> Result<(), SnapshotError> {
    if positions.point_count() != dataset.num_points() {
        return Err(DecodeError::SizeMismatch {
            positions: positions.point_count(),
            statistics: dataset.num_points(),
        }
        .into());
    }

    let compression = if compression == CompressionType::Lz4 && !cfg!(feature = "lz4") {
        log::warn!("LZ4 support not compiled in; writing uncompressed snapshot");
        CompressionType::None
    } else {
        compression
    };

    let header = SnapshotHeader {
        point_count: positions.point_count() as u64,
        frames_per_point: dataset.frames_per_point() as u32,
        compression,
    };

    let mut body = Vec::with_capacity(header.body_size().unwrap_or(0));
    encode_values(&mut body, positions.as_slice());
    encode_values(&mut body, dataset.frames());
    for statistic in Statistic::ALL {
        encode_values(&mut body, dataset.statistic(statistic));
    }

    header.write_to(w)?;
    match compression {
        CompressionType::None => w.write_all(&body)?,
        CompressionType::Lz4 => w.write_all(&compress_lz4(&body))?,
    }
    Ok(())
}

/// Read a snapshot written by [`write_snapshot`].
pub fn read_snapshot<R: Read>(r: &mut R) -> Result<(PositionSet, VertexDataset), SnapshotError> {
    let header = SnapshotHeader::read_from(r)?;
    let expected = header
        .body_size()
        .ok_or(SnapshotError::TooLarge(header.point_count))?;

    let mut raw = Vec::new();
    r.read_to_end(&mut raw)?;
    let body = match header.compression {
        CompressionType::None => raw,
        CompressionType::Lz4 => decompress_lz4(&raw)?,
    };
    if body.len() != expected {
        return Err(SnapshotError::BodyLength {
            expected,
            found: body.len(),
        });
    }

    let n = header.point_count as usize;
    let f = header.frames_per_point as usize;
    let mut values = decode_values(&body).into_iter();
    let mut take = |count: usize| -> Vec<f32> { values.by_ref().take(count).collect() };

    let positions = PositionSet::from_flat(take(3 * n))?;
    let frames = take(n * f);
    let stats = [take(n), take(n), take(n), take(n), take(n)];
    let dataset = VertexDataset::from_parts(f, frames, stats)?;

    Ok((positions, dataset))
}

fn encode_values(out: &mut Vec<u8>, data: &[f32]) {
    for v in data {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn decode_values(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(feature = "lz4")]
fn compress_lz4(data: &[u8]) -> Vec<u8> {
    lz4_flex::compress_prepend_size(data)
}

#[cfg(feature = "lz4")]
fn decompress_lz4(data: &[u8]) -> Result<Vec<u8>, SnapshotError> {
    lz4_flex::decompress_size_prepended(data)
        .map_err(|e| SnapshotError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

#[cfg(not(feature = "lz4"))]
fn compress_lz4(data: &[u8]) -> Vec<u8> {
    data.to_vec()
}

#[cfg(not(feature = "lz4"))]
fn decompress_lz4(_data: &[u8]) -> Result<Vec<u8>, SnapshotError> {
    Err(SnapshotError::CompressionUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{FrameSeriesDecoder, PositionDecoder};
    use std::io::Cursor;

    fn sample() -> (PositionSet, VertexDataset) {
        let positions = PositionDecoder::default()
            .decode(b"0,1,2\n3,4,5\n")
            .unwrap();
        let dataset = FrameSeriesDecoder::default()
            .decode(b"1,2,3\n,5,6\n", 2)
            .unwrap();
        (positions, dataset)
    }

    #[test]
    fn test_header_roundtrip() {
        let header = SnapshotHeader {
            point_count: 1234,
            frames_per_point: 48,
            compression: CompressionType::Lz4,
        };

        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), SnapshotHeader::SIZE);

        let decoded = SnapshotHeader::read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let (positions, dataset) = sample();

        let mut buf = Vec::new();
        write_snapshot(&mut buf, &positions, &dataset, CompressionType::None).unwrap();
        assert_eq!(buf.len(), SnapshotHeader::SIZE + (2 * (3 + 3 + 5)) * 4);

        let (read_positions, read_dataset) = read_snapshot(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(read_positions, positions);
        assert_eq!(read_dataset.frames_per_point(), 3);
        assert!(read_dataset.frames()[3].is_nan());
        assert_eq!(read_dataset.mean(), dataset.mean());
        assert_eq!(read_dataset.std_dev(), dataset.std_dev());
    }

    #[cfg(feature = "lz4")]
    #[test]
    fn test_snapshot_roundtrip_lz4() {
        let (positions, dataset) = sample();

        let mut buf = Vec::new();
        write_snapshot(&mut buf, &positions, &dataset, CompressionType::Lz4).unwrap();
        let (read_positions, read_dataset) = read_snapshot(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(read_positions, positions);
        assert_eq!(read_dataset.max(), dataset.max());
    }

    #[test]
    fn test_bad_magic() {
        let mut buf = vec![0u8; SnapshotHeader::SIZE];
        buf[..4].copy_from_slice(b"FLWA");
        assert!(matches!(
            read_snapshot(&mut Cursor::new(&buf)),
            Err(SnapshotError::BadMagic)
        ));
    }

    #[test]
    fn test_truncated_body() {
        let (positions, dataset) = sample();
        let mut buf = Vec::new();
        write_snapshot(&mut buf, &positions, &dataset, CompressionType::None).unwrap();
        buf.truncate(buf.len() - 4);

        assert!(matches!(
            read_snapshot(&mut Cursor::new(&buf)),
            Err(SnapshotError::BodyLength { .. })
        ));
    }

    #[test]
    fn test_mismatched_inputs_rejected() {
        let (positions, _) = sample();
        let dataset = VertexDataset::empty(5);
        let mut buf = Vec::new();
        assert!(matches!(
            write_snapshot(&mut buf, &positions, &dataset, CompressionType::None),
            Err(SnapshotError::Decode(DecodeError::SizeMismatch { .. }))
        ));
        assert!(buf.is_empty());
    }
}
