//! Viewer session: owns the displayed geometry and dataset.
//!
//! Every load decodes into a fresh value first and only swaps it in once the
//! decode succeeded, so readers never observe a partially decoded dataset and
//! a failed load leaves the previous state in place.

use crate::decode::{
    DecodeError, DelimiterSet, FrameSeriesDecoder, PositionDecoder, PositionSet, Statistic,
    VertexDataset,
};
use crate::export::serialize;
use crate::schema::{ConfigError, ViewerConfig};
use crate::shading::{ColorScale, Gradient, Shading, shade};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No geometry loaded")]
    NoGeometry,
    #[error("No frame series loaded")]
    NoFrames,
    #[error("Frame {frame} out of range ({frames_per_point} frames per point)")]
    FrameOutOfRange {
        frame: usize,
        frames_per_point: usize,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Currently displayed geometry and frame series.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    config: ViewerConfig,
    positions: PositionDecoder,
    frames: FrameSeriesDecoder,
    gradient: Gradient,
    geometry: Option<PositionSet>,
    dataset: Option<VertexDataset>,
}

impl ViewerSession {
    pub fn new(config: ViewerConfig) -> Result<Self, SessionError> {
        let delimiters: DelimiterSet = config.delimiters.to_set()?;
        Ok(Self {
            positions: PositionDecoder::new(delimiters.clone()),
            frames: FrameSeriesDecoder::new(delimiters),
            gradient: config.gradient.gradient(),
            config,
            geometry: None,
            dataset: None,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn geometry(&self) -> Option<&PositionSet> {
        self.geometry.as_ref()
    }

    pub fn dataset(&self) -> Option<&VertexDataset> {
        self.dataset.as_ref()
    }

    pub fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    pub fn set_gradient(&mut self, gradient: Gradient) {
        self.gradient = gradient;
    }

    /// Decode a point-cloud buffer and make it the displayed geometry.
    ///
    /// Any loaded frame series is dropped since its rows belonged to the
    /// previous geometry. Returns the number of points.
    pub fn load_geometry(&mut self, bytes: &[u8]) -> Result<usize, SessionError> {
        let positions = self.positions.decode(bytes)?;
        Ok(self.publish_geometry(positions))
    }

    /// Use an already decoded mesh vertex buffer as the geometry.
    pub fn load_mesh_vertices(&mut self, vertices: Vec<f32>) -> Result<usize, SessionError> {
        let positions = PositionSet::from_flat(vertices)?;
        Ok(self.publish_geometry(positions))
    }

    fn publish_geometry(&mut self, positions: PositionSet) -> usize {
        let positions = if self.config.center_geometry {
            positions.centered()
        } else {
            positions
        };
        let count = positions.point_count();
        self.geometry = Some(positions);
        self.dataset = None;
        log::info!("Loaded geometry with {count} points");
        count
    }

    /// Decode a frame series for the current geometry. Returns the number of
    /// frames per point.
    pub fn load_frames(&mut self, bytes: &[u8]) -> Result<usize, SessionError> {
        let geometry = self.geometry.as_ref().ok_or(SessionError::NoGeometry)?;
        let dataset = self.frames.decode(bytes, geometry.point_count())?;
        let frames_per_point = dataset.frames_per_point();
        self.dataset = Some(dataset);
        log::info!("Loaded frame series with {frames_per_point} frames per point");
        Ok(frames_per_point)
    }

    fn loaded(&self) -> Result<(&PositionSet, &VertexDataset), SessionError> {
        let geometry = self.geometry.as_ref().ok_or(SessionError::NoGeometry)?;
        let dataset = self.dataset.as_ref().ok_or(SessionError::NoFrames)?;
        Ok((geometry, dataset))
    }

    /// Serialize the current geometry and statistics into a text report.
    pub fn export(&self) -> Result<Vec<u8>, SessionError> {
        let (geometry, dataset) = self.loaded()?;
        Ok(serialize(geometry, dataset)?)
    }

    /// Shade frame `frame`, normalized across every frame of the dataset.
    pub fn shade_frame(
        &self,
        frame: usize,
        window: Option<(f32, f32)>,
    ) -> Result<Shading, SessionError> {
        let (_, dataset) = self.loaded()?;
        let values = dataset
            .frame(frame)
            .ok_or(SessionError::FrameOutOfRange {
                frame,
                frames_per_point: dataset.frames_per_point(),
            })?;
        let scale = apply_window(ColorScale::from_values(dataset.frames()), window);
        Ok(shade(&values, &scale, &self.gradient))
    }

    /// Shade one statistic buffer, normalized across that buffer.
    pub fn shade_statistic(
        &self,
        statistic: Statistic,
        window: Option<(f32, f32)>,
    ) -> Result<Shading, SessionError> {
        let (_, dataset) = self.loaded()?;
        let values = dataset.statistic(statistic);
        let scale = apply_window(ColorScale::from_values(values), window);
        Ok(shade(values, &scale, &self.gradient))
    }
}

fn apply_window(scale: ColorScale, window: Option<(f32, f32)>) -> ColorScale {
    match window {
        Some((min, max)) => scale.with_window(min, max),
        None => scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::parse_report;

    fn session() -> ViewerSession {
        ViewerSession::new(ViewerConfig {
            center_geometry: false,
            ..ViewerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_frames_require_geometry() {
        let mut session = session();
        assert!(matches!(
            session.load_frames(b"1,2\n"),
            Err(SessionError::NoGeometry)
        ));
        assert!(matches!(session.export(), Err(SessionError::NoGeometry)));
    }

    #[test]
    fn test_load_and_export() {
        let mut session = session();
        assert_eq!(session.load_geometry(b"1,2,3\n4,5,6\n").unwrap(), 2);
        assert!(matches!(session.export(), Err(SessionError::NoFrames)));

        assert_eq!(session.load_frames(b"1,2,3\n4,5,6\n").unwrap(), 3);
        let report = session.export().unwrap();
        let entries = parse_report(&report).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].position, [4.0, 5.0, 6.0]);
        assert_eq!(entries[1].mean, 5.0);
    }

    #[test]
    fn test_failed_load_keeps_previous_dataset() {
        let mut session = session();
        session.load_geometry(b"0,0,0\n").unwrap();
        session.load_frames(b"1,2\n").unwrap();

        assert!(matches!(
            session.load_frames(b"1,2\n3,4\n"),
            Err(SessionError::Decode(DecodeError::PointCountMismatch { .. }))
        ));
        assert_eq!(session.dataset().unwrap().frames(), &[1.0, 2.0]);

        assert!(session.load_geometry(b"1,2\n").is_err());
        assert_eq!(session.geometry().unwrap().point_count(), 1);
        assert!(session.dataset().is_some());
    }

    #[test]
    fn test_new_geometry_drops_dataset() {
        let mut session = session();
        session.load_geometry(b"0,0,0\n").unwrap();
        session.load_frames(b"1,2\n").unwrap();
        session.load_geometry(b"0,0,0\n1,1,1\n").unwrap();
        assert!(session.dataset().is_none());
    }

    #[test]
    fn test_geometry_centering() {
        let mut session = ViewerSession::new(ViewerConfig::default()).unwrap();
        session.load_geometry(b"0,0,0\n2,2,2\n").unwrap();
        assert_eq!(session.geometry().unwrap().point(0), Some([-1.0, -1.0, -1.0]));
    }

    #[test]
    fn test_mesh_vertices() {
        let mut session = session();
        assert_eq!(session.load_mesh_vertices(vec![0.0; 9]).unwrap(), 3);
        assert!(session.load_mesh_vertices(vec![0.0; 7]).is_err());
        assert_eq!(session.geometry().unwrap().point_count(), 3);
    }

    #[test]
    fn test_shade_frame_and_statistic() {
        let mut session = session();
        session.load_geometry(b"0,0,0\n1,1,1\n").unwrap();
        session.load_frames(b"0,10\n,5\n").unwrap();

        let shading = session.shade_frame(0, None).unwrap();
        assert_eq!(shading.alphas, vec![1.0, 0.0]);
        assert_eq!(&shading.colors[0..3], &[0.0, 0.0, 1.0]);

        let shading = session.shade_frame(1, None).unwrap();
        assert_eq!(&shading.colors[0..3], &[1.0, 0.0, 0.0]);

        assert!(matches!(
            session.shade_frame(2, None),
            Err(SessionError::FrameOutOfRange {
                frame: 2,
                frames_per_point: 2
            })
        ));

        let shading = session.shade_statistic(Statistic::Mean, None).unwrap();
        assert_eq!(shading.alphas, vec![1.0, 1.0]);
    }
}
