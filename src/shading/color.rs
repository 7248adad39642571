//! Per-point color and opacity buffers for a selected channel.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;
use serde::Serialize;

use super::Gradient;
use crate::decode::finite_extrema;

/// Maps raw readings to gradient positions.
///
/// Normalization always spans the data extrema; the display window only
/// clamps readings before they are normalized, so narrowing the window
/// saturates the ends of the gradient instead of stretching it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorScale {
    data_min: f32,
    data_max: f32,
    window_min: f32,
    window_max: f32,
}

impl ColorScale {
    /// Scale spanning the finite extrema of `values`.
    pub fn from_values(values: &[f32]) -> Self {
        let (lo, hi) = finite_extrema(values).unwrap_or((0.0, 1.0));
        Self::new(lo, hi)
    }

    pub fn new(data_min: f32, data_max: f32) -> Self {
        Self {
            data_min,
            data_max,
            window_min: data_min,
            window_max: data_max,
        }
    }

    /// Restrict the display window; readings outside it are clamped.
    pub fn with_window(mut self, min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.window_min = min;
        self.window_max = max;
        self
    }

    pub fn data_extrema(&self) -> (f32, f32) {
        (self.data_min, self.data_max)
    }

    pub fn window(&self) -> (f32, f32) {
        (self.window_min, self.window_max)
    }

    /// Gradient position of `value`, or `None` for a missing reading.
    #[inline]
    pub fn normalize(&self, value: f32) -> Option<f32> {
        if value.is_nan() {
            return None;
        }
        let range = if self.data_max > self.data_min {
            self.data_max - self.data_min
        } else {
            1.0
        };
        let clamped = value.clamp(self.window_min, self.window_max);
        Some((clamped - self.data_min) / range)
    }
}

/// Color (`rgb` per point) and alpha (one per point) buffers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shading {
    pub colors: Vec<f32>,
    pub alphas: Vec<f32>,
}

impl Shading {
    pub fn point_count(&self) -> usize {
        self.alphas.len()
    }
}

#[inline]
fn shade_point(value: f32, scale: &ColorScale, gradient: &Gradient, rgb: &mut [f32], alpha: &mut f32) {
    match scale.normalize(value) {
        Some(t) => {
            let color = gradient.blend(t);
            rgb[0] = color.r;
            rgb[1] = color.g;
            rgb[2] = color.b;
            *alpha = 1.0;
        }
        None => {
            rgb.fill(0.0);
            *alpha = 0.0;
        }
    }
}

/// Shade one value per point. Missing readings become fully transparent.
pub fn shade(values: &[f32], scale: &ColorScale, gradient: &Gradient) -> Shading {
    let mut colors = vec![0.0f32; values.len() * 3];
    let mut alphas = vec![0.0f32; values.len()];

    #[cfg(not(target_arch = "wasm32"))]
    {
        colors
            .par_chunks_mut(3)
            .zip(alphas.par_iter_mut())
            .zip(values.par_iter())
            .for_each(|((rgb, alpha), &value)| shade_point(value, scale, gradient, rgb, alpha));
    }

    #[cfg(target_arch = "wasm32")]
    {
        for ((rgb, alpha), &value) in colors
            .chunks_mut(3)
            .zip(alphas.iter_mut())
            .zip(values.iter())
        {
            shade_point(value, scale, gradient, rgb, alpha);
        }
    }

    Shading { colors, alphas }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shading::GradientScheme;

    #[test]
    fn test_normalize_spans_data() {
        let scale = ColorScale::from_values(&[10.0, f32::NAN, 30.0, 20.0]);
        assert_eq!(scale.data_extrema(), (10.0, 30.0));
        assert_eq!(scale.normalize(10.0), Some(0.0));
        assert_eq!(scale.normalize(20.0), Some(0.5));
        assert_eq!(scale.normalize(30.0), Some(1.0));
        assert_eq!(scale.normalize(f32::NAN), None);
    }

    #[test]
    fn test_window_clamps_without_rescaling() {
        let scale = ColorScale::new(0.0, 100.0).with_window(80.0, 20.0);
        assert_eq!(scale.window(), (20.0, 80.0));
        assert_eq!(scale.normalize(0.0), Some(0.2));
        assert_eq!(scale.normalize(50.0), Some(0.5));
        assert_eq!(scale.normalize(100.0), Some(0.8));
    }

    #[test]
    fn test_flat_data_uses_unit_range() {
        let scale = ColorScale::from_values(&[5.0, 5.0]);
        assert_eq!(scale.normalize(5.0), Some(0.0));
    }

    #[test]
    fn test_shade_missing_is_transparent() {
        let values = [0.0, f32::NAN, 1.0];
        let shading = shade(
            &values,
            &ColorScale::from_values(&values),
            &GradientScheme::BlueGreenRed.gradient(),
        );

        assert_eq!(shading.point_count(), 3);
        assert_eq!(shading.alphas, vec![1.0, 0.0, 1.0]);
        assert_eq!(&shading.colors[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(&shading.colors[3..6], &[0.0, 0.0, 0.0]);
        assert_eq!(&shading.colors[6..9], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shade_empty() {
        let shading = shade(&[], &ColorScale::new(0.0, 1.0), &Gradient::default());
        assert!(shading.colors.is_empty());
        assert!(shading.alphas.is_empty());
    }
}
