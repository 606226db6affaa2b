//! Canny edges for each scale-space level.

use image::{imageops, GrayImage};
use imageproc::edges::canny;
use log::debug;

use super::scale_space::GaussianStack;

/// Binary edge images aligned 1:1 with the scale space they came from.
#[derive(Debug, Clone, Default)]
pub struct EdgeStack {
    levels: Vec<GrayImage>,
}

impl EdgeStack {
    /// Run Canny on every level, stopping at the first level with no edge
    /// pixels. That level is discarded and `stack` is restricted to match.
    pub fn build(stack: &mut GaussianStack, low: f32, high: f32) -> Self {
        let mut levels = Vec::with_capacity(stack.height());
        for (i, level) in stack.levels().iter().enumerate() {
            let edges = detect_edges(&level.image, low, high);
            let count = edge_pixel_count(&edges);
            debug!("edge level {i} (sigma {:.2}): {count} edge pixels", level.sigma);
            if count == 0 {
                break;
            }
            levels.push(edges);
        }
        stack.restrict(levels.len());
        Self { levels }
    }

    pub fn height(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&GrayImage> {
        self.levels.get(index)
    }
}

/// Two-threshold Canny on the luma of an RGB image. Edge pixels are 255.
pub fn detect_edges(image: &image::RgbImage, low: f32, high: f32) -> GrayImage {
    let (w, h) = image.dimensions();
    // Sobel needs a 3x3 neighborhood.
    if w < 3 || h < 3 {
        return GrayImage::new(w, h);
    }
    canny(&imageops::grayscale(image), low, high)
}

pub fn edge_pixel_count(edges: &GrayImage) -> usize {
    edges.pixels().filter(|p| p[0] > 0).count()
}
