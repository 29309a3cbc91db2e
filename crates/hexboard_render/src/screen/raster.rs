use image::imageops::FilterType;
use image::DynamicImage;

use super::{Frame, Screen};
use crate::filter::gamma::GammaFilter;
use crate::layout::projection::Projection;
use crate::layout::Layout;
use crate::BoardError;

/// Shows 8-bit luma rasters by sampling them at every segment's projected position.
pub struct RasterScreen {
    projection: Projection,
    gamma: GammaFilter,
    raster: Vec<u8>,
}

impl RasterScreen {
    pub fn new(layout: &Layout, width: usize, height: usize, gamma: f32) -> Result<Self, BoardError> {
        let projection = layout.project(width, height)?;
        Ok(Self { projection, gamma: GammaFilter::new(gamma), raster: vec![0; width * height] })
    }

    pub fn width(&self) -> usize {
        self.projection.width()
    }

    pub fn height(&self) -> usize {
        self.projection.height()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Replace the raster with a raw row-major luma frame of exactly `width * height` bytes.
    pub fn set_frame(&mut self, luma: &[u8]) -> Result<(), BoardError> {
        if luma.len() != self.raster.len() {
            return Err(BoardError::RasterSize { expected: self.raster.len(), actual: luma.len() });
        }
        self.raster.copy_from_slice(luma);
        Ok(())
    }

    /// Resize any decoded image to the raster grid and take its luma.
    pub fn set_image(&mut self, image: &DynamicImage) {
        self.raster = luma_raster(image, self.width(), self.height());
    }

    pub fn clear(&mut self) {
        self.raster.fill(0);
    }
}

/// Row-major luma bytes of `image` scaled to exactly `width` x `height`.
pub fn luma_raster(image: &DynamicImage, width: usize, height: usize) -> Vec<u8> {
    let mut raster = image
        .resize_exact(width as u32, height as u32, FilterType::CatmullRom)
        .to_luma8()
        .into_raw();
    raster.resize(width * height, 0);
    raster
}

impl Screen for RasterScreen {
    fn segment_count(&self) -> usize {
        self.projection.len()
    }

    fn render(&mut self) -> Frame {
        let mut frame = vec![0.0; self.segment_count()];
        self.projection.sample(&self.raster, &mut frame, |v| self.gamma.map_u8(v));
        frame
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};

    use super::*;
    use crate::layout::geometry::FILLER_SLOT;

    #[test]
    fn white_raster_lights_every_real_segment() {
        let layout = Layout::default();
        let mut screen = RasterScreen::new(&layout, 64, 16, 1.0).unwrap();
        screen.set_frame(&[255; 64 * 16]).unwrap();

        let frame = screen.render();
        assert_eq!(frame.len(), layout.segment_count());
        for (index, value) in frame.iter().enumerate() {
            let expected = if index % 16 == FILLER_SLOT { 0.0 } else { 1.0 };
            assert_eq!(*value, expected, "segment {index}");
        }
    }

    #[test]
    fn wrong_sized_frame_is_rejected() {
        let layout = Layout::default();
        let mut screen = RasterScreen::new(&layout, 8, 8, 2.5).unwrap();
        assert!(screen.set_frame(&[0; 10]).is_err());
    }

    #[test]
    fn image_is_resized_to_grid() {
        let layout = Layout::default();
        let mut screen = RasterScreen::new(&layout, 32, 8, 1.0).unwrap();
        let image = GrayImage::from_pixel(100, 40, Luma([255]));
        screen.set_image(&DynamicImage::ImageLuma8(image));

        let frame = screen.render();
        assert!(frame[0] > 0.99);
        assert_eq!(frame[FILLER_SLOT], 0.0);

        screen.clear();
        assert!(screen.render().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn luma_raster_matches_grid() {
        let image = DynamicImage::new_rgb8(7, 3);
        let raster = luma_raster(&image, 5, 2);
        assert_eq!(raster, vec![0; 10]);
    }
}
