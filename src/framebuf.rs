use crate::types::*;

/// HDR output raster. Colors accumulate unclamped through the shading
/// pipeline; the single clamp happens in `mk_image`.
pub struct FrameBuf {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Colorf>,
}

impl FrameBuf {
    pub fn new(width: usize, height: usize) -> FrameBuf {
        FrameBuf { width, height, pixels: vec![Colorf::zero(); width * height] }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Colorf {
        self.pixels[x + self.width * y]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: Colorf) {
        self.pixels[x + self.width * y] = rgb;
    }

    /// Row-major pixel storage, for scanline-parallel writers: disjoint
    /// `width`-sized chunks are disjoint rows.
    pub fn pixels_mut(&mut self) -> &mut [Colorf] {
        &mut self.pixels
    }

    pub fn mk_image(&self) -> image::RgbImage {
        let mut buf = image::RgbImage::new(self.width as u32, self.height as u32);
        buf.enumerate_pixels_mut().for_each(|(x, y, p)| {
            let rgb = self.pixel(x as usize, y as usize);
            *p = image::Rgb([to_channel(rgb.x), to_channel(rgb.y), to_channel(rgb.z)]);
        });
        buf
    }
}

fn to_channel(v: Float) -> u8 {
    (num::clamp(v, 0.0, 1.0) * 255.99) as u8
}
