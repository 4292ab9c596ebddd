//! RGB frames.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::palette::Rgb;

/// Row-major RGB image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Frame {
    /// A `width × height` frame filled with `fill`.
    pub fn filled(width: usize, height: usize, fill: Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            pixels.extend_from_slice(&fill);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGB bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Colour at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// Set the colour at `(x, y)`; out-of-range writes are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: Rgb) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * 3;
            self.pixels[i..i + 3].copy_from_slice(&rgb);
        }
    }

    /// Copy `src` with its top-left corner at `(x0, y0)`, clipped.
    pub fn blit(&mut self, src: &Frame, x0: usize, y0: usize) {
        for y in 0..src.height.min(self.height.saturating_sub(y0)) {
            let w = src.width.min(self.width.saturating_sub(x0));
            let s = y * src.width * 3;
            let d = ((y0 + y) * self.width + x0) * 3;
            self.pixels[d..d + w * 3].copy_from_slice(&src.pixels[s..s + w * 3]);
        }
    }

    /// The `width × height` region at `(x0, y0)`, clipped to this frame.
    pub fn cropped(&self, x0: usize, y0: usize, width: usize, height: usize) -> Frame {
        let width = width.min(self.width.saturating_sub(x0));
        let height = height.min(self.height.saturating_sub(y0));
        let mut pixels = Vec::with_capacity(width * height * 3);
        for y in y0..y0 + height {
            let s = (y * self.width + x0) * 3;
            pixels.extend_from_slice(&self.pixels[s..s + width * 3]);
        }
        Frame {
            width,
            height,
            pixels,
        }
    }

    /// This frame turned half a revolution.
    pub fn rotated_180(&self) -> Frame {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for px in self.pixels.chunks_exact(3).rev() {
            pixels.extend_from_slice(px);
        }
        Frame {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// Encode as binary PPM (`P6`).
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        out.write_all(&self.pixels)
    }

    /// Write a binary PPM file at `path`.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_swaps_corners() {
        let mut f = Frame::filled(3, 2, [0, 0, 0]);
        f.set_pixel(0, 0, [1, 2, 3]);
        let r = f.rotated_180();
        assert_eq!(r.pixel(2, 1), Some([1, 2, 3]));
        assert_eq!(r.pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(r.rotated_180(), f);
    }

    #[test]
    fn blit_and_crop() {
        let mut f = Frame::filled(4, 4, [0, 0, 0]);
        f.blit(&Frame::filled(2, 2, [9, 9, 9]), 3, 3);
        assert_eq!(f.pixel(3, 3), Some([9, 9, 9]));
        assert_eq!(f.pixel(2, 3), Some([0, 0, 0]));
        let c = f.cropped(2, 2, 5, 5);
        assert_eq!((c.width(), c.height()), (2, 2));
        assert_eq!(c.pixel(1, 1), Some([9, 9, 9]));
    }

    #[test]
    fn ppm_layout() {
        let f = Frame::filled(2, 1, [255, 0, 7]);
        let mut buf = Vec::new();
        f.write_ppm(&mut buf).unwrap();
        let header = b"P6\n2 1\n255\n";
        assert_eq!(&buf[..header.len()], header);
        assert_eq!(&buf[header.len()..], &[255, 0, 7, 255, 0, 7]);
    }
}
