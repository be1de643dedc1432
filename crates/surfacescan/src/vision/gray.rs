use image::RgbaImage;

/// Floating-point luminance plane of a video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayFrame {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl GrayFrame {
    /// Convert with the 0.299 / 0.587 / 0.114 luminance weights; alpha is ignored.
    pub fn from_rgba(frame: &RgbaImage) -> Self {
        let (width, height) = frame.dimensions();
        let data = frame
            .pixels()
            .map(|p| 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Build from a row-major luminance buffer. Returns `None` on size mismatch.
    pub fn from_raw(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Luminance at `(x, y)`. Callers keep coordinates in bounds.
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }
}
