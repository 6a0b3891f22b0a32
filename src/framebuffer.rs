/// Row-major grid of packed `0x00RRGGBB` pixels handed to presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Reallocate only when the size actually changes.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width * height];
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Copy of column `x`, top to bottom.
    pub fn column(&self, x: usize) -> Vec<u32> {
        (0..self.height)
            .filter_map(|y| self.pixel(x, y))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn pixel_access_is_bounds_checked() {
        let mut fb = Framebuffer::new(3, 2);
        fb.pixels_mut()[1 * 3 + 2] = 9;
        assert_eq!(fb.pixel(2, 1), Some(9));
        assert_eq!(fb.pixel(3, 0), None);
        assert_eq!(fb.pixel(0, 2), None);
        assert_eq!(fb.column(2), vec![0, 9]);
    }

    #[test]
    fn resize_keeps_buffer_when_size_matches() {
        let mut fb = Framebuffer::new(2, 2);
        fb.pixels_mut().fill(5);
        fb.resize(2, 2);
        assert!(fb.pixels().iter().all(|&p| p == 5));
        fb.resize(4, 1);
        assert_eq!(fb.pixels().len(), 4);
        assert!(fb.pixels().iter().all(|&p| p == 0));
    }
}
