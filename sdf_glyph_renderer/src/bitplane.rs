/// A dense 1-bit coverage grid, packed 8 pixels per byte with the most significant bit first.
///
/// Reads outside the grid return `false` (background), which lets distance searches run off the
/// edge without special casing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageBitplane {
    width: usize,
    height: usize,
    pitch: usize,
    data: Vec<u8>,
}

impl CoverageBitplane {
    #[must_use]
    pub fn new(width: usize, height: usize) -> CoverageBitplane {
        let pitch = (width + 7) >> 3;
        CoverageBitplane {
            width,
            height,
            pitch,
            data: vec![0; pitch * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sets the bit at `(x, y)`. Coordinates outside the grid are ignored.
    pub fn set(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.data[y * self.pitch + (x >> 3)] |= 0x80 >> (x & 7);
        }
    }

    /// Sets every bit in `x0..=x1` on row `y`.
    pub fn fill_span(&mut self, y: usize, x0: usize, x1: usize) {
        for x in x0..=x1 {
            self.set(x, y);
        }
    }

    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        self.data[y * self.pitch + (x >> 3)] & (0x80 >> (x & 7)) != 0
    }

    /// The number of set bits, mostly useful for diagnostics.
    pub fn count_set(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}
