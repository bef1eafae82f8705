//! The analysis grid shared by every contour.

pub const FRAME_MS: usize = 25;
pub const HOP_MS: usize = 10;

/// Overlapping frame layout over one buffer. A trailing partial frame is
/// dropped rather than padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGrid {
    pub frame_len: usize,
    pub hop: usize,
    pub count: usize,
    sample_rate: u32,
}

impl FrameGrid {
    pub fn new(sample_count: usize, sample_rate: u32) -> Self {
        let frame_len = ((sample_rate as usize * FRAME_MS) / 1000).max(1);
        let hop = ((sample_rate as usize * HOP_MS) / 1000).max(1);
        let count = if sample_count < frame_len {
            0
        } else {
            (sample_count - frame_len) / hop + 1
        };
        Self {
            frame_len,
            hop,
            count,
            sample_rate,
        }
    }

    fn frame<'a>(&self, samples: &'a [f32], index: usize) -> Option<&'a [f32]> {
        let start = index * self.hop;
        samples.get(start..start + self.frame_len)
    }

    /// Frames in order; stops early if `samples` is shorter than the grid.
    pub fn frames<'a>(&self, samples: &'a [f32]) -> impl Iterator<Item = &'a [f32]> + 'a {
        let grid = *self;
        (0..grid.count).map_while(move |index| grid.frame(samples, index))
    }

    /// Start time of frame `index` in seconds.
    pub fn time_of(&self, index: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (index * self.hop) as f64 / self.sample_rate as f64
    }
}
