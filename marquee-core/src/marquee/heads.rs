//! Marquee head scheduler
//!
//! A head is the X position of one copy of the bitmap. Copies sit exactly
//! `spacing = bitmap_width + gap` apart, so the text repeats seamlessly.
//! Heads move one pixel per tick; a head that has fully left the canvas is
//! moved to `spacing` beyond the trailing head, which keeps the set evenly
//! spaced forever.

use alloc::vec::Vec;

use marquee_protocol::Direction;

/// Fewest heads ever seeded
pub const MIN_HEADS: usize = 4;

/// Heads needed to cover `canvas_width + 2 * spacing`
pub fn head_count(canvas_width: usize, spacing: usize) -> usize {
    let spacing = spacing.max(1);
    (canvas_width + 2 * spacing).div_ceil(spacing).max(MIN_HEADS)
}

/// Scrolling head set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marquee {
    heads: Vec<i32>,
    canvas_width: i32,
    bitmap_width: i32,
    spacing: i32,
    direction: Direction,
    progress: u32,
}

impl Marquee {
    /// Seed heads just outside the leading edge
    ///
    /// Scrolling left, the first copy starts at the right edge of the canvas
    /// and the rest queue up behind it; scrolling right, the first copy ends
    /// at the left edge.
    pub fn seed(canvas_width: usize, bitmap_width: u16, gap: u16, direction: Direction) -> Self {
        let spacing = (bitmap_width as i32 + gap as i32).max(1);
        let count = head_count(canvas_width, spacing as usize);
        let canvas_width = canvas_width as i32;
        let bitmap_width = bitmap_width as i32;

        let heads = (0..count as i32)
            .map(|i| match direction {
                Direction::Left => canvas_width + i * spacing,
                Direction::Right => -bitmap_width - i * spacing,
            })
            .collect();

        Self {
            heads,
            canvas_width,
            bitmap_width,
            spacing,
            direction,
            progress: 0,
        }
    }

    /// Current head X positions (unordered)
    pub fn heads(&self) -> &[i32] {
        &self.heads
    }

    /// Distance between successive copies
    pub fn spacing(&self) -> i32 {
        self.spacing
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Pixels advanced since seeding, modulo spacing
    pub fn progress(&self) -> u32 {
        self.progress
    }

    fn has_exited(&self, head: i32) -> bool {
        match self.direction {
            Direction::Left => head + self.bitmap_width <= 0,
            Direction::Right => head >= self.canvas_width,
        }
    }

    fn trailing_head(&self) -> Option<i32> {
        match self.direction {
            Direction::Left => self.heads.iter().copied().max(),
            Direction::Right => self.heads.iter().copied().min(),
        }
    }

    /// Advance every head one pixel, then recycle the ones that left
    pub fn tick(&mut self) {
        let step = self.direction.step();
        for head in self.heads.iter_mut() {
            *head += step;
        }

        for i in 0..self.heads.len() {
            if !self.has_exited(self.heads[i]) {
                continue;
            }
            if let Some(trailing) = self.trailing_head() {
                self.heads[i] = trailing - step * self.spacing;
            }
        }

        self.progress = (self.progress + 1) % self.spacing as u32;
    }

    /// Run `steps` ticks
    pub fn advance_by(&mut self, steps: u32) {
        for _ in 0..steps {
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(marquee: &Marquee) -> Vec<i32> {
        let mut heads = marquee.heads().to_vec();
        heads.sort_unstable();
        heads
    }

    #[test]
    fn test_head_count() {
        assert_eq!(head_count(128, 45), 5);
        assert_eq!(head_count(128, 200), MIN_HEADS);
        assert_eq!(head_count(128, 1), 130);
        assert_eq!(head_count(128, 0), 130);
    }

    #[test]
    fn test_seed_left() {
        let marquee = Marquee::seed(128, 40, 5, Direction::Left);
        assert_eq!(marquee.spacing(), 45);
        assert_eq!(marquee.heads(), &[128, 173, 218, 263, 308]);
    }

    #[test]
    fn test_seed_right() {
        let marquee = Marquee::seed(128, 40, 5, Direction::Right);
        assert_eq!(marquee.heads(), &[-40, -85, -130, -175, -220]);
    }

    #[test]
    fn test_zero_width_spacing_floor() {
        let marquee = Marquee::seed(16, 0, 0, Direction::Left);
        assert_eq!(marquee.spacing(), 1);
    }

    #[test]
    fn test_first_recycle_left() {
        let mut marquee = Marquee::seed(128, 40, 5, Direction::Left);

        // 128 - 167 = -39: still one pixel on screen
        marquee.advance_by(167);
        assert!(marquee.heads().contains(&-39));

        // -40 + 40 <= 0: recycled behind the trailing head (308 - 168 = 140)
        marquee.tick();
        assert!(!marquee.heads().contains(&-40));
        assert_eq!(sorted(&marquee), [5, 50, 95, 140, 185]);
    }

    #[test]
    fn test_first_recycle_right() {
        let mut marquee = Marquee::seed(128, 40, 5, Direction::Right);

        // -40 + 168 = 128 = canvas width
        marquee.advance_by(168);
        assert!(!marquee.heads().contains(&128));
        assert_eq!(sorted(&marquee), [-97, -52, -7, 38, 83]);
    }

    #[test]
    fn test_spacing_stays_exact() {
        let mut marquee = Marquee::seed(64, 10, 3, Direction::Left);
        for _ in 0..1000 {
            marquee.tick();
            let heads = sorted(&marquee);
            for pair in heads.windows(2) {
                assert_eq!(pair[1] - pair[0], marquee.spacing());
            }
        }
    }

    #[test]
    fn test_progress_wraps() {
        let mut marquee = Marquee::seed(64, 3, 2, Direction::Left);
        marquee.advance_by(4);
        assert_eq!(marquee.progress(), 4);
        marquee.tick();
        assert_eq!(marquee.progress(), 0);
    }
}
