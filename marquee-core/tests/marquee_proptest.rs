//! Property tests for the marquee, compositor and tile mask.

use marquee_core::compositor::{blit, compose};
use marquee_core::config::RenderConfig;
use marquee_core::layout::PanelLayout;
use marquee_core::marquee::Marquee;
use marquee_core::PixelBuffer;
use marquee_protocol::{Bitmap, Color16, Direction};

fn direction(right: bool) -> Direction {
    if right {
        Direction::Right
    } else {
        Direction::Left
    }
}

proptest::proptest! {
    /// Successive heads stay exactly one spacing apart, so visible copies
    /// never leave a gap wider than bitmap width plus gap.
    #[test]
    fn heads_stay_evenly_spaced(
        canvas in 1usize..=256,
        width in 0u16..=64,
        gap in 0u16..=32,
        right in proptest::bool::ANY,
        ticks in 0u32..=600,
    ) {
        let mut marquee = Marquee::seed(canvas, width, gap, direction(right));
        marquee.advance_by(ticks);

        let mut heads = marquee.heads().to_vec();
        heads.sort_unstable();
        let spacing = marquee.spacing();
        assert!(spacing <= (width + gap).max(1) as i32);
        for pair in heads.windows(2) {
            assert_eq!(pair[1] - pair[0], spacing);
        }
    }

    /// No head is ever parked outside the canvas for good: after one full
    /// cycle of the head set, every head has been on screen or queued ahead.
    #[test]
    fn heads_never_stall(
        canvas in 1usize..=128,
        width in 1u16..=48,
        gap in 1u16..=16,
        right in proptest::bool::ANY,
        ticks in 0u32..=400,
    ) {
        let mut marquee = Marquee::seed(canvas, width, gap, direction(right));
        marquee.advance_by(ticks);

        let canvas = canvas as i32;
        let width = width as i32;
        let reach = marquee.heads().len() as i32 * marquee.spacing();
        for &head in marquee.heads() {
            // Not yet exited on the trailing side
            match direction(right) {
                Direction::Left => assert!(head + width > 0),
                Direction::Right => assert!(head < canvas),
            }
            // Never further from the canvas than the whole queue
            assert!(head > -reach - width && head < canvas + reach);
        }
    }

    /// An all-true mask leaves the frame alone; an all-false one blanks it.
    #[test]
    fn mask_extremes(rows in 1u8..=2, cols in 1u8..=4, raw in 0u16..=u16::MAX) {
        let mut layout = PanelLayout::new(8, 4, rows, cols).unwrap();
        let (w, h) = (layout.canvas_width(), layout.canvas_height());

        let mut frame = PixelBuffer::filled(w, h, Color16(raw));
        layout.apply_mask(&mut frame);
        assert!(frame.as_slice().iter().all(|&c| c == Color16(raw)));

        for index in 0..layout.tile_count() {
            layout.set_tile_active(index, false).unwrap();
        }
        layout.apply_mask(&mut frame);
        assert!(frame.as_slice().iter().all(|&c| c == Color16::BLACK));
    }

    /// A fully transparent bitmap composes to the background pass.
    #[test]
    fn zero_alpha_is_identity(
        bw in 1u16..=12,
        bh in 1u16..=8,
        bg in 0u16..=u16::MAX,
        fg in 0u16..=u16::MAX,
        offset_x in -16i16..=16,
    ) {
        let mut config = RenderConfig::default();
        config.background = Color16(bg);
        config.offset_x = offset_x;
        let count = bw as usize * bh as usize;
        let bitmap = Bitmap::new(bw, bh, vec![Color16(fg); count], Some(vec![0; count])).unwrap();

        let mut plain = PixelBuffer::filled(16, 8, Color16::BLACK);
        compose(&mut plain, &config, None, None, &[]);
        let mut blended = PixelBuffer::filled(16, 8, Color16::BLACK);
        compose(&mut blended, &config, None, Some(&bitmap), &[0, 7]);
        assert_eq!(plain, blended);
    }

    /// An opaque bitmap overwrites every in-bounds pixel of its footprint.
    #[test]
    fn opaque_blit_overwrites(x in -8i32..=20, y in -6i32..=10, fg in 0u16..=u16::MAX) {
        let mut frame = PixelBuffer::filled(16, 8, Color16(!fg));
        let bitmap = Bitmap::solid(5, 3, Color16(fg));
        blit(&mut frame, &bitmap, x, y);

        for py in 0..8i32 {
            for px in 0..16i32 {
                let inside = px >= x && px < x + 5 && py >= y && py < y + 3;
                let expected = if inside { Color16(fg) } else { Color16(!fg) };
                assert_eq!(frame.get(px as usize, py as usize), Some(expected));
            }
        }
    }
}
