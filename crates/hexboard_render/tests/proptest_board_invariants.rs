//! Property tests for the board pipeline.
//!
//! 1. Raster projections stay inside the raster and never map filler slots.
//! 2. Gamma stays in `[0, 1]`, is monotonic, and bends the right way.
//! 3. After-glow fades a single pulse geometrically.
//! 4. Text writes never spill past the right edge or into other rows.

use std::sync::Arc;

use hexboard_render::{
    is_filler, AfterGlowFilter, Configuration, Filter, GammaFilter, Glyph, Layout, Orientation,
    Panel, SegmentFont, TextScreen,
};
use proptest::prelude::*;

fn panel_strategy() -> impl Strategy<Value = Panel> {
    (0usize..40, 0usize..8, any::<bool>()).prop_map(|(column, row, vertical)| {
        let orientation =
            if vertical { Orientation::Vertical } else { Orientation::Horizontal };
        Panel::new(column, row, orientation)
    })
}

fn layout_strategy() -> impl Strategy<Value = Layout> {
    prop::collection::vec(panel_strategy(), 1..5)
        .prop_map(|panels| Layout::new(Configuration::new(panels)))
}

proptest! {
    #[test]
    fn projection_stays_inside_raster(
        layout in layout_strategy(),
        width in 1usize..200,
        height in 1usize..200,
    ) {
        let projection = layout.project(width, height).unwrap();
        prop_assert_eq!(projection.len(), layout.segment_count());
        for (index, position) in projection.positions().iter().enumerate() {
            if is_filler(index) {
                prop_assert!(position.is_none(), "filler {} mapped", index);
            } else {
                let position = position.expect("segment without raster position");
                prop_assert!(position < width * height);
            }
        }
    }
}

proptest! {
    #[test]
    fn gamma_is_bounded_and_monotonic(
        gamma in 0.1f32..5.0,
        a in 0.0f32..=1.0,
        b in 0.0f32..=1.0,
    ) {
        let filter = GammaFilter::new(gamma);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let (mapped_low, mapped_high) = (filter.map(low), filter.map(high));

        prop_assert!((0.0..=1.0).contains(&mapped_low));
        prop_assert!((0.0..=1.0).contains(&mapped_high));
        prop_assert!(mapped_low <= mapped_high);

        if gamma > 1.0 {
            prop_assert!(mapped_low <= low + 1e-6);
        } else {
            prop_assert!(mapped_low >= low - 1e-6);
        }
    }
}

proptest! {
    #[test]
    fn afterglow_decays_geometrically(decay in 0.0f32..1.0, frames in 1usize..30) {
        let mut filter = AfterGlowFilter::new(decay);
        let mut frame = vec![1.0, 0.0];
        filter.apply(&mut frame);

        for step in 1..=frames {
            let mut frame = vec![0.0, 0.0];
            filter.apply(&mut frame);
            let expected = decay.powi(step as i32);
            prop_assert!((frame[0] - expected).abs() <= 1e-5, "step {}: {} != {}", step, frame[0], expected);
            prop_assert_eq!(frame[1], 0.0);
        }
    }
}

proptest! {
    #[test]
    fn text_is_clipped_at_right_edge(
        text in "[A-Z0-9 ]{0,80}",
        column in 0i32..32,
        row in 0i32..4,
    ) {
        let mut screen = TextScreen::new(Arc::new(Layout::default()));
        screen.write_at(&text, column, row);

        let chars: Vec<char> = text.chars().collect();
        for c in 0..32 {
            for r in 0..4 {
                let expected = match (c - column, r == row) {
                    (offset, true) if offset >= 0 && (offset as usize) < chars.len() => {
                        SegmentFont::glyph(chars[offset as usize])
                    },
                    _ => Glyph::BLANK,
                };
                prop_assert_eq!(screen.glyph_at(c, r), Some(expected));
            }
        }
        prop_assert_eq!(screen.glyph_at(32, row), None);
    }
}
