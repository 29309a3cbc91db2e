use crate::layout::geometry::{FILLER_SLOT, SEGMENTS_PER_DIGIT};

/// Light levels for the segments of one digit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Glyph([f32; SEGMENTS_PER_DIGIT]);

impl Glyph {
    pub const BLANK: Glyph = Glyph([0.0; SEGMENTS_PER_DIGIT]);

    pub fn from_levels(mut levels: [f32; SEGMENTS_PER_DIGIT]) -> Self {
        levels[FILLER_SLOT] = 0.0;
        for level in &mut levels {
            *level = level.clamp(0.0, 1.0);
        }
        Self(levels)
    }

    /// Fully lit segments for every set bit; bit `n` is segment slot `n`.
    pub fn from_mask(mask: u16) -> Self {
        let mut levels = [0.0; SEGMENTS_PER_DIGIT];
        for (slot, level) in levels.iter_mut().enumerate().take(FILLER_SLOT) {
            if mask & (1 << slot) != 0 {
                *level = 1.0;
            }
        }
        Self(levels)
    }

    pub fn level(&self, slot: usize) -> f32 {
        self.0.get(slot).copied().unwrap_or(0.0)
    }

    pub fn levels(&self) -> &[f32; SEGMENTS_PER_DIGIT] {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|&level| level == 0.0)
    }

    /// Per-segment maximum of two glyphs.
    pub fn overlay(&self, other: &Glyph) -> Glyph {
        let mut levels = self.0;
        for (level, &top) in levels.iter_mut().zip(&other.0) {
            *level = level.max(top);
        }
        Glyph(levels)
    }
}

/// Glyph lookup service. One glyph per character, in order.
pub trait Font: Send + Sync {
    fn glyphs(&self, text: &str) -> Vec<Glyph>;
}

const A: u16 = 1 << 0;
const B: u16 = 1 << 1;
const C: u16 = 1 << 2;
const D: u16 = 1 << 3;
const E: u16 = 1 << 4;
const F: u16 = 1 << 5;
const G1: u16 = 1 << 6;
const G2: u16 = 1 << 7;
const H: u16 = 1 << 8;
const I: u16 = 1 << 9;
const J: u16 = 1 << 10;
const K: u16 = 1 << 11;
const L: u16 = 1 << 12;
const M: u16 = 1 << 13;
const DP: u16 = 1 << 14;

/// Built-in fourteen segment font with a decimal point. Lower case folds to upper
/// case; characters without a pattern render blank.
#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentFont;

impl SegmentFont {
    pub fn mask(ch: char) -> u16 {
        match ch.to_ascii_uppercase() {
            '0' => A | B | C | D | E | F | J | K,
            '1' => B | C | J,
            '2' => A | B | D | E | G1 | G2,
            '3' => A | B | C | D | G2,
            '4' => B | C | F | G1 | G2,
            '5' => A | C | D | F | G1 | G2,
            '6' => A | C | D | E | F | G1 | G2,
            '7' => A | B | C,
            '8' => A | B | C | D | E | F | G1 | G2,
            '9' => A | B | C | D | F | G1 | G2,
            'A' => A | B | C | E | F | G1 | G2,
            'B' => A | B | C | D | G2 | I | L,
            'C' => A | D | E | F,
            'D' => A | B | C | D | I | L,
            'E' => A | D | E | F | G1,
            'F' => A | E | F | G1,
            'G' => A | C | D | E | F | G2,
            'H' => B | C | E | F | G1 | G2,
            'I' => A | D | I | L,
            'J' => B | C | D | E,
            'K' => E | F | G1 | J | M,
            'L' => D | E | F,
            'M' => B | C | E | F | H | J,
            'N' => B | C | E | F | H | M,
            'O' => A | B | C | D | E | F,
            'P' => A | B | E | F | G1 | G2,
            'Q' => A | B | C | D | E | F | M,
            'R' => A | B | E | F | G1 | G2 | M,
            'S' => A | C | D | F | G1 | G2,
            'T' => A | I | L,
            'U' => B | C | D | E | F,
            'V' => E | F | J | K,
            'W' => B | C | E | F | K | M,
            'X' => H | J | K | M,
            'Y' => H | J | L,
            'Z' => A | D | J | K,
            '-' => G1 | G2,
            '_' => D,
            '.' => DP,
            ',' => K,
            '+' => G1 | G2 | I | L,
            '*' => G1 | G2 | H | I | J | K | L | M,
            '/' => J | K,
            '\\' => H | M,
            '=' => D | G1 | G2,
            '\'' => J,
            '"' => F | I,
            '!' => I | DP,
            '?' => A | B | G2 | L | DP,
            '(' | '<' => J | M,
            ')' | '>' => H | K,
            '[' => A | D | E | F,
            ']' => A | B | C | D,
            '#' => B | C | D | G1 | G2 | I | L,
            '$' => A | C | D | F | G1 | G2 | I | L,
            '%' => C | F | J | K,
            ':' => I | L,
            '@' => A | B | D | E | F | G2 | I,
            _ => 0,
        }
    }

    pub fn glyph(ch: char) -> Glyph {
        Glyph::from_mask(Self::mask(ch))
    }
}

impl Font for SegmentFont {
    fn glyphs(&self, text: &str) -> Vec<Glyph> {
        text.chars().map(Self::glyph).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_glyph_per_char() {
        let glyphs = SegmentFont.glyphs("héllo");
        assert_eq!(glyphs.len(), 5);
        assert!(glyphs[1].is_blank());
        assert_eq!(glyphs[0], SegmentFont::glyph('H'));
    }

    #[test]
    fn filler_never_lit() {
        let glyph = Glyph::from_mask(u16::MAX);
        assert_eq!(glyph.level(FILLER_SLOT), 0.0);
        assert_eq!(glyph.level(14), 1.0);

        let glyph = Glyph::from_levels([2.0; SEGMENTS_PER_DIGIT]);
        assert_eq!(glyph.level(FILLER_SLOT), 0.0);
        assert_eq!(glyph.level(0), 1.0);
    }

    #[test]
    fn every_hex_digit_has_a_pattern() {
        for ch in "0123456789ABCDEF".chars() {
            assert!(!SegmentFont::glyph(ch).is_blank(), "{ch} renders blank");
        }
        assert!(SegmentFont::glyph(' ').is_blank());
    }

    #[test]
    fn overlay_takes_brightest() {
        let a = SegmentFont::glyph('-');
        let b = SegmentFont::glyph('_');
        let both = a.overlay(&b);
        assert_eq!(both, SegmentFont::glyph('='));
    }
}
