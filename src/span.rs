//! Vertical screen spans for one column.
//!
//! A span `(lo, hi)` covers integer rows `floor(lo)..floor(hi)`, so spans
//! that share an edge tile the column with no gap and no overlap.

use std::ops::Range;

use crate::geometry::clamp_ordered;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Span {
    pub lo: f32,
    pub hi: f32,
}

impl Span {
    /// Built from two edges given in either order.
    #[inline]
    pub fn between(a: f32, b: f32) -> Self {
        if a <= b { Self { lo: a, hi: b } } else { Self { lo: b, hi: a } }
    }

    /// Both edges clamped into the range spanned by `a` and `b`.
    #[inline]
    pub fn clamped(self, a: f32, b: f32) -> Self {
        Self::between(clamp_ordered(self.lo, a, b), clamp_ordered(self.hi, a, b))
    }

    #[inline]
    pub fn rows(self) -> Range<usize> {
        rows(self.lo, self.hi)
    }
}

#[inline]
pub fn rows(lo: f32, hi: f32) -> Range<usize> {
    let start = lo.max(0.0).floor() as usize;
    let end = hi.max(0.0).floor() as usize;
    start..end.max(start)
}

/// Open part of a column that farther geometry may still paint:
/// rows from `top` down to `bottom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub top: f32,
    pub bottom: f32,
}

impl Window {
    #[inline]
    pub fn full(height: usize) -> Self {
        Self {
            top: 0.0,
            bottom: height as f32,
        }
    }

    /// What stays open below a ceiling span and above a floor span.
    #[inline]
    pub fn between(ceiling: Span, floor: Span) -> Self {
        Self {
            top: ceiling.hi,
            bottom: floor.lo,
        }
    }

    #[inline]
    pub fn is_closed(self) -> bool {
        self.rows().is_empty()
    }

    #[inline]
    pub fn rows(self) -> Range<usize> {
        rows(self.top, self.bottom)
    }

    #[inline]
    pub fn contains(self, span: Span) -> bool {
        span.lo >= self.top && span.hi <= self.bottom
    }
}

/// What one hit committed in a column. Sprites use `window` to find the
/// part of the column nearer geometry left open at their depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpan {
    pub distance: f32,
    /// Open window this hit was clipped into.
    pub window: Window,
    pub floor: Span,
    pub ceiling: Span,
    pub culled: bool,
}
