#![forbid(unsafe_code)]

//! Array-style index expressions for one grid axis.
//!
//! An [`Axis`] is either a fixed coordinate or a [`SliceSpec`]. Slices are
//! resolved against the axis length into a [`Positions`] iterator that only
//! ever yields in-range coordinates:
//!
//! - Missing `start` is 0, missing `stop` is the axis length, missing `step`
//!   is 1. A step of 0 is rejected.
//! - Negative `start`/`stop` have the axis length added once.
//! - Positive steps walk from `max(start, 0)` while below `min(len, stop)`.
//! - Negative steps walk down from `min(stop, len) - 1` while the cursor is
//!   `>= 0`; `start` does not bound a reverse walk.
//!
//! ```
//! use termpix_render::slice::SliceSpec;
//!
//! let cols: Vec<_> = SliceSpec::from(2..8).with_step(3).resolve(10).unwrap().collect();
//! assert_eq!(cols, [2, 5]);
//!
//! let reversed: Vec<_> = SliceSpec::FULL.with_step(-4).resolve(10).unwrap().collect();
//! assert_eq!(reversed, [9, 5, 1]);
//! ```

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

use crate::grid::GridError;

/// `start:stop:step` with each part optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceSpec {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}

impl SliceSpec {
    /// Every position in order.
    pub const FULL: Self = Self {
        start: None,
        stop: None,
        step: None,
    };

    #[must_use]
    pub const fn new(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Self {
        Self { start, stop, step }
    }

    #[must_use]
    pub const fn with_step(mut self, step: isize) -> Self {
        self.step = Some(step);
        self
    }

    /// Resolve against an axis of length `len`.
    ///
    /// # Errors
    ///
    /// [`GridError::ZeroStep`] if the step is 0.
    pub fn resolve(&self, len: u16) -> Result<Positions, GridError> {
        let len = len as isize;
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(GridError::ZeroStep);
        }
        let normalize = |v: isize| if v < 0 { v + len } else { v };
        let start = normalize(self.start.unwrap_or(0));
        let stop = normalize(self.stop.unwrap_or(len));

        Ok(if step > 0 {
            Positions {
                next: start.max(0),
                end: stop.min(len),
                step,
            }
        } else {
            Positions {
                next: stop.min(len).saturating_sub(1),
                end: -1,
                step,
            }
        })
    }
}

impl From<RangeFull> for SliceSpec {
    fn from(_: RangeFull) -> Self {
        Self::FULL
    }
}

macro_rules! slice_from_ranges {
    ($($int:ty),+) => {$(
        impl From<Range<$int>> for SliceSpec {
            fn from(r: Range<$int>) -> Self {
                Self::new(Some(r.start as isize), Some(r.end as isize), None)
            }
        }

        impl From<RangeFrom<$int>> for SliceSpec {
            fn from(r: RangeFrom<$int>) -> Self {
                Self::new(Some(r.start as isize), None, None)
            }
        }

        impl From<RangeTo<$int>> for SliceSpec {
            fn from(r: RangeTo<$int>) -> Self {
                Self::new(None, Some(r.end as isize), None)
            }
        }

        impl From<RangeInclusive<$int>> for SliceSpec {
            fn from(r: RangeInclusive<$int>) -> Self {
                let (start, end) = r.into_inner();
                Self::new(Some(start as isize), Some((end as isize).saturating_add(1)), None)
            }
        }

        impl From<$int> for Axis {
            fn from(i: $int) -> Self {
                Axis::At(i as isize)
            }
        }
    )+};
}

slice_from_ranges!(i32, i64, isize, u16);

/// One axis of an index expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// A single coordinate; negative values count from the end.
    At(isize),
    Slice(SliceSpec),
}

impl From<SliceSpec> for Axis {
    fn from(spec: SliceSpec) -> Self {
        Axis::Slice(spec)
    }
}

macro_rules! axis_from_slices {
    ($($range:ty),+) => {$(
        impl From<$range> for Axis {
            fn from(r: $range) -> Self {
                Axis::Slice(SliceSpec::from(r))
            }
        }
    )+};
}

axis_from_slices!(
    RangeFull,
    Range<i32>,
    RangeFrom<i32>,
    RangeTo<i32>,
    RangeInclusive<i32>,
    Range<isize>,
    RangeFrom<isize>,
    RangeTo<isize>,
    RangeInclusive<isize>,
    Range<i64>,
    RangeFrom<i64>,
    RangeTo<i64>,
    RangeInclusive<i64>,
    Range<u16>,
    RangeFrom<u16>,
    RangeTo<u16>,
    RangeInclusive<u16>
);

/// Coordinates selected by a resolved slice, each in `0..len`.
#[derive(Debug, Clone)]
pub struct Positions {
    next: isize,
    end: isize,
    step: isize,
}

impl Iterator for Positions {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let in_range = if self.step > 0 {
            self.next < self.end
        } else {
            self.next > self.end
        };
        if !in_range {
            return None;
        }
        let current = self.next;
        // Overflow only past the end; park the cursor there.
        self.next = current.checked_add(self.step).unwrap_or(self.end);
        u16::try_from(current).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let span = if self.step > 0 {
            self.end.saturating_sub(self.next)
        } else {
            self.next.saturating_sub(self.end)
        };
        if span <= 0 {
            return (0, Some(0));
        }
        let n = (span.unsigned_abs()).div_ceil(self.step.unsigned_abs());
        (n, Some(n))
    }
}
