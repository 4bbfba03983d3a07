//! Breakpoints: half-open intervals over a source sequence.
//!
//! A breakpoint `[low, high)` selects the part of the source that a variant replaces.
//! The *low breakend* and the *high breakend* are the endpoints of the interval.
//! All coordinates are 0-based, and `high` may be equal to the length of the source.

use std::ops::Range;

//-----------------------------------------------------------------------------

/// A half-open interval `[low, high)` on a source sequence.
///
/// A breakpoint with `low == high` marks an insertion position.
///
/// # Examples
///
/// ```
/// use jst_base::Breakpoint;
///
/// let breakpoint = Breakpoint::new(2, 5).unwrap();
/// assert_eq!(breakpoint.span(), 3);
/// assert_eq!(breakpoint.slice(b"GATTACA").unwrap(), b"TTA");
///
/// let insertion = Breakpoint::insertion_at(3);
/// assert!(insertion.is_insertion());
/// assert_eq!(insertion.span(), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Breakpoint {
    low: usize,
    high: usize,
}

impl Breakpoint {
    /// Creates a new breakpoint, or fails if the low breakend is after the high breakend.
    pub fn new(low: usize, high: usize) -> Result<Self, String> {
        if low > high {
            return Err(format!("Breakpoint: low breakend {} is after high breakend {}", low, high));
        }
        Ok(Breakpoint { low, high })
    }

    /// Creates a breakpoint covering `span` positions starting from `low`.
    pub fn with_span(low: usize, span: usize) -> Self {
        Breakpoint { low, high: low + span }
    }

    /// Creates a zero-span breakpoint marking an insertion position.
    pub fn insertion_at(position: usize) -> Self {
        Breakpoint { low: position, high: position }
    }

    /// Returns the low breakend.
    #[inline]
    pub fn low_breakend(&self) -> usize {
        self.low
    }

    /// Returns the high breakend.
    #[inline]
    pub fn high_breakend(&self) -> usize {
        self.high
    }

    /// Returns the number of positions covered by the breakpoint.
    #[inline]
    pub fn span(&self) -> usize {
        self.high - self.low
    }

    /// Returns `true` if the breakpoint has a zero span.
    #[inline]
    pub fn is_insertion(&self) -> bool {
        self.low == self.high
    }

    /// Returns the covered interval as a range.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.low..self.high
    }

    /// Returns a zero-copy view of the covered part of the source.
    ///
    /// Fails if the high breakend is beyond the end of the source.
    pub fn slice<'a>(&self, source: &'a [u8]) -> Result<&'a [u8], String> {
        if self.high > source.len() {
            return Err(format!(
                "Breakpoint: high breakend {} is beyond the end of a source of length {}",
                self.high, source.len()
            ));
        }
        Ok(&source[self.low..self.high])
    }
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakends_and_span() {
        let breakpoint = Breakpoint::new(3, 7).unwrap();
        assert_eq!(breakpoint.low_breakend(), 3, "Wrong low breakend");
        assert_eq!(breakpoint.high_breakend(), 7, "Wrong high breakend");
        assert_eq!(breakpoint.span(), 4, "Wrong span");
        assert!(!breakpoint.is_insertion(), "A spanning breakpoint is not an insertion");
        assert_eq!(breakpoint.range(), 3..7, "Wrong range");
    }

    #[test]
    fn invalid_breakpoint() {
        assert!(Breakpoint::new(5, 4).is_err(), "Created a breakpoint with low > high");
    }

    #[test]
    fn insertion_position() {
        let breakpoint = Breakpoint::insertion_at(4);
        assert!(breakpoint.is_insertion(), "A zero-span breakpoint should be an insertion");
        assert_eq!(breakpoint.span(), 0, "Wrong span for an insertion");
    }

    #[test]
    fn slices() {
        let source = b"GATTACA";
        assert_eq!(Breakpoint::new(0, 0).unwrap().slice(source).unwrap(), b"", "Wrong empty slice");
        assert_eq!(Breakpoint::new(1, 4).unwrap().slice(source).unwrap(), b"ATT", "Wrong middle slice");
        assert_eq!(Breakpoint::new(0, 7).unwrap().slice(source).unwrap(), source.as_slice(), "Wrong full slice");
        assert_eq!(Breakpoint::new(7, 7).unwrap().slice(source).unwrap(), b"", "Wrong slice at the end");
        assert!(Breakpoint::new(5, 8).unwrap().slice(source).is_err(), "Sliced past the end of the source");
    }
}

//-----------------------------------------------------------------------------
