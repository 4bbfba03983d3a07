//! An inline sequence journal: one derived sequence as segments over a shared source.
//!
//! A [`Journal`] is an ordered list of non-overlapping segments that spell the
//! derived sequence when concatenated. The segments are zero-copy views into the
//! source sequence and into the literals of recorded edits. Edits are applied
//! inline with [`Journal::record`], so the journal always represents the current
//! state of the derived sequence rather than an edit history.
//!
//! The journal ends with a sentinel record: an empty segment positioned at the
//! length of the derived sequence. The sentinel keeps position updates and
//! upper-bound searches branch-free and is excluded from [`Journal::size`].

use std::ops::Range;


//-----------------------------------------------------------------------------

/// A segment of the derived sequence.
///
/// The position is the starting offset of the segment in the derived sequence,
/// which also serves as the search key within the journal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JournalRecord<'a> {
    position: usize,
    segment: &'a [u8],
}

impl<'a> JournalRecord<'a> {
    /// Returns the starting offset of the segment in the derived sequence.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the referenced segment.
    #[inline]
    pub fn segment(&self) -> &'a [u8] {
        self.segment
    }
}

//-----------------------------------------------------------------------------

/// A position inside a journal, stored as a record index and an offset within the record.
///
/// Breakends are plain indexes rather than references, so recording new edits
/// does not invalidate the journal itself; breakends taken before an edit are
/// stale after it and must be recomputed with [`Journal::breakend_at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Breakend {
    record: usize,
    offset: usize,
}

impl Breakend {
    /// Creates a breakend from a record index and an offset within the record.
    pub fn new(record: usize, offset: usize) -> Self {
        Breakend { record, offset }
    }

    /// Returns the record index.
    #[inline]
    pub fn record(&self) -> usize {
        self.record
    }

    /// Returns the offset within the record.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

//-----------------------------------------------------------------------------

/// An ordered, non-overlapping segmentation of a derived sequence over a shared source.
///
/// # Examples
///
/// ```
/// use jst_base::Journal;
///
/// let source = b"AAAAGGGG";
/// let mut journal = Journal::new(source);
/// assert_eq!(journal.to_vec(), source);
///
/// // Substitute position 4 with C.
/// let substitution = b"C";
/// journal.record_at(4..5, substitution).unwrap();
/// assert_eq!(journal.to_vec(), b"AAAACGGG");
///
/// // Insert TT at the beginning.
/// let insertion = b"TT";
/// journal.record_at(0..0, insertion).unwrap();
/// assert_eq!(journal.to_vec(), b"TTAAAACGGG");
/// assert_eq!(journal.derived_len(), 10);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Journal<'a> {
    source: &'a [u8],
    records: Vec<JournalRecord<'a>>,
}

impl<'a> Journal<'a> {
    /// Creates a journal that spells the source sequence unchanged.
    pub fn new(source: &'a [u8]) -> Self {
        let mut journal = Journal { source, records: Vec::new() };
        journal.initialize();
        journal
    }

    fn initialize(&mut self) {
        if !self.source.is_empty() {
            self.records.push(JournalRecord { position: 0, segment: self.source });
        }
        self.records.push(JournalRecord { position: self.source.len(), segment: &[] });
    }

    /// Returns the source sequence of the journal.
    #[inline]
    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// Returns the number of records, excluding the sentinel.
    #[inline]
    pub fn size(&self) -> usize {
        self.records.len() - 1
    }

    /// Returns `true` if the journal has no records other than the sentinel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the length of the derived sequence.
    #[inline]
    pub fn derived_len(&self) -> usize {
        self.records[self.records.len() - 1].position
    }

    /// Returns the record with the given index, including the sentinel.
    pub fn get(&self, index: usize) -> Option<&JournalRecord<'a>> {
        self.records.get(index)
    }

    /// Returns an iterator over the records, excluding the sentinel.
    pub fn iter(&self) -> impl Iterator<Item = &JournalRecord<'a>> {
        self.records[..self.records.len() - 1].iter()
    }

    /// Resets the journal to spell the source sequence unchanged.
    pub fn clear(&mut self) {
        self.records.clear();
        self.initialize();
    }

    /// Returns the derived sequence as a vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.derived_len());
        for record in self.iter() {
            result.extend_from_slice(record.segment());
        }
        result
    }

    //-------------------------------------------------------------------------

    /// Returns the index of the first record whose position is not less than the key.
    ///
    /// The key is a position in the derived sequence. The sentinel is excluded;
    /// the result is [`Journal::size`] if every record starts before the key.
    pub fn lower_bound(&self, key: usize) -> usize {
        self.records[..self.size()].partition_point(|record| record.position() < key)
    }

    /// Returns the index of the first record whose position is greater than the key.
    pub fn upper_bound(&self, key: usize) -> usize {
        self.records[..self.size()].partition_point(|record| record.position() <= key)
    }

    /// Returns the index of the record that contains the key.
    ///
    /// This is the last record starting at or before the key.
    /// Returns [`Journal::size`] if the key is at or beyond the end of the derived sequence.
    pub fn find(&self, key: usize) -> usize {
        if key >= self.derived_len() {
            return self.size();
        }
        self.upper_bound(key) - 1
    }

    /// Returns the breakend at the given position of the derived sequence.
    ///
    /// Positions at or beyond the end map to the sentinel.
    pub fn breakend_at(&self, position: usize) -> Breakend {
        if position >= self.derived_len() {
            return Breakend::new(self.records.len() - 1, 0);
        }
        let record = self.find(position);
        Breakend::new(record, position - self.records[record].position())
    }

    /// Converts a breakend to a position in the derived sequence.
    ///
    /// Fails if the breakend does not point inside this journal.
    pub fn offset_of(&self, breakend: Breakend) -> Result<usize, String> {
        self.check_breakend(breakend)?;
        Ok(self.records[breakend.record()].position() + breakend.offset())
    }

    /// Returns the signed distance from the first breakend to the second.
    pub fn distance(&self, from: Breakend, to: Breakend) -> Result<isize, String> {
        let from_offset = self.offset_of(from)? as isize;
        let to_offset = self.offset_of(to)? as isize;
        Ok(to_offset - from_offset)
    }

    fn check_breakend(&self, breakend: Breakend) -> Result<(), String> {
        if breakend.record() >= self.records.len() {
            return Err(format!(
                "Journal: breakend record {} is out of range for {} records",
                breakend.record(), self.records.len()
            ));
        }
        if breakend.offset() > self.records[breakend.record()].segment().len() {
            return Err(format!(
                "Journal: breakend offset {} is out of range for a segment of length {}",
                breakend.offset(), self.records[breakend.record()].segment().len()
            ));
        }
        Ok(())
    }

    // Moves a breakend at the end of a record to the beginning of the next one.
    // Afterwards the offset is inside the segment, except at the sentinel.
    fn canonicalize(&self, breakend: Breakend) -> Breakend {
        let mut breakend = breakend;
        while breakend.record() + 1 < self.records.len()
            && breakend.offset() == self.records[breakend.record()].segment().len()
        {
            breakend = Breakend::new(breakend.record() + 1, 0);
        }
        breakend
    }

    //-------------------------------------------------------------------------

    /// Records an edit at the breakpoint given as a pair of breakends.
    ///
    /// The interval between the breakends is replaced by the literal, which may
    /// be empty for a deletion. A zero-length interval with an empty literal is
    /// rejected before any mutation. The positions of the remaining records and
    /// the sentinel are updated to match the new derived sequence.
    ///
    /// Returns the index of the first record not before the recorded region:
    /// the record holding the literal, or the record after the erased interval
    /// for a deletion.
    pub fn record(&mut self, low: Breakend, high: Breakend, alt: &'a [u8]) -> Result<usize, String> {
        self.check_breakend(low)?;
        self.check_breakend(high)?;
        let low = self.canonicalize(low);
        let high = self.canonicalize(high);
        let low_offset = self.records[low.record()].position() + low.offset();
        let high_offset = self.records[high.record()].position() + high.offset();
        if high_offset < low_offset {
            return Err(format!(
                "Journal: high breakend {} is before low breakend {}",
                high_offset, low_offset
            ));
        }
        let deleted = high_offset - low_offset;
        let inserted = alt.len();
        if deleted == 0 && inserted == 0 {
            return Err(String::from("Journal: an empty edit is not allowed"));
        }

        // Prepare the new records first, then commit by splicing.
        let mut entries: Vec<JournalRecord<'a>> = Vec::with_capacity(2);
        let low_segment = self.records[low.record()].segment();
        if low.offset() > 0 {
            entries.push(JournalRecord {
                position: self.records[low.record()].position(),
                segment: &low_segment[..low.offset()],
            });
        }
        if inserted > 0 {
            entries.push(JournalRecord { position: low_offset, segment: alt });
        }
        let high_suffix = JournalRecord {
            position: self.records[high.record()].position() + high.offset(),
            segment: &self.records[high.record()].segment()[high.offset()..],
        };

        let inserted_count = entries.len();
        self.records[high.record()] = high_suffix;
        self.records.splice(low.record()..high.record(), entries);

        // Update the positions of the remaining records, including the sentinel.
        let delta = inserted as isize - deleted as isize;
        if delta != 0 {
            for record in self.records[low.record() + inserted_count..].iter_mut() {
                record.position = (record.position as isize + delta) as usize;
            }
        }

        debug_assert!(self.check_invariants(), "Journal: invariants violated after an edit");

        Ok(low.record() + inserted_count - usize::from(inserted > 0))
    }

    /// Records an edit over the given interval of the derived sequence.
    ///
    /// This is a convenience wrapper over [`Journal::record`].
    pub fn record_at(&mut self, interval: Range<usize>, alt: &'a [u8]) -> Result<usize, String> {
        if interval.start > interval.end {
            return Err(format!("Journal: invalid interval {}..{}", interval.start, interval.end));
        }
        if interval.end > self.derived_len() {
            return Err(format!(
                "Journal: interval {}..{} is out of range for a derived sequence of length {}",
                interval.start, interval.end, self.derived_len()
            ));
        }
        let low = self.breakend_at(interval.start);
        let high = self.breakend_at(interval.end);
        self.record(low, high, alt)
    }

    // Checks that the positions are adjacent, the first record starts at 0, the
    // journal ends with the sentinel, and no two adjacent records are empty.
    fn check_invariants(&self) -> bool {
        if self.records.is_empty() || self.records[0].position() != 0 {
            return false;
        }
        if !self.records[self.records.len() - 1].segment().is_empty() {
            return false;
        }
        for index in 0..self.records.len() - 1 {
            let record = &self.records[index];
            let next = &self.records[index + 1];
            if record.position() + record.segment().len() != next.position() {
                return false;
            }
            if record.segment().is_empty() && next.segment().is_empty() {
                return false;
            }
        }
        true
    }
}

//-----------------------------------------------------------------------------
