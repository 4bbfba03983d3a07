//! Coverage bitmaps over a fixed domain of sequences.
//!
//! A [`Coverage`] tells which sequences in a collection of `N` derived sequences
//! carry a variant or reach a node during traversal.
//! All set operations are word-parallel and require that both operands have the same domain size.
//! Operations between bitmaps with different domain sizes fail instead of silently truncating.

use simple_sds::serialize::Serialize;

use std::io;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

// Number of bits in a word.
const WORD_BITS: usize = 64;

// Number of words needed for the given number of bits.
fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

//-----------------------------------------------------------------------------

/// A fixed-size bitmap with one bit per derived sequence.
///
/// The domain size is set at construction time and never changes.
/// Bits above the domain size are always zero, which makes equality and
/// population counts independent of the word padding.
///
/// # Examples
///
/// ```
/// use jst_base::Coverage;
///
/// let mut first = Coverage::new(4);
/// first.set_bit(0, true);
/// first.set_bit(2, true);
/// let mut second = Coverage::new(4);
/// second.set_bit(2, true);
/// second.set_bit(3, true);
///
/// let intersection = first.intersection(&second).unwrap();
/// assert_eq!(intersection.count_ones(), 1);
/// assert!(intersection.bit(2));
///
/// let union = first.union(&second).unwrap();
/// assert_eq!(union.count_ones(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coverage {
    len: usize,
    words: Vec<u64>,
}

impl Coverage {
    /// Creates an empty coverage over a domain of the given size.
    pub fn new(domain_size: usize) -> Self {
        Coverage {
            len: domain_size,
            words: vec![0; words_for(domain_size)],
        }
    }

    /// Creates a coverage with every bit set.
    pub fn filled(domain_size: usize) -> Self {
        let mut result = Coverage {
            len: domain_size,
            words: vec![!0u64; words_for(domain_size)],
        };
        result.mask_tail();
        result
    }

    /// Creates a coverage from the given bits.
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut result = Coverage::new(bits.len());
        for (index, value) in bits.iter().enumerate() {
            if *value {
                result.set_bit(index, true);
            }
        }
        result
    }

    /// Returns the domain size of the coverage.
    #[inline]
    pub fn domain_size(&self) -> usize {
        self.len
    }

    /// Returns the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the domain size.
    #[inline]
    pub fn bit(&self, index: usize) -> bool {
        assert!(index < self.len, "Coverage: bit index {} is out of range for domain size {}", index, self.len);
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
    }

    /// Sets the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the domain size.
    #[inline]
    pub fn set_bit(&mut self, index: usize, value: bool) {
        assert!(index < self.len, "Coverage: bit index {} is out of range for domain size {}", index, self.len);
        if value {
            self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        } else {
            self.words[index / WORD_BITS] &= !(1 << (index % WORD_BITS));
        }
    }

    /// Returns `true` if at least one bit is set.
    pub fn any(&self) -> bool {
        self.words.iter().any(|word| *word != 0)
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Returns an iterator over the indexes of the set bits in increasing order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |index| self.bit(*index))
    }

    /// Returns the intersection of the two coverages, or an error on domain mismatch.
    pub fn intersection(&self, other: &Coverage) -> Result<Coverage, String> {
        self.check_domain(other)?;
        let mut result = self.clone();
        result.and_assign(other);
        Ok(result)
    }

    /// Returns the set difference `self \ other`, or an error on domain mismatch.
    pub fn difference(&self, other: &Coverage) -> Result<Coverage, String> {
        self.check_domain(other)?;
        let mut result = self.clone();
        result.and_not_assign(other);
        Ok(result)
    }

    /// Returns the union of the two coverages, or an error on domain mismatch.
    pub fn union(&self, other: &Coverage) -> Result<Coverage, String> {
        self.check_domain(other)?;
        let mut result = self.clone();
        result.or_assign(other);
        Ok(result)
    }

    /// Returns the complement of the coverage within its domain.
    pub fn complement(&self) -> Coverage {
        let mut result = Coverage {
            len: self.len,
            words: self.words.iter().map(|word| !word).collect(),
        };
        result.mask_tail();
        result
    }

    // In-place intersection. The caller guarantees matching domains.
    pub(crate) fn and_assign(&mut self, other: &Coverage) {
        debug_assert_eq!(self.len, other.len, "Coverage: domain mismatch in and_assign");
        for (word, other_word) in self.words.iter_mut().zip(other.words.iter()) {
            *word &= other_word;
        }
    }

    // In-place difference. The caller guarantees matching domains.
    pub(crate) fn and_not_assign(&mut self, other: &Coverage) {
        debug_assert_eq!(self.len, other.len, "Coverage: domain mismatch in and_not_assign");
        for (word, other_word) in self.words.iter_mut().zip(other.words.iter()) {
            *word &= !other_word;
        }
    }

    // In-place union. The caller guarantees matching domains.
    pub(crate) fn or_assign(&mut self, other: &Coverage) {
        debug_assert_eq!(self.len, other.len, "Coverage: domain mismatch in or_assign");
        for (word, other_word) in self.words.iter_mut().zip(other.words.iter()) {
            *word |= other_word;
        }
    }

    fn check_domain(&self, other: &Coverage) -> Result<(), String> {
        if self.len != other.len {
            return Err(format!("Coverage: domain mismatch ({} vs {})", self.len, other.len));
        }
        Ok(())
    }

    // Clears the padding bits in the last word.
    fn mask_tail(&mut self) {
        let tail = self.len % WORD_BITS;
        if tail > 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }
}

//-----------------------------------------------------------------------------

impl Serialize for Coverage {
    fn serialize_header<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        self.len.serialize(writer)
    }

    fn serialize_body<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        self.words.serialize(writer)
    }

    fn load<T: io::Read>(reader: &mut T) -> io::Result<Self> {
        let len = usize::load(reader)?;
        let words = Vec::<u64>::load(reader)?;
        if words.len() != words_for(len) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Coverage: expected {} words for domain size {}, got {}", words_for(len), len, words.len())
            ));
        }
        let mut result = Coverage { len, words };
        let mut masked = result.clone();
        masked.mask_tail();
        if masked != result {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "Coverage: padding bits are not zero"));
        }
        result.mask_tail();
        Ok(result)
    }

    fn size_in_elements(&self) -> usize {
        self.len.size_in_elements() + self.words.size_in_elements()
    }
}

//-----------------------------------------------------------------------------
