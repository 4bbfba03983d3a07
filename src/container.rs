//! The binary container for a journaled sequence tree.
//!
//! The container stores, in order: a magic number and a version, the source
//! sequence, the domain size and the variant count, and the variants in
//! canonical order with their packed coverage bitmaps. Everything is encoded
//! as 8-byte elements through [`simple_sds::serialize`], so a collection can
//! be written with [`simple_sds::serialize::serialize_to`] and read back with
//! [`simple_sds::serialize::load_from`].
//!
//! The loader validates the structure instead of trusting it: the magic number
//! and the major version must match, the variants must be strictly increasing
//! in canonical order (which also rules out duplicates), no variant may reach
//! past the end of the source, and every coverage must have the stated domain
//! size.

use crate::breakpoint::Breakpoint;
use crate::coverage::Coverage;
use crate::jst::JournaledSequenceTree;
use crate::variants::{Variant, VariantStore};

use simple_sds::serialize::Serialize;

use std::cmp::Ordering;
use std::io;
use std::path::Path;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

// Magic number: "JSTBASE\0" as a little-endian integer.
const MAGIC: usize = 0x0045_5341_4254_534A;

// Container version. Major versions are incompatible.
const VERSION: usize = 1;

//-----------------------------------------------------------------------------

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

fn serialize_variant<T: io::Write>(variant: &Variant, writer: &mut T) -> io::Result<()> {
    variant.breakpoint().low_breakend().serialize(writer)?;
    variant.breakpoint().high_breakend().serialize(writer)?;
    variant.alt().to_vec().serialize(writer)?;
    variant.coverage().serialize(writer)
}

fn load_variant<T: io::Read>(reader: &mut T, domain_size: usize) -> io::Result<Variant> {
    let low = usize::load(reader)?;
    let high = usize::load(reader)?;
    let alt = Vec::<u8>::load(reader)?;
    let coverage = Coverage::load(reader)?;
    if coverage.domain_size() != domain_size {
        return Err(invalid_data(format!(
            "Container: coverage domain {} does not match the stated domain size {}",
            coverage.domain_size(), domain_size
        )));
    }
    let breakpoint = Breakpoint::new(low, high).map_err(invalid_data)?;
    Variant::new(breakpoint, alt, coverage).map_err(invalid_data)
}

fn variant_size_in_elements(variant: &Variant) -> usize {
    variant.breakpoint().low_breakend().size_in_elements()
        + variant.breakpoint().high_breakend().size_in_elements()
        + variant.alt().to_vec().size_in_elements()
        + variant.coverage().size_in_elements()
}

//-----------------------------------------------------------------------------

impl Serialize for JournaledSequenceTree {
    fn serialize_header<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        MAGIC.serialize(writer)?;
        VERSION.serialize(writer)
    }

    fn serialize_body<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        self.source().to_vec().serialize(writer)?;
        self.domain_size().serialize(writer)?;
        self.variant_count().serialize(writer)?;
        for variant in self.store().iter() {
            serialize_variant(variant, writer)?;
        }
        Ok(())
    }

    fn load<T: io::Read>(reader: &mut T) -> io::Result<Self> {
        let magic = usize::load(reader)?;
        if magic != MAGIC {
            return Err(invalid_data(format!("Container: invalid magic number {:#018x}", magic)));
        }
        let version = usize::load(reader)?;
        if version != VERSION {
            return Err(invalid_data(format!(
                "Container: unsupported version {} (expected {})", version, VERSION
            )));
        }

        let source = Vec::<u8>::load(reader)?;
        let domain_size = usize::load(reader)?;
        let variant_count = usize::load(reader)?;

        let mut store = VariantStore::new(domain_size);
        let mut previous: Option<Variant> = None;
        for index in 0..variant_count {
            let variant = load_variant(reader, domain_size)?;
            if variant.breakpoint().high_breakend() > source.len() {
                return Err(invalid_data(format!(
                    "Container: variant {} reaches past the end of a source of length {}",
                    index, source.len()
                )));
            }
            if let Some(previous) = &previous {
                if previous.canonical_cmp(&variant) != Ordering::Less {
                    return Err(invalid_data(format!(
                        "Container: variant {} is not in canonical order", index
                    )));
                }
            }
            store.insert(variant.clone()).map_err(invalid_data)?;
            previous = Some(variant);
        }

        JournaledSequenceTree::from_parts(source, store).map_err(invalid_data)
    }

    fn size_in_elements(&self) -> usize {
        let mut result = MAGIC.size_in_elements() + VERSION.size_in_elements();
        result += self.source().to_vec().size_in_elements();
        result += self.domain_size().size_in_elements();
        result += self.variant_count().size_in_elements();
        for variant in self.store().iter() {
            result += variant_size_in_elements(variant);
        }
        result
    }
}

//-----------------------------------------------------------------------------

impl JournaledSequenceTree {
    /// Writes the collection to the given file.
    pub fn save<P: AsRef<Path>>(&self, filename: P) -> Result<(), String> {
        simple_sds::serialize::serialize_to(self, filename).map_err(|x| x.to_string())
    }

    /// Reads a collection from the given file, validating the structure.
    pub fn load_from<P: AsRef<Path>>(filename: P) -> Result<Self, String> {
        simple_sds::serialize::load_from(filename).map_err(|x| x.to_string())
    }
}

//-----------------------------------------------------------------------------
