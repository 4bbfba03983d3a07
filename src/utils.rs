//! Utility functions for the command line tools.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

//-----------------------------------------------------------------------------

// Input files.

// Gzip files start with these two bytes.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Opens a text input file for buffered reading, decompressing gzip on the fly.
///
/// Gzip input is recognized from the magic bytes at the start of the file, not
/// from the file name. Peeking at the buffer does not consume anything, so the
/// decoder sees the whole stream.
pub fn open_text<P: AsRef<Path>>(filename: P) -> Result<Box<dyn BufRead>, String> {
    let path = filename.as_ref();
    let mut reader = BufReader::new(File::open(path).map_err(
        |err| format!("Failed to open {}: {}", path.display(), err)
    )?);
    let start = reader.fill_buf().map_err(
        |err| format!("Failed to read {}: {}", path.display(), err)
    )?;
    if start.starts_with(&GZIP_MAGIC) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Reads a sequence from FASTA-like text: header lines start with `>` and are
/// skipped, and the remaining lines are concatenated without the newlines.
pub fn read_sequence<T: BufRead>(reader: &mut T) -> Result<Vec<u8>, String> {
    let mut result: Vec<u8> = Vec::new();
    loop {
        let mut buf: Vec<u8> = Vec::new();
        let len = reader.read_until(b'\n', &mut buf).map_err(|x| x.to_string())?;
        if len == 0 {
            break;
        }
        while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
            buf.pop();
        }
        if buf.first() == Some(&b'>') || buf.is_empty() {
            continue;
        }
        result.extend_from_slice(&buf);
    }
    Ok(result)
}

//-----------------------------------------------------------------------------

// Output statistics.

/// Returns the size of the file in a human-readable form, or `unknown` if the
/// file cannot be inspected.
pub fn file_size_display<P: AsRef<Path>>(filename: P) -> String {
    let Ok(metadata) = fs::metadata(filename) else {
        return String::from("unknown");
    };
    let mut value = metadata.len() as f64;
    let mut unit = "B";
    for larger in ["KiB", "MiB", "GiB", "TiB"] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = larger;
    }
    format!("{:.1} {}", value, unit)
}

//-----------------------------------------------------------------------------


//-----------------------------------------------------------------------------
