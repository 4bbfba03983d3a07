use std::path::PathBuf;
use std::time::Instant;
use std::{env, fs, process};

use jst_base::{Breakpoint, Coverage, JournaledSequenceTree, Variant};
use jst_base::utils;

use getopts::Options;

//-----------------------------------------------------------------------------

// Builds a JST container from a reference sequence and a variant table.
//
// The reference is FASTA-like text. The variant table has one variant per
// line: position, kind (ins/del/sub), the literal (or the deleted length for
// del), and the coverage as a bit string, separated by whitespace. Lines
// starting with # are ignored.

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    let config = Config::new();

    if config.output_file.exists() {
        if config.overwrite {
            if !config.quiet {
                eprintln!("Overwriting container {}", config.output_file.display());
            }
            fs::remove_file(&config.output_file).map_err(|x| x.to_string())?;
        } else {
            return Err(format!("Container {} already exists", config.output_file.display()));
        }
    }

    // Read the reference.
    let mut reader = utils::open_text(&config.reference_file)?;
    let reference = utils::read_sequence(&mut reader)?;
    if config.verbose {
        eprintln!("Read a reference of {} symbols", reference.len());
    }

    // Read the variants and build the collection.
    let mut reader = utils::open_text(&config.variant_file)?;
    let mut jst: Option<JournaledSequenceTree> = None;
    let mut line_num = 0;
    loop {
        let mut buf = String::new();
        let len = std::io::BufRead::read_line(&mut reader, &mut buf).map_err(|x| x.to_string())?;
        if len == 0 {
            break;
        }
        line_num += 1;
        let line = buf.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let variant = parse_variant(line).map_err(|x| format!("Line {}: {}", line_num, x))?;
        let jst = jst.get_or_insert_with(|| {
            JournaledSequenceTree::new(reference.clone(), variant.coverage().domain_size())
        });
        jst.insert(variant).map_err(|x| format!("Line {}: {}", line_num, x))?;
    }
    let jst = jst.unwrap_or_else(|| JournaledSequenceTree::new(reference, 0));

    if config.verbose {
        eprintln!("Built a collection of {} sequences with {} variants",
            jst.domain_size(), jst.variant_count()
        );
    }

    jst.save(&config.output_file)?;

    if !config.quiet {
        eprintln!("Final container size: {}", utils::file_size_display(&config.output_file));
        let end_time = Instant::now();
        let seconds = end_time.duration_since(start_time).as_secs_f64();
        eprintln!("Used {:.3} seconds", seconds);
    }

    Ok(())
}

//-----------------------------------------------------------------------------

fn parse_variant(line: &str) -> Result<Variant, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(format!("Expected 4 fields, got {}", fields.len()));
    }
    let position: usize = fields[0].parse().map_err(|_| format!("Invalid position {}", fields[0]))?;

    let (breakpoint, alt) = match fields[1] {
        "ins" => (Breakpoint::insertion_at(position), fields[2].as_bytes().to_vec()),
        "del" => {
            let span: usize = fields[2].parse().map_err(|_| format!("Invalid deletion length {}", fields[2]))?;
            (Breakpoint::with_span(position, span), Vec::new())
        }
        "sub" => (Breakpoint::with_span(position, fields[2].len()), fields[2].as_bytes().to_vec()),
        _ => return Err(format!("Invalid variant kind {}", fields[1])),
    };

    let mut coverage = Coverage::new(fields[3].len());
    for (index, symbol) in fields[3].bytes().enumerate() {
        match symbol {
            b'1' => coverage.set_bit(index, true),
            b'0' => (),
            _ => return Err(format!("Invalid coverage string {}", fields[3])),
        }
    }

    Variant::new(breakpoint, alt, coverage)
}

//-----------------------------------------------------------------------------

struct Config {
    pub reference_file: PathBuf,
    pub variant_file: PathBuf,
    pub output_file: PathBuf,
    pub overwrite: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output file name (default: <reference>.jst)", "FILE");
        opts.optflag("", "overwrite", "overwrite the output file if it exists");
        opts.optflag("q", "quiet", "do not print statistics");
        opts.optflag("v", "verbose", "print progress information");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        let header = format!("Usage: {} [options] reference.fa variants.tsv", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }
        if matches.free.len() != 2 {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }
        let reference_file = PathBuf::from(&matches.free[0]);
        let variant_file = PathBuf::from(&matches.free[1]);

        let output_file = match matches.opt_str("o") {
            Some(s) => PathBuf::from(s),
            None => PathBuf::from(format!("{}.jst", reference_file.display())),
        };

        Config {
            reference_file,
            variant_file,
            output_file,
            overwrite: matches.opt_present("overwrite"),
            quiet: matches.opt_present("q"),
            verbose: matches.opt_present("v"),
        }
    }
}

//-----------------------------------------------------------------------------
