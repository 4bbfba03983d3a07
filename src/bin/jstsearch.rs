use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use std::{env, process};

use jst_base::{JournaledSequenceTree, Matcher, NaiveMatcher};
use jst_base::utils;

use getopts::Options;

//-----------------------------------------------------------------------------

// Searches for exact pattern occurrences in every sequence of a JST container.
//
// Patterns are read one per line; lines starting with > name the following
// pattern. Each hit is reported as pattern name, sequence identifier, and
// offset in that sequence, tab-separated.

fn main() -> Result<(), String> {
    let start_time = Instant::now();

    let config = Config::new();

    let jst = JournaledSequenceTree::load_from(&config.index_file)?;
    if config.verbose {
        eprintln!("Loaded a collection of {} sequences with {} variants",
            jst.domain_size(), jst.variant_count()
        );
    }

    let patterns = read_patterns(&config.pattern_file)?;
    if config.verbose {
        eprintln!("Read {} patterns", patterns.len());
    }

    let stdout = io::stdout();
    let mut output = stdout.lock();
    let mut total_hits = 0;
    for (name, pattern) in patterns.iter() {
        let matcher = NaiveMatcher::new(pattern.clone())?;
        let mut traverser = jst.windows(matcher.window_size())?;
        while let Some(cargo) = traverser.next_window() {
            let mut hit = false;
            matcher.scan(cargo.sequence(), |_| {
                hit = true;
            });
            if hit {
                let positions = jst.positions(cargo.coordinate(), cargo.coverage())?;
                for (sequence, position) in positions {
                    writeln!(output, "{}\t{}\t{}", name, sequence, position).map_err(|x| x.to_string())?;
                    total_hits += 1;
                }
            }
        }
    }

    if !config.quiet {
        eprintln!("Found {} hits for {} patterns", total_hits, patterns.len());
        let end_time = Instant::now();
        let seconds = end_time.duration_since(start_time).as_secs_f64();
        eprintln!("Used {:.3} seconds", seconds);
    }

    Ok(())
}

//-----------------------------------------------------------------------------

fn read_patterns(filename: &PathBuf) -> Result<Vec<(String, Vec<u8>)>, String> {
    let mut reader = utils::open_text(filename)?;
    let mut result: Vec<(String, Vec<u8>)> = Vec::new();
    let mut name: Option<String> = None;
    loop {
        let mut buf = String::new();
        let len = BufRead::read_line(&mut reader, &mut buf).map_err(|x| x.to_string())?;
        if len == 0 {
            break;
        }
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(stripped) = line.strip_prefix('>') {
            name = Some(stripped.trim().to_string());
            continue;
        }
        let pattern_name = name.take().unwrap_or_else(|| format!("pattern{}", result.len()));
        result.push((pattern_name, line.as_bytes().to_vec()));
    }
    Ok(result)
}

//-----------------------------------------------------------------------------

struct Config {
    pub index_file: PathBuf,
    pub pattern_file: PathBuf,
    pub quiet: bool,
    pub verbose: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optflag("q", "quiet", "do not print statistics");
        opts.optflag("v", "verbose", "print progress information");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        let header = format!("Usage: {} [options] index.jst patterns.txt", program);
        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }
        if matches.free.len() != 2 {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }

        Config {
            index_file: PathBuf::from(&matches.free[0]),
            pattern_file: PathBuf::from(&matches.free[1]),
            quiet: matches.opt_present("q"),
            verbose: matches.opt_present("v"),
        }
    }
}

//-----------------------------------------------------------------------------
