use anyhow::{bail, Context, Result};
use smallvec::SmallVec;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Highest representable bank index; bank ids travel as u16 through the
/// partition files.
pub const MAX_BANKS: usize = u16::MAX as usize;

/// One numbered input dataset: a label and its read files.
#[derive(Debug, Clone)]
pub struct Bank {
    pub name: String,
    pub files: SmallVec<[PathBuf; 2]>,
    /// Per-file read cap; 0 = unlimited.
    pub max_reads_per_file: u64,
}

/// Parse the input descriptor file. Each non-empty line is
/// `<bank_id> <file1> [<file2> ...]`, whitespace-separated.
///
/// `max_reads` is the per-bank cap (0 = unlimited); multi-file banks get a
/// per-file quota of `ceil(max_reads / nfiles)`.
pub fn load_banks(path: &Path, max_reads: u64) -> Result<Vec<Bank>> {
    let f = File::open(path).with_context(|| format!("opening input descriptor {:?}", path))?;
    let reader = BufReader::new(f);

    let mut banks = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading input descriptor {:?}", path))?;
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            continue; // blank line
        };
        let files: SmallVec<[PathBuf; 2]> = parts.map(PathBuf::from).collect();
        if files.is_empty() {
            bail!(
                "input descriptor {:?} line {}: bank '{}' lists no read file",
                path,
                lineno + 1,
                name
            );
        }
        for file in &files {
            if !file.is_file() {
                bail!("bank '{}': missing input file {:?}", name, file);
            }
        }
        let max_reads_per_file = if max_reads == 0 {
            0
        } else {
            max_reads.div_ceil(files.len() as u64)
        };
        banks.push(Bank {
            name: name.to_string(),
            files,
            max_reads_per_file,
        });
    }

    if banks.is_empty() {
        bail!("input descriptor {:?} defines no bank", path);
    }
    if banks.len() > MAX_BANKS {
        bail!(
            "too many input datasets ({}); at most {} are supported",
            banks.len(),
            MAX_BANKS
        );
    }
    Ok(banks)
}

/// Bank labels in input order, the row/column order of every output matrix.
pub fn bank_names(banks: &[Bank]) -> Vec<String> {
    banks.iter().map(|b| b.name.clone()).collect()
}
