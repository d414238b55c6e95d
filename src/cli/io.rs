use anyhow::{Context, Result};
use niffler::send::from_path;
use seq_io::fasta;
use seq_io::fastq;
use std::io::Read;
use std::path::Path;

/// A FASTA or FASTQ reader over a possibly-compressed file. The format is
/// picked from the file name (a compression suffix is stripped first);
/// anything unrecognized is treated as FASTA.
pub enum SeqReader {
    Fasta(fasta::Reader<Box<dyn Read + Send>>),
    Fastq(fastq::Reader<Box<dyn Read + Send>>),
}

pub fn open_seq_file(path: &Path) -> Result<SeqReader> {
    let (reader, _format) =
        from_path(path).with_context(|| format!("opening read file {:?}", path))?;
    if is_fastq(path) {
        Ok(SeqReader::Fastq(fastq::Reader::new(reader)))
    } else {
        Ok(SeqReader::Fasta(fasta::Reader::new(reader)))
    }
}

fn is_fastq(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n.to_ascii_lowercase(),
        None => return false,
    };
    let stem = name
        .strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".bz2"))
        .or_else(|| name.strip_suffix(".xz"))
        .unwrap_or(&name);
    stem.ends_with(".fq") || stem.ends_with(".fastq")
}

impl SeqReader {
    /// Pull up to `max_batch` read sequences into `out` (cleared first),
    /// decrementing `remaining` per read. `remaining == u64::MAX` means no
    /// quota. Returns false once the file (or the quota) is exhausted.
    pub fn next_batch(
        &mut self,
        max_batch: usize,
        remaining: &mut u64,
        out: &mut Vec<Vec<u8>>,
    ) -> Result<bool> {
        out.clear();
        while out.len() < max_batch && *remaining > 0 {
            let seq = match self {
                SeqReader::Fasta(reader) => match reader.next() {
                    None => break,
                    Some(rec) => {
                        use seq_io::fasta::Record;
                        let rec = rec.context("parsing FASTA record")?;
                        rec.full_seq().into_owned()
                    }
                },
                SeqReader::Fastq(reader) => match reader.next() {
                    None => break,
                    Some(rec) => {
                        use seq_io::fastq::Record;
                        let rec = rec.context("parsing FASTQ record")?;
                        rec.seq().to_vec()
                    }
                },
            };
            out.push(seq);
            if *remaining != u64::MAX {
                *remaining -= 1;
            }
        }
        Ok(!out.is_empty())
    }
}
