use anyhow::{Context, Result};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::kmersim::distance::{DistanceBuilder, MatrixKind};

/// Suffix appended to every matrix file name:
/// `_k<K>_min<AMIN>[_max<AMAX>]`, the max elided when effectively
/// unbounded.
pub fn output_suffix(kmer_size: usize, abundance_min: u32, abundance_max: u32) -> String {
    let mut suffix = format!("_k{kmer_size}_min{abundance_min}");
    if abundance_max < 1_000_000 {
        suffix.push_str(&format!("_max{abundance_max}"));
    }
    suffix
}

/// Write one `;`-separated similarity matrix. The header row starts with
/// an empty field followed by the bank names; each data row is the bank
/// name and its `%f`-formatted values, no trailing delimiter.
pub fn dump_matrix(path: &Path, bank_names: &[String], matrix: &Array2<f64>) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating output matrix {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for name in bank_names {
        write!(writer, ";{name}")?;
    }
    writeln!(writer)?;

    for (i, name) in bank_names.iter().enumerate() {
        write!(writer, "{name}")?;
        for j in 0..bank_names.len() {
            write!(writer, ";{:.6}", matrix[(i, j)])?;
        }
        writeln!(writer)?;
    }

    writer
        .flush()
        .with_context(|| format!("writing output matrix {:?}", path))
}

/// Build all five matrices, then write them. Nothing is created on disk
/// until every matrix has been derived, so an abort leaves no partial
/// output behind.
pub fn write_distance_matrices(
    output_dir: &Path,
    suffix: &str,
    bank_names: &[String],
    distance: &DistanceBuilder,
) -> Result<()> {
    let matrices = [
        (
            "mat_presenceAbsence_asym",
            distance.presence_absence(MatrixKind::Asymmetrical),
        ),
        (
            "mat_presenceAbsence_norm",
            distance.presence_absence(MatrixKind::Normalized),
        ),
        (
            "mat_abundance_asym",
            distance.abundance(MatrixKind::Asymmetrical),
        ),
        (
            "mat_abundance_norm",
            distance.abundance(MatrixKind::Normalized),
        ),
        ("mat_brayCurtis", distance.bray_curtis()),
    ];

    for (prefix, matrix) in &matrices {
        let path = output_dir.join(format!("{prefix}{suffix}.csv"));
        dump_matrix(&path, bank_names, matrix)?;
    }
    Ok(())
}
