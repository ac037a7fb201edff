use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use nalgebra::DMatrix;

use crate::discretization::grid::Grid;
use crate::numerics::solver::IterationRecord;

/// One header line, then one line per row with values as `{:.15e}`.
fn write_rows<P, R>(path: P, header: &[&str], rows: R) -> io::Result<()>
where
    P: AsRef<Path>,
    R: IntoIterator,
    R::Item: AsRef<[f64]>,
{
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", header.join(","))?;
    for row in rows {
        let mut first = true;
        for value in row.as_ref() {
            if !first {
                out.write_all(b",")?;
            }
            write!(out, "{value:.15e}")?;
            first = false;
        }
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Write a grid field as `x,y,<header>` rows, row-major.
pub fn write_field<P: AsRef<Path>>(
    path: P,
    grid: &Grid,
    header: &str,
    field: &DMatrix<f64>,
) -> io::Result<()> {
    if field.nrows() != grid.ns || field.ncols() != grid.ns {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Field shape {}x{} doesn't match grid {}x{}",
                field.nrows(),
                field.ncols(),
                grid.ns,
                grid.ns
            ),
        ));
    }

    let rows = (0..grid.ns).flat_map(|row| {
        (0..grid.ns).map(move |col| [grid.coordinate(row), grid.coordinate(col), field[(row, col)]])
    });
    write_rows(path, &["x", "y", header], rows)
}

/// Write the per-sweep solver history.
pub fn write_history<P: AsRef<Path>>(path: P, history: &[IterationRecord]) -> io::Result<()> {
    let rows = history
        .iter()
        .map(|r| [r.iteration as f64, r.initial_norm, r.final_norm, r.measure]);
    write_rows(path, &["iter", "initial_norm", "final_norm", "diff"], rows)
}
