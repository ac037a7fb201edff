use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use nalgebra::DMatrix;

use crate::numerics::solver::SolverResult;
use crate::physics::System;

/// Per-method solver outcome, as shown in the summary.
pub struct MethodReport {
    pub name: String,
    pub iterations: usize,
    pub final_measure: f64,
    pub converged: bool,
}

pub struct SolveSummary {
    // Grid info
    pub ns: usize,
    pub num_cells: usize,
    pub spacing: f64,
    pub num_sources: usize,
    pub potential_range: (f64, f64),

    // Solver info
    pub methods: Vec<MethodReport>,
    pub max_solution_diff: Option<f64>,
    pub mean_solution_diff: Option<f64>,
}

impl SolveSummary {
    pub fn from_system(system: &System) -> Self {
        let pins = system.pinned_cells();
        let values = system.source_potentials();
        let (lo, hi) = pins
            .indices()
            .iter()
            .map(|&k| {
                let (row, col) = system.grid().cell(k);
                values[(row, col)]
            })
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

        Self {
            ns: system.ns(),
            num_cells: system.grid().len(),
            spacing: system.grid().h,
            num_sources: system.source_count(),
            potential_range: if pins.is_empty() { (0.0, 0.0) } else { (lo, hi) },
            methods: Vec::new(),
            max_solution_diff: None,
            mean_solution_diff: None,
        }
    }

    pub fn add_solver_info(&mut self, name: impl Into<String>, result: &SolverResult) {
        self.methods.push(MethodReport {
            name: name.into(),
            iterations: result.iterations,
            final_measure: result.final_measure,
            converged: result.converged(),
        });
    }

    pub fn add_comparison(&mut self, a: &DMatrix<f64>, b: &DMatrix<f64>) {
        let diffs: Vec<f64> = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).collect();
        if diffs.is_empty() {
            return;
        }

        self.max_solution_diff = Some(diffs.iter().cloned().fold(0.0, f64::max));
        self.mean_solution_diff = Some(diffs.iter().sum::<f64>() / diffs.len() as f64);
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;
        self.write(&mut file)
    }

    fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out, "LAPLACE RELAXATION SUMMARY")?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out)?;

        writeln!(out, "GRID")?;
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Points per side:     {}", self.ns)?;
        writeln!(out, "Number of cells:     {}", self.num_cells)?;
        writeln!(out, "Spacing (h):         {:.6e}", self.spacing)?;
        writeln!(out)?;

        writeln!(out, "SOURCES")?;
        writeln!(out, "{}", "-".repeat(60))?;
        writeln!(out, "Pinned cells:        {}", self.num_sources)?;
        writeln!(
            out,
            "Potential range:     {:.4} to {:.4}",
            self.potential_range.0, self.potential_range.1
        )?;
        writeln!(out)?;

        if !self.methods.is_empty() {
            writeln!(out, "SOLVER PERFORMANCE")?;
            writeln!(out, "{}", "-".repeat(60))?;
            for m in &self.methods {
                writeln!(out, "{}:", m.name)?;
                writeln!(out, "  Iterations:        {}", m.iterations)?;
                writeln!(out, "  Final diff:        {:.6e}", m.final_measure)?;
                writeln!(out, "  Converged:         {}", m.converged)?;
            }
            writeln!(out)?;
        }

        if let (Some(max_diff), Some(mean_diff)) = (self.max_solution_diff, self.mean_solution_diff)
        {
            writeln!(out, "SOLVER COMPARISON")?;
            writeln!(out, "{}", "-".repeat(60))?;
            writeln!(out, "Max difference:      {:.6e}", max_diff)?;
            writeln!(out, "Mean difference:     {:.6e}", mean_diff)?;
            writeln!(out)?;
        }

        writeln!(out, "{}", "=".repeat(60))?;
        Ok(())
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SOLVE SUMMARY");
        println!("{}", "=".repeat(60));
        println!(
            "Grid:          {}x{} ({} sources)",
            self.ns, self.ns, self.num_sources
        );
        for m in &self.methods {
            println!(
                "{:<14} {} sweeps, diff {:.3e}{}",
                format!("{}:", m.name),
                m.iterations,
                m.final_measure,
                if m.converged { "" } else { " (not converged)" }
            );
        }
        if let Some(max_diff) = self.max_solution_diff {
            println!("Max diff:      {:.3e}", max_diff);
        }
        println!("{}\n", "=".repeat(60));
    }
}
