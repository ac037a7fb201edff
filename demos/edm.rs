//! Electrode layout of an electric dipole moment experiment: two long plates
//! at ±1, optionally flanked by short end electrodes at ±0.25, surrounded by
//! grounded space.
//!
//! The setup is 26 units long and 3 units high. `k` sets the free margin on
//! every side as a multiple of the setup's own length along that axis.

use std::env;
use std::fs;

use laplace_rs::discretization::shapes::Shape;
use laplace_rs::numerics::relaxation::optimal_omega;
use laplace_rs::numerics::solver::{RelaxationConfig, RelaxationMethod, RelaxationSolver};
use laplace_rs::physics::{Region, System};
use laplace_rs::processing::csv_writer;
use laplace_rs::processing::summary::SolveSummary;

const NS: usize = 180;

fn edm_system(ns: usize, k: f64, small_sources: bool) -> System {
    let hx = 1.0 / (26.0 * (2.0 * k + 1.0));
    let hy = 1.0 / (3.0 * (2.0 * k + 1.0));
    let sx = k * 26.0 * hx;
    let sy = k * 3.0 * hy;

    let rect = |width, height| Shape::Rectangle { width, height };
    let mut electrodes = vec![
        (1.0, (sx + 13.0 * hx, sy + 2.5 * hy), rect(20.0 * hx, hy)),
        (-1.0, (sx + 13.0 * hx, sy + 0.5 * hy), rect(20.0 * hx, hy)),
    ];
    if small_sources {
        for (potential, y) in [(0.25, sy + 2.5 * hy), (-0.25, sy + 0.5 * hy)] {
            electrodes.push((potential, (sx + hx, y), rect(2.0 * hx, hy)));
            electrodes.push((potential, (sx + 25.0 * hx, y), rect(2.0 * hx, hy)));
        }
    }

    let mut system = System::new(ns).expect("Failed to create grid");
    for (potential, origin, shape) in electrodes {
        let region = Region::new(ns, potential, origin, shape, true).expect("Failed to rasterize");
        system.add(&region).expect("Grid size mismatch");
    }
    system
}

fn main() {
    env_logger::init();
    let k: f64 = env::args()
        .nth(1)
        .map(|arg| arg.parse().expect("k must be a number"))
        .unwrap_or(0.9);
    let small_sources = !env::args().any(|arg| arg == "--no-small-sources");

    fs::create_dir_all("output/edm").expect("Failed to create output directory");
    let mut system = edm_system(NS, k, small_sources);
    let mut summary = SolveSummary::from_system(&system);

    let solver = RelaxationSolver::new(
        RelaxationMethod::Sor { omega: optimal_omega(NS) },
        RelaxationConfig::default()
            .with_tolerance(1e-10)
            .with_max_iterations(50_000)
            .with_seed(0),
    );
    println!("Running SOR on the EDM layout (k = {k}, small sources: {small_sources})...");
    match solver.solve(&mut system) {
        Ok(result) => {
            summary.add_solver_info("SOR", &result);
            csv_writer::write_field("output/edm/potential.csv", system.grid(), "phi", system.potentials())
                .expect("Failed to write solution");
            csv_writer::write_history("output/edm/history.csv", &result.history)
                .expect("Failed to write history");
        }
        Err(e) => eprintln!("SOR failed: {}", e),
    }

    summary
        .write_to_file("output/edm/solve_summary.txt")
        .expect("Failed to write summary");
    summary.print_to_console();
}
