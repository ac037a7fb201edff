use std::fs;

use laplace_rs::discretization::shapes::Shape;
use laplace_rs::numerics::relaxation::optimal_omega;
use laplace_rs::numerics::solver::{RelaxationConfig, RelaxationMethod, RelaxationSolver, SolverResult};
use laplace_rs::physics::{Region, System};
use laplace_rs::processing::csv_writer;
use laplace_rs::processing::summary::SolveSummary;

const NS: usize = 60;

fn main() {
    env_logger::init();
    fs::create_dir_all("output/main").expect("Failed to create output directory");

    let system = concentric_rings();
    let mut summary = SolveSummary::from_system(&system);

    let config = RelaxationConfig::default()
        .with_tolerance(1e-8)
        .with_max_iterations(20_000)
        .with_seed(0);

    let methods = [
        ("SOR", RelaxationMethod::Sor { omega: optimal_omega(NS) }),
        ("Jacobi", RelaxationMethod::Jacobi),
        ("Gauss-Seidel", RelaxationMethod::GaussSeidel),
    ];

    let mut solved = Vec::new();
    for (label, method) in methods {
        let mut sys = system.clone();
        if let Some(result) = solve(label, method, &config, &mut sys) {
            summary.add_solver_info(label, &result);
            save_solution(method.name(), &sys, &result);
            solved.push(sys);
        }
    }

    if let [first, second, ..] = solved.as_slice() {
        summary.add_comparison(first.potentials(), second.potentials());
    }

    summary
        .write_to_file("output/main/solve_summary.txt")
        .expect("Failed to write summary");
    summary.print_to_console();

    println!("Summary saved to output/main/solve_summary.txt");
}

/// Three concentric circular conductors around the centre of the plate.
fn concentric_rings() -> System {
    let mut system = System::new(NS).expect("Failed to create grid");
    for (potential, radius) in [(-1.3, 0.18), (1.8, 0.1), (1.0, 0.3)] {
        let ring = Region::new(NS, potential, (0.5, 0.5), Shape::Circle { radius }, false)
            .expect("Failed to rasterize ring");
        system.add(&ring).expect("Grid size mismatch");
    }
    system
}

fn solve(
    label: &str,
    method: RelaxationMethod,
    config: &RelaxationConfig,
    system: &mut System,
) -> Option<SolverResult> {
    println!("Running {label} solver...");
    match RelaxationSolver::new(method, config.clone()).solve(system) {
        Ok(result) => {
            println!(
                "{label} finished after {} sweeps ({:?}).\n",
                result.iterations, result.stop_reason
            );
            Some(result)
        }
        Err(e) => {
            eprintln!("{label} failed: {}", e);
            None
        }
    }
}

fn save_solution(name: &str, system: &System, result: &SolverResult) {
    let field_path = format!("output/main/{name}_potential.csv");
    csv_writer::write_field(&field_path, system.grid(), "phi", system.potentials())
        .expect("Failed to write solution");

    let history_path = format!("output/main/{name}_history.csv");
    csv_writer::write_history(&history_path, &result.history)
        .expect("Failed to write history");

    println!("Solution saved to {field_path}");
}
