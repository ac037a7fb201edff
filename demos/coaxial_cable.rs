//! Square coaxial cable: a conductor of side 2 cm held at 10 V inside a
//! grounded tube of side 6 cm. Lengths are scaled by (6 cm)⁻¹ and potentials
//! by (10 V)⁻¹, so the conductor is a 1/3-wide square at potential 1.
//!
//! The first `FRAMES` SOR sweeps are written out as snapshots, then the field
//! is relaxed to convergence.

use std::fs;

use laplace_rs::discretization::shapes::Shape;
use laplace_rs::numerics::relaxation::optimal_omega;
use laplace_rs::numerics::solver::{RelaxationConfig, RelaxationMethod, RelaxationSolver};
use laplace_rs::numerics::transient::FrameRecorder;
use laplace_rs::physics::{Region, System};
use laplace_rs::processing::csv_writer;

const NS: usize = 200;
const FRAMES: usize = 100;
const FRAME_STRIDE: usize = 10;

fn main() {
    env_logger::init();
    fs::create_dir_all("output/coaxial_cable").expect("Failed to create output directory");

    let side = 1.0 / 3.0;
    let conductor = Region::new(
        NS,
        1.0,
        (0.5, 0.5),
        Shape::Rectangle { width: side, height: side },
        true,
    )
    .expect("Failed to rasterize conductor");
    let mut cable = System::new(NS).expect("Failed to create grid");
    cable.add(&conductor).expect("Grid size mismatch");
    println!("Conductor covers {} grid points", cable.source_count());

    let solver = RelaxationSolver::new(
        RelaxationMethod::Sor { omega: optimal_omega(NS) },
        RelaxationConfig::default()
            .with_tolerance(1e-3)
            .with_max_iterations(100_000)
            .with_seed(0),
    );

    let mut animated = cable.clone();
    let frames = FrameRecorder::new(FRAMES)
        .record(&solver, &mut animated)
        .expect("Frame recording failed");
    for (i, frame) in frames.iter().enumerate().step_by(FRAME_STRIDE) {
        let path = format!("output/coaxial_cable/frame_{i:03}.csv");
        csv_writer::write_field(&path, cable.grid(), "phi", frame).expect("Failed to write frame");
    }
    println!("{} frames recorded, every {FRAME_STRIDE}th saved", frames.len());

    match solver.solve(&mut cable) {
        Ok(result) => {
            println!(
                "SOR finished after {} sweeps ({:?})",
                result.iterations, result.stop_reason
            );
            csv_writer::write_field(
                "output/coaxial_cable/potential.csv",
                cable.grid(),
                "phi",
                cable.potentials(),
            )
            .expect("Failed to write solution");
            println!("Solution saved to output/coaxial_cable/potential.csv");
        }
        Err(e) => eprintln!("SOR failed: {}", e),
    }
}
