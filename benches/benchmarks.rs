use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use laplace_rs::discretization::shapes::Shape;
use laplace_rs::discretization::stencil::Stencil;
use laplace_rs::numerics::relaxation::{GaussSeidelSweep, JacobiSweep, SorSweep, Sweep};
use laplace_rs::numerics::solver::{
    OperatorForm, RelaxationConfig, RelaxationMethod, RelaxationSolver,
};
use laplace_rs::physics::{Region, System};
use nalgebra::DVector;

fn grid_sizes() -> Vec<usize> {
    vec![50, 200]
}

fn dense_sizes() -> Vec<usize> {
    vec![10, 20]
}

fn ring_system(ns: usize) -> System {
    let mut system = System::new(ns).unwrap();
    for (potential, radius) in [(-1.3, 0.18), (1.8, 0.1), (1.0, 0.3)] {
        let ring = Region::new(ns, potential, (0.5, 0.5), Shape::Circle { radius }, false).unwrap();
        system.add(&ring).unwrap();
    }
    system
}

fn bench_stencil_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("stencil_build");
    for &ns in &grid_sizes() {
        group.bench_with_input(BenchmarkId::from_parameter(ns), &ns, |b, &ns| {
            b.iter(|| std::hint::black_box(Stencil::new(ns)));
        });
    }
    group.finish();
}

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize_circle");
    for &ns in &grid_sizes() {
        group.bench_with_input(BenchmarkId::from_parameter(ns), &ns, |b, &ns| {
            b.iter(|| {
                let region =
                    Region::new(ns, 1.0, (0.5, 0.5), Shape::Circle { radius: 0.3 }, true).unwrap();
                std::hint::black_box(region);
            });
        });
    }
    group.finish();
}

fn bench_sweeps(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    for &ns in &grid_sizes() {
        let system = ring_system(ns);
        let pinned = system.pinned_cells();
        let stencil = Stencil::new(ns);
        let b_vec = stencil.rhs();
        let x0 = DVector::from_fn(ns * ns, |i, _| ((i * 31) % 17) as f64 / 17.0);

        let mut sweeps: Vec<Box<dyn Sweep>> = vec![
            Box::new(JacobiSweep::new(stencil.clone(), b_vec.clone())),
            Box::new(GaussSeidelSweep::new(stencil.clone(), b_vec.clone())),
            Box::new(SorSweep::new(stencil.clone(), b_vec.clone(), 1.8)),
        ];
        for sweep in sweeps.iter_mut() {
            let id = BenchmarkId::new(sweep.name(), ns);
            group.bench_function(id, |b| {
                b.iter_batched(
                    || x0.clone(),
                    |mut x| {
                        sweep.sweep(&mut x, &pinned);
                        std::hint::black_box(x);
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_operator_forms(c: &mut Criterion) {
    let mut group = c.benchmark_group("operator_form");
    for &ns in &dense_sizes() {
        let system = ring_system(ns);
        for (label, form) in [("implicit", OperatorForm::Implicit), ("dense", OperatorForm::Dense)] {
            let solver = RelaxationSolver::new(
                RelaxationMethod::Jacobi,
                RelaxationConfig::default()
                    .with_tolerance(0.0)
                    .with_max_iterations(50)
                    .with_seed(0)
                    .with_operator(form),
            );
            group.bench_function(BenchmarkId::new(label, ns), |b| {
                b.iter_batched(
                    || system.clone(),
                    |mut sys| {
                        let _ = solver.solve(&mut sys);
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_stencil_build,
    bench_rasterize,
    bench_sweeps,
    bench_operator_forms
);
criterion_main!(benches);
