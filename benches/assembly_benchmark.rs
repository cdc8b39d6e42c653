use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elastobem::assembly::{assemble, AssemblyOptions};
use elastobem::element::CollocationScheme;
use elastobem::kernels::kelvin::Kelvin3d;
use elastobem::mesh::MeshContext;
use elastobem::shapes::regular_sphere;

pub fn assembly_parts_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    group.sample_size(20);

    for level in 1..3 {
        let mesh = regular_sphere(level, CollocationScheme::Centroid);
        let ctx = MeshContext::new(&mesh).unwrap();
        let kernel = Kelvin3d::new(3.0e7, 0.25).unwrap();
        let options = AssemblyOptions::default();
        let n_dof = 3 * ctx.collocation_count();

        group.bench_function(
            format!("Dense assembly of {n_dof}x{n_dof} matrices"),
            |b| b.iter(|| black_box(assemble(&ctx, &kernel, &options).unwrap())),
        );
    }
    group.finish();
}

criterion_group!(benches, assembly_parts_benchmark);
criterion_main!(benches);
