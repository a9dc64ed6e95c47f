use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use meshio::{CellBlock, Mesh, WriteOptions};

fn create_mesh(n: usize) -> Mesh {
    let points: Array2<f64> = Array2::random((n, 3), Uniform::new(0., 10.));
    let triangles: Array2<i32> = Array2::random((2 * n, 3), Uniform::new(0, n as i32));

    Mesh::new(points, vec![CellBlock::new("triangle", triangles).unwrap()]).unwrap()
}

fn write_binary(mesh: &mut Mesh) -> usize {
    let mut writer: Vec<u8> = Vec::new();
    meshio::write_stream(&mut writer, mesh, "ply", &WriteOptions::binary()).unwrap();
    writer.len()
}

fn write_binary_bench(c: &mut Criterion) {
    let mut small = create_mesh(10_000);
    c.bench_function("write binary ply 10k", |b| {
        b.iter(|| write_binary(black_box(&mut small)))
    });

    let mut large = create_mesh(100_000);
    c.bench_function("write binary ply 100k", |b| {
        b.iter(|| write_binary(black_box(&mut large)))
    });
}

criterion_group!(benches, write_binary_bench);
criterion_main!(benches);
