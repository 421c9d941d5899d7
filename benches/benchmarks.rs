use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use glam::dvec3;
use spinel::{EdgeSet, LoopRule, Mesh, edge_loop};

/// An `n` by `n` grid of unit quads in the XY plane.
fn grid_mesh(n: usize) -> Mesh {
    let nvx = n + 1;
    let mut mesh = Mesh::with_capacity(nvx * nvx, 2 * n * n + 2 * n, n * n);
    for y in 0..=n {
        for x in 0..=n {
            mesh.add_vertex(dvec3(x as f64, y as f64, 0.0)).unwrap();
        }
    }
    for y in 0..n {
        for x in 0..n {
            let v = (y * nvx + x) as u32;
            mesh.add_face(&[
                v.into(),
                (v + 1).into(),
                (v + 1 + nvx as u32).into(),
                (v + nvx as u32).into(),
            ])
            .unwrap();
        }
    }
    mesh
}

fn bench_grouping(c: &mut Criterion) {
    let mesh = grid_mesh(64);
    let edges = EdgeSet::from_mesh(&mesh, false).unwrap();
    c.bench_function("group_grid_edges", |b| {
        b.iter(|| black_box(edges.group(black_box(&mesh), false)))
    });
}

fn bench_chains(c: &mut Criterion) {
    let mesh = grid_mesh(64);
    // The bottom rim is one long open polyline.
    let rim: Vec<_> = (0..64u32)
        .map(|i| mesh.find_edge(i.into(), (i + 1).into()).unwrap())
        .collect();
    let set = EdgeSet::new(rim);
    c.bench_function("chain_rim_polyline", |b| {
        b.iter(|| black_box(set.chains(black_box(&mesh))))
    });
}

fn bench_edge_loop(c: &mut Criterion) {
    let mesh = grid_mesh(64);
    // A vertical edge in the middle of the grid.
    let seed = mesh.find_edge((32 * 65 + 32).into(), (33 * 65 + 32).into()).unwrap();
    c.bench_function("edge_loop_grid", |b| {
        b.iter(|| black_box(edge_loop(black_box(&mesh), seed, LoopRule::Valence, false)))
    });
}

criterion_group!(benches, bench_grouping, bench_chains, bench_edge_loop);
criterion_main!(benches);
