use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tilenav::cluster::build_clusters;
use tilenav::search::{find_corridor_into, SearchPath};
use tilenav::{GridView, NavMeshConfig, TileGrid, TileNavMesh, Vec2};

/// Open grid with a lattice of small pillars and a long wall with a gap.
fn obstacle_grid(width: u32, height: u32) -> TileGrid {
    let mut grid = TileGrid::new(width, height, Vec2::new(1.0, 1.0));
    for y in (4..height as i32 - 4).step_by(8) {
        for x in (4..width as i32 - 4).step_by(8) {
            grid.set_index(x, y, 1);
            grid.set_index(x + 1, y, 1);
            grid.set_index(x, y + 1, 1);
        }
    }
    let wall_x = width as i32 / 2 + 2;
    for y in 0..height as i32 {
        if y != height as i32 / 3 {
            grid.set_index(wall_x, y, 1);
        }
    }
    grid
}

/// Roughly 30% of the cells blocked, scattered with a fixed xorshift seed.
fn scattered_grid(width: u32, height: u32) -> TileGrid {
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let indices: Vec<u32> = (0..width * height)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            u32::from(seed % 10 < 3)
        })
        .collect();
    TileGrid::from_indices(width, height, Vec2::new(1.0, 1.0), &indices)
}

fn bench_nav_mesh(c: &mut Criterion) {
    let grid = obstacle_grid(64, 64);
    let config = NavMeshConfig::new([1]).with_narrowness_threshold(1.5);

    let mut group = c.benchmark_group("tilenav/navmesh");

    group.bench_function("generate_64x64", |b| {
        b.iter(|| {
            let nav = TileNavMesh::build(&grid, config.clone()).expect("generate");
            black_box(nav.mesh().triangle_count());
        })
    });

    let dense = scattered_grid(128, 128);
    group.bench_function("clusters_128x128_dense", |b| {
        let view = GridView::new(&dense, &[1]);
        b.iter(|| {
            let clusters = build_clusters(&view, 100_000).expect("clusters");
            black_box(clusters.len());
        })
    });

    group.bench_function("generate_128x128_dense", |b| {
        let mut config = config.clone();
        config.max_clusters = 100_000;
        b.iter(|| {
            let nav = TileNavMesh::build(&dense, config.clone()).expect("generate");
            black_box(nav.mesh().triangle_count());
        })
    });

    let nav = TileNavMesh::build(&grid, config).expect("generate");
    let start = Vec2::new(0.5, 0.5);
    let goal = Vec2::new(63.5, 63.5);

    group.bench_function("get_path_alloc", |b| {
        b.iter(|| {
            let path = nav.get_path(start, goal, 0.4).expect("path");
            black_box(path.smoothed_path.len());
        })
    });

    let mut query = nav.query();
    group.bench_function("get_path_reuse", |b| {
        b.iter(|| {
            let path = nav
                .try_path_with(start, goal, 0.4, &mut query)
                .expect("path");
            black_box(path.smoothed_path.len());
        })
    });

    let mut out = SearchPath::default();
    group.bench_function("corridor_into_reuse", |b| {
        b.iter(|| {
            find_corridor_into(nav.mesh(), start, goal, &mut query, &mut out).expect("corridor");
            black_box(out.triangles.len());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_nav_mesh);
criterion_main!(benches);
