use tilenav::cluster::build_clusters;
use tilenav::{BuildError, Cluster, GridView, TileGrid, Vec2};

const WALL: u32 = 1;

fn grid_from_rows(rows: &[&str]) -> TileGrid {
    let indices: Vec<u32> = rows
        .iter()
        .flat_map(|row| row.bytes())
        .map(|c| if c == b'#' { WALL } else { 0 })
        .collect();
    TileGrid::from_indices(
        rows[0].len() as u32,
        rows.len() as u32,
        Vec2::new(1.0, 1.0),
        &indices,
    )
}

fn shape(cluster: &Cluster) -> (usize, usize, Vec<(usize, usize)>) {
    (
        cluster.depth(),
        cluster.contour().perimeter(),
        cluster
            .children()
            .iter()
            .map(|c| (c.depth(), c.contour().perimeter()))
            .collect(),
    )
}

#[test]
fn open_grid_has_no_clusters() {
    let grid = TileGrid::new(6, 4, Vec2::new(1.0, 1.0));
    let view = GridView::new(&grid, &[WALL]);
    let clusters = build_clusters(&view, 100).expect("clusters");
    assert!(clusters.is_empty());
}

#[test]
fn separate_obstacles_become_separate_top_level_clusters() {
    let grid = grid_from_rows(&[
        "..........",
        ".##.......",
        ".##....#..",
        ".......#..",
        "..........",
    ]);
    let view = GridView::new(&grid, &[WALL]);
    let clusters = build_clusters(&view, 100).expect("clusters");

    assert_eq!(clusters.len(), 2);
    assert_eq!(shape(&clusters[0]), (0, 8, vec![]));
    assert_eq!(shape(&clusters[1]), (0, 6, vec![]));
    assert!(clusters.iter().all(Cluster::is_blocking));
}

#[test]
fn nesting_alternates_blocked_and_walkable() {
    let grid = grid_from_rows(&[
        "..........",
        "..........",
        "..######..",
        "..#....#..",
        "..#.##.#..",
        "..#.##.#..",
        "..#....#..",
        "..######..",
        "..........",
        "..........",
    ]);
    let view = GridView::new(&grid, &[WALL]);
    let clusters = build_clusters(&view, 100).expect("clusters");

    assert_eq!(clusters.len(), 1);
    let ring = &clusters[0];
    assert_eq!(shape(ring), (0, 24, vec![(1, 16)]));
    assert!(ring.is_blocking());

    let hole = &ring.children()[0];
    assert!(!hole.is_blocking());
    assert_eq!(shape(hole), (1, 16, vec![(2, 8)]));

    let island = &hole.children()[0];
    assert!(island.is_blocking());
    assert!(island.children().is_empty());

    let depths: Vec<usize> = ring.descendants().map(Cluster::depth).collect();
    assert_eq!(depths, vec![0, 1, 2]);

    // Children lie inside their parent's bounds and polygon.
    for parent in ring.descendants() {
        for child in parent.children() {
            for (x, y) in child.bounds().cells() {
                if child.contains_cell(x, y) {
                    assert!(parent.contains_cell(x, y), "({x}, {y}) escapes its parent");
                }
            }
        }
    }
}

#[test]
fn blocked_override_counts_as_collision() {
    let mut grid = TileGrid::new(5, 5, Vec2::new(1.0, 1.0));
    grid.set_blocked(2, 2, true);

    let view = GridView::new(&grid, &[]);
    let clusters = build_clusters(&view, 100).expect("clusters");
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].contour().perimeter(), 4);

    grid.toggle_blocked(2, 2, None);
    let view = GridView::new(&grid, &[]);
    assert!(build_clusters(&view, 100).expect("clusters").is_empty());
}

#[test]
fn collision_indices_select_which_tiles_block() {
    let grid = grid_from_rows(&["#..#", "...."]);

    let none = GridView::new(&grid, &[7]);
    assert!(build_clusters(&none, 100).expect("clusters").is_empty());

    let walls = GridView::new(&grid, &[WALL]);
    assert_eq!(build_clusters(&walls, 100).expect("clusters").len(), 2);
}

#[test]
fn discovery_ceiling_is_reported() {
    let grid = grid_from_rows(&["#.#.#", ".....", "#.#.#"]);
    let view = GridView::new(&grid, &[WALL]);

    assert_eq!(build_clusters(&view, 6).expect("clusters").len(), 6);
    assert_eq!(
        build_clusters(&view, 5).expect_err("ceiling"),
        BuildError::ClusterLimit { limit: 5 }
    );
}

#[test]
fn consolidated_edges_of_a_rectangle_are_its_four_sides() {
    let grid = grid_from_rows(&["....", ".##.", ".##.", "...."]);
    let view = GridView::new(&grid, &[WALL]);
    let clusters = build_clusters(&view, 100).expect("clusters");

    assert_eq!(clusters[0].contour().edges().len(), 8);
    assert_eq!(clusters[0].edges().len(), 4);
}

#[test]
fn deepest_enclosing_cluster_matches_cell_classification() {
    let grid = grid_from_rows(&[
        "############",
        "#..........#",
        "#.########.#",
        "#.#......#.#",
        "#.#.####.#.#",
        "#.#.#..#.#.#",
        "#.#.####.#.#",
        "#.#......#.#",
        "#.########.#",
        "#..........#",
        "############",
    ]);
    let view = GridView::new(&grid, &[WALL]);
    let clusters = build_clusters(&view, 100).expect("clusters");

    let max_depth = clusters
        .iter()
        .flat_map(Cluster::descendants)
        .map(Cluster::depth)
        .max();
    assert_eq!(max_depth, Some(5));

    for y in 0..11 {
        for x in 0..12 {
            let mut deepest: Option<&Cluster> = None;
            let mut level: &[Cluster] = &clusters;
            while let Some(c) = level.iter().find(|c| c.contains_cell(x, y)) {
                deepest = Some(c);
                level = c.children();
            }
            let blocked = view.is_blocked(x, y);
            let enclosed_blocked = deepest.is_some_and(Cluster::is_blocking);
            assert_eq!(enclosed_blocked, blocked, "cell ({x}, {y})");
        }
    }
}

/// Deterministic pseudo-random grid with roughly `percent`% of the cells blocked.
fn scattered_grid(width: u32, height: u32, percent: u64, mut seed: u64) -> TileGrid {
    let indices: Vec<u32> = (0..width * height)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            if seed % 100 < percent {
                WALL
            } else {
                0
            }
        })
        .collect();
    TileGrid::from_indices(width, height, Vec2::new(1.0, 1.0), &indices)
}

#[test]
fn dense_large_grid_is_fully_classified() {
    let grid = scattered_grid(128, 128, 30, 0x9e37_79b9_7f4a_7c15);
    let view = GridView::new(&grid, &[WALL]);
    let clusters = build_clusters(&view, 100_000).expect("clusters");
    assert!(clusters.len() > 100);

    for y in 0..128 {
        for x in 0..128 {
            let enclosing = clusters.iter().filter(|c| c.contains_cell(x, y)).count();
            assert!(enclosing <= 1, "top-level clusters overlap at ({x}, {y})");

            let mut deepest: Option<&Cluster> = None;
            let mut level: &[Cluster] = &clusters;
            while let Some(c) = level.iter().find(|c| c.contains_cell(x, y)) {
                deepest = Some(c);
                level = c.children();
            }
            let enclosed_blocked = deepest.is_some_and(Cluster::is_blocking);
            assert_eq!(enclosed_blocked, view.is_blocked(x, y), "cell ({x}, {y})");
        }
    }
}
