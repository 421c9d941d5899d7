use crate::{
    element::{EH, HasTopology, VH},
    iterator,
    marks::Marks,
    set::{EdgeSet, ElementSet},
    topol::Topology,
};

/// How [`edge_loop`] decides which edge continues the loop through a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopRule {
    /// Continue through interior vertices of valence 4 (and boundary
    /// vertices of valence 3 when boundary forcing is on), along the edge
    /// whose far vertex lies on neither face bordering the current edge.
    #[default]
    Valence,
    /// Continue through any even-valence interior vertex along the edge
    /// that bisects the vertex fan.
    Bisect,
}

/// Extend `seed` into an edge loop: a run of topologically parallel edges
/// crossing the mesh through vertices of regular valence.
///
/// Extension walks out of both ends of the seed and stops when the rule
/// fails at a vertex, when the boundary is reached without
/// `force_boundary`, or when it comes back around to an edge it has
/// already collected (a closed loop). The returned set lists the seed
/// first, then the edges of one direction, then the other.
pub fn edge_loop(
    mesh: &impl HasTopology,
    seed: EH,
    rule: LoopRule,
    force_boundary: bool,
) -> EdgeSet {
    let topol = mesh.topology();
    let mut visited = Marks::new(topol.num_edges());
    visited.set(seed);
    let mut edges = vec![seed];
    let (v0, v1) = seed.vertices(topol);
    for endpoint in [v1, v0] {
        let mut current_e = seed;
        let mut current_v = endpoint;
        while let Some(e) = next_loop_edge(topol, current_e, current_v, rule, force_boundary) {
            if visited.mark(e) {
                break;
            }
            edges.push(e);
            current_v = e.opposite_vertex(topol, current_v);
            current_e = e;
        }
    }
    ElementSet::new(edges)
}

/// The edge continuing the loop from `e` through its end vertex `v`, if the
/// rule admits one.
fn next_loop_edge(
    topol: &Topology,
    e: EH,
    v: VH,
    rule: LoopRule,
    force_boundary: bool,
) -> Option<EH> {
    let valence = topol.vertex_valence(v);
    let boundary = topol.is_boundary_vertex(v);
    match rule {
        LoopRule::Valence => {
            if boundary {
                if !force_boundary || valence != 3 {
                    return None;
                }
            } else if valence != 4 {
                return None;
            }
            // The continuation is the incident edge whose far vertex lies on
            // neither face bordering `e`.
            let fverts: Vec<VH> = iterator::ef_iter(topol, e)
                .flat_map(|f| iterator::fv_iter(topol, f))
                .collect();
            iterator::ve_iter(topol, v)
                .find(|e2| *e2 != e && !fverts.contains(&e2.opposite_vertex(topol, v)))
        }
        LoopRule::Bisect => {
            if boundary || valence % 2 != 0 {
                return None;
            }
            // Rotate half way around the fan, starting against the incoming
            // halfedge.
            let incoming = if topol.head_vertex(e.halfedge(false)) == v {
                e.halfedge(false)
            } else {
                e.halfedge(true)
            };
            let mut out = topol.opposite_halfedge(incoming);
            for _ in 0..(valence / 2) {
                out = topol.ccw_rotated_halfedge(out);
            }
            Some(topol.halfedge_edge(out))
        }
    }
}

/// Extend `seed` into an edge ring: the edges crossing a strip of
/// quadrilateral faces through opposite sides.
///
/// The walk crosses into both faces bordering the seed and keeps crossing
/// quads through the side that shares no vertex with the edge it came in
/// on. It terminates at a non-quad face, at the boundary, or when the strip
/// closes back onto an edge already collected. The returned set lists the
/// seed first, then the edges of one direction, then the other.
pub fn edge_ring(mesh: &impl HasTopology, seed: EH) -> EdgeSet {
    let topol = mesh.topology();
    let mut visited = Marks::new(topol.num_edges());
    visited.set(seed);
    let mut edges = vec![seed];
    for h in [seed.halfedge(false), seed.halfedge(true)] {
        let mut current = h;
        loop {
            let Some(f) = topol.halfedge_face(current) else {
                break;
            };
            if topol.face_valence(f) != 4 {
                break;
            }
            // The opposite side of the quad.
            let across = topol.next_halfedge(topol.next_halfedge(current));
            let e = topol.halfedge_edge(across);
            if visited.mark(e) {
                break;
            }
            edges.push(e);
            current = topol.opposite_halfedge(across);
        }
    }
    ElementSet::new(edges)
}

#[cfg(test)]
mod test {
    use super::{LoopRule, edge_loop, edge_ring};
    use crate::{
        element::{EH, Handle},
        topol::Topology,
        topol::test::{quad_grid, quad_tube},
    };

    fn sorted_indices(set: &crate::set::EdgeSet) -> Vec<u32> {
        let mut out: Vec<u32> = set.iter().map(|e| e.index()).collect();
        out.sort();
        out
    }

    /// The vertical edges of column `x` in a grid with `nvx` vertices per
    /// row.
    fn column_edges(grid: &Topology, x: u32, nvx: u32, ny: u32) -> Vec<EH> {
        (0..ny)
            .map(|y| {
                grid.find_edge((y * nvx + x).into(), ((y + 1) * nvx + x).into())
                    .expect("Column edge must exist")
            })
            .collect()
    }

    #[test]
    fn t_grid_column_loop() {
        // A loop seeded on an interior vertical edge runs the full column
        // and stops at the rim vertices.
        let grid = quad_grid(3, 3);
        let column = column_edges(&grid, 1, 4, 3);
        let seed = column[1];
        let found = edge_loop(&grid, seed, LoopRule::Valence, false);
        let mut expected: Vec<u32> = column.iter().map(|e| e.index()).collect();
        expected.sort();
        assert_eq!(sorted_indices(&found), expected);
    }

    #[test]
    fn t_loop_symmetry() {
        // Extending again from either end edge of an open loop rebuilds the
        // same edge set.
        let grid = quad_grid(3, 3);
        let column = column_edges(&grid, 2, 4, 3);
        let from_mid = edge_loop(&grid, column[1], LoopRule::Valence, false);
        let from_end = edge_loop(&grid, column[0], LoopRule::Valence, false);
        assert_eq!(sorted_indices(&from_mid), sorted_indices(&from_end));
    }

    #[test]
    fn t_boundary_needs_forcing() {
        // A rim loop only extends along the boundary when forcing is on.
        let grid = quad_grid(3, 1);
        let seed = grid.find_edge(1.into(), 2.into()).unwrap();
        let plain = edge_loop(&grid, seed, LoopRule::Valence, false);
        assert_eq!(plain.len(), 1);
        let forced = edge_loop(&grid, seed, LoopRule::Valence, true);
        // The full bottom rim: corners stop the walk.
        assert_eq!(forced.len(), 3);
    }

    #[test]
    fn t_tube_rim_loop_closes() {
        // The rim of a tube is a closed loop of boundary valence-3
        // vertices.
        let tube = quad_tube(6);
        let seed = tube.find_edge(0.into(), 1.into()).unwrap();
        let rim = edge_loop(&tube, seed, LoopRule::Valence, true);
        assert_eq!(rim.len(), 6);
        let expected: Vec<EH> = (0..6u32)
            .map(|i| tube.find_edge(i.into(), ((i + 1) % 6).into()).unwrap())
            .collect();
        let mut expected: Vec<u32> = expected.iter().map(|e| e.index()).collect();
        expected.sort();
        assert_eq!(sorted_indices(&rim), expected);
    }

    #[test]
    fn t_bisect_matches_valence_on_grid() {
        let grid = quad_grid(3, 3);
        let column = column_edges(&grid, 1, 4, 3);
        let by_valence = edge_loop(&grid, column[1], LoopRule::Valence, false);
        let by_bisect = edge_loop(&grid, column[1], LoopRule::Bisect, false);
        assert_eq!(sorted_indices(&by_valence), sorted_indices(&by_bisect));
    }

    #[test]
    fn t_tube_ring_closes() {
        // Ring extension around a closed strip of 6 quads collects one edge
        // per face and terminates by revisiting the seed.
        let tube = quad_tube(6);
        let seed = tube.find_edge(1.into(), 7.into()).unwrap();
        let ring = edge_ring(&tube, seed);
        assert_eq!(ring.len(), 6);
        let expected: Vec<u32> = (0..6u32)
            .map(|i| tube.find_edge(i.into(), (i + 6).into()).unwrap().index())
            .collect();
        let mut expected = expected;
        expected.sort();
        assert_eq!(sorted_indices(&ring), expected);
    }

    #[test]
    fn t_grid_ring_stops_at_boundary() {
        // A ring across a 3x1 strip: one vertical edge per quad crossing,
        // four in total counting both rims.
        let grid = quad_grid(3, 1);
        let seed = grid.find_edge(1.into(), 5.into()).unwrap();
        let ring = edge_ring(&grid, seed);
        assert_eq!(ring.len(), 4);
    }
}
