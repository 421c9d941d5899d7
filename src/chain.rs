use std::collections::VecDeque;

use crate::{
    element::{EH, HasTopology, VH},
    error::Error,
    iterator,
    marks::Marks,
    set::{EdgeSet, ElementSet},
    topol::Topology,
};

/// An ordered run of vertices in which consecutive entries are connected by
/// a mesh edge. Produced by [`EdgeSet::chains`].
///
/// A closed chain represents a cycle: its last vertex connects back to its
/// first through a member edge, without the first vertex being repeated.
pub struct Chain {
    verts: Vec<VH>,
    closed: bool,
}

impl Chain {
    pub fn verts(&self) -> &[VH] {
        &self.verts
    }

    pub fn len(&self) -> usize {
        self.verts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The edges between consecutive chain vertices, in chain order, with
    /// the closing edge appended for closed chains.
    pub fn edges(&self, mesh: &impl HasTopology) -> Result<EdgeSet, Error> {
        let topol = mesh.topology();
        let mut edges = Vec::with_capacity(self.verts.len());
        for pair in self.verts.windows(2) {
            edges.push(topol.find_edge(pair[0], pair[1])?);
        }
        if self.closed && self.verts.len() > 1 {
            edges.push(topol.find_edge(self.verts[self.verts.len() - 1], self.verts[0])?);
        }
        Ok(ElementSet::new(edges))
    }
}

/// The single remaining member edge incident to `v`, or `None` when there
/// are none (dead end) or several (branch).
fn sole_remaining_edge(topol: &Topology, remaining: &Marks<EH>, v: VH) -> Option<EH> {
    let mut found = None;
    for e in iterator::ve_iter(topol, v) {
        if remaining.check(e) {
            if found.is_some() {
                return None;
            }
            found = Some(e);
        }
    }
    found
}

impl EdgeSet {
    /// Reconstruct ordered vertex chains from this edge set.
    ///
    /// The set is expected to be a disjoint union of simple paths and
    /// cycles. Each member edge ends up in exactly one chain. When the
    /// expectation is violated (a vertex with three or more incident member
    /// edges), the walk stops extending at the branch vertex and yields a
    /// shorter, still valid chain; the remaining edges seed chains of their
    /// own. Callers needing validation can compare chain lengths against
    /// the member count.
    pub fn chains(&self, mesh: &impl HasTopology) -> Vec<Chain> {
        let topol = mesh.topology();
        let member = self.membership(topol);
        let mut remaining = self.membership(topol);
        let mut chains = Vec::new();
        for seed in self.iter() {
            if !remaining.check(seed) {
                continue;
            }
            remaining.unset(seed);
            let (v0, v1) = seed.vertices(topol);
            let mut verts = VecDeque::with_capacity(self.len() + 1);
            verts.push_back(v0);
            verts.push_back(v1);
            let mut closed = false;
            // Walk forward from v1, then backward from v0.
            let mut current = v1;
            while let Some(e) = sole_remaining_edge(topol, &remaining, current) {
                let next = e.opposite_vertex(topol, current);
                remaining.unset(e);
                if verts.contains(&next) {
                    closed = true;
                    break;
                }
                verts.push_back(next);
                current = next;
            }
            if !closed {
                let mut current = v0;
                while let Some(e) = sole_remaining_edge(topol, &remaining, current) {
                    let next = e.opposite_vertex(topol, current);
                    remaining.unset(e);
                    if verts.contains(&next) {
                        closed = true;
                        break;
                    }
                    verts.push_front(next);
                    current = next;
                }
            }
            // The ends may still be joined by a member edge the walk never
            // consumed, e.g. one skipped at a branch vertex.
            if !closed && verts.len() > 2 {
                let first = *verts.front().expect("Chain cannot be empty");
                let last = *verts.back().expect("Chain cannot be empty");
                closed = iterator::ve_iter(topol, last)
                    .any(|e| member.check(e) && e.opposite_vertex(topol, last) == first);
            }
            chains.push(Chain {
                verts: verts.into(),
                closed,
            });
        }
        chains
    }
}

#[cfg(test)]
mod test {
    use crate::{
        element::{EH, Handle},
        set::EdgeSet,
        topol::test::{quad_box, quad_grid},
        topol::Topology,
    };

    fn rim_edges(grid: &Topology, n: usize) -> Vec<EH> {
        (0..n)
            .map(|i| {
                grid.find_edge((i as u32).into(), (i as u32 + 1).into())
                    .expect("Rim edge must exist")
            })
            .collect()
    }

    #[test]
    fn t_open_polyline() {
        // Ten edges along the grid rim form an 11 vertex open chain.
        let grid = quad_grid(10, 1);
        let edges = rim_edges(&grid, 10);
        let chains = EdgeSet::new(edges.clone()).chains(&grid);
        assert_eq!(chains.len(), 1);
        let chain = &chains[0];
        assert!(!chain.is_closed());
        assert_eq!(chain.len(), 11);
        let indices: Vec<u32> = chain.verts().iter().map(|v| v.index()).collect();
        // Reversing the input yields the same sequence, possibly reversed.
        let reversed: Vec<EH> = edges.into_iter().rev().collect();
        let rchains = EdgeSet::new(reversed).chains(&grid);
        assert_eq!(rchains.len(), 1);
        let mut rindices: Vec<u32> = rchains[0].verts().iter().map(|v| v.index()).collect();
        if rindices.first() != indices.first() {
            rindices.reverse();
        }
        assert_eq!(indices, rindices);
    }

    #[test]
    fn t_closed_cycle() {
        // The four edges of one box face close into a cycle of four.
        let qbox = quad_box();
        let edges: Vec<EH> = [(0u32, 1u32), (1, 2), (2, 3), (3, 0)]
            .iter()
            .map(|(a, b)| qbox.find_edge((*a).into(), (*b).into()).unwrap())
            .collect();
        let chains = EdgeSet::new(edges).chains(&qbox);
        assert_eq!(chains.len(), 1);
        assert!(chains[0].is_closed());
        assert_eq!(chains[0].len(), 4);
    }

    #[test]
    fn t_chain_adjacency_invariant() {
        let qbox = quad_box();
        let edges = EdgeSet::from_mesh(&qbox, false).expect("Cannot build set");
        for chain in edges.chains(&qbox) {
            for pair in chain.verts().windows(2) {
                assert!(qbox.find_halfedge(pair[0], pair[1]).is_some());
            }
            if chain.is_closed() {
                let first = chain.verts()[0];
                let last = chain.verts()[chain.len() - 1];
                assert!(qbox.find_halfedge(last, first).is_some());
            }
        }
    }

    #[test]
    fn t_branching_input() {
        // A T: two rim edges and the upright meeting at one vertex. The
        // walk must not run through the branch; every edge still ends up in
        // some chain.
        let grid = quad_grid(2, 2);
        let e0 = grid.find_edge(3.into(), 4.into()).unwrap();
        let e1 = grid.find_edge(4.into(), 5.into()).unwrap();
        let e2 = grid.find_edge(4.into(), 7.into()).unwrap();
        let chains = EdgeSet::new(vec![e0, e1, e2]).chains(&grid);
        let total_edges: usize = chains
            .iter()
            .map(|c| c.len() - 1 + usize::from(c.is_closed()))
            .sum();
        assert_eq!(total_edges, 3);
        assert!(chains.len() >= 2);
        assert!(chains.iter().all(|c| !c.is_closed()));
    }

    #[test]
    fn t_chain_edges_roundtrip() {
        let grid = quad_grid(4, 1);
        let edges = rim_edges(&grid, 4);
        let chains = EdgeSet::new(edges.clone()).chains(&grid);
        assert_eq!(chains.len(), 1);
        let mut recovered: Vec<u32> = chains[0]
            .edges(&grid)
            .expect("Chain edges must exist")
            .iter()
            .map(|e| e.index())
            .collect();
        recovered.sort();
        let mut expected: Vec<u32> = edges.iter().map(|e| e.index()).collect();
        expected.sort();
        assert_eq!(recovered, expected);
    }

    #[test]
    fn t_empty_input() {
        let qbox = quad_box();
        assert!(EdgeSet::empty().chains(&qbox).is_empty());
    }
}
