use crate::{
    element::{EH, HasTopology},
    marks::Marks,
    set::{ElementSet, SetElement},
    topol::Topology,
};

/// Stock barrier predicate: an edge is a barrier when its `seam` status bit
/// is set.
pub fn seam_barrier(topol: &Topology, e: EH) -> bool {
    topol.edge_status(e).map(|s| s.seam()).unwrap_or(false)
}

impl<H> ElementSet<H>
where
    H: SetElement,
{
    /// Partition this set into maximal connected subsets.
    ///
    /// Connectivity is the kind-specific adjacency relation: vertices
    /// connect through shared edges, edges through shared vertices, faces
    /// through shared vertices. With `expand`, growth is allowed to capture
    /// elements outside this set that are connected to it; otherwise groups
    /// contain only members.
    ///
    /// Every member lands in exactly one group; an element with no eligible
    /// neighbor forms a singleton group. Group order and the order within a
    /// group follow discovery order and carry no spatial meaning.
    pub fn group(&self, mesh: &impl HasTopology, expand: bool) -> Vec<ElementSet<H>> {
        self.collect_groups(mesh.topology(), expand, false, &|_, _| false)
    }

    /// Like [`group`](Self::group), but growth never crosses an edge the
    /// `barrier` predicate rejects. For face sets, adjacency narrows to
    /// shared-edge neighbors so that every crossing has an edge to test.
    pub fn group_by<F>(&self, mesh: &impl HasTopology, expand: bool, barrier: F) -> Vec<ElementSet<H>>
    where
        F: Fn(&Topology, EH) -> bool,
    {
        self.collect_groups(mesh.topology(), expand, true, &barrier)
    }

    fn collect_groups(
        &self,
        topol: &Topology,
        expand: bool,
        via_edges: bool,
        barrier: &dyn Fn(&Topology, EH) -> bool,
    ) -> Vec<ElementSet<H>> {
        let mut visited = Marks::new(H::element_count(topol));
        let member = self.membership(topol);
        let mut groups = Vec::new();
        let mut stack = Vec::new();
        let mut neighbors = Vec::new();
        for seed in self.iter() {
            if visited.mark(seed) {
                continue;
            }
            let mut current = Vec::new();
            stack.push(seed);
            while let Some(item) = stack.pop() {
                current.push(item);
                neighbors.clear();
                H::neighbors(topol, item, via_edges, &mut neighbors);
                for (next, conn) in neighbors.drain(..) {
                    if visited.check(next) {
                        continue;
                    }
                    if let Some(e) = conn {
                        if barrier(topol, e) {
                            continue;
                        }
                    }
                    if !expand && !member.check(next) {
                        continue;
                    }
                    visited.set(next);
                    stack.push(next);
                }
            }
            groups.push(ElementSet::new(current));
        }
        groups
    }
}

#[cfg(test)]
mod test {
    use super::seam_barrier;
    use crate::{
        element::{EH, Handle, VH},
        set::{EdgeSet, FaceSet, VertexSet},
        topol::test::{quad_box, quad_grid},
    };

    #[test]
    fn t_quad_edges_one_group() {
        let mut topol = crate::topol::Topology::default();
        let mut cache = crate::topol::FaceCache::default();
        let verts: Vec<_> = (0..4).flat_map(|_| topol.add_vertex()).collect();
        topol.add_face(&verts, &mut cache).unwrap();
        let edges = EdgeSet::from_mesh(&topol, false).expect("Cannot build set");
        assert_eq!(edges.len(), 4);
        let groups = edges.group(&topol, false);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 4);
    }

    #[test]
    fn t_group_partition() {
        // Two opposite edges of the box top face, plus the bottom face's
        // edges: the top two are disconnected from each other through the
        // set, the bottom four are one component.
        let qbox = quad_box();
        let e_top_a = qbox.find_edge(4.into(), 5.into()).unwrap();
        let e_top_b = qbox.find_edge(6.into(), 7.into()).unwrap();
        let bottom: Vec<EH> = [(0u32, 1u32), (1, 2), (2, 3), (3, 0)]
            .iter()
            .map(|(a, b)| qbox.find_edge((*a).into(), (*b).into()).unwrap())
            .collect();
        let mut members = vec![e_top_a, e_top_b];
        members.extend(bottom.iter().copied());
        let set = EdgeSet::new(members.clone());
        let groups = set.group(&qbox, false);
        assert_eq!(groups.len(), 3);
        // Pairwise disjoint and collectively the input.
        let mut all: Vec<u32> = groups
            .iter()
            .flat_map(|g| g.iter().map(|e| e.index()))
            .collect();
        all.sort();
        let mut expected: Vec<u32> = members.iter().map(|e| e.index()).collect();
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn t_singleton_group() {
        let qbox = quad_box();
        let set = VertexSet::new(vec![0.into(), 6.into()]);
        // Vertices 0 and 6 are diagonally opposite box corners, not
        // connected by an edge.
        let groups = set.group(&qbox, false);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn t_group_expand_captures_mesh() {
        let qbox = quad_box();
        let set = VertexSet::new(vec![0.into()]);
        let groups = set.group(&qbox, true);
        assert_eq!(groups.len(), 1);
        // The whole box is connected, so expansion pulls in all 8 vertices.
        assert_eq!(groups[0].len(), 8);
    }

    #[test]
    fn t_group_respects_seams() {
        // A 2x1 grid of quads; marking the shared edge as a seam splits the
        // vertex set of both faces into two components of 3 vertices each...
        let grid = quad_grid(2, 1);
        let shared = grid.find_edge(1.into(), 4.into()).unwrap();
        EdgeSet::new(vec![shared])
            .mark_seams(&grid, true)
            .expect("Cannot mark seam");
        let verts = VertexSet::from_mesh(&grid, false).expect("Cannot build set");
        assert_eq!(verts.len(), 6);
        let groups = verts.group_by(&grid, false, seam_barrier);
        // ...vertices 1 and 4 are still joined to either side through the
        // other grid edges, so the set stays one component; without those
        // edges it would split. Check the stricter face variant instead.
        assert_eq!(groups.len(), 1);
        let faces = FaceSet::from_mesh(&grid, false).expect("Cannot build set");
        let fgroups = faces.group_by(&grid, false, seam_barrier);
        assert_eq!(fgroups.len(), 2);
        assert!(fgroups.iter().all(|g| g.len() == 1));
        // Without the barrier the two faces are one component.
        assert_eq!(faces.group(&grid, false).len(), 1);
    }

    #[test]
    fn t_group_faces_share_vertex() {
        // Faces 0 and 5 of the box touch nowhere; faces 0 and 1 share an
        // edge; faces meeting only at a vertex still connect by default.
        let qbox = quad_box();
        let set = FaceSet::new(vec![0.into(), 5.into()]);
        assert_eq!(set.group(&qbox, false).len(), 2);
        let set = FaceSet::new(vec![0.into(), 1.into()]);
        assert_eq!(set.group(&qbox, false).len(), 1);
    }

    #[test]
    fn t_empty_group() {
        let qbox = quad_box();
        assert!(FaceSet::empty().group(&qbox, false).is_empty());
    }

    #[test]
    fn t_group_leaves_status_untouched() {
        // Grouping keeps its visited state in caller-local marks; the
        // mesh-resident tag bits must come out exactly as they went in.
        let qbox = quad_box();
        let set = EdgeSet::from_mesh(&qbox, false).expect("Cannot build set");
        set.tag(&qbox, true).expect("Cannot tag");
        let _ = set.group(&qbox, false);
        for e in qbox.edges() {
            assert!(qbox.edge_status(e).unwrap().tagged());
        }
        set.tag(&qbox, false).expect("Cannot untag");
        let _ = set.group(&qbox, false);
        for e in qbox.edges() {
            assert!(!qbox.edge_status(e).unwrap().tagged());
        }
    }

    #[test]
    fn t_group_vertex_barrier_splits() {
        // A path of 3 vertices along the grid rim; a seam on the middle rim
        // edge splits it in two because rim vertices connect only through
        // rim edges within this set.
        let grid = quad_grid(3, 1);
        let a: VH = 0.into();
        let b: VH = 1.into();
        let c: VH = 2.into();
        let seam = grid.find_edge(a, b).unwrap();
        EdgeSet::new(vec![seam])
            .mark_seams(&grid, true)
            .expect("Cannot mark seam");
        let set = VertexSet::new(vec![a, b, c]);
        let groups = set.group_by(&grid, false, seam_barrier);
        assert_eq!(groups.len(), 2);
        let mut sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        sizes.sort();
        assert_eq!(sizes, [1, 2]);
    }
}
