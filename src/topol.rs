use crate::{
    element::{Edge, EH, Face, FH, Halfedge, Handle, HH, Vertex, VH},
    error::Error,
    iterator,
    property::{Property, PropertyContainer},
    status::Status,
};

/// One side of the polygon being inserted by
/// [`add_face`](Topology::add_face): either a halfedge that already exists,
/// or a fresh one whose links are resolved while walking the polygon.
enum PendingEdge {
    Known(HH),
    Fresh {
        index: u32,
        from: VH,
        to: VH,
        prev: Option<HH>,
        next: Option<HH>,
        opp_prev: Option<HH>,
        opp_next: Option<HH>,
    },
}

/// Scratch buffers reused across [`add_face`](Topology::add_face) calls.
#[derive(Default)]
pub struct FaceCache {
    found: Vec<Option<HH>>,
    adjust: Vec<bool>,
    links: Vec<(HH, HH)>,
    pending: Vec<PendingEdge>,
    halfedges: Vec<HH>,
}

impl FaceCache {
    fn clear(&mut self) {
        self.found.clear();
        self.adjust.clear();
        self.links.clear();
        self.pending.clear();
        self.halfedges.clear();
    }
}

/// Halfedge connectivity of a polygon mesh, with per-element status bits and
/// property registries.
///
/// This topology is build-only: faces and vertices can be added but never
/// removed, so element handles stay valid for the life of the mesh.
pub struct Topology {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    vprops: PropertyContainer<VH>,
    hprops: PropertyContainer<HH>,
    eprops: PropertyContainer<EH>,
    fprops: PropertyContainer<FH>,
    vstatus: Property<VH, Status>,
    hstatus: Property<HH, Status>,
    estatus: Property<EH, Status>,
    fstatus: Property<FH, Status>,
}

impl Topology {
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    pub fn with_capacity(nverts: usize, nedges: usize, nfaces: usize) -> Self {
        let mut vprops = PropertyContainer::new();
        let mut hprops = PropertyContainer::new();
        let mut eprops = PropertyContainer::new();
        let mut fprops = PropertyContainer::new();
        let vstatus = Property::new(&mut vprops, Status::default());
        let hstatus = Property::new(&mut hprops, Status::default());
        let estatus = Property::new(&mut eprops, Status::default());
        let fstatus = Property::new(&mut fprops, Status::default());
        Topology {
            vertices: Vec::with_capacity(nverts),
            edges: Vec::with_capacity(nedges),
            faces: Vec::with_capacity(nfaces),
            vprops,
            hprops,
            eprops,
            fprops,
            vstatus,
            hstatus,
            estatus,
            fstatus,
        }
    }

    pub fn create_vertex_prop<T: Clone + Copy + 'static>(&mut self, default: T) -> Property<VH, T> {
        Property::new(&mut self.vprops, default)
    }

    pub fn create_halfedge_prop<T: Clone + Copy + 'static>(
        &mut self,
        default: T,
    ) -> Property<HH, T> {
        Property::new(&mut self.hprops, default)
    }

    pub fn create_edge_prop<T: Clone + Copy + 'static>(&mut self, default: T) -> Property<EH, T> {
        Property::new(&mut self.eprops, default)
    }

    pub fn create_face_prop<T: Clone + Copy + 'static>(&mut self, default: T) -> Property<FH, T> {
        Property::new(&mut self.fprops, default)
    }

    fn vertex(&self, v: VH) -> &Vertex {
        &self.vertices[v.index() as usize]
    }

    fn vertex_mut(&mut self, v: VH) -> &mut Vertex {
        &mut self.vertices[v.index() as usize]
    }

    fn halfedge(&self, h: HH) -> &Halfedge {
        &self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    fn halfedge_mut(&mut self, h: HH) -> &mut Halfedge {
        &mut self.edges[(h.index() >> 1) as usize].halfedges[(h.index() & 1) as usize]
    }

    fn face_mut(&mut self, f: FH) -> &mut Face {
        &mut self.faces[f.index() as usize]
    }

    pub fn vertex_halfedge(&self, v: VH) -> Option<HH> {
        self.vertex(v).halfedge
    }

    /// The vertex this halfedge points at.
    pub fn head_vertex(&self, h: HH) -> VH {
        self.halfedge(h).vertex
    }

    /// The vertex this halfedge points away from.
    pub fn tail_vertex(&self, h: HH) -> VH {
        self.halfedge(self.opposite_halfedge(h)).vertex
    }

    pub fn prev_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).prev
    }

    pub fn next_halfedge(&self, h: HH) -> HH {
        self.halfedge(h).next
    }

    pub fn halfedge_face(&self, h: HH) -> Option<FH> {
        self.halfedge(h).face
    }

    pub fn halfedge_edge(&self, h: HH) -> EH {
        (h.index() >> 1).into()
    }

    pub fn edge_halfedge(&self, e: EH, flag: bool) -> HH {
        ((e.index() << 1) | u32::from(flag)).into()
    }

    pub fn face_halfedge(&self, f: FH) -> HH {
        self.faces[f.index() as usize].halfedge
    }

    pub fn opposite_halfedge(&self, h: HH) -> HH {
        (h.index() ^ 1).into()
    }

    /// The next outgoing halfedge when rotating clockwise around the tail
    /// vertex of `h`.
    pub fn cw_rotated_halfedge(&self, h: HH) -> HH {
        self.halfedge(self.opposite_halfedge(h)).next
    }

    /// The next outgoing halfedge when rotating counter-clockwise around the
    /// tail vertex of `h`.
    pub fn ccw_rotated_halfedge(&self, h: HH) -> HH {
        self.opposite_halfedge(self.halfedge(h).prev)
    }

    pub fn is_boundary_halfedge(&self, h: HH) -> bool {
        self.halfedge(h).face.is_none()
    }

    pub fn is_boundary_edge(&self, e: EH) -> bool {
        let h = self.edge_halfedge(e, false);
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(self.opposite_halfedge(h))
    }

    pub fn is_boundary_vertex(&self, v: VH) -> bool {
        match self.vertex(v).halfedge {
            Some(h) => self.is_boundary_halfedge(h),
            None => true,
        }
    }

    pub fn is_manifold_vertex(&self, v: VH) -> bool {
        /* If just the first outgoing halfedge is on the boundary, it just
         * means the vertex is on the boundary. If any outgoing halfedge apart
         * from the first is on the boundary, there is more than one gap when
         * circulating around the vertex, making it non-manifold. For this
         * reason, we skip the first halfedge and check the rest.
         */
        iterator::voh_iter(self, v)
            .skip(1)
            .all(|h| !self.is_boundary_halfedge(h))
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.num_edges() * 2
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> {
        (0..(self.num_vertices() as u32)).map(|i| i.into())
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> {
        (0..(self.num_halfedges() as u32)).map(|i| i.into())
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> {
        (0..(self.num_edges() as u32)).map(|i| i.into())
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> {
        (0..(self.num_faces() as u32)).map(|i| i.into())
    }

    /// Find the halfedge going from vertex `from` to vertex `to`, if any.
    pub fn find_halfedge(&self, from: VH, to: VH) -> Option<HH> {
        iterator::voh_iter(self, from).find(|h| self.head_vertex(*h) == to)
    }

    /// Find the edge connecting the two given vertices.
    ///
    /// Unlike [`find_halfedge`](Self::find_halfedge), the absence of such an
    /// edge is reported as [`Error::EdgeNotFound`] so callers can propagate
    /// it.
    pub fn find_edge(&self, a: VH, b: VH) -> Result<EH, Error> {
        self.find_halfedge(a, b)
            .map(|h| self.halfedge_edge(h))
            .ok_or(Error::EdgeNotFound(a, b))
    }

    pub fn vertex_valence(&self, v: VH) -> usize {
        iterator::voh_iter(self, v).count()
    }

    pub fn face_valence(&self, f: FH) -> usize {
        iterator::fh_iter(self, f).count()
    }

    pub fn vertex_status(&self, v: VH) -> Result<Status, Error> {
        self.vstatus.get_cloned(v)
    }

    pub fn halfedge_status(&self, h: HH) -> Result<Status, Error> {
        self.hstatus.get_cloned(h)
    }

    pub fn edge_status(&self, e: EH) -> Result<Status, Error> {
        self.estatus.get_cloned(e)
    }

    pub fn face_status(&self, f: FH) -> Result<Status, Error> {
        self.fstatus.get_cloned(f)
    }

    /// The status property shared by all vertices. The returned handle is a
    /// cheap clone pointing at the same buffer.
    pub fn vertex_statuses(&self) -> Property<VH, Status> {
        self.vstatus.clone()
    }

    pub fn halfedge_statuses(&self) -> Property<HH, Status> {
        self.hstatus.clone()
    }

    pub fn edge_statuses(&self) -> Property<EH, Status> {
        self.estatus.clone()
    }

    pub fn face_statuses(&self) -> Property<FH, Status> {
        self.fstatus.clone()
    }

    pub fn voh_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::voh_iter(self, v)
    }

    pub fn vih_iter(&self, v: VH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::vih_iter(self, v)
    }

    pub fn vv_iter(&self, v: VH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::vv_iter(self, v)
    }

    pub fn ve_iter(&self, v: VH) -> impl Iterator<Item = EH> + use<'_> {
        iterator::ve_iter(self, v)
    }

    pub fn vf_iter(&self, v: VH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::vf_iter(self, v)
    }

    pub fn ev_iter(&self, e: EH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::ev_iter(self, e)
    }

    pub fn eh_iter(&self, e: EH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::eh_iter(self, e)
    }

    pub fn ef_iter(&self, e: EH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::ef_iter(self, e)
    }

    pub fn fh_iter(&self, f: FH) -> impl Iterator<Item = HH> + use<'_> {
        iterator::fh_iter(self, f)
    }

    pub fn fv_iter(&self, f: FH) -> impl Iterator<Item = VH> + use<'_> {
        iterator::fv_iter(self, f)
    }

    pub fn fe_iter(&self, f: FH) -> impl Iterator<Item = EH> + use<'_> {
        iterator::fe_iter(self, f)
    }

    pub fn ff_iter(&self, f: FH) -> impl Iterator<Item = FH> + use<'_> {
        iterator::ff_iter(self, f)
    }

    /// Fan triangulation of a face, as vertex triples. The face itself is not
    /// modified.
    pub fn triangulated_face_vertices(&self, f: FH) -> impl Iterator<Item = [VH; 3]> + use<'_> {
        let hstart = self.face_halfedge(f);
        let vstart = self.tail_vertex(hstart);
        iterator::loop_iter(self, self.next_halfedge(hstart))
            .take_while(move |h| self.head_vertex(*h) != vstart)
            .map(move |h| [vstart, self.tail_vertex(h), self.head_vertex(h)])
    }

    fn set_vertex_halfedge(&mut self, v: VH, h: HH) {
        self.vertex_mut(v).halfedge = Some(h);
    }

    fn link_halfedges(&mut self, hprev: HH, hnext: HH) {
        self.halfedge_mut(hprev).next = hnext;
        self.halfedge_mut(hnext).prev = hprev;
    }

    /// Point the vertex at a boundary outgoing halfedge if one exists, so
    /// that boundary circulation starts at the gap.
    fn adjust_outgoing_halfedge(&mut self, v: VH) {
        let h = iterator::voh_iter(self, v).find(|h| self.is_boundary_halfedge(*h));
        if let Some(h) = h {
            self.set_vertex_halfedge(v, h)
        }
    }

    pub fn add_vertex(&mut self) -> Result<VH, Error> {
        let vi = self.vertices.len() as u32;
        self.vprops.push_value()?;
        self.vertices.push(Vertex { halfedge: None });
        Ok(vi.into())
    }

    fn new_edge(
        &mut self,
        from: VH,
        to: VH,
        prev: HH,
        next: HH,
        opp_prev: HH,
        opp_next: HH,
    ) -> Result<EH, Error> {
        let ei = self.edges.len() as u32;
        self.eprops.push_value()?;
        self.hprops.push_values(2)?;
        self.edges.push(Edge {
            halfedges: [
                Halfedge {
                    face: None,
                    vertex: to,
                    next,
                    prev,
                },
                Halfedge {
                    face: None,
                    vertex: from,
                    next: opp_next,
                    prev: opp_prev,
                },
            ],
        });
        Ok(ei.into())
    }

    fn new_face(&mut self, halfedge: HH) -> Result<FH, Error> {
        let fi = self.faces.len() as u32;
        self.fprops.push_value()?;
        self.faces.push(Face { halfedge });
        Ok(fi.into())
    }

    /// Add a face spanning the given vertices, in counter-clockwise order.
    ///
    /// The insertion is manifold-preserving: it fails with
    /// [`Error::ComplexVertex`] / [`Error::ComplexHalfedge`] when the face
    /// would make a vertex or edge non-manifold, and relinks existing
    /// boundary loops around vertices that already have more than two
    /// incident boundary edges.
    pub fn add_face(&mut self, verts: &[VH], cache: &mut FaceCache) -> Result<FH, Error> {
        cache.clear();
        cache.found.reserve(verts.len());
        cache.adjust.reserve(verts.len());
        cache.links.reserve(verts.len() * 6);
        // Check for topological errors.
        for i in 0..verts.len() {
            if !self.is_boundary_vertex(verts[i]) {
                return Err(Error::ComplexVertex(verts[i]));
            }
            let h = self.find_halfedge(verts[i], verts[(i + 1) % verts.len()]);
            match h {
                Some(h) if !self.is_boundary_halfedge(h) => return Err(Error::ComplexHalfedge(h)),
                _ => {}
            }
            cache.found.push(h);
            cache.adjust.push(false);
        }
        // Vertices with more than two incident boundary edges may need their
        // boundary loops relinked before the new face can close the gap.
        for (prev, next) in (0..verts.len()).filter_map(|i| {
            match (cache.found[i], cache.found[(i + 1) % verts.len()]) {
                (Some(prev), Some(next)) if self.next_halfedge(prev) != next => Some((prev, next)),
                _ => None,
            }
        }) {
            let boundprev = {
                let mut out = self.opposite_halfedge(next);
                loop {
                    out = self.opposite_halfedge(self.next_halfedge(out));
                    if self.is_boundary_halfedge(out) {
                        break;
                    }
                }
                out
            };
            let boundnext = self.next_halfedge(boundprev);
            if boundprev == prev {
                return Err(Error::PatchRelinkingFailed);
            }
            debug_assert!(
                self.is_boundary_halfedge(boundprev) && self.is_boundary_halfedge(boundnext)
            );
            let pstart = self.next_halfedge(prev);
            let pend = self.prev_halfedge(next);
            cache.links.extend_from_slice(&[
                (boundprev, pstart),
                (pend, boundnext),
                (prev, next),
            ]);
        }
        // Reserve halfedge indices for the edges that don't exist yet. No
        // more errors allowed from this point; if anything goes wrong below,
        // we panic.
        cache.pending.reserve(verts.len());
        {
            let mut ei = self.edges.len() as u32;
            cache
                .pending
                .extend((0..verts.len()).map(|i| match cache.found[i] {
                    Some(h) => PendingEdge::Known(h),
                    None => PendingEdge::Fresh {
                        index: {
                            let current = ei;
                            ei += 1;
                            current << 1
                        },
                        from: verts[i],
                        to: verts[(i + 1) % verts.len()],
                        prev: None,
                        next: None,
                        opp_prev: None,
                        opp_next: None,
                    },
                }));
        }
        // Walk the polygon corners and resolve the links of fresh edges.
        for (i, j) in (0..verts.len()).map(|i| (i, (i + 1) % verts.len())) {
            let (e0, e1) = if j == 0 {
                let (rest, last) = cache.pending.split_at_mut(i);
                (&mut last[0], &mut rest[0])
            } else {
                let (left, right) = cache.pending.split_at_mut(j);
                (&mut left[left.len() - 1], &mut right[0])
            };
            let v = verts[j];
            match (e0, e1) {
                (PendingEdge::Known(_), PendingEdge::Known(innernext)) => {
                    cache.adjust[j] = self.vertex_halfedge(v) == Some(*innernext);
                }
                (
                    PendingEdge::Fresh {
                        index: innerprev,
                        opp_prev,
                        next,
                        ..
                    },
                    PendingEdge::Known(innernext),
                ) => {
                    let innernext = *innernext;
                    let innerprev = (*innerprev).into();
                    let outernext = self.opposite_halfedge(innerprev);
                    let boundprev = self.prev_halfedge(innernext);
                    cache.links.push((boundprev, outernext));
                    *opp_prev = Some(boundprev);
                    cache.links.push((innerprev, innernext));
                    *next = Some(innernext);
                    self.set_vertex_halfedge(v, outernext);
                }
                (
                    PendingEdge::Known(innerprev),
                    PendingEdge::Fresh {
                        index: innernext,
                        prev,
                        opp_next,
                        ..
                    },
                ) => {
                    let innerprev = *innerprev;
                    let innernext = (*innernext).into();
                    let outerprev = self.opposite_halfedge(innernext);
                    let boundnext = self.next_halfedge(innerprev);
                    cache.links.push((outerprev, boundnext));
                    *opp_next = Some(boundnext);
                    cache.links.push((innerprev, innernext));
                    *prev = Some(innerprev);
                    self.set_vertex_halfedge(v, boundnext);
                }
                (
                    PendingEdge::Fresh {
                        index: innerprev,
                        next,
                        opp_prev,
                        ..
                    },
                    PendingEdge::Fresh {
                        index: innernext,
                        prev,
                        opp_next,
                        ..
                    },
                ) => {
                    let innerprev = (*innerprev).into();
                    let innernext = (*innernext).into();
                    let outernext = self.opposite_halfedge(innerprev);
                    let outerprev = self.opposite_halfedge(innernext);
                    if let Some(boundnext) = self.vertex_halfedge(v) {
                        let boundprev = self.prev_halfedge(boundnext);
                        cache
                            .links
                            .extend(&[(boundprev, outernext), (outerprev, boundnext)]);
                        *next = Some(innernext);
                        *opp_prev = Some(boundprev);
                        *prev = Some(innerprev);
                        *opp_next = Some(boundnext);
                    } else {
                        self.set_vertex_halfedge(v, outernext);
                        *next = Some(innernext);
                        *opp_prev = Some(outerprev);
                        *prev = Some(innerprev);
                        *opp_next = Some(outernext);
                    }
                }
            };
        }
        // Materialize the fresh edges.
        cache.halfedges.reserve(cache.pending.len());
        const ERR: &str = "Unable to create edge loop";
        for pedge in &cache.pending {
            let h = match pedge {
                PendingEdge::Known(h) => *h,
                PendingEdge::Fresh {
                    index,
                    from,
                    to,
                    prev,
                    next,
                    opp_prev,
                    opp_next,
                } => {
                    let ei = self.new_edge(
                        *from,
                        *to,
                        prev.expect(ERR),
                        next.expect(ERR),
                        opp_prev.expect(ERR),
                        opp_next.expect(ERR),
                    )?;
                    assert_eq!(*index >> 1, ei.index(), "Failed to create an edge loop");
                    (*index).into()
                }
            };
            cache.halfedges.push(h);
        }
        // Create the face.
        let fnew = self.new_face(match cache.pending.last().expect(ERR) {
            PendingEdge::Known(h) => *h,
            PendingEdge::Fresh { index, .. } => (*index).into(),
        })?;
        for h in &cache.halfedges {
            self.halfedge_mut(*h).face = Some(fnew);
        }
        // Apply the deferred links.
        for (prev, next) in cache.links.drain(..) {
            self.link_halfedges(prev, next);
        }
        // Adjust vertices' outgoing halfedges.
        for i in 0..verts.len() {
            if cache.adjust[i] {
                self.adjust_outgoing_halfedge(verts[i]);
            }
        }
        Ok(fnew)
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}
