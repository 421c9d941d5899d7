use glam::{DMat4, DVec2, DVec3, dvec2};

use crate::{
    element::{FH, HasTopology},
    error::Error,
    mesh::Mesh,
    set::{EdgeSet, ElementSet, FaceSet, VertexSet},
};

/// Default pick radius around the cursor, in pixels.
pub const PICK_RADIUS: f64 = 8.0;

/// Screen distances within this tolerance count as a tie and fall through
/// to the camera-distance comparison.
const TIE_EPSILON: f64 = 1e-9;

/// The view of the host viewport: a combined view-projection transform, the
/// viewport size in pixels, and the camera's position and forward direction
/// in world space.
pub struct Camera {
    view_proj: DMat4,
    viewport: DVec2,
    position: DVec3,
    forward: DVec3,
}

impl Camera {
    pub fn new(view_proj: DMat4, viewport: DVec2, position: DVec3, forward: DVec3) -> Self {
        Camera {
            view_proj,
            viewport,
            position,
            forward: forward.normalize_or_zero(),
        }
    }

    /// Project a world-space position to viewport pixel coordinates, with
    /// the origin at the top left. Positions behind the camera project to
    /// `None`.
    pub fn project(&self, p: DVec3) -> Option<DVec2> {
        let clip = self.view_proj * p.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(dvec2(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn view_direction(&self) -> DVec3 {
        self.forward
    }

    pub fn viewport(&self) -> DVec2 {
        self.viewport
    }
}

fn point_in_triangle(p: DVec2, a: DVec2, b: DVec2, c: DVec2) -> bool {
    let d0 = (b - a).perp_dot(p - a);
    let d1 = (c - b).perp_dot(p - b);
    let d2 = (a - c).perp_dot(p - c);
    let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
    let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
    !(has_neg && has_pos)
}

fn point_segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f64::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Resolve the vertex nearest the cursor within `radius` pixels.
///
/// Hidden vertices are ignored. Ties in screen distance go to the vertex
/// nearest the camera. Returns an empty set when nothing is in range.
pub fn pick_vertex(
    mesh: &Mesh,
    world: &DMat4,
    camera: &Camera,
    cursor: DVec2,
    radius: f64,
) -> Result<VertexSet, Error> {
    let topol = mesh.topology();
    let points = mesh.points();
    let points = points.try_borrow()?;
    let status = topol.vertex_statuses();
    let status = status.try_borrow()?;
    let mut best: Option<(_, f64, f64)> = None;
    for v in topol.vertices() {
        if status[v].hidden() {
            continue;
        }
        let wp = world.transform_point3(points[v]);
        let Some(sp) = camera.project(wp) else {
            continue;
        };
        let d = sp.distance(cursor);
        if d > radius {
            continue;
        }
        let cd = wp.distance(camera.position());
        let better = match best {
            None => true,
            Some((_, bd, bcd)) => d < bd - TIE_EPSILON || ((d - bd).abs() <= TIE_EPSILON && cd < bcd),
        };
        if better {
            best = Some((v, d, cd));
        }
    }
    Ok(match best {
        Some((v, _, _)) => ElementSet::new(vec![v]),
        None => ElementSet::empty(),
    })
}

/// Resolve the edge nearest the cursor within `radius` pixels, by 2D
/// point-to-segment distance against the projected edge.
///
/// With `cull_backfacing`, edges whose averaged endpoint normals face away
/// from the camera are skipped. Hidden edges are ignored. Ties in screen
/// distance go to the edge whose midpoint is nearest the camera. Returns an
/// empty set when nothing is in range.
pub fn pick_edge(
    mesh: &Mesh,
    world: &DMat4,
    camera: &Camera,
    cursor: DVec2,
    radius: f64,
    cull_backfacing: bool,
) -> Result<EdgeSet, Error> {
    let topol = mesh.topology();
    let points = mesh.points();
    let points = points.try_borrow()?;
    let status = topol.edge_statuses();
    let status = status.try_borrow()?;
    let mut best: Option<(_, f64, f64)> = None;
    for e in topol.edges() {
        if status[e].hidden() {
            continue;
        }
        let (va, vb) = e.vertices(topol);
        let wa = world.transform_point3(points[va]);
        let wb = world.transform_point3(points[vb]);
        let (Some(sa), Some(sb)) = (camera.project(wa), camera.project(wb)) else {
            continue;
        };
        let d = point_segment_distance(cursor, sa, sb);
        if d > radius {
            continue;
        }
        if cull_backfacing {
            let normal = (mesh.calc_vertex_normal(va, &points)
                + mesh.calc_vertex_normal(vb, &points))
            .normalize_or_zero();
            let normal = world.transform_vector3(normal);
            if normal.dot(camera.view_direction()) >= 0.0 {
                continue;
            }
        }
        let cd = ((wa + wb) * 0.5).distance(camera.position());
        let better = match best {
            None => true,
            Some((_, bd, bcd)) => d < bd - TIE_EPSILON || ((d - bd).abs() <= TIE_EPSILON && cd < bcd),
        };
        if better {
            best = Some((e, d, cd));
        }
    }
    Ok(match best {
        Some((e, _, _)) => ElementSet::new(vec![e]),
        None => ElementSet::empty(),
    })
}

/// Resolve the face under the cursor.
///
/// Every visible face is fan triangulated and the cursor tested for
/// containment against each projected triangle; among the containing
/// triangles the one whose 3D centroid is nearest the camera wins, which
/// resolves overlapping faces without a depth buffer. Returns an empty set
/// when no face contains the cursor.
pub fn pick_face(
    mesh: &Mesh,
    world: &DMat4,
    camera: &Camera,
    cursor: DVec2,
) -> Result<FaceSet, Error> {
    let topol = mesh.topology();
    let points = mesh.points();
    let points = points.try_borrow()?;
    let status = topol.face_statuses();
    let status = status.try_borrow()?;
    let mut best: Option<(FH, f64)> = None;
    for f in topol.faces() {
        if status[f].hidden() {
            continue;
        }
        for [a, b, c] in topol.triangulated_face_vertices(f) {
            let wa = world.transform_point3(points[a]);
            let wb = world.transform_point3(points[b]);
            let wc = world.transform_point3(points[c]);
            let (Some(sa), Some(sb), Some(sc)) =
                (camera.project(wa), camera.project(wb), camera.project(wc))
            else {
                continue;
            };
            if !point_in_triangle(cursor, sa, sb, sc) {
                continue;
            }
            let cd = ((wa + wb + wc) / 3.0).distance(camera.position());
            if best.map(|(_, bcd)| cd < bcd).unwrap_or(true) {
                best = Some((f, cd));
            }
        }
    }
    Ok(match best {
        Some((f, _)) => ElementSet::new(vec![f]),
        None => ElementSet::empty(),
    })
}
