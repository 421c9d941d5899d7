/*!
Element sets and selection topology for halfedge polygon meshes.

This crate is the topology layer a mesh/UV editing toolkit is built on. It
does not edit geometry itself: it answers the questions every editing
operator asks first, over a live halfedge mesh.

# Overview

+ The four element-set types ([`VertexSet`], [`EdgeSet`], [`FaceSet`] and
  [`CornerSet`]) are ordered, duplicate-free views over the elements of a
  [`Mesh`]. They are built from the current selection
  ([`ElementSet::from_selection`]), from the whole mesh
  ([`ElementSet::from_mesh`]), or from a screen-space pick
  ([`pick_vertex`] / [`pick_edge`] / [`pick_face`]), and project to
  adjacent kinds (`.vertices()`, `.edges()`, `.faces()`, `.corners()`).

+ Graph algorithms over those sets:

  + [`ElementSet::group`] partitions a set into connected components, with
    optional seam barriers and opt-in growth past the input membership.

  + [`EdgeSet::chains`] reconstructs ordered vertex paths and cycles
    ([`Chain`]) from an unordered edge set.

  + [`edge_loop`] and [`edge_ring`] extend a single edge into a full loop
    (through regular-valence vertices) or ring (across quad strips).

  + [`FaceSet::uv_islands`] splits a face set into UV islands under the
    componentwise almost-equal continuity test.

+ Traversals keep their visited state in caller-local [`Marks`], never in a
  scratch flag on the shared mesh, so they are reentrant and leave all
  per-element status bits exactly as they found them. The mesh-resident
  `tagged` bit stays available to callers through [`ElementSet::tag`].

+ Meshes are built through [`Mesh::add_vertex`] / [`Mesh::add_face`] or
  loaded from OBJ files (with UV channels) via [`Mesh::load_obj`]. The
  topology is build-only: handles stay valid for the life of the mesh.
*/

mod chain;
mod element;
mod error;
mod group;
mod island;
mod iterator;
mod loops;
mod macros;
mod marks;
mod mesh;
mod obj;
mod pick;
mod property;
mod set;
mod status;
mod topol;

pub use chain::Chain;
pub use element::{EH, FH, HH, Handle, HasTopology, VH};
pub use error::Error;
pub use group::seam_barrier;
pub use island::{UV_EPSILON, uv_almost_equal};
pub use loops::{LoopRule, edge_loop, edge_ring};
pub use marks::Marks;
pub use mesh::Mesh;
pub use pick::{Camera, PICK_RADIUS, pick_edge, pick_face, pick_vertex};
pub use property::{PropBuf, Property};
pub use set::{CornerSet, EdgeSet, ElementSet, FaceSet, SetElement, VertexSet};
pub use status::Status;
pub use topol::{FaceCache, Topology};
