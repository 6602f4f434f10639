// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Indexed triangle mesh with unique vertices and face membership
//!
//! Vertices are deduplicated within `EPS` through a spatial grid keyed by
//! `EPS`-sized cells. Faces live in an arena; removing a face leaves a
//! tombstone so outstanding `FaceId`s never alias a different face.

use super::bound::Bound;
use super::face::{Face, FaceId, FaceState};
use super::vertex::{Vertex, VertexId, VertexState};
use crate::error::{CsgError, Result};
use crate::utils::math::{points_coincide, snap_point, EPS};
use ahash::AHashMap;
use nalgebra::{Matrix4, Point3};

type CellKey = (i64, i64, i64);

fn cell_of(p: &Point3<f64>) -> CellKey {
    (
        (p.x / EPS).floor() as i64,
        (p.y / EPS).floor() as i64,
        (p.z / EPS).floor() as i64,
    )
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    vertices: Vec<Vertex>,
    faces: Vec<Option<Face>>,
    lookup: AHashMap<CellKey, Vec<VertexId>>,
    live_faces: usize,
}

/// Triangle mesh owned by a solid
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Option<Face>>,
    lookup: AHashMap<CellKey, Vec<VertexId>>,
    live_faces: usize,
    snapshots: Vec<Snapshot>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents without any pushed snapshots
    pub fn working_copy(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            faces: self.faces.clone(),
            lookup: self.lookup.clone(),
            live_faces: self.live_faces,
            snapshots: Vec::new(),
        }
    }

    /// Drop every face and vertex
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.lookup.clear();
        self.live_faces = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.live_faces == 0
    }

    // ---- vertices ----

    /// Find the vertex within `EPS` of a position
    pub fn find_vertex(&self, position: &Point3<f64>) -> Option<VertexId> {
        let position = snap_point(position);
        let (cx, cy, cz) = cell_of(&position);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.lookup.get(&(
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    )) else {
                        continue;
                    };
                    if let Some(id) = bucket
                        .iter()
                        .find(|id| points_coincide(self.vertices[id.index()].position(), &position))
                    {
                        return Some(*id);
                    }
                }
            }
        }
        None
    }

    /// The unique vertex at a position, created in state `Unknown` if absent
    pub fn vertex_at(&mut self, position: Point3<f64>) -> VertexId {
        if let Some(id) = self.find_vertex(&position) {
            return id;
        }
        let vertex = Vertex::new(position);
        let id = VertexId(self.vertices.len() as u32);
        self.lookup.entry(cell_of(vertex.position())).or_default().push(id);
        self.vertices.push(vertex);
        id
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Vertices referenced by at least one live face
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_orphan())
            .map(|(i, v)| (VertexId(i as u32), v))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().count()
    }

    /// Set the state of an `Unknown` vertex and flood it through face membership.
    ///
    /// Classified vertices are never changed, and `Boundary` vertices stop the
    /// flood, so only `Inside` and `Outside` propagate.
    pub fn classify(&mut self, id: VertexId, state: VertexState) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let vertex = &mut self.vertices[current.index()];
            if vertex.state() != VertexState::Unknown {
                continue;
            }
            vertex.set_state(state);
            if state == VertexState::Boundary || state == VertexState::Unknown {
                continue;
            }
            for face_id in self.vertices[current.index()].members() {
                if let Some(face) = &self.faces[face_id.index()] {
                    pending.extend(
                        face.vertices()
                            .into_iter()
                            .filter(|v| self.vertices[v.index()].state() == VertexState::Unknown),
                    );
                }
            }
        }
    }

    /// Mark a vertex as lying on the cut, whatever its current state
    pub fn mark_boundary(&mut self, id: VertexId) {
        self.vertices[id.index()].set_state(VertexState::Boundary);
    }

    /// Reset every vertex and face to `Unknown`
    pub fn reset_classification(&mut self) {
        for vertex in &mut self.vertices {
            vertex.set_state(VertexState::Unknown);
        }
        for face in self.faces.iter_mut().flatten() {
            face.set_state(FaceState::Unknown);
        }
    }

    // ---- faces ----

    /// Add a face by positions; fails on coincident or collinear vertices
    pub fn add_face(
        &mut self,
        a: Point3<f64>,
        b: Point3<f64>,
        c: Point3<f64>,
    ) -> Result<FaceId> {
        for p in [&a, &b, &c] {
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(CsgError::invalid(format!("non-finite vertex {:?}", p)));
            }
        }
        let ids = [self.vertex_at(a), self.vertex_at(b), self.vertex_at(c)];
        self.insert_face(ids).ok_or_else(|| {
            CsgError::invalid(format!(
                "degenerate face ({:?}, {:?}, {:?}): vertices coincide or are collinear",
                a, b, c
            ))
        })
    }

    /// Add a face over existing vertices; `None` when the triangle is degenerate
    pub(crate) fn insert_face(&mut self, ids: [VertexId; 3]) -> Option<FaceId> {
        let points = ids.map(|id| *self.vertices[id.index()].position());
        let face = Face::new(ids, points)?;
        let id = FaceId(self.faces.len() as u32);
        for vertex in ids {
            self.vertices[vertex.index()].add_member(id);
        }
        self.faces.push(Some(face));
        self.live_faces += 1;
        Some(id)
    }

    /// Remove a face, detaching it from its vertices' membership
    pub fn remove_face(&mut self, id: FaceId) -> Option<Face> {
        let face = self.faces.get_mut(id.index())?.take()?;
        for vertex in face.vertices() {
            self.vertices[vertex.index()].remove_member(id);
        }
        self.live_faces -= 1;
        Some(face)
    }

    /// Replace a face with the given triangles. Degenerate triangles are dropped.
    pub(crate) fn replace_face(&mut self, id: FaceId, triangles: &[[VertexId; 3]]) -> Vec<FaceId> {
        self.remove_face(id);
        triangles
            .iter()
            .filter_map(|ids| self.insert_face(*ids))
            .collect()
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.index()).and_then(|f| f.as_ref())
    }

    /// Live faces in insertion order
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_ref().map(|face| (FaceId(i as u32), face)))
    }

    pub fn face_ids(&self) -> Vec<FaceId> {
        self.faces().map(|(id, _)| id).collect()
    }

    pub fn face_count(&self) -> usize {
        self.live_faces
    }

    /// Size of the face arena, tombstones included
    pub(crate) fn face_slots(&self) -> usize {
        self.faces.len()
    }

    pub(crate) fn set_face_state(&mut self, id: FaceId, state: FaceState) {
        if let Some(face) = self.faces.get_mut(id.index()).and_then(|f| f.as_mut()) {
            face.set_state(state);
        }
    }

    /// Flip a face's winding. A face may be inverted only once per operation.
    pub fn invert_face(&mut self, id: FaceId) -> Result<()> {
        let face = self
            .faces
            .get_mut(id.index())
            .and_then(|f| f.as_mut())
            .ok_or_else(|| CsgError::illegal(format!("face {} does not exist", id.index())))?;
        if face.is_inverted() {
            return Err(CsgError::illegal(format!(
                "face {} is already inverted",
                id.index()
            )));
        }
        face.invert();
        Ok(())
    }

    /// Copy a face of another mesh into this one. New vertices keep the
    /// source vertex state; the copied face starts `Unknown`.
    pub(crate) fn copy_face_from(&mut self, other: &Mesh, id: FaceId) -> Option<FaceId> {
        let face = other.face(id)?;
        let ids = face.vertices().map(|source| {
            let source = other.vertex(source);
            match self.find_vertex(source.position()) {
                Some(existing) => existing,
                None => {
                    let created = self.vertex_at(*source.position());
                    self.vertices[created.index()].set_state(source.state());
                    created
                }
            }
        });
        self.insert_face(ids)
    }

    /// Union of all live face bounds
    pub fn bound(&self) -> Bound {
        self.faces()
            .fold(Bound::empty(), |bound, (_, face)| bound.union(face.bound()))
    }

    /// Compacted copy with tombstones and orphan vertices dropped
    pub fn compact(&self) -> Mesh {
        let mut mesh = Mesh::new();
        for (id, face) in self.faces() {
            if let Some(copied) = mesh.copy_face_from(self, id) {
                mesh.set_face_state(copied, face.state());
            }
        }
        mesh
    }

    /// Copy with every vertex mapped through an affine matrix. Mirroring
    /// matrices flip the winding so normals stay outward.
    pub fn transformed(&self, matrix: &Matrix4<f64>) -> Mesh {
        let mirror = matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0;
        let mut mesh = Mesh::new();
        for (_, face) in self.faces() {
            let [a, b, c] = face.points().map(|p| matrix.transform_point(&p));
            let ids = if mirror {
                [mesh.vertex_at(a), mesh.vertex_at(c), mesh.vertex_at(b)]
            } else {
                [mesh.vertex_at(a), mesh.vertex_at(b), mesh.vertex_at(c)]
            };
            if mesh.insert_face(ids).is_none() {
                log::debug!("transform collapsed a face; dropping it");
            }
        }
        mesh
    }

    // ---- snapshots ----

    /// Start a nested construction scope
    pub fn push(&mut self) {
        self.snapshots.push(Snapshot {
            vertices: self.vertices.clone(),
            faces: self.faces.clone(),
            lookup: self.lookup.clone(),
            live_faces: self.live_faces,
        });
    }

    /// Discard everything added since the matching `push`
    pub fn pop(&mut self) -> Result<()> {
        let snapshot = self
            .snapshots
            .pop()
            .ok_or_else(|| CsgError::illegal("pop without a matching push"))?;
        self.vertices = snapshot.vertices;
        self.faces = snapshot.faces;
        self.lookup = snapshot.lookup;
        self.live_faces = snapshot.live_faces;
        Ok(())
    }

    /// Keep everything added since the matching `push`
    pub fn commit(&mut self) -> Result<()> {
        self.snapshots
            .pop()
            .map(|_| ())
            .ok_or_else(|| CsgError::illegal("commit without a matching push"))
    }

    /// Number of open construction scopes
    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        let o = Point3::new(0.0, 0.0, 0.0);
        let x = Point3::new(1.0, 0.0, 0.0);
        let y = Point3::new(0.0, 1.0, 0.0);
        let z = Point3::new(0.0, 0.0, 1.0);
        mesh.add_face(o, y, x).unwrap();
        mesh.add_face(o, x, z).unwrap();
        mesh.add_face(o, z, y).unwrap();
        mesh.add_face(x, y, z).unwrap();
        mesh
    }

    #[test]
    fn test_vertices_are_unique() {
        let mesh = tetrahedron();
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.vertex_count(), 4);

        let origin = mesh.find_vertex(&Point3::new(EPS / 3.0, 0.0, 0.0)).unwrap();
        assert_eq!(mesh.vertex(origin).members().len(), 3);
    }

    #[test]
    fn test_vertex_lookup_across_cells() {
        let mut mesh = Mesh::new();
        let a = mesh.vertex_at(Point3::new(1.0, 1.0, 1.0));
        let b = mesh.vertex_at(Point3::new(1.0 + 0.9 * EPS, 1.0 - 0.9 * EPS, 1.0));
        assert_eq!(a, b);
        let c = mesh.vertex_at(Point3::new(1.0 + 1e-6, 1.0, 1.0));
        assert_ne!(a, c);
    }

    #[test]
    fn test_lookup_far_from_origin() {
        let mut mesh = Mesh::new();
        let id = mesh
            .add_face(
                Point3::new(1e11, 0.0, 0.0),
                Point3::new(1e11 + 1.0, 0.0, 0.0),
                Point3::new(1e11, 1.0, 0.0),
            )
            .unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.face(id).is_some());
        assert_eq!(mesh.find_vertex(&Point3::new(-1e11, 0.0, 0.0)), None);
        let far = mesh.find_vertex(&Point3::new(1e11 + 1.0, 0.0, 0.0));
        assert_eq!(far, Some(mesh.face(id).unwrap().vertices()[1]));
    }

    #[test]
    fn test_degenerate_face_is_rejected() {
        let mut mesh = Mesh::new();
        let p = Point3::new(0.0, 0.0, 0.0);
        let err = mesh.add_face(p, Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        assert!(matches!(err, Err(CsgError::InvalidArgument(_))));
        assert!(mesh.add_face(p, p, Point3::new(1.0, 1.0, 0.0)).is_err());
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_remove_face_updates_membership() {
        let mut mesh = tetrahedron();
        let first = mesh.face_ids()[0];
        let removed = mesh.remove_face(first).unwrap();
        assert_eq!(mesh.face_count(), 3);
        assert!(mesh.face(first).is_none());
        for v in removed.vertices() {
            assert!(!mesh.vertex(v).members().contains(&first));
        }
        assert!(mesh.remove_face(first).is_none());
    }

    #[test]
    fn test_classify_is_sticky_and_floods() {
        let mut mesh = tetrahedron();
        let ids: Vec<VertexId> = mesh.vertices().map(|(id, _)| id).collect();
        mesh.mark_boundary(ids[3]);

        mesh.classify(ids[0], VertexState::Inside);
        assert_eq!(mesh.vertex(ids[1]).state(), VertexState::Inside);
        assert_eq!(mesh.vertex(ids[2]).state(), VertexState::Inside);
        assert_eq!(mesh.vertex(ids[3]).state(), VertexState::Boundary);

        mesh.classify(ids[0], VertexState::Outside);
        assert_eq!(mesh.vertex(ids[0]).state(), VertexState::Inside);
    }

    #[test]
    fn test_push_pop_restores_contents() {
        let mut mesh = tetrahedron();
        mesh.push();
        mesh.add_face(
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(6.0, 0.0, 0.0),
            Point3::new(5.0, 1.0, 0.0),
        )
        .unwrap();
        assert_eq!(mesh.face_count(), 5);
        mesh.pop().unwrap();
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.find_vertex(&Point3::new(5.0, 0.0, 0.0)).is_none());

        mesh.push();
        mesh.commit().unwrap();
        assert!(mesh.pop().is_err());
    }

    #[test]
    fn test_invert_once() {
        let mut mesh = tetrahedron();
        let id = mesh.face_ids()[0];
        mesh.invert_face(id).unwrap();
        assert!(matches!(mesh.invert_face(id), Err(CsgError::IllegalState(_))));
    }

    #[test]
    fn test_mirror_transform_keeps_outward_normals() {
        let mesh = tetrahedron();
        let mirror = Matrix4::new_nonuniform_scaling(&nalgebra::Vector3::new(-1.0, 1.0, 1.0));
        let mirrored = mesh.transformed(&mirror);
        assert_eq!(mirrored.face_count(), 4);
        let center = Point3::new(-0.25, 0.25, 0.25);
        for (_, face) in mirrored.faces() {
            assert!(face.normal().dot(&(face.centroid() - center)) > 0.0);
        }
    }

    #[test]
    fn test_compact_drops_tombstones() {
        let mut mesh = tetrahedron();
        mesh.remove_face(mesh.face_ids()[1]);
        let compacted = mesh.compact();
        assert_eq!(compacted.face_count(), 3);
        assert_eq!(compacted.face_slots(), 3);
    }
}
