// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solids: named meshes with construction provenance and render buffers

use super::boolean::{assemble, BooleanOp};
use super::bound::Bound;
use super::classify::classify_faces;
use super::face::FaceId;
use super::intersection::split_faces;
use super::mesh::Mesh;
use crate::config::CsgConfig;
use crate::error::{CsgError, Result};
use nalgebra::{Matrix4, Point3, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The operation and operands a solid was built from
#[derive(Debug, Clone)]
pub struct Provenance {
    pub op: BooleanOp,
    pub a: Arc<Solid>,
    pub b: Arc<Solid>,
}

/// Flat triangle-list buffers ready for a renderer: nine floats per face in
/// each array, every corner carrying its face normal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledSolid {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
}

impl CompiledSolid {
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 9
    }

    /// Corners of each triangle
    pub fn triangles(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.positions.chunks_exact(9).map(|c| {
            [[c[0], c[1], c[2]], [c[3], c[4], c[5]], [c[6], c[7], c[8]]]
        })
    }

    /// Normal of each triangle
    pub fn face_normals(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.normals.chunks_exact(9).map(|c| [c[0], c[1], c[2]])
    }
}

/// A closed triangle-mesh solid
#[derive(Debug, Clone, Default)]
pub struct Solid {
    name: String,
    mesh: Mesh,
    provenance: Option<Provenance>,
    compiled: Option<CompiledSolid>,
}

impl Solid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::new("Empty")
    }

    /// Build a solid from a flat array of triangle corner coordinates, nine
    /// values per triangle
    pub fn from_triangles(name: impl Into<String>, coords: &[f64]) -> Result<Self> {
        let mut solid = Self::new(name);
        solid.add_triangles(coords)?;
        Ok(solid)
    }

    /// Append triangles from a flat coordinate array. Nothing is added when
    /// any triangle is invalid.
    pub fn add_triangles(&mut self, coords: &[f64]) -> Result<()> {
        if coords.len() % 9 != 0 {
            return Err(CsgError::invalid(format!(
                "triangle array length {} is not a multiple of 9",
                coords.len()
            )));
        }

        self.mesh.push();
        for chunk in coords.chunks_exact(9) {
            let a = Point3::new(chunk[0], chunk[1], chunk[2]);
            let b = Point3::new(chunk[3], chunk[4], chunk[5]);
            let c = Point3::new(chunk[6], chunk[7], chunk[8]);
            if let Err(e) = self.mesh.add_face(a, b, c) {
                self.mesh.pop()?;
                return Err(e);
            }
        }
        self.mesh.commit()?;
        self.compiled = None;
        Ok(())
    }

    pub fn add_face(
        &mut self,
        a: Point3<f64>,
        b: Point3<f64>,
        c: Point3<f64>,
    ) -> Result<FaceId> {
        self.compiled = None;
        self.mesh.add_face(a, b, c)
    }

    /// Add a face, reversing its winding if its normal points against `outward`
    pub fn add_face_oriented(
        &mut self,
        a: Point3<f64>,
        b: Point3<f64>,
        c: Point3<f64>,
        outward: &Vector3<f64>,
    ) -> Result<FaceId> {
        let normal = (b - a).cross(&(c - a));
        if normal.dot(outward) < 0.0 {
            self.add_face(a, c, b)
        } else {
            self.add_face(a, b, c)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    pub fn bound(&self) -> Bound {
        self.mesh.bound()
    }

    pub fn min(&self) -> Point3<f64> {
        self.bound().min
    }

    pub fn mid(&self) -> Point3<f64> {
        self.bound().mid()
    }

    pub fn max(&self) -> Point3<f64> {
        self.bound().max
    }

    /// Release every face and vertex
    pub fn clear(&mut self) {
        self.mesh.clear();
        self.compiled = None;
    }

    // ---- boolean operations ----

    pub fn union(&self, other: &Solid) -> Result<Solid> {
        self.combine(BooleanOp::Union, other, &CsgConfig::default())
    }

    pub fn intersection(&self, other: &Solid) -> Result<Solid> {
        self.combine(BooleanOp::Intersection, other, &CsgConfig::default())
    }

    pub fn difference(&self, other: &Solid) -> Result<Solid> {
        self.combine(BooleanOp::Difference, other, &CsgConfig::default())
    }

    pub fn union_with(&self, other: &Solid, config: &CsgConfig) -> Result<Solid> {
        self.combine(BooleanOp::Union, other, config)
    }

    pub fn intersection_with(&self, other: &Solid, config: &CsgConfig) -> Result<Solid> {
        self.combine(BooleanOp::Intersection, other, config)
    }

    pub fn difference_with(&self, other: &Solid, config: &CsgConfig) -> Result<Solid> {
        self.combine(BooleanOp::Difference, other, config)
    }

    /// Combine two solids. Both operands are left untouched; the work happens
    /// on private copies of their meshes.
    pub fn combine(&self, op: BooleanOp, other: &Solid, config: &CsgConfig) -> Result<Solid> {
        log::debug!(
            "{} of '{}' ({} faces) and '{}' ({} faces)",
            op,
            self.name,
            self.face_count(),
            other.name,
            other.face_count()
        );

        let mut a = self.mesh.working_copy();
        let mut b = other.mesh.working_copy();
        a.reset_classification();
        b.reset_classification();

        split_faces(&mut a, &b, config)?;
        split_faces(&mut b, &a, config)?;

        let mut rng = StdRng::seed_from_u64(config.ray_seed);
        classify_faces(&mut a, &b, config, &mut rng)?;
        classify_faces(&mut b, &a, config, &mut rng)?;

        let mesh = assemble(op, &a, &mut b)?;

        Ok(Solid {
            name: format!("{} of ({}) and ({})", op, self.name, other.name),
            mesh,
            provenance: Some(Provenance {
                op,
                a: Arc::new(self.clone()),
                b: Arc::new(other.clone()),
            }),
            compiled: None,
        })
    }

    // ---- transforms and render buffers ----

    /// Map every vertex through an affine matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.mesh = self.mesh.transformed(matrix);
        self.compiled = None;
    }

    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.transform(&Matrix4::new_translation(&offset));
    }

    /// Whether the render buffers reflect the current mesh
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Flatten the mesh into render buffers, reusing them while the mesh is unchanged
    pub fn compile(&mut self) -> &CompiledSolid {
        let mesh = &self.mesh;
        self.compiled.get_or_insert_with(|| flatten(mesh))
    }

    /// Render buffers of a transformed copy; the mesh itself is unchanged
    pub fn compile_with(&self, matrix: &Matrix4<f64>) -> CompiledSolid {
        flatten(&self.mesh.transformed(matrix))
    }

    /// Text dump: the name, then one line per face
    pub fn to_string_with(&self, prefix: &str, separator: &str) -> String {
        let mut out = format!("{}{}", prefix, self.name);
        for (_, face) in self.mesh.faces() {
            out.push_str(separator);
            out.push_str(prefix);
            out.push_str(&face.state().to_string());
            for (id, p) in face.vertices().iter().zip(face.points()) {
                out.push_str(&format!(
                    " ({}, {}, {}, {})",
                    fmt_coord(p.x),
                    fmt_coord(p.y),
                    fmt_coord(p.z),
                    self.mesh.vertex(*id).state()
                ));
            }
            let n = face.normal();
            out.push_str(&format!(
                " n=({}, {}, {})",
                fmt_coord(n.x),
                fmt_coord(n.y),
                fmt_coord(n.z)
            ));
        }
        out
    }
}

fn fmt_coord(value: f64) -> String {
    format!("{:>5}", general(value, 3))
}

/// `%g`-style rendering with `precision` significant digits: fixed notation
/// for moderate magnitudes, scientific otherwise, trailing zeros removed
fn general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{:.*e}", precision.saturating_sub(1), value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_zeros(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn flatten(mesh: &Mesh) -> CompiledSolid {
    let mut compiled = CompiledSolid {
        positions: Vec::with_capacity(mesh.face_count() * 9),
        normals: Vec::with_capacity(mesh.face_count() * 9),
    };
    for (_, face) in mesh.faces() {
        let n = face.normal();
        for p in face.points() {
            compiled
                .positions
                .extend([p.x as f32, p.y as f32, p.z as f32]);
            compiled
                .normals
                .extend([n.x as f32, n.y as f32, n.z as f32]);
        }
    }
    compiled
}

impl fmt::Display for Solid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with("  ", "\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TETRA: [f64; 36] = [
        0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, //
        0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, //
        1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, //
    ];

    #[test]
    fn test_from_triangles() {
        let solid = Solid::from_triangles("tetra", &TETRA).unwrap();
        assert_eq!(solid.face_count(), 4);
        assert_eq!(solid.vertex_count(), 4);
        assert_eq!(solid.min(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(solid.max(), Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_compile_roundtrip_from_triangles() {
        let mut solid = Solid::from_triangles("tetra", &TETRA).unwrap();
        let compiled = solid.compile().clone();

        assert_eq!(compiled.positions.len(), TETRA.len());
        for (out, input) in compiled.positions.iter().zip(TETRA.iter()) {
            assert_relative_eq!(*out as f64, *input, epsilon = 1e-6);
        }

        for (corners, normal) in TETRA.chunks_exact(9).zip(compiled.normals.chunks_exact(9)) {
            let a = Point3::new(corners[0], corners[1], corners[2]);
            let b = Point3::new(corners[3], corners[4], corners[5]);
            let c = Point3::new(corners[6], corners[7], corners[8]);
            let expected = (b - a).cross(&(c - a)).normalize();
            for corner in normal.chunks_exact(3) {
                assert_relative_eq!(corner[0] as f64, expected.x, epsilon = 1e-6);
                assert_relative_eq!(corner[1] as f64, expected.y, epsilon = 1e-6);
                assert_relative_eq!(corner[2] as f64, expected.z, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_general_format() {
        assert_eq!(general(0.0, 3), "0");
        assert_eq!(general(2.5, 3), "2.5");
        assert_eq!(general(-1.0 / 3.0, 3), "-0.333");
        assert_eq!(general(1e-4, 3), "0.0001");
        assert_eq!(general(1.5e-5, 3), "1.5e-05");
        assert_eq!(general(1e5, 3), "1e+05");
        assert_eq!(general(1234.0, 3), "1.23e+03");
        assert_eq!(general(999.6, 3), "1e+03");
        assert_eq!(fmt_coord(1.0), "    1");
    }

    #[test]
    fn test_from_triangles_rejects_bad_length() {
        let err = Solid::from_triangles("short", &TETRA[..10]).unwrap_err();
        assert!(matches!(err, CsgError::InvalidArgument(_)));
    }

    #[test]
    fn test_add_triangles_rolls_back() {
        let mut solid = Solid::from_triangles("tetra", &TETRA).unwrap();
        let mut coords = vec![5.0, 0.0, 0.0, 6.0, 0.0, 0.0, 5.0, 1.0, 0.0];
        // second triangle is collinear
        coords.extend([0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
        assert!(solid.add_triangles(&coords).is_err());
        assert_eq!(solid.face_count(), 4);
        assert_eq!(solid.vertex_count(), 4);
        assert_eq!(solid.mesh().depth(), 0);
    }

    #[test]
    fn test_compile_is_invalidated_by_mutation() {
        let mut solid = Solid::from_triangles("tetra", &TETRA).unwrap();
        assert!(!solid.is_compiled());
        assert_eq!(solid.compile().triangle_count(), 4);
        assert!(solid.is_compiled());

        solid.translate(Vector3::new(1.0, 0.0, 0.0));
        assert!(!solid.is_compiled());
        let compiled = solid.compile();
        assert_relative_eq!(compiled.positions[0], 1.0);
    }

    #[test]
    fn test_compile_with_leaves_mesh() {
        let solid = Solid::from_triangles("tetra", &TETRA).unwrap();
        let moved = solid.compile_with(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, 2.0)));
        assert_relative_eq!(moved.positions[2], 2.0);
        assert_eq!(solid.min(), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_display_lists_faces() {
        let solid = Solid::from_triangles("tetra", &TETRA).unwrap();
        let text = solid.to_string();
        assert!(text.starts_with("  tetra"));
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains("Unknown"));
    }

    #[test]
    fn test_add_face_oriented() {
        let mut solid = Solid::new("sheet");
        let id = solid
            .add_face_oriented(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                &Vector3::new(0.0, 0.0, -1.0),
            )
            .unwrap();
        assert!(solid.mesh().face(id).unwrap().normal().z < 0.0);
    }
}
