// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operation properties on simple solids

use anyhow::Result;
use approx::assert_relative_eq;
use nalgebra::Vector3;
use trisolid::geometry::{analyze, FaceState, VertexState};
use trisolid::{BooleanOp, CsgConfig, Primitive, Solid};

fn cube(size: f64, offset: Vector3<f64>) -> Result<Solid> {
    let mut solid = Primitive::cuboid(Vector3::new(size, size, size)).to_solid()?;
    solid.translate(offset);
    Ok(solid)
}

/// Two 10-unit cubes overlapping in a 8 x 7 x 6 block
fn overlapping_pair() -> Result<(Solid, Solid)> {
    Ok((
        cube(10.0, Vector3::zeros())?,
        cube(10.0, Vector3::new(2.0, 3.0, 4.0))?,
    ))
}

#[test]
fn test_union_with_empty_is_identity() -> Result<()> {
    let a = cube(2.0, Vector3::zeros())?;
    let empty = Solid::empty();

    let union = a.union(&empty)?;
    assert_eq!(union.face_count(), a.face_count());
    assert_relative_eq!(analyze(&union).volume, 8.0, epsilon = 1e-9);

    let intersection = a.intersection(&empty)?;
    assert!(intersection.is_empty());

    let difference = a.difference(&empty)?;
    assert_eq!(difference.face_count(), a.face_count());
    Ok(())
}

#[test]
fn test_difference_with_itself_is_empty() -> Result<()> {
    let a = cube(4.0, Vector3::zeros())?;
    let b = a.clone();

    let difference = a.difference(&b)?;
    println!("{}", difference);
    assert!(difference.is_empty(), "{} faces left", difference.face_count());

    let union = a.union(&b)?;
    assert_relative_eq!(analyze(&union).volume, 64.0, epsilon = 1e-9);
    Ok(())
}

#[test]
fn test_disjoint_solids() -> Result<()> {
    let a = cube(1.0, Vector3::zeros())?;
    let b = cube(1.0, Vector3::new(20.0, 0.0, 0.0))?;

    assert_eq!(a.intersection(&b)?.face_count(), 0);

    let union = a.union(&b)?;
    assert_eq!(union.face_count(), 24);
    let stats = analyze(&union);
    assert_relative_eq!(stats.volume, 2.0, epsilon = 1e-9);
    assert!(stats.is_watertight);

    let difference = a.difference(&b)?;
    assert_eq!(difference.face_count(), 12);
    Ok(())
}

#[test]
fn test_overlapping_volumes() -> Result<()> {
    let (a, b) = overlapping_pair()?;
    let overlap = 8.0 * 7.0 * 6.0;

    let union = analyze(&a.union(&b)?);
    let intersection = analyze(&a.intersection(&b)?);
    let difference = analyze(&a.difference(&b)?);

    println!(
        "union {:.4}, intersection {:.4}, difference {:.4}",
        union.volume, intersection.volume, difference.volume
    );

    assert_relative_eq!(union.volume, 2000.0 - overlap, epsilon = 1e-6);
    assert_relative_eq!(intersection.volume, overlap, epsilon = 1e-6);
    assert_relative_eq!(difference.volume, 1000.0 - overlap, epsilon = 1e-6);

    // all three results keep outward orientation
    assert!(union.signed_volume > 0.0);
    assert!(intersection.signed_volume > 0.0);
    assert!(difference.signed_volume > 0.0);
    Ok(())
}

#[test]
fn test_union_is_commutative_in_volume() -> Result<()> {
    let (a, b) = overlapping_pair()?;
    let ab = analyze(&a.union(&b)?);
    let ba = analyze(&b.union(&a)?);
    assert_relative_eq!(ab.volume, ba.volume, epsilon = 1e-6);
    assert_relative_eq!(ab.surface_area, ba.surface_area, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_result_carries_boundary_vertices() -> Result<()> {
    let (a, b) = overlapping_pair()?;

    for op in [BooleanOp::Union, BooleanOp::Intersection, BooleanOp::Difference] {
        let result = a.combine(op, &b, &CsgConfig::default())?;
        let stats = analyze(&result);
        assert_eq!(stats.faces_by_state[0], stats.face_count);
        assert!(result
            .mesh()
            .faces()
            .all(|(_, face)| face.state() == FaceState::Unknown));

        let introduced: Vec<_> = result
            .mesh()
            .vertices()
            .filter(|(_, v)| {
                a.mesh().find_vertex(v.position()).is_none()
                    && b.mesh().find_vertex(v.position()).is_none()
            })
            .collect();
        assert!(!introduced.is_empty(), "{} introduced no vertices", op);
        for (_, vertex) in introduced {
            assert_eq!(
                vertex.state(),
                VertexState::Boundary,
                "{} left cut vertex {:?} unmarked",
                op,
                vertex.position()
            );
        }
    }
    Ok(())
}

#[test]
fn test_operands_are_untouched() -> Result<()> {
    let (a, b) = overlapping_pair()?;
    let before = (a.face_count(), b.face_count());

    let result = a.combine(BooleanOp::Intersection, &b, &CsgConfig::default())?;

    assert_eq!((a.face_count(), b.face_count()), before);
    let provenance = result.provenance().expect("boolean result has provenance");
    assert_eq!(provenance.op, BooleanOp::Intersection);
    assert_eq!(provenance.a.face_count(), before.0);
    assert_eq!(
        result.name(),
        format!("Intersection of ({}) and ({})", a.name(), b.name())
    );
    Ok(())
}

#[test]
fn test_seeded_operations_are_reproducible() -> Result<()> {
    let (a, b) = overlapping_pair()?;
    let config = CsgConfig {
        ray_seed: 42,
        ..CsgConfig::default()
    };
    let first = a.difference_with(&b, &config)?;
    let second = a.difference_with(&b, &config)?;
    assert_eq!(first.to_string(), second.to_string());
    Ok(())
}

#[test]
fn test_compile_buffers_match_faces() -> Result<()> {
    let (a, b) = overlapping_pair()?;
    let mut union = a.union(&b)?;
    assert!(!union.is_compiled());

    let faces = union.face_count();
    let compiled = union.compile().clone();
    assert!(union.is_compiled());
    assert_eq!(compiled.triangle_count(), faces);
    assert_eq!(compiled.positions.len(), faces * 9);
    assert_eq!(compiled.normals.len(), faces * 9);

    for normal in compiled.face_normals() {
        let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
        assert!((length - 1.0).abs() < 1e-5);
    }
    Ok(())
}
