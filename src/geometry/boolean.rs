// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operation kinds and result assembly from classified faces

use super::face::FaceState;
use super::mesh::Mesh;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
}

impl BooleanOp {
    /// Face states kept from the first and the second operand
    fn kept_states(self) -> (&'static [FaceState], &'static [FaceState]) {
        match self {
            BooleanOp::Union => (
                &[FaceState::Outside, FaceState::Same],
                &[FaceState::Outside],
            ),
            BooleanOp::Intersection => (
                &[FaceState::Inside, FaceState::Same],
                &[FaceState::Inside],
            ),
            BooleanOp::Difference => (
                &[FaceState::Outside, FaceState::Opposite],
                &[FaceState::Inside],
            ),
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BooleanOp::Union => "Union",
            BooleanOp::Intersection => "Intersection",
            BooleanOp::Difference => "Difference",
        };
        f.write_str(name)
    }
}

/// Build the result mesh from two split and classified meshes.
///
/// For a difference the kept faces of `b` are inverted first so the result
/// stays outward-facing. Result faces start `Unknown`; vertices keep their
/// classification, so cut vertices remain `Boundary`.
pub fn assemble(op: BooleanOp, a: &Mesh, b: &mut Mesh) -> Result<Mesh> {
    let (keep_a, keep_b) = op.kept_states();

    if op == BooleanOp::Difference {
        let inside: Vec<_> = b
            .faces()
            .filter(|(_, face)| face.state() == FaceState::Inside)
            .map(|(id, _)| id)
            .collect();
        for id in inside {
            b.invert_face(id)?;
        }
    }

    let mut result = Mesh::new();
    for (source, keep) in [(a, keep_a), (&*b, keep_b)] {
        for (id, face) in source.faces() {
            if keep.contains(&face.state()) && result.copy_face_from(source, id).is_none() {
                log::debug!("dropped a degenerate face while assembling {}", op);
            }
        }
    }

    log::debug!("{} assembled {} faces", op, result.face_count());
    Ok(result)
}
