// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Trisolid CSG Kernel
//!
//! Boolean operations (union, intersection, difference) on closed
//! triangle-mesh solids. Each operation splits the faces of both operands
//! along their intersection curves, classifies every face as inside,
//! outside or coplanar with the other solid, then keeps the faces the
//! operation calls for.
//!
//! ```no_run
//! use trisolid::{CirclePlane, Primitive};
//!
//! let outer = Primitive::cylinder(CirclePlane::XY, 10.0, 10.0, 1.0).to_solid()?;
//! let inner = Primitive::cylinder(CirclePlane::XY, 5.0, 12.0, 1.0).to_solid()?;
//! let mut tube = outer.difference(&inner)?;
//! let buffers = tube.compile();
//! println!("{} triangles", buffers.triangle_count());
//! # Ok::<(), trisolid::CsgError>(())
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod utils;

pub use config::CsgConfig;
pub use error::{CsgError, Result};
pub use geometry::{
    analyze, BooleanOp, Bound, CirclePlane, CompiledSolid, Primitive, Solid, SolidStats,
};
pub use io::export_stl;

/// Evaluate `a op b` with the default configuration
pub fn evaluate(op: BooleanOp, a: &Solid, b: &Solid) -> Result<Solid> {
    a.combine(op, b, &CsgConfig::default())
}
