// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::solid::Solid;
use crate::config::{MAX_CIRCLE_ERROR, MIN_CIRCLE_ERROR};
use crate::error::{CsgError, Result};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Plane a cylinder's circular cross-section lies in; the axis is its normal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CirclePlane {
    /// Axis along z
    XY,
    /// Axis along x
    YZ,
    /// Axis along y
    ZX,
}

/// Geometric primitives, all centred at the origin
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Cuboid {
        size: Vector3<f64>,
    },
    Cylinder {
        plane: CirclePlane,
        radius: f64,
        depth: f64,
        error: f64,
    },
    /// Ring of radius `outer` around z, swept by a tube of radius `inner`
    Torus {
        inner: f64,
        outer: f64,
        error: f64,
    },
}

impl Primitive {
    pub fn cuboid(size: Vector3<f64>) -> Self {
        Self::Cuboid { size }
    }

    pub fn cylinder(plane: CirclePlane, radius: f64, depth: f64, error: f64) -> Self {
        Self::Cylinder {
            plane,
            radius,
            depth,
            error,
        }
    }

    /// Cylinder along z
    pub fn cylinder_xy(radius: f64, depth: f64, error: f64) -> Self {
        Self::cylinder(CirclePlane::XY, radius, depth, error)
    }

    pub fn torus(inner: f64, outer: f64, error: f64) -> Self {
        Self::Torus {
            inner,
            outer,
            error,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Cuboid { size } => format!("Box({}, {}, {})", size.x, size.y, size.z),
            Self::Cylinder {
                plane,
                radius,
                depth,
                error,
            } => format!("Cylinder.{:?}({}, {}, {})", plane, radius, depth, error),
            Self::Torus {
                inner,
                outer,
                error,
            } => format!("Torus.XY({}, {}, {})", inner, outer, error),
        }
    }

    pub fn to_solid(&self) -> Result<Solid> {
        match self {
            Self::Cuboid { size } => generate_cuboid(self.name(), *size),
            Self::Cylinder {
                plane,
                radius,
                depth,
                error,
            } => generate_cylinder(self.name(), *plane, *radius, *depth, *error),
            Self::Torus {
                inner,
                outer,
                error,
            } => generate_torus(self.name(), *inner, *outer, *error),
        }
    }
}

fn check_error(error: f64) -> Result<()> {
    if !(MIN_CIRCLE_ERROR..=MAX_CIRCLE_ERROR).contains(&error) {
        return Err(CsgError::invalid(format!("Invalid error: {}", error)));
    }
    Ok(())
}

fn check_radius(radius: f64) -> Result<()> {
    if !(radius > 0.0 && radius.is_finite()) {
        return Err(CsgError::invalid(format!("Invalid radius: {}", radius)));
    }
    Ok(())
}

/// Sagitta-like deviation of an `n`-gon from a circle of radius `r`, using
/// half the arc length per segment as the chord half-length
fn deviation(r: f64, n: usize) -> f64 {
    let half = r * PI / n as f64;
    r - (r * r - half * half).sqrt()
}

fn within(r: f64, n: usize, error: f64) -> bool {
    // NaN from an over-long chord counts as out of tolerance
    n >= 3 && deviation(r, n) <= error
}

/// Number of segments approximating a circle of radius `r` within `error`.
///
/// Doubles a multiple of `r` until the polygon is fine enough, then backs off
/// one multiple of `r` at a time while it stays fine enough.
pub fn circle_segments(r: f64, error: f64) -> Result<usize> {
    check_radius(r)?;
    check_error(error)?;

    let mut coarse = 4.0;
    while !within(r, (r * coarse) as usize, error) {
        coarse *= 2.0;
        if r * coarse > 1e7 {
            return Err(CsgError::invalid(format!(
                "Invalid error: {} is too fine for radius {}",
                error, r
            )));
        }
    }

    let mut fine = coarse - 2.0;
    while fine > 0.0 {
        if !within(r, (r * fine) as usize, error) {
            return Ok(((r * (fine + 2.0)) as usize).max(3));
        }
        fine -= 1.0;
    }
    Ok((r as usize).max(3))
}

fn generate_cuboid(name: String, size: Vector3<f64>) -> Result<Solid> {
    if !(size.x > 0.0 && size.y > 0.0 && size.z > 0.0) {
        return Err(CsgError::invalid(format!("Invalid size: {:?}", size)));
    }
    let h = size / 2.0;

    let positions = [
        Point3::new(-h.x, -h.y, -h.z),
        Point3::new(h.x, -h.y, -h.z),
        Point3::new(h.x, h.y, -h.z),
        Point3::new(-h.x, h.y, -h.z),
        Point3::new(-h.x, -h.y, h.z),
        Point3::new(h.x, -h.y, h.z),
        Point3::new(h.x, h.y, h.z),
        Point3::new(-h.x, h.y, h.z),
    ];

    let faces = [
        // Top (z+)
        [4, 5, 6],
        [4, 6, 7],
        // Bottom (z-)
        [1, 0, 3],
        [1, 3, 2],
        // Right (x+)
        [5, 1, 2],
        [5, 2, 6],
        // Left (x-)
        [0, 4, 7],
        [0, 7, 3],
        // Back (y+)
        [7, 6, 2],
        [7, 2, 3],
        // Front (y-)
        [0, 1, 5],
        [0, 5, 4],
    ];

    let mut solid = Solid::new(name);
    for [a, b, c] in faces {
        solid.add_face(positions[a], positions[b], positions[c])?;
    }
    Ok(solid)
}

fn generate_cylinder(
    name: String,
    plane: CirclePlane,
    radius: f64,
    depth: f64,
    error: f64,
) -> Result<Solid> {
    check_radius(radius)?;
    if !(depth > 0.0 && depth.is_finite()) {
        return Err(CsgError::invalid(format!("Invalid depth: {}", depth)));
    }
    let segments = circle_segments(radius, error)?;

    // (u, v) around the circle, w along the axis, mapped so (u, v, w) stays right-handed
    let place = |u: f64, v: f64, w: f64| match plane {
        CirclePlane::XY => Point3::new(u, v, w),
        CirclePlane::YZ => Point3::new(w, u, v),
        CirclePlane::ZX => Point3::new(v, w, u),
    };

    let (w0, w1) = (-depth / 2.0, depth / 2.0);
    let step = 2.0 * PI / segments as f64;
    let mut solid = Solid::new(name);

    for i in 0..segments {
        let (s0, c0) = (step * i as f64).sin_cos();
        let (s1, c1) = (step * ((i + 1) % segments) as f64).sin_cos();
        let (u0, v0) = (radius * c0, radius * s0);
        let (u1, v1) = (radius * c1, radius * s1);

        // top fan
        solid.add_face(place(0.0, 0.0, w1), place(u0, v0, w1), place(u1, v1, w1))?;
        // side quad
        solid.add_face(place(u0, v0, w1), place(u0, v0, w0), place(u1, v1, w0))?;
        solid.add_face(place(u0, v0, w1), place(u1, v1, w0), place(u1, v1, w1))?;
        // bottom fan
        solid.add_face(place(0.0, 0.0, w0), place(u1, v1, w0), place(u0, v0, w0))?;
    }

    log::debug!("{} built with {} segments", solid.name(), segments);
    Ok(solid)
}

fn generate_torus(name: String, inner: f64, outer: f64, error: f64) -> Result<Solid> {
    check_radius(inner)?;
    if !(outer > inner && outer.is_finite()) {
        return Err(CsgError::invalid(format!(
            "Invalid radius: outer {} must exceed inner {}",
            outer, inner
        )));
    }
    let tube_segments = circle_segments((outer - inner) / 2.0, error)?;
    let ring_segments = circle_segments(outer, error)?;

    let point = |ring: usize, tube: usize| {
        let (sr, cr) = (2.0 * PI * (ring % ring_segments) as f64 / ring_segments as f64).sin_cos();
        let (st, ct) = (2.0 * PI * (tube % tube_segments) as f64 / tube_segments as f64).sin_cos();
        let spoke = outer + ct * inner;
        Point3::new(cr * spoke, sr * spoke, st * inner)
    };

    let mut solid = Solid::new(name);
    for ring in 0..ring_segments {
        for tube in 0..tube_segments {
            let qa = point(ring, tube);
            let qb = point(ring + 1, tube);
            let qc = point(ring + 1, tube + 1);
            let qd = point(ring, tube + 1);

            // outward is away from the tube's centre line
            let (sr, cr) = (2.0 * PI * (ring as f64 + 0.5) / ring_segments as f64).sin_cos();
            let centre = Point3::new(cr * outer, sr * outer, 0.0);
            let middle = Point3::from((qa.coords + qb.coords + qc.coords + qd.coords) / 4.0);
            let outward = middle - centre;

            solid.add_face_oriented(qa, qb, qc, &outward)?;
            solid.add_face_oriented(qc, qd, qa, &outward)?;
        }
    }

    log::debug!(
        "{} built with {}x{} segments",
        solid.name(),
        ring_segments,
        tube_segments
    );
    Ok(solid)
}
