// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities shared by the CSG engine

use nalgebra::{Point3, Vector3};

/// Geometric tolerance used for every epsilon comparison in the engine
pub const EPS: f64 = 1e-8;

/// Snap a coordinate to zero when it lies within `EPS` of zero
pub fn snap(value: f64) -> f64 {
    if value.abs() < EPS {
        0.0
    } else {
        value
    }
}

/// Check if two floats are approximately equal
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Sign of a value with an epsilon band: -1, 0 or 1
pub fn sign_of(value: f64) -> i8 {
    if value > EPS {
        1
    } else if value < -EPS {
        -1
    } else {
        0
    }
}

/// Unnormalized normal of the triangle (a, b, c) following its winding
pub fn triangle_cross(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    (b - a).cross(&(c - a))
}

/// Unit normal of a triangle, `None` when the triangle is degenerate
pub fn triangle_normal(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Option<Vector3<f64>> {
    let cross = triangle_cross(a, b, c);
    let length = cross.norm();
    if length < EPS || !length.is_finite() {
        None
    } else {
        Some(cross / length)
    }
}

/// Area of a triangle
pub fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    triangle_cross(a, b, c).norm() / 2.0
}

/// Centroid of a triangle
pub fn triangle_centroid(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Point3<f64> {
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Two points are the same within `EPS` on every axis
pub fn points_coincide(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    approx_eq(a.x, b.x, EPS) && approx_eq(a.y, b.y, EPS) && approx_eq(a.z, b.z, EPS)
}

/// Component-wise snap of a point
pub fn snap_point(p: &Point3<f64>) -> Point3<f64> {
    Point3::new(snap(p.x), snap(p.y), snap(p.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap() {
        assert_eq!(snap(1e-12), 0.0);
        assert_eq!(snap(-1e-9), 0.0);
        assert_eq!(snap(0.5), 0.5);
        // cos(90°) lands on exactly zero
        assert_eq!(snap((std::f64::consts::FRAC_PI_2).cos() * 10.0), 0.0);
    }

    #[test]
    fn test_sign_of() {
        assert_eq!(sign_of(1.0), 1);
        assert_eq!(sign_of(-1.0), -1);
        assert_eq!(sign_of(EPS / 2.0), 0);
    }

    #[test]
    fn test_triangle_normal() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let n = triangle_normal(&a, &b, &c).unwrap();
        assert!(approx_eq(n.z, 1.0, 1e-12));
        assert!(triangle_normal(&a, &b, &Point3::new(2.0, 0.0, 0.0)).is_none());
        assert!(approx_eq(triangle_area(&a, &b, &c), 0.5, 1e-12));
    }

    #[test]
    fn test_points_coincide() {
        let a = Point3::new(1.0, 2.0, 3.0);
        assert!(points_coincide(&a, &Point3::new(1.0 + EPS / 4.0, 2.0, 3.0)));
        assert!(!points_coincide(&a, &Point3::new(1.001, 2.0, 3.0)));
    }
}
