// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Axis-aligned bounds of faces and meshes

use crate::utils::math::EPS;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bound {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// The bound containing nothing; overlaps no other bound
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bound = Self::empty();
        for point in points {
            bound.expand_to_include(point);
        }
        bound
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn union(&self, other: &Bound) -> Bound {
        let mut bound = *self;
        if !other.is_empty() {
            bound.expand_to_include(&other.min);
            bound.expand_to_include(&other.max);
        }
        bound
    }

    /// Bounds overlap when they are within `EPS` of each other on every axis
    pub fn overlap(&self, other: &Bound) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        !(self.min.x > other.max.x + EPS
            || self.max.x < other.min.x - EPS
            || self.min.y > other.max.y + EPS
            || self.max.y < other.min.y - EPS
            || self.min.z > other.max.z + EPS
            || self.max.z < other.min.z - EPS)
    }

    pub fn mid(&self) -> Point3<f64> {
        Point3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    pub fn size(&self) -> nalgebra::Vector3<f64> {
        if self.is_empty() {
            return nalgebra::Vector3::zeros();
        }
        self.max - self.min
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &Bound, tolerance: f64) -> bool {
        (self.min - other.min).amax() < tolerance && (self.max - other.max).amax() < tolerance
    }
}

impl Default for Bound {
    fn default() -> Self {
        Self::empty()
    }
}
