// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport Controller (C5).
//!
//! Holds `(zoom, pan_x, pan_y)` and debounces gestures: `*_delta` calls are
//! constant-time state updates that never trigger recomputation; only a
//! commit (driven by [`crate::Engine::commit_zoom`] / `commit_pan`) runs the
//! LOD filter and incremental resolver (§4.5).
//!
//! `zoom` is a ratio (`1.0` == 100%), the same scale [`mindmap_core::lod::LodConfig::max_zoom`]
//! reports its ceiling in. [`mindmap_core::lod`] thresholds are expressed in
//! percent, so a commit multiplies `zoom` by 100 before calling into C4.

/// Minimum zoom ratio (§4.4: "the floor is engine-defined").
pub const ZOOM_FLOOR: f64 = 0.05;

/// Zoom-end commit only re-runs C4/C3 if the zoom moved by more than this
/// since the last commit (§4.5, default `ε = 0.01`).
pub const ZOOM_EPSILON: f64 = 0.01;

/// Viewport state: zoom ratio and pan offset in layout units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub(crate) last_commit_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0, last_commit_zoom: 1.0 }
    }
}

impl Viewport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a mid-gesture zoom delta, clamped to `[ZOOM_FLOOR, ceiling]`.
    /// Constant time; never triggers recomputation.
    pub fn zoom_delta(&mut self, delta: f64, ceiling: f64) {
        self.zoom = (self.zoom + delta).clamp(ZOOM_FLOOR, ceiling);
    }

    /// Applies a mid-gesture pan delta. Constant time; never triggers
    /// recomputation.
    pub fn pan_delta(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Whether the zoom has moved far enough since the last commit to
    /// warrant a zoom-end recompute (§4.5).
    #[must_use]
    pub fn zoom_moved(&self) -> bool {
        (self.zoom - self.last_commit_zoom).abs() > ZOOM_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_delta_clamps_to_floor_and_ceiling() {
        let mut vp = Viewport::new();
        vp.zoom_delta(-10.0, 5.0);
        assert_eq!(vp.zoom, ZOOM_FLOOR);
        vp.zoom_delta(100.0, 5.0);
        assert_eq!(vp.zoom, 5.0);
    }

    #[test]
    fn zoom_moved_respects_epsilon() {
        let mut vp = Viewport::new();
        vp.zoom_delta(0.005, 5.0);
        assert!(!vp.zoom_moved());
        vp.zoom_delta(0.02, 5.0);
        assert!(vp.zoom_moved());
    }
}
