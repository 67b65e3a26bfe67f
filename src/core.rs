use glam::{Mat4, Quat, Vec3};

use crate::error::{VfxError, VfxResult};

/// Fixed simulation rate for sequence timelines. Durations, timestamp windows
/// and emitter windows are all authored in frames at this rate.
pub const SEQUENCE_FRAME_RATE: f32 = 120.0;

/// Inclusive frame window `[start, end]` in sequence-local time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameWindow {
    pub start: i32,
    pub end: i32,
}

impl FrameWindow {
    pub fn new(start: i32, end: i32) -> VfxResult<Self> {
        if start > end {
            return Err(VfxError::validation("FrameWindow start must be <= end"));
        }
        Ok(Self { start, end })
    }

    pub fn contains(self, frame: i32) -> bool {
        self.start <= frame && frame <= self.end
    }

    /// Frame span of the window. Zero for a single-frame window; curve
    /// evaluation requires a span > 0 (validated at authoring time).
    pub fn span(self) -> i32 {
        self.end - self.start
    }
}

/// Which pass of the external renderer consumes a package.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RenderLayer {
    Background,
    #[default]
    Main,
    Foreground,
    Overlay,
}

/// Position / rotation / scale transform in world or local space.
///
/// Composition follows the usual parent-child convention: `parent * local`
/// applies `local` inside `parent`'s space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Moves along the transform's own axes rather than world axes.
    pub fn translate_local(&mut self, offset: Vec3) {
        self.position += self.rotation * offset;
    }

    /// Applies `rotation` in local space, before this transform's own
    /// rotation.
    pub fn rotate_local(&mut self, rotation: Quat) {
        self.rotation *= rotation;
    }
}

impl std::ops::Mul for Transform {
    type Output = Transform;

    fn mul(self, local: Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale * local.position),
            rotation: self.rotation * local.rotation,
            scale: self.scale * local.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_contains_is_inclusive() {
        let w = FrameWindow::new(10, 20).unwrap();
        assert!(w.contains(10));
        assert!(w.contains(20));
        assert!(!w.contains(9));
        assert!(!w.contains(21));
    }

    #[test]
    fn window_rejects_inverted_bounds() {
        assert!(FrameWindow::new(5, 4).is_err());
    }

    #[test]
    fn compose_with_identity_is_noop() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: Vec3::splat(2.0),
        };
        let composed = t * Transform::IDENTITY;
        assert!(composed.position.abs_diff_eq(t.position, 1e-6));
        assert!(composed.scale.abs_diff_eq(t.scale, 1e-6));
    }

    #[test]
    fn compose_offsets_child_by_parent_rotation() {
        let parent = Transform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        };
        let child = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        let composed = parent * child;
        // +X rotated 90 degrees around Y lands on -Z.
        assert!(composed.position.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn translate_local_follows_rotation() {
        let mut t = Transform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        };
        t.translate_local(Vec3::new(1.0, 0.0, 0.0));
        assert!(t.position.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }
}
