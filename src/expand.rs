use glam::{EulerRot, Quat, Vec2, Vec3, Vec4};

use crate::{
    core::{RenderLayer, Transform},
    curve::{AttributeType, CurveProfile},
    playback::{CustomBufferInput, PlaybackInstance, RenderInput},
    sequence::{EffectRef, Sequence},
};

/// Resolved attribute values for one package. Unset attributes keep these
/// defaults: identity motion, white colour, untouched UVs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeBundle {
    pub uv_offset: Vec2,
    pub translation: Vec3,
    /// Euler angles in degrees; converted to radians when the world
    /// transform is rebuilt.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Vec4,
    pub uv_scale: Vec2,
}

impl Default for AttributeBundle {
    fn default() -> Self {
        Self {
            uv_offset: Vec2::ZERO,
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Vec4::ONE,
            uv_scale: Vec2::ONE,
        }
    }
}

impl AttributeBundle {
    /// Writes a sampled curve value into the field the attribute tag names.
    pub fn set(&mut self, attribute: AttributeType, value: f32) {
        match attribute {
            AttributeType::UvScrollX => self.uv_offset.x = value,
            AttributeType::UvScrollY => self.uv_offset.y = value,
            AttributeType::TranslationX => self.translation.x = value,
            AttributeType::TranslationY => self.translation.y = value,
            AttributeType::TranslationZ => self.translation.z = value,
            AttributeType::RotationX => self.rotation.x = value,
            AttributeType::RotationY => self.rotation.y = value,
            AttributeType::RotationZ => self.rotation.z = value,
            AttributeType::ScaleX => self.scale.x = value,
            AttributeType::ScaleY => self.scale.y = value,
            AttributeType::ScaleZ => self.scale.z = value,
            AttributeType::ColorR => self.color.x = value,
            AttributeType::ColorG => self.color.y = value,
            AttributeType::ColorB => self.color.z = value,
            AttributeType::ColorA => self.color.w = value,
            AttributeType::UvScaleX => self.uv_scale.x = value,
            AttributeType::UvScaleY => self.uv_scale.y = value,
        }
    }
}

/// Non-owning reference to the model a package renders: indices into the
/// sequence store, resolved by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelRef {
    pub sequence: usize,
    pub mesh: usize,
}

/// One fully-resolved renderable for the current frame. Rebuilt from
/// scratch every tick and discarded after the renderer consumes it.
#[derive(Clone, Debug)]
pub struct RenderPackage {
    pub model: ModelRef,
    pub transform: Transform,
    pub layer: RenderLayer,
    pub attributes: AttributeBundle,
    pub bloom: bool,
    pub custom_buffer: Option<CustomBufferInput>,
}

/// The slice of playback state expansion needs; lets direct rendering run
/// the same path without registering a queue entry.
#[derive(Clone, Copy, Debug)]
pub struct PlaybackView<'a> {
    pub sequence: usize,
    pub frame: i32,
    pub layer: RenderLayer,
    pub render_input: &'a RenderInput,
}

impl<'a> PlaybackView<'a> {
    pub fn of(inst: &'a PlaybackInstance) -> Self {
        Self {
            sequence: inst.sequence(),
            frame: inst.frame(),
            layer: inst.layer(),
            render_input: inst.render_input(),
        }
    }
}

/// Expands every mesh timestamp of `sq` open at the view's frame into
/// packages appended to `out`.
///
/// Emitter timestamps produce no packages; they only gate emitter activity
/// (emitters render through their own sprite-batch path).
pub fn expand_playback(out: &mut Vec<RenderPackage>, view: &PlaybackView, sq: &Sequence) {
    let input = view.render_input;
    let base = input.transform.resolve();

    for ts in &sq.timestamps {
        if !ts.window.contains(view.frame) {
            continue;
        }
        let EffectRef::Mesh(mesh_index) = ts.effect else {
            continue;
        };
        let Some(mesh) = sq.meshes.get(mesh_index) else {
            continue;
        };

        let mut transform = base * mesh.transform;
        let mut attributes = AttributeBundle::default();
        for curve in ts.curves.iter() {
            if curve.profile == CurveProfile::None {
                continue;
            }
            attributes.set(curve.attribute, curve.evaluate(view.frame, ts.window));
        }

        // Caller override beats the composed transform's own scale; the
        // curve-driven scale multiplies either.
        let base_scale = input.scale_override.unwrap_or(transform.scale);

        transform.translate_local(attributes.translation);
        let rotation = attributes.rotation * std::f32::consts::PI / 180.0;
        transform.rotate_local(Quat::from_euler(
            EulerRot::YXZ,
            rotation.y,
            rotation.x,
            rotation.z,
        ));
        transform.scale = base_scale * attributes.scale;

        out.push(RenderPackage {
            model: ModelRef {
                sequence: view.sequence,
                mesh: mesh_index,
            },
            transform,
            layer: view.layer,
            attributes,
            bloom: input.bloom,
            custom_buffer: input.custom_buffer.clone(),
        });
    }
}

/// Orders packages back-to-front by squared distance from the camera
/// (farthest first) for alpha-blended compositing. Ties are unordered.
pub fn sort_back_to_front(packages: &mut [RenderPackage], camera_position: Vec3) {
    packages.sort_by(|a, b| {
        let da = (a.transform.position - camera_position).length_squared();
        let db = (b.transform.position - camera_position).length_squared();
        db.total_cmp(&da)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::StockResources,
        core::FrameWindow,
        curve::{CurveDataSet, CurvePoint},
        sequence::Timestamp,
    };

    fn sequence_with_mesh_timestamp(window: FrameWindow) -> Sequence {
        let mut sq = Sequence::new(0);
        sq.duration = 240;
        sq.add_mesh_instance(&StockResources);
        sq.timestamps.push(Timestamp::new(window, EffectRef::Mesh(0)));
        sq
    }

    fn linear_curve(attribute: AttributeType, min: f32, max: f32) -> CurveDataSet {
        CurveDataSet {
            attribute,
            profile: CurveProfile::Linear,
            min_value: min,
            max_value: max,
            points: vec![CurvePoint { x: 0.0, y: 0.0 }, CurvePoint { x: 1.0, y: 1.0 }],
        }
    }

    fn expand_at(sq: &Sequence, frame: i32, input: &RenderInput) -> Vec<RenderPackage> {
        let mut out = Vec::new();
        let view = PlaybackView {
            sequence: 0,
            frame,
            layer: RenderLayer::Main,
            render_input: input,
        };
        expand_playback(&mut out, &view, sq);
        out
    }

    #[test]
    fn only_open_mesh_timestamps_expand() {
        let sq = sequence_with_mesh_timestamp(FrameWindow { start: 10, end: 20 });
        let input = RenderInput::stationary(Transform::IDENTITY);
        assert!(expand_at(&sq, 9, &input).is_empty());
        assert_eq!(expand_at(&sq, 10, &input).len(), 1);
        assert_eq!(expand_at(&sq, 20, &input).len(), 1);
        assert!(expand_at(&sq, 21, &input).is_empty());
    }

    #[test]
    fn emitter_timestamps_produce_no_packages() {
        let mut sq = sequence_with_mesh_timestamp(FrameWindow { start: 0, end: 240 });
        sq.add_emitter_slot(&StockResources);
        sq.timestamps.push(Timestamp::new(
            FrameWindow { start: 0, end: 240 },
            EffectRef::Emitter(0),
        ));
        let input = RenderInput::stationary(Transform::IDENTITY);
        assert_eq!(expand_at(&sq, 50, &input).len(), 1);
    }

    #[test]
    fn rotation_curve_drives_world_rotation() {
        // Linear 0..1 over [0,240] mapped to [0,360] degrees: frame 120 is
        // a half turn around Y.
        let mut sq = sequence_with_mesh_timestamp(FrameWindow { start: 0, end: 240 });
        sq.timestamps[0]
            .curves
            .insert(linear_curve(AttributeType::RotationY, 0.0, 360.0));
        let input = RenderInput::stationary(Transform::IDENTITY);
        let packages = expand_at(&sq, 120, &input);

        assert!((packages[0].attributes.rotation.y - 180.0).abs() < 1e-3);
        let rotated = packages[0].transform.rotation * Vec3::X;
        assert!(rotated.abs_diff_eq(Vec3::NEG_X, 1e-4));
    }

    #[test]
    fn translation_is_applied_in_local_space() {
        let mut sq = sequence_with_mesh_timestamp(FrameWindow { start: 0, end: 240 });
        let mut curve = linear_curve(AttributeType::TranslationX, 0.0, 4.0);
        curve.points = vec![CurvePoint { x: 0.0, y: 1.0 }];
        sq.timestamps[0].curves.insert(curve);

        // Base rotated 90 degrees around Y: local +X lands on world -Z.
        let base = Transform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        };
        let input = RenderInput::stationary(base);
        let packages = expand_at(&sq, 0, &input);
        assert!(
            packages[0]
                .transform
                .position
                .abs_diff_eq(Vec3::new(0.0, 0.0, -4.0), 1e-4)
        );
    }

    #[test]
    fn scale_override_replaces_transform_scale() {
        let mut sq = sequence_with_mesh_timestamp(FrameWindow { start: 0, end: 240 });
        let mut curve = linear_curve(AttributeType::ScaleX, 0.0, 3.0);
        curve.points = vec![CurvePoint { x: 0.0, y: 1.0 }];
        sq.timestamps[0].curves.insert(curve);

        let base = Transform {
            scale: Vec3::splat(2.0),
            ..Transform::IDENTITY
        };
        let mut input = RenderInput::stationary(base);
        let no_override = expand_at(&sq, 0, &input);
        assert!(
            no_override[0]
                .transform
                .scale
                .abs_diff_eq(Vec3::new(6.0, 2.0, 2.0), 1e-4)
        );

        input.scale_override = Some(Vec3::splat(10.0));
        let with_override = expand_at(&sq, 0, &input);
        assert!(
            with_override[0]
                .transform
                .scale
                .abs_diff_eq(Vec3::new(30.0, 10.0, 10.0), 1e-4)
        );
    }

    #[test]
    fn unset_attributes_keep_defaults() {
        let sq = sequence_with_mesh_timestamp(FrameWindow { start: 0, end: 240 });
        let input = RenderInput::stationary(Transform::IDENTITY);
        let packages = expand_at(&sq, 0, &input);
        assert_eq!(packages[0].attributes, AttributeBundle::default());
    }

    #[test]
    fn none_profile_curves_are_skipped() {
        let mut sq = sequence_with_mesh_timestamp(FrameWindow { start: 0, end: 240 });
        let mut curve = linear_curve(AttributeType::ColorA, 0.0, 0.5);
        curve.profile = CurveProfile::None;
        sq.timestamps[0].curves.insert(curve);
        let input = RenderInput::stationary(Transform::IDENTITY);
        let packages = expand_at(&sq, 120, &input);
        assert_eq!(packages[0].attributes.color.w, 1.0);
    }

    #[test]
    fn bundle_set_covers_every_attribute() {
        let mut bundle = AttributeBundle::default();
        for (i, attr) in AttributeType::ALL.into_iter().enumerate() {
            bundle.set(attr, i as f32 + 100.0);
        }
        // Spot-check the extremes and a few fields in between.
        assert_eq!(bundle.uv_offset.x, 100.0);
        assert_eq!(bundle.translation.z, 104.0);
        assert_eq!(bundle.rotation.y, 106.0);
        assert_eq!(bundle.scale.z, 110.0);
        assert_eq!(bundle.color.w, 114.0);
        assert_eq!(bundle.uv_scale.y, 116.0);
    }

    #[test]
    fn packages_sort_farthest_first() {
        let sq = sequence_with_mesh_timestamp(FrameWindow { start: 0, end: 240 });
        let mut packages = Vec::new();
        for z in [1.0_f32, 9.0, 5.0] {
            let input = RenderInput::stationary(Transform::from_position(Vec3::new(0.0, 0.0, z)));
            let view = PlaybackView {
                sequence: 0,
                frame: 0,
                layer: RenderLayer::Main,
                render_input: &input,
            };
            expand_playback(&mut packages, &view, &sq);
        }
        sort_back_to_front(&mut packages, Vec3::ZERO);
        let zs: Vec<f32> = packages.iter().map(|p| p.transform.position.z).collect();
        assert_eq!(zs, vec![9.0, 5.0, 1.0]);
    }
}
