use glam::Vec4;

use crate::core::Transform;

/// Simulation parameters shared by every particle of an emitter. This block
/// is persisted verbatim inside sequence files; field names follow the file
/// format.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedEmitterAttributes {
    pub burst_time_min: f32,
    pub burst_time_max: f32,
    pub burst_count_min: i32,
    pub burst_count_max: i32,

    pub velocity_min: f32,
    pub velocity_max: f32,

    pub acceleration_min: f32,
    pub acceleration_max: f32,

    pub velocity_degradation: f32,
    pub acceleration_degradation: f32,

    pub life_time_min: f32,
    pub life_time_max: f32,
    pub life_time_mid_point: f32,

    pub angle_min: f32,
    pub angle_max: f32,

    pub horizontal_velocity_factor: f32,
    pub vertical_velocity_factor: f32,

    pub start_color: Vec4,
    pub mid_color: Vec4,
    pub end_color: Vec4,

    pub start_size: f32,
    pub mid_size: f32,
    pub end_size: f32,
}

impl Default for SharedEmitterAttributes {
    fn default() -> Self {
        Self {
            burst_time_min: 0.05,
            burst_time_max: 0.1,
            burst_count_min: 1,
            burst_count_max: 4,
            velocity_min: 0.5,
            velocity_max: 1.5,
            acceleration_min: 0.0,
            acceleration_max: 0.0,
            velocity_degradation: 0.0,
            acceleration_degradation: 0.0,
            life_time_min: 0.5,
            life_time_max: 1.5,
            life_time_mid_point: 0.5,
            angle_min: 0.0,
            angle_max: 360.0,
            horizontal_velocity_factor: 1.0,
            vertical_velocity_factor: 1.0,
            start_color: Vec4::ONE,
            mid_color: Vec4::ONE,
            end_color: Vec4::new(1.0, 1.0, 1.0, 0.0),
            start_size: 0.5,
            mid_size: 0.5,
            end_size: 0.5,
        }
    }
}

/// Renderer-side emitter setup: particle capacity, sprite texture and the
/// renderer's batch mode (opaque integer enum owned by the renderer).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EmitterConfig {
    pub capacity: u32,
    pub texture: String,
    pub render_mode: i32,
}

/// A particle emitter as seen by the sequence engine.
///
/// The particle simulation itself lives renderer-side; this type carries the
/// configuration and the externally visible update contract: each tick the
/// owning playback pushes its current world transform and whether the
/// playback frame falls inside the emitter's activity window.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleEmitter {
    pub config: EmitterConfig,
    pub attributes: SharedEmitterAttributes,

    active: bool,
    origin: Transform,
}

impl ParticleEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            config,
            attributes: SharedEmitterAttributes::default(),
            active: false,
            origin: Transform::IDENTITY,
        }
    }

    /// Per-tick contract: records the emission origin and gates spawning on
    /// `active`. Called every tick while the owning playback lives, whether
    /// or not the emitter's window is open.
    pub fn update(&mut self, transform: &Transform, active: bool) {
        self.origin = *transform;
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn origin(&self) -> &Transform {
        &self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn update_records_origin_and_activity() {
        let mut emitter = ParticleEmitter::new(EmitterConfig {
            capacity: 64,
            texture: "spark.png".to_string(),
            render_mode: 0,
        });
        assert!(!emitter.is_active());

        let at = Transform::from_position(Vec3::new(3.0, 0.0, -1.0));
        emitter.update(&at, true);
        assert!(emitter.is_active());
        assert_eq!(emitter.origin().position, at.position);

        emitter.update(&at, false);
        assert!(!emitter.is_active());
    }

    #[test]
    fn shared_attributes_use_file_field_names() {
        let attrs = SharedEmitterAttributes::default();
        let json = serde_json::to_value(&attrs).unwrap();
        assert!(json.get("burstTimeMin").is_some());
        assert!(json.get("lifeTimeMidPoint").is_some());
        assert!(json.get("horizontalVelocityFactor").is_some());
        assert_eq!(json["startColor"].as_array().unwrap().len(), 4);
    }
}
