//! Persisted sequence representation.
//!
//! One JSON document per sequence, field-compatible with files produced by
//! the original authoring tools. This module owns the mapping between the
//! on-disk shape and the in-memory [`Sequence`] model; everything else in
//! the crate works on the in-memory model only.

use crate::{
    assets::{MaterialTextures, ModelSpec},
    core::FrameWindow,
    curve::{AttributeType, CurveDataSet, CurvePoint, CurveProfile},
    emitter::{EmitterConfig, ParticleEmitter, SharedEmitterAttributes},
    error::{VfxError, VfxResult},
    sequence::{EffectRef, EmitterSlot, MeshInstance, Sequence, Timestamp},
};

/// Persisted `type` tag of a timestamp.
const EFFECT_KIND_EMITTER: i32 = 0;
const EFFECT_KIND_MESH: i32 = 1;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SequenceFile {
    pub name: String,
    pub duration: i32,
    pub meshes: Vec<MeshEntry>,
    #[serde(rename = "particleEmitters")]
    pub particle_emitters: Vec<EmitterEntry>,
    pub timestamps: Vec<TimestampEntry>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MeshEntry {
    /// Mesh source path.
    pub name: String,
    pub albedo: String,
    pub normal: String,
    pub material: String,
    pub effects: String,
    #[serde(rename = "vertexShader")]
    pub vertex_shader: String,
    #[serde(rename = "pixelShader")]
    pub pixel_shader: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EmitterEntry {
    #[serde(rename = "particleCapacity")]
    pub particle_capacity: u32,
    #[serde(rename = "particleTexture")]
    pub particle_texture: String,
    #[serde(rename = "particleMode")]
    pub particle_mode: i32,
    #[serde(rename = "sharedParticleAttributes")]
    pub shared_attributes: SharedEmitterAttributes,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TimestampEntry {
    #[serde(rename = "type")]
    pub kind: i32,
    pub start: i32,
    pub end: i32,
    #[serde(rename = "effectIndex")]
    pub effect_index: i32,
    pub curves: Vec<CurveEntry>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CurveEntry {
    #[serde(rename = "curveAttribute")]
    pub attribute: i32,
    #[serde(rename = "curveProfile")]
    pub profile: i32,
    #[serde(rename = "minValue")]
    pub min_value: f32,
    #[serde(rename = "maxValue")]
    pub max_value: f32,
    pub points: Vec<PointEntry>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct PointEntry {
    pub x: f32,
    pub y: f32,
}

impl SequenceFile {
    pub fn from_sequence(sq: &Sequence) -> Self {
        Self {
            name: sq.name.clone(),
            duration: sq.duration,
            meshes: sq.meshes.iter().map(mesh_entry).collect(),
            particle_emitters: sq.emitters.iter().map(emitter_entry).collect(),
            timestamps: sq.timestamps.iter().map(timestamp_entry).collect(),
        }
    }

    /// Replaces `sq`'s meshes, emitters and timestamps with the file's
    /// contents. Index and in-memory name are preserved; the store keys
    /// files by the in-memory name.
    pub fn apply_to(&self, sq: &mut Sequence) -> VfxResult<()> {
        sq.clear_contents();
        sq.duration = self.duration;

        for mesh in &self.meshes {
            sq.meshes.push(MeshInstance::new(ModelSpec {
                mesh_path: mesh.name.clone(),
                textures: MaterialTextures {
                    albedo: mesh.albedo.clone(),
                    normal: mesh.normal.clone(),
                    material: mesh.material.clone(),
                    effects: mesh.effects.clone(),
                },
                vertex_shader: mesh.vertex_shader.clone(),
                pixel_shader: mesh.pixel_shader.clone(),
            }));
        }

        for entry in &self.particle_emitters {
            let mut emitter = ParticleEmitter::new(EmitterConfig {
                capacity: entry.particle_capacity,
                texture: entry.particle_texture.clone(),
                render_mode: entry.particle_mode,
            });
            emitter.attributes = entry.shared_attributes.clone();
            sq.emitters.push(EmitterSlot {
                emitter,
                window: FrameWindow { start: 0, end: 0 },
            });
        }

        for (i, entry) in self.timestamps.iter().enumerate() {
            let effect_index = usize::try_from(entry.effect_index).map_err(|_| {
                VfxError::serde(format!(
                    "timestamp {i}: negative effectIndex {}",
                    entry.effect_index
                ))
            })?;
            let effect = match entry.kind {
                EFFECT_KIND_EMITTER => EffectRef::Emitter(effect_index),
                EFFECT_KIND_MESH => EffectRef::Mesh(effect_index),
                other => {
                    return Err(VfxError::serde(format!(
                        "timestamp {i}: unknown effect type tag {other}"
                    )));
                }
            };
            let window = FrameWindow {
                start: entry.start,
                end: entry.end,
            };

            // Emitter activity windows are persisted only through their
            // timestamps; stamp them back onto the slot here.
            if let EffectRef::Emitter(e) = effect {
                let slot = sq.emitters.get_mut(e).ok_or_else(|| {
                    VfxError::serde(format!("timestamp {i}: references missing emitter {e}"))
                })?;
                slot.window = window;
            }

            let mut ts = Timestamp::new(window, effect);
            for curve in &entry.curves {
                let Some(attribute) = AttributeType::from_index(curve.attribute) else {
                    // Unknown attribute tags are dropped, not fatal: files
                    // written by newer authoring builds may carry attributes
                    // this build does not know about.
                    tracing::warn!(
                        timestamp = i,
                        attribute = curve.attribute,
                        "skipping curve with out-of-range attribute index"
                    );
                    continue;
                };
                let profile = CurveProfile::from_index(curve.profile).unwrap_or_else(|| {
                    tracing::warn!(
                        timestamp = i,
                        profile = curve.profile,
                        "unknown curve profile index, treating curve as unset"
                    );
                    CurveProfile::None
                });
                ts.curves.insert(CurveDataSet {
                    attribute,
                    profile,
                    min_value: curve.min_value,
                    max_value: curve.max_value,
                    points: curve
                        .points
                        .iter()
                        .map(|p| CurvePoint { x: p.x, y: p.y })
                        .collect(),
                });
            }
            sq.timestamps.push(ts);
        }

        Ok(())
    }
}

fn mesh_entry(mesh: &MeshInstance) -> MeshEntry {
    MeshEntry {
        name: mesh.model.mesh_path.clone(),
        albedo: mesh.model.textures.albedo.clone(),
        normal: mesh.model.textures.normal.clone(),
        material: mesh.model.textures.material.clone(),
        effects: mesh.model.textures.effects.clone(),
        vertex_shader: mesh.model.vertex_shader.clone(),
        pixel_shader: mesh.model.pixel_shader.clone(),
    }
}

fn emitter_entry(slot: &EmitterSlot) -> EmitterEntry {
    EmitterEntry {
        particle_capacity: slot.emitter.config.capacity,
        particle_texture: slot.emitter.config.texture.clone(),
        particle_mode: slot.emitter.config.render_mode,
        shared_attributes: slot.emitter.attributes.clone(),
    }
}

fn timestamp_entry(ts: &Timestamp) -> TimestampEntry {
    let (kind, effect_index) = match ts.effect {
        EffectRef::Emitter(e) => (EFFECT_KIND_EMITTER, e as i32),
        EffectRef::Mesh(m) => (EFFECT_KIND_MESH, m as i32),
    };
    TimestampEntry {
        kind,
        start: ts.window.start,
        end: ts.window.end,
        effect_index,
        curves: ts
            .curves
            .iter()
            .map(|curve| CurveEntry {
                attribute: curve.attribute.index() as i32,
                profile: curve.profile.index(),
                min_value: curve.min_value,
                max_value: curve.max_value,
                points: curve
                    .points
                    .iter()
                    .map(|p| PointEntry { x: p.x, y: p.y })
                    .collect(),
            })
            .collect(),
    }
}
