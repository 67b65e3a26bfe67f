use crate::{
    assets::{ModelSpec, ResourceCatalog},
    core::{FrameWindow, SEQUENCE_FRAME_RATE, Transform},
    curve::CurveSet,
    emitter::{EmitterConfig, ParticleEmitter},
    error::{VfxError, VfxResult},
};

/// A static mesh bound to a sequence, placed by a local transform and
/// referenced by index from mesh-typed timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshInstance {
    pub model: ModelSpec,
    pub transform: Transform,
}

impl MeshInstance {
    pub fn new(model: ModelSpec) -> Self {
        Self {
            model,
            transform: Transform::IDENTITY,
        }
    }
}

/// A particle emitter plus its activity window in sequence time. The window
/// gates activity against the *owning playback's* current frame, so two
/// concurrent playbacks of one sequence never share emitter state.
#[derive(Clone, Debug, PartialEq)]
pub struct EmitterSlot {
    pub emitter: ParticleEmitter,
    pub window: FrameWindow,
}

impl EmitterSlot {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            emitter: ParticleEmitter::new(config),
            window: FrameWindow { start: 0, end: 0 },
        }
    }
}

/// Which effect a timestamp drives, by index into the owning sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectRef {
    Emitter(usize),
    Mesh(usize),
}

/// Binds a timeline segment to an effect, with one optional curve per
/// renderable attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Timestamp {
    pub window: FrameWindow,
    pub effect: EffectRef,
    pub curves: CurveSet,
}

impl Timestamp {
    pub fn new(window: FrameWindow, effect: EffectRef) -> Self {
        Self {
            window,
            effect,
            curves: CurveSet::default(),
        }
    }
}

/// A named, frame-indexed timeline of mesh instances and particle emitters.
///
/// Owned by the [`SequenceStore`](crate::store::SequenceStore); identified by
/// a stable index assigned at creation and never reused while the sequence
/// lives.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    pub name: String,
    /// Total length in frames at [`SEQUENCE_FRAME_RATE`].
    pub duration: i32,
    index: usize,

    pub meshes: Vec<MeshInstance>,
    pub emitters: Vec<EmitterSlot>,
    pub timestamps: Vec<Timestamp>,
}

impl Sequence {
    pub fn new(index: usize) -> Self {
        Self {
            name: "New Sequence".to_string(),
            duration: SEQUENCE_FRAME_RATE as i32,
            index,
            meshes: Vec::new(),
            emitters: Vec::new(),
            timestamps: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Appends a default-initialized mesh instance wired from the catalog.
    pub fn add_mesh_instance(&mut self, catalog: &dyn ResourceCatalog) -> usize {
        self.meshes.push(MeshInstance::new(catalog.default_model()));
        self.meshes.len() - 1
    }

    /// Appends a default-initialized emitter slot wired from the catalog.
    pub fn add_emitter_slot(&mut self, catalog: &dyn ResourceCatalog) -> usize {
        self.emitters.push(EmitterSlot::new(catalog.default_emitter()));
        self.emitters.len() - 1
    }

    /// Drops meshes, emitters and timestamps, keeping name and index. Load
    /// repopulates on top of this.
    pub fn clear_contents(&mut self) {
        self.meshes.clear();
        self.emitters.clear();
        self.timestamps.clear();
    }

    pub fn validate(&self) -> VfxResult<()> {
        if self.duration <= 0 {
            return Err(VfxError::validation(format!(
                "sequence '{}' duration must be > 0 frames",
                self.name
            )));
        }

        for (i, ts) in self.timestamps.iter().enumerate() {
            if ts.window.start > ts.window.end {
                return Err(VfxError::validation(format!(
                    "sequence '{}' timestamp {i} has an inverted window",
                    self.name
                )));
            }
            match ts.effect {
                EffectRef::Mesh(m) if m >= self.meshes.len() => {
                    return Err(VfxError::validation(format!(
                        "sequence '{}' timestamp {i} references missing mesh {m}",
                        self.name
                    )));
                }
                EffectRef::Emitter(e) if e >= self.emitters.len() => {
                    return Err(VfxError::validation(format!(
                        "sequence '{}' timestamp {i} references missing emitter {e}",
                        self.name
                    )));
                }
                _ => {}
            }
            // Curve evaluation divides by the window span.
            if !ts.curves.is_empty() && ts.window.span() == 0 {
                return Err(VfxError::validation(format!(
                    "sequence '{}' timestamp {i} has curves on a zero-length window",
                    self.name
                )));
            }
            ts.curves.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::StockResources;
    use crate::curve::{AttributeType, CurveDataSet};

    fn basic_sequence() -> Sequence {
        let mut sq = Sequence::new(0);
        sq.duration = 240;
        sq.add_mesh_instance(&StockResources);
        let mut ts = Timestamp::new(FrameWindow { start: 0, end: 240 }, EffectRef::Mesh(0));
        ts.curves.insert(CurveDataSet::new(AttributeType::RotationY));
        sq.timestamps.push(ts);
        sq
    }

    #[test]
    fn basic_sequence_validates() {
        basic_sequence().validate().unwrap();
    }

    #[test]
    fn validate_rejects_missing_effect_index() {
        let mut sq = basic_sequence();
        sq.timestamps[0].effect = EffectRef::Mesh(3);
        assert!(sq.validate().is_err());
        sq.timestamps[0].effect = EffectRef::Emitter(0);
        assert!(sq.validate().is_err());
    }

    #[test]
    fn validate_rejects_curves_on_zero_length_window() {
        let mut sq = basic_sequence();
        sq.timestamps[0].window = FrameWindow { start: 10, end: 10 };
        assert!(sq.validate().is_err());
    }

    #[test]
    fn validate_rejects_nonpositive_duration() {
        let mut sq = basic_sequence();
        sq.duration = 0;
        assert!(sq.validate().is_err());
    }

    #[test]
    fn add_helpers_wire_catalog_defaults() {
        let mut sq = Sequence::new(1);
        let m = sq.add_mesh_instance(&StockResources);
        let e = sq.add_emitter_slot(&StockResources);
        assert_eq!(m, 0);
        assert_eq!(e, 0);
        assert!(!sq.meshes[0].model.mesh_path.is_empty());
        assert!(sq.emitters[0].emitter.config.capacity > 0);
    }
}
