//! Playback and authoring engine for timed visual-effect sequences:
//! frame-indexed timelines of mesh instances and particle emitters with
//! per-attribute animation curves, advanced at a fixed 120 fps simulation
//! rate and expanded each tick into a camera-sorted render queue.
#![forbid(unsafe_code)]

pub mod assets;
pub mod core;
pub mod curve;
pub mod emitter;
pub mod error;
pub mod expand;
pub mod format;
pub mod manager;
pub mod playback;
pub mod sequence;
pub mod store;

pub use assets::{MaterialTextures, ModelSpec, ResourceCatalog, StockResources};
pub use core::{FrameWindow, RenderLayer, SEQUENCE_FRAME_RATE, Transform};
pub use curve::{AttributeType, CurveDataSet, CurvePoint, CurveProfile, CurveSet};
pub use emitter::{EmitterConfig, ParticleEmitter, SharedEmitterAttributes};
pub use error::{VfxError, VfxResult};
pub use expand::{AttributeBundle, ModelRef, PlaybackView, RenderPackage};
pub use format::SequenceFile;
pub use manager::VfxManager;
pub use playback::{
    CustomBufferInput, PlaybackHandle, PlaybackInstance, PlaybackQueue, RenderInput,
    TransformBinding,
};
pub use sequence::{EffectRef, EmitterSlot, MeshInstance, Sequence, Timestamp};
pub use store::{DEFAULT_SEQUENCE_DIR, SEQUENCE_FILE_EXT, SequenceStore};
