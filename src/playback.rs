use std::{cell::RefCell, rc::Rc};

use glam::Vec3;

use crate::{
    core::{RenderLayer, SEQUENCE_FRAME_RATE, Transform},
    error::VfxResult,
    sequence::EmitterSlot,
    store::SequenceStore,
};

/// Caller-supplied constant-buffer payload forwarded untouched to the
/// renderer with every package of a playback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomBufferInput {
    pub slot: u32,
    pub data: Vec<u8>,
}

/// Where a playback gets its world transform from.
///
/// `Shared` follows a live gameplay transform; `Stationary` snapshots a
/// value at trigger time. Stop-by-input matches `Shared` bindings by
/// identity of the shared cell, never by value.
#[derive(Clone, Debug)]
pub enum TransformBinding {
    Shared(Rc<RefCell<Transform>>),
    Stationary(Transform),
}

impl TransformBinding {
    /// Current transform value, copied out once per use.
    pub fn resolve(&self) -> Transform {
        match self {
            Self::Shared(cell) => *cell.borrow(),
            Self::Stationary(transform) => *transform,
        }
    }

    /// Identity comparison: true only for two `Shared` bindings over the
    /// same cell. Stationary bindings never match anything.
    pub fn same_target(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Shared(a), Self::Shared(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Everything external code decides about a triggered playback: transform
/// source, layer, looping, bloom, optional scale override and custom buffer
/// payload.
#[derive(Clone, Debug)]
pub struct RenderInput {
    pub transform: TransformBinding,
    pub layer: RenderLayer,
    pub looping: bool,
    pub bloom: bool,
    pub scale_override: Option<Vec3>,
    pub custom_buffer: Option<CustomBufferInput>,
}

impl RenderInput {
    pub fn new(transform: TransformBinding) -> Self {
        Self {
            transform,
            layer: RenderLayer::Main,
            looping: false,
            bloom: true,
            scale_override: None,
            custom_buffer: None,
        }
    }

    pub fn shared(transform: Rc<RefCell<Transform>>) -> Self {
        Self::new(TransformBinding::Shared(transform))
    }

    pub fn stationary(transform: Transform) -> Self {
        Self::new(TransformBinding::Stationary(transform))
    }
}

/// Opaque identifier returned by trigger; the precise way to stop a single
/// playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(u64);

/// One active playing-instance of a sequence.
///
/// Emitter slots are copied out of the sequence at trigger time so that
/// concurrent playbacks of the same sequence never share emitter state.
#[derive(Clone, Debug)]
pub struct PlaybackInstance {
    handle: PlaybackHandle,
    sequence: usize,
    timer: f32,
    frame: i32,
    looping: bool,
    layer: RenderLayer,
    render_input: RenderInput,
    emitters: Vec<EmitterSlot>,
    expired: bool,
}

impl PlaybackInstance {
    pub fn handle(&self) -> PlaybackHandle {
        self.handle
    }

    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn frame(&self) -> i32 {
        self.frame
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn layer(&self) -> RenderLayer {
        self.layer
    }

    pub fn render_input(&self) -> &RenderInput {
        &self.render_input
    }

    pub fn emitters(&self) -> &[EmitterSlot] {
        &self.emitters
    }
}

/// Tracks every currently-triggered playback and advances them each tick.
#[derive(Default)]
pub struct PlaybackQueue {
    instances: Vec<PlaybackInstance>,
    next_handle: u64,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a playback of `sequence` and returns its handle.
    pub fn trigger(
        &mut self,
        sequence: usize,
        store: &SequenceStore,
        input: RenderInput,
    ) -> VfxResult<PlaybackHandle> {
        let sq = store.sequence(sequence)?;
        let handle = PlaybackHandle(self.next_handle);
        self.next_handle += 1;
        self.instances.push(PlaybackInstance {
            handle,
            sequence,
            timer: 0.0,
            frame: 0,
            looping: input.looping,
            layer: input.layer,
            emitters: sq.emitters.clone(),
            render_input: input,
            expired: false,
        });
        tracing::trace!(sequence, ?handle, "triggered playback");
        Ok(handle)
    }

    /// Removes every playback of `sequence` whose transform binding shares
    /// the input's target cell. Known-coarse contract: callers must stop
    /// with the same shared transform they triggered with, and stationary
    /// playbacks cannot be stopped this way (use the handle instead).
    pub fn stop(&mut self, sequence: usize, input: &RenderInput) -> usize {
        let before = self.instances.len();
        self.instances.retain(|inst| {
            !(inst.sequence == sequence
                && inst.render_input.transform.same_target(&input.transform))
        });
        before - self.instances.len()
    }

    /// Removes the single playback identified by `handle`, if still active.
    pub fn stop_handle(&mut self, handle: PlaybackHandle) -> bool {
        let before = self.instances.len();
        self.instances.retain(|inst| inst.handle != handle);
        before != self.instances.len()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Advances every playback by `dt` seconds of wall-clock time.
    ///
    /// Looping playbacks wrap keeping the overshoot; non-looping playbacks
    /// whose timer passes the sequence duration are removed after the pass.
    /// Emitter activity windows are re-evaluated every tick, including the
    /// tick an instance expires on.
    pub fn update(&mut self, dt: f32, store: &SequenceStore) {
        for inst in &mut self.instances {
            let Ok(sq) = store.sequence(inst.sequence) else {
                inst.expired = true;
                continue;
            };
            let duration = sq.duration as f32;

            inst.timer += dt * SEQUENCE_FRAME_RATE;
            if inst.timer > duration {
                if inst.looping {
                    inst.timer %= duration;
                } else {
                    inst.expired = true;
                }
            }
            inst.frame = inst.timer as i32;

            let transform = inst.render_input.transform.resolve();
            for slot in &mut inst.emitters {
                let active = slot.window.contains(inst.frame);
                slot.emitter.update(&transform, active);
            }
        }

        self.instances.retain(|inst| !inst.expired);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaybackInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
