use glam::Vec3;

use crate::{
    core::{RenderLayer, Transform},
    error::VfxResult,
    expand::{PlaybackView, RenderPackage, expand_playback, sort_back_to_front},
    playback::{PlaybackHandle, PlaybackQueue, RenderInput, TransformBinding},
    store::SequenceStore,
};

/// Owns the sequence store, the playback queue and the per-frame package
/// list, and drives them through the fixed tick cycle:
///
/// 1. [`update`](Self::update) — advance playbacks, expire finished ones,
///    expand the survivors into packages and sort them for the camera.
/// 2. The renderer consumes [`packages`](Self::packages), per layer.
/// 3. [`end_frame`](Self::end_frame) — drop the transient packages.
///
/// Everything runs on one logical thread; trigger/stop may be called
/// anywhere between ticks.
pub struct VfxManager {
    store: SequenceStore,
    queue: PlaybackQueue,
    packages: Vec<RenderPackage>,
}

impl VfxManager {
    pub fn new(store: SequenceStore) -> Self {
        Self {
            store,
            queue: PlaybackQueue::new(),
            packages: Vec::new(),
        }
    }

    pub fn store(&self) -> &SequenceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SequenceStore {
        &mut self.store
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    /// Starts a playback of the sequence at `sequence`.
    pub fn trigger(&mut self, sequence: usize, input: RenderInput) -> VfxResult<PlaybackHandle> {
        self.queue.trigger(sequence, &self.store, input)
    }

    /// Find-or-create convenience: resolves `name` through the store, then
    /// triggers.
    pub fn trigger_by_name(&mut self, name: &str, input: RenderInput) -> VfxResult<PlaybackHandle> {
        let sequence = self.store.index_from_name(name)?;
        self.trigger(sequence, input)
    }

    /// Stops playbacks of `sequence` matching the input's transform
    /// identity; returns how many were removed. See [`PlaybackQueue::stop`]
    /// for the match contract.
    pub fn stop(&mut self, sequence: usize, input: &RenderInput) -> usize {
        self.queue.stop(sequence, input)
    }

    /// Stops the single playback identified by `handle`.
    pub fn stop_handle(&mut self, handle: PlaybackHandle) -> bool {
        self.queue.stop_handle(handle)
    }

    /// Drops every active playback immediately.
    pub fn clear_playbacks(&mut self) {
        self.queue.clear();
    }

    /// One simulation tick: advances the queue by `dt` seconds, expands
    /// every surviving playback into render packages and sorts the whole
    /// list back-to-front for `camera_position`.
    #[tracing::instrument(skip(self))]
    pub fn update(&mut self, dt: f32, camera_position: Vec3) {
        self.queue.update(dt, &self.store);

        for inst in self.queue.iter() {
            let Ok(sq) = self.store.sequence(inst.sequence()) else {
                continue;
            };
            expand_playback(&mut self.packages, &PlaybackView::of(inst), sq);
        }

        sort_back_to_front(&mut self.packages, camera_position);
    }

    /// This frame's packages, farthest from the camera first.
    pub fn packages(&self) -> &[RenderPackage] {
        &self.packages
    }

    /// Packages destined for one render layer, in global sort order.
    pub fn packages_for_layer(&self, layer: RenderLayer) -> impl Iterator<Item = &RenderPackage> {
        self.packages.iter().filter(move |p| p.layer == layer)
    }

    /// Clears the transient package list. Call after the renderer has
    /// consumed this frame's packages.
    pub fn end_frame(&mut self) {
        self.packages.clear();
    }

    /// One-off expansion of a sequence at a caller-chosen frame, without
    /// registering a playback. Used for preview and timeline scrubbing.
    pub fn render_direct(
        &mut self,
        sequence: usize,
        frame: i32,
        transform: Transform,
        layer: RenderLayer,
    ) -> VfxResult<()> {
        let mut input = RenderInput::new(TransformBinding::Stationary(transform));
        input.layer = layer;
        let view = PlaybackView {
            sequence,
            frame,
            layer,
            render_input: &input,
        };
        let sq = self.store.sequence(sequence)?;
        expand_playback(&mut self.packages, &view, sq);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::StockResources,
        core::FrameWindow,
        sequence::{EffectRef, Sequence, Timestamp},
    };

    fn manager_with_sequence() -> VfxManager {
        let mut store = SequenceStore::with_stock_resources("unused");
        let mut sq = Sequence::new(0);
        sq.name = "beam".to_string();
        sq.duration = 240;
        sq.add_mesh_instance(&StockResources);
        sq.timestamps.push(Timestamp::new(
            FrameWindow { start: 0, end: 240 },
            EffectRef::Mesh(0),
        ));
        store.push_for_tests(sq);
        VfxManager::new(store)
    }

    #[test]
    fn update_expands_and_end_frame_clears() {
        let mut mgr = manager_with_sequence();
        mgr.trigger(0, RenderInput::stationary(Transform::IDENTITY))
            .unwrap();

        mgr.update(0.1, Vec3::ZERO);
        assert_eq!(mgr.packages().len(), 1);
        assert_eq!(mgr.packages_for_layer(RenderLayer::Main).count(), 1);
        assert_eq!(mgr.packages_for_layer(RenderLayer::Overlay).count(), 0);

        mgr.end_frame();
        assert!(mgr.packages().is_empty());
    }

    #[test]
    fn packages_accumulate_until_end_frame() {
        let mut mgr = manager_with_sequence();
        mgr.trigger(0, RenderInput::stationary(Transform::IDENTITY))
            .unwrap();
        mgr.update(0.1, Vec3::ZERO);
        mgr.update(0.1, Vec3::ZERO);
        assert_eq!(mgr.packages().len(), 2);
        mgr.end_frame();
        assert!(mgr.packages().is_empty());
    }

    #[test]
    fn render_direct_does_not_register_a_playback() {
        let mut mgr = manager_with_sequence();
        mgr.render_direct(0, 120, Transform::IDENTITY, RenderLayer::Foreground)
            .unwrap();
        assert_eq!(mgr.packages().len(), 1);
        assert_eq!(mgr.packages()[0].layer, RenderLayer::Foreground);
        assert!(mgr.queue().is_empty());
    }

    #[test]
    fn update_sorts_across_playbacks() {
        let mut mgr = manager_with_sequence();
        for z in [2.0_f32, 8.0] {
            mgr.trigger(
                0,
                RenderInput::stationary(Transform::from_position(Vec3::new(0.0, 0.0, z))),
            )
            .unwrap();
        }
        mgr.update(0.1, Vec3::ZERO);
        let zs: Vec<f32> = mgr
            .packages()
            .iter()
            .map(|p| p.transform.position.z)
            .collect();
        assert_eq!(zs, vec![8.0, 2.0]);
    }

    #[test]
    fn trigger_unknown_sequence_is_an_error() {
        let mut mgr = manager_with_sequence();
        assert!(
            mgr.trigger(5, RenderInput::stationary(Transform::IDENTITY))
                .is_err()
        );
    }
}
