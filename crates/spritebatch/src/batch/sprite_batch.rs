use crate::coords::Rect;
use crate::device::GraphicsDevice;
use crate::paint::Color;
use crate::scene::{Glyph, GlyphQueue, SortPolicy, TextureId, Vertex};

use super::builder::{build_batches, RenderBatch, VERTICES_PER_SPRITE};

/// Lifecycle position of a [`SpriteBatch`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BatchState {
    /// No frame in progress.
    Idle,
    /// Between `begin` and `end`; `draw` is accepted.
    Recording,
    /// Batches are built and uploaded; `render` is accepted.
    Built,
}

/// Per-frame counters, valid from `end` until the next `begin`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub sprites: u32,
    pub vertices: u32,
    pub batches: u32,
    /// Texture binds beyond the first one.
    pub texture_switches: u32,
}

/// Sorts queued sprites, packs them into one vertex stream and replays the
/// resulting texture batches on a [`GraphicsDevice`].
///
/// Per frame:
///
/// ```ignore
/// batch.begin(SortPolicy::Texture);
/// batch.draw(dest, uv, texture, depth, Color::WHITE);
/// batch.end()?;    // sort, build batches, upload vertices
/// batch.render()?; // one bind + draw per batch
/// ```
///
/// `draw` outside `begin`/`end` and `render` without a preceding `end` are
/// programming errors and panic. `begin` is always accepted and discards any
/// frame that was built but never rendered.
///
/// The device is owned by the batch: its vertex buffer is created in
/// [`SpriteBatch::new`] and released when the batch is dropped.
#[derive(Debug)]
pub struct SpriteBatch<D: GraphicsDevice> {
    device: D,
    state: BatchState,
    policy: SortPolicy,

    queue: GlyphQueue,
    vertices: Vec<Vertex>,
    batches: Vec<RenderBatch>,
    stats: FrameStats,
}

impl<D: GraphicsDevice> SpriteBatch<D> {
    /// Takes ownership of `device` and creates its vertex buffer.
    pub fn new(device: D) -> Result<Self, D::Error> {
        Self::with_capacity(device, 0)
    }

    /// Like [`SpriteBatch::new`], reserving room for `sprites` queued sprites.
    pub fn with_capacity(mut device: D, sprites: usize) -> Result<Self, D::Error> {
        device.create_vertex_buffer()?;
        Ok(Self {
            device,
            state: BatchState::Idle,
            policy: SortPolicy::default(),
            queue: GlyphQueue::with_capacity(sprites),
            vertices: Vec::new(),
            batches: Vec::new(),
            stats: FrameStats::default(),
        })
    }

    /// Starts a frame. Always legal; resets any previous frame.
    pub fn begin(&mut self, policy: SortPolicy) {
        if self.state == BatchState::Built && !self.batches.is_empty() {
            log::warn!(
                "SpriteBatch::begin: discarding {} unrendered batches",
                self.batches.len()
            );
        }

        self.policy = policy;
        self.queue.clear();
        self.vertices.clear();
        self.batches.clear();
        self.stats = FrameStats::default();
        self.state = BatchState::Recording;
    }

    /// Queues one sprite.
    ///
    /// `dest` is in logical pixels and `uv` in texture space; both use a
    /// bottom-left `(x, y)`. Zero or negative sizes are accepted as-is.
    ///
    /// # Panics
    /// Panics if called outside `begin`/`end`.
    pub fn draw(&mut self, dest: Rect, uv: Rect, texture: TextureId, depth: f32, color: Color) {
        assert!(
            self.state == BatchState::Recording,
            "SpriteBatch::draw called while {:?}; call begin() first",
            self.state
        );
        self.queue.push(Glyph::new(dest, uv, texture, depth, color));
    }

    /// Queues a white-tinted sprite showing the whole texture.
    ///
    /// # Panics
    /// Panics if called outside `begin`/`end`.
    #[inline]
    pub fn draw_sprite(&mut self, dest: Rect, texture: TextureId, depth: f32) {
        self.draw(dest, Rect::UNIT, texture, depth, Color::WHITE);
    }

    /// Sorts the queued sprites, builds batches and uploads the vertex stream.
    ///
    /// The queued requests are dropped afterwards. An empty frame uploads an
    /// empty stream and produces no batches.
    ///
    /// On upload failure the frame is discarded and the batch returns to idle.
    ///
    /// # Panics
    /// Panics if called without a matching `begin`, or if more than
    /// [`MAX_SPRITES`](super::MAX_SPRITES) sprites were queued.
    pub fn end(&mut self) -> Result<(), D::Error> {
        assert!(
            self.state == BatchState::Recording,
            "SpriteBatch::end called while {:?}; call begin() first",
            self.state
        );

        self.queue.sort(self.policy);
        build_batches(self.queue.glyphs(), &mut self.vertices, &mut self.batches);
        self.queue.clear();

        self.stats = FrameStats {
            sprites: self.vertices.len() as u32 / VERTICES_PER_SPRITE,
            vertices: self.vertices.len() as u32,
            batches: self.batches.len() as u32,
            texture_switches: (self.batches.len() as u32).saturating_sub(1),
        };
        log::trace!(
            "SpriteBatch::end: {} sprites -> {} batches ({:?})",
            self.stats.sprites,
            self.stats.batches,
            self.policy
        );

        if let Err(err) = self.device.upload_vertices(&self.vertices) {
            log::debug!("SpriteBatch::end: upload failed, discarding frame");
            self.vertices.clear();
            self.batches.clear();
            self.stats = FrameStats::default();
            self.state = BatchState::Idle;
            return Err(err);
        }

        self.state = BatchState::Built;
        Ok(())
    }

    /// Replays the built batches: for each, bind its texture then draw its range.
    ///
    /// Stops at the first device error and returns it. The batch returns to idle
    /// either way.
    ///
    /// # Panics
    /// Panics if called without a preceding `end`.
    pub fn render(&mut self) -> Result<(), D::Error> {
        assert!(
            self.state == BatchState::Built,
            "SpriteBatch::render called while {:?}; call end() first",
            self.state
        );
        self.state = BatchState::Idle;

        for batch in &self.batches {
            self.device.bind_texture(batch.texture)?;
            self.device.draw_range(batch.offset, batch.vertex_count)?;
        }
        Ok(())
    }

    #[inline]
    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Sort policy of the current (or last) frame.
    #[inline]
    pub fn policy(&self) -> SortPolicy {
        self.policy
    }

    /// Number of sprites queued in the current frame.
    #[inline]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Vertex stream of the last `end`, in batch order.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Batches of the last `end`.
    #[inline]
    pub fn batches(&self) -> &[RenderBatch] {
        &self.batches
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Releases the batch and returns the device.
    #[inline]
    pub fn into_device(self) -> D {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, DeviceError, RecordingDevice};

    fn batch() -> SpriteBatch<RecordingDevice> {
        SpriteBatch::new(RecordingDevice::new()).unwrap()
    }

    /// Sprite whose draw-call index is stored in `dest.x`.
    fn draw(b: &mut SpriteBatch<RecordingDevice>, order: u32, texture: u32, depth: f32) {
        b.draw(
            Rect::new(order as f32, 0.0, 1.0, 1.0),
            Rect::UNIT,
            TextureId(texture),
            depth,
            Color::WHITE,
        );
    }

    /// Draw-call indices in output order, one per quad.
    fn output_order(b: &SpriteBatch<RecordingDevice>) -> Vec<u32> {
        b.vertices().chunks_exact(6).map(|q| q[1].position[0] as u32).collect()
    }

    /// `(texture, depth)` per quad is not stored in vertices, so rebuild it from
    /// the draw-call table used by the test.
    fn depths_in_output(b: &SpriteBatch<RecordingDevice>, table: &[(u32, f32)]) -> Vec<f32> {
        output_order(b).iter().map(|&i| table[i as usize].1).collect()
    }

    fn frame(policy: SortPolicy, table: &[(u32, f32)]) -> SpriteBatch<RecordingDevice> {
        let mut b = batch();
        b.begin(policy);
        for (i, &(texture, depth)) in table.iter().enumerate() {
            draw(&mut b, i as u32, texture, depth);
        }
        b.end().unwrap();
        b
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn new_creates_vertex_buffer_once() {
        let b = batch();
        assert_eq!(b.device().calls(), &[DeviceCall::CreateVertexBuffer]);
        assert_eq!(b.state(), BatchState::Idle);
    }

    // ── empty frame ───────────────────────────────────────────────────────

    #[test]
    fn empty_frame_yields_nothing_and_renders_nothing() {
        let mut b = batch();
        b.begin(SortPolicy::Texture);
        b.end().unwrap();
        assert!(b.vertices().is_empty());
        assert!(b.batches().is_empty());

        b.render().unwrap();
        assert_eq!(b.device().draw_count(), 0);
        assert_eq!(b.device().calls().last(), Some(&DeviceCall::Upload { vertices: 0 }));
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn single_sprite_geometry_and_batch() {
        let mut b = batch();
        b.begin(SortPolicy::Texture);
        b.draw(Rect::new(0.0, 0.0, 10.0, 20.0), Rect::UNIT, TextureId(5), 0.0, Color::WHITE);
        b.end().unwrap();

        let positions: Vec<[f32; 2]> = b.vertices().iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![[0.0, 20.0], [0.0, 0.0], [10.0, 0.0], [0.0, 20.0], [10.0, 20.0], [10.0, 0.0]]
        );
        assert_eq!(b.batches(), &[RenderBatch::new(0, 6, TextureId(5))]);
        assert_eq!(b.device().uploaded(), b.vertices());
    }

    #[test]
    fn two_texture_merge() {
        let b = frame(SortPolicy::Texture, &[(5, 0.0), (5, 0.0), (7, 0.0)]);
        assert_eq!(
            b.batches(),
            &[RenderBatch::new(0, 12, TextureId(5)), RenderBatch::new(12, 6, TextureId(7))]
        );
        assert_eq!(
            b.stats(),
            FrameStats { sprites: 3, vertices: 18, batches: 2, texture_switches: 1 }
        );
    }

    // ── properties ────────────────────────────────────────────────────────

    #[test]
    fn vertex_count_and_partition_for_every_policy() {
        let policies = [SortPolicy::Texture, SortPolicy::FrontToBack, SortPolicy::BackToFront];
        for policy in policies {
            for n in 0..25u32 {
                let table: Vec<(u32, f32)> =
                    (0..n).map(|i| ((i * 5) % 3, ((i * 7) % 4) as f32)).collect();
                let b = frame(policy, &table);

                assert_eq!(b.vertices().len(), 6 * n as usize);
                let mut next = 0;
                for batch in b.batches() {
                    assert_eq!(batch.offset, next);
                    next += batch.vertex_count;
                }
                assert_eq!(next, 6 * n);
            }
        }
    }

    #[test]
    fn texture_policy_groups_each_texture_once() {
        let table = [(3, 0.0), (1, 0.0), (3, 0.0), (2, 0.0), (1, 0.0), (3, 0.0)];
        let b = frame(SortPolicy::Texture, &table);

        let textures: Vec<u32> = b.batches().iter().map(|b| b.texture.get()).collect();
        assert_eq!(textures, vec![1, 2, 3]);
        let counts: Vec<u32> = b.batches().iter().map(|b| b.sprite_count()).collect();
        assert_eq!(counts, vec![2, 1, 3]);
        // Stable within each texture.
        assert_eq!(output_order(&b), vec![1, 4, 3, 0, 2, 5]);
    }

    #[test]
    fn front_to_back_orders_ascending_depth_stably() {
        let table = [(0, 2.0), (1, -1.0), (2, 2.0), (3, 0.5), (4, -1.0)];
        let b = frame(SortPolicy::FrontToBack, &table);

        let depths = depths_in_output(&b, &table);
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(output_order(&b), vec![1, 4, 3, 0, 2]);
    }

    #[test]
    fn back_to_front_orders_descending_depth_stably() {
        let table = [(0, 2.0), (1, -1.0), (2, 2.0), (3, 0.5), (4, -1.0)];
        let b = frame(SortPolicy::BackToFront, &table);

        let depths = depths_in_output(&b, &table);
        assert!(depths.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(output_order(&b), vec![0, 2, 3, 1, 4]);
    }

    #[test]
    fn depth_policy_splits_batches_on_interleaved_textures() {
        // Painter's order wins over grouping: 5,7,5 stays three batches.
        let b = frame(SortPolicy::BackToFront, &[(5, 3.0), (7, 2.0), (5, 1.0)]);
        let textures: Vec<u32> = b.batches().iter().map(|b| b.texture.get()).collect();
        assert_eq!(textures, vec![5, 7, 5]);
    }

    // ── render ────────────────────────────────────────────────────────────

    #[test]
    fn render_binds_then_draws_each_batch_in_order() {
        let mut b = frame(SortPolicy::Texture, &[(7, 0.0), (5, 0.0), (5, 0.0)]);
        b.device_mut().take_calls();
        b.render().unwrap();

        assert_eq!(
            b.device().calls(),
            &[
                DeviceCall::BindTexture(TextureId(5)),
                DeviceCall::DrawRange { offset: 0, count: 12 },
                DeviceCall::BindTexture(TextureId(7)),
                DeviceCall::DrawRange { offset: 12, count: 6 },
            ]
        );
        assert_eq!(b.state(), BatchState::Idle);
    }

    #[test]
    fn render_propagates_unknown_texture() {
        let mut b = SpriteBatch::new(RecordingDevice::with_textures([TextureId(1)])).unwrap();
        b.begin(SortPolicy::Texture);
        b.draw_sprite(Rect::from_size(1.0, 1.0), TextureId(1), 0.0);
        b.draw_sprite(Rect::from_size(1.0, 1.0), TextureId(9), 0.0);
        b.end().unwrap();

        assert_eq!(b.render(), Err(DeviceError::UnknownTexture(TextureId(9))));
        assert_eq!(b.device().draw_count(), 1);
        assert_eq!(b.state(), BatchState::Idle);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn begin_discards_unrendered_frame() {
        let mut b = frame(SortPolicy::Texture, &[(1, 0.0)]);
        assert_eq!(b.state(), BatchState::Built);

        b.begin(SortPolicy::FrontToBack);
        assert_eq!(b.state(), BatchState::Recording);
        assert_eq!(b.policy(), SortPolicy::FrontToBack);
        assert!(b.batches().is_empty());
        assert_eq!(b.stats(), FrameStats::default());
    }

    #[test]
    fn requests_are_dropped_at_end() {
        let mut b = batch();
        b.begin(SortPolicy::Texture);
        draw(&mut b, 0, 1, 0.0);
        assert_eq!(b.queued(), 1);
        b.end().unwrap();
        assert_eq!(b.queued(), 0);
    }

    #[test]
    fn frames_do_not_leak_into_each_other() {
        let mut b = frame(SortPolicy::Texture, &[(1, 0.0), (2, 0.0)]);
        b.render().unwrap();

        b.begin(SortPolicy::Texture);
        draw(&mut b, 0, 3, 0.0);
        b.end().unwrap();
        assert_eq!(b.batches(), &[RenderBatch::new(0, 6, TextureId(3))]);
        assert_eq!(b.device().uploaded().len(), 6);
    }

    #[test]
    #[should_panic(expected = "call begin() first")]
    fn draw_before_begin_panics() {
        let mut b = batch();
        draw(&mut b, 0, 1, 0.0);
    }

    #[test]
    #[should_panic(expected = "call begin() first")]
    fn draw_after_end_panics() {
        let mut b = frame(SortPolicy::Texture, &[]);
        draw(&mut b, 0, 1, 0.0);
    }

    #[test]
    #[should_panic(expected = "call end() first")]
    fn render_before_end_panics() {
        let mut b = batch();
        b.begin(SortPolicy::Texture);
        let _ = b.render();
    }

    #[test]
    #[should_panic(expected = "call end() first")]
    fn render_twice_panics() {
        let mut b = frame(SortPolicy::Texture, &[(1, 0.0)]);
        b.render().unwrap();
        let _ = b.render();
    }

    #[test]
    #[should_panic(expected = "call begin() first")]
    fn end_without_begin_panics() {
        let mut b = batch();
        let _ = b.end();
    }

    /// Recording device whose next upload fails once.
    #[derive(Debug, Default)]
    struct FailingUpload {
        inner: RecordingDevice,
        fail_next: bool,
    }

    impl GraphicsDevice for FailingUpload {
        type Error = DeviceError;

        fn create_vertex_buffer(&mut self) -> Result<(), DeviceError> {
            self.inner.create_vertex_buffer()
        }

        fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<(), DeviceError> {
            if std::mem::take(&mut self.fail_next) {
                return Err(DeviceError::VertexBufferTooLarge { required: vertices.len(), max: 0 });
            }
            self.inner.upload_vertices(vertices)
        }

        fn bind_texture(&mut self, texture: TextureId) -> Result<(), DeviceError> {
            self.inner.bind_texture(texture)
        }

        fn draw_range(&mut self, offset: u32, count: u32) -> Result<(), DeviceError> {
            self.inner.draw_range(offset, count)
        }
    }

    #[test]
    fn upload_failure_discards_frame_and_recovers() {
        let mut b = SpriteBatch::new(FailingUpload { fail_next: true, ..Default::default() }).unwrap();
        b.begin(SortPolicy::Texture);
        b.draw_sprite(Rect::from_size(1.0, 1.0), TextureId(1), 0.0);

        assert_eq!(b.end(), Err(DeviceError::VertexBufferTooLarge { required: 6, max: 0 }));
        assert_eq!(b.state(), BatchState::Idle);
        assert!(b.vertices().is_empty());
        assert!(b.batches().is_empty());
        assert_eq!(b.stats(), FrameStats::default());

        b.begin(SortPolicy::Texture);
        b.draw_sprite(Rect::from_size(1.0, 1.0), TextureId(2), 0.0);
        b.end().unwrap();
        assert_eq!(b.state(), BatchState::Built);
        assert_eq!(b.batches(), &[RenderBatch::new(0, 6, TextureId(2))]);

        b.render().unwrap();
        assert_eq!(b.device().inner.draw_count(), 1);
    }

    #[test]
    #[should_panic(expected = "call end() first")]
    fn render_after_failed_upload_panics() {
        let mut b = SpriteBatch::new(FailingUpload { fail_next: true, ..Default::default() }).unwrap();
        b.begin(SortPolicy::Texture);
        b.draw_sprite(Rect::from_size(1.0, 1.0), TextureId(1), 0.0);
        let _ = b.end();
        let _ = b.render();
    }

    #[test]
    fn into_device_returns_owned_device() {
        let b = frame(SortPolicy::Texture, &[(1, 0.0)]);
        let dev = b.into_device();
        assert_eq!(dev.uploaded().len(), 6);
    }
}
