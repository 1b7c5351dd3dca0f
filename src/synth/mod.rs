//! Engine instance: owns the graph, the parameter registry and the bridges,
//! and renders interleaved buffers for the audio host.
//!
//! Rendering runs in control blocks of [`CONTROL_BLOCK_SIZE`] frames. At the
//! start of a block the control graph ticks once, bridges notify, shared
//! generators render, then the output generator renders the whole block. A
//! host buffer of any size is filled from these blocks, so control ticks stay
//! on a fixed frame grid independent of the host's buffer size.
//!
//! Registration only grows: [`Synth::set_output`] swaps the output generator
//! but never unregisters the shared generators and controls it reached.

pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod error;

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use tracing::{debug, info};

pub use bridge::{BindingId, ControlEvent, Notification, SubscriptionId};
#[cfg(feature = "rtrb")]
pub use bridge::EventReceiver;
pub use config::EngineConfig;
pub use diagnostics::Diagnostics;
pub use error::SynthError;

use crate::{
    control::{graph::ControlGraph, Control, ControlOutput, ParameterSpec, Parameters},
    graph::{
        ops::Constant,
        node::{Frame, Gen, Generator, GraphBuilder, IntoGen, RenderCtx},
        shared::SharedGen,
    },
    CONTROL_BLOCK_SIZE,
};
use bridge::Binding;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

pub struct Synth {
    instance: u64,
    config: EngineConfig,
    parameters: Parameters,
    controls: ControlGraph,
    shared: Vec<Box<dyn Generator>>,
    shared_blocks: Vec<Vec<Frame>>,
    output: Box<dyn Generator>,
    bindings: Vec<Binding>,
    block: Vec<Frame>,
    cursor: usize,
    diagnostics: Arc<Diagnostics>,
}

impl Default for Synth {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl Synth {
    pub fn new(config: EngineConfig) -> Result<Self, SynthError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        debug!(instance, sample_rate = config.sample_rate, "synth created");

        Self {
            instance,
            controls: ControlGraph::new(config.sample_rate, config.seed),
            config,
            parameters: Parameters::new(),
            shared: Vec::new(),
            shared_blocks: Vec::new(),
            output: Box::new(Constant(0.0)),
            bindings: Vec::new(),
            block: vec![Frame::ZERO; CONTROL_BLOCK_SIZE],
            // Forces a control tick before the first frame.
            cursor: CONTROL_BLOCK_SIZE,
            diagnostics: Arc::new(Diagnostics::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    /* Parameters */

    pub fn add_parameter(&mut self, name: &str) -> Result<Control, SynthError> {
        self.parameters.add(name, ParameterSpec::default())
    }

    pub fn add_parameter_with(
        &mut self,
        name: &str,
        spec: ParameterSpec,
    ) -> Result<Control, SynthError> {
        self.parameters.add(name, spec)
    }

    pub fn set_parameter(&self, name: &str, value: f32) -> Result<(), SynthError> {
        self.parameters.set(name, value)
    }

    /// Handle for writing parameters from other threads.
    pub fn parameters(&self) -> Parameters {
        self.parameters.clone()
    }

    /* Graph */

    /// Register `gen` as a shared source. It is rendered once per block no
    /// matter how many times the returned handle (or its clones) is used.
    /// A shared generator can read earlier shared generators.
    pub fn share<G>(&mut self, gen: G) -> Result<Gen<SharedGen>, SynthError>
    where
        G: IntoGen,
        G::Node: 'static,
    {
        let mut node = gen.into_gen();
        self.connect(&mut node)?;

        let index = self.shared.len();
        self.shared.push(Box::new(node));
        self.shared_blocks.push(vec![Frame::ZERO; CONTROL_BLOCK_SIZE]);
        debug!(index, "shared generator registered");

        Ok(Gen(SharedGen {
            index,
            instance: self.instance,
        }))
    }

    /// Replace the output generator. On error the previous output is kept.
    ///
    /// Only the output generator is replaced. Shared generators, interned
    /// controls and bindings registered for earlier outputs stay registered
    /// and keep rendering every block for the life of the synth. Build a new
    /// `Synth` to change the graph's structure.
    pub fn set_output<G>(&mut self, gen: G) -> Result<(), SynthError>
    where
        G: IntoGen,
        G::Node: 'static,
    {
        let mut node = gen.into_gen();
        self.connect(&mut node)?;
        self.output = Box::new(node);

        info!(
            controls = self.controls.len(),
            shared = self.shared.len(),
            bindings = self.bindings.len(),
            "output generator set"
        );
        Ok(())
    }

    fn connect(&mut self, node: &mut impl Generator) -> Result<(), SynthError> {
        let mut builder = GraphBuilder::new(
            &mut self.controls,
            self.config.sample_rate,
            self.instance,
            self.shared.len(),
        );
        node.connect(&mut builder);
        builder.finish()
    }

    /* Bridges */

    /// Publish `control`'s output on every control tick. The control is
    /// evaluated from now on even if nothing else reads it.
    pub fn bridge(&mut self, control: &Control) -> ControlEvent {
        let id = self.controls.intern(control);
        let binding = BindingId(self.bindings.len());
        let event = ControlEvent::new(binding, self.instance);
        self.bindings.push(Binding::new(id, event.clone()));
        debug!(binding = binding.0, slot = id.index(), "control bridged");
        event
    }

    /// Attach a bounded queue to a bridge, for draining on another thread.
    #[cfg(feature = "rtrb")]
    pub fn event_queue(
        &mut self,
        event: &ControlEvent,
        capacity: usize,
    ) -> Result<EventReceiver, SynthError> {
        if event.instance() != self.instance {
            return Err(SynthError::ForeignHandle);
        }
        let binding = self
            .bindings
            .get_mut(event.binding().0)
            .ok_or(SynthError::ForeignHandle)?;

        let (tx, rx) = rtrb::RingBuffer::new(capacity.max(1));
        binding.queues.push(tx);
        Ok(EventReceiver {
            rx,
            binding: event.binding(),
        })
    }

    /* Inspection */

    /// Latest output of an interned control, `None` if this synth never
    /// evaluates it.
    pub fn value_of(&self, control: &Control) -> Option<ControlOutput> {
        self.controls.lookup(control).map(|id| self.controls.output(id))
    }

    /// How many control ticks have evaluated `control`.
    pub fn evaluation_count(&self, control: &Control) -> Option<u64> {
        self.controls
            .lookup(control)
            .map(|id| self.controls.evaluations(id))
    }

    /// Completed control ticks.
    pub fn control_ticks(&self) -> u64 {
        self.controls.ticks()
    }

    pub fn diagnostics(&self) -> Arc<Diagnostics> {
        Arc::clone(&self.diagnostics)
    }

    /* Rendering */

    /// Fill `buffer` with `frames` interleaved frames of `channels` channels.
    ///
    /// Channel 0 gets the left signal, channel 1 the right, further channels
    /// alternate; a single channel gets the average of both. If `buffer` is
    /// too short only the frames that fit are written.
    pub fn fill_buffer(&mut self, buffer: &mut [f32], frames: usize, channels: usize) {
        if channels == 0 {
            return;
        }
        let started = self.config.diagnostics.then(Instant::now);
        let frames = frames.min(buffer.len() / channels);

        for out in buffer[..frames * channels].chunks_exact_mut(channels) {
            if self.cursor >= CONTROL_BLOCK_SIZE {
                self.render_block();
                self.cursor = 0;
            }
            let frame = self.block[self.cursor];
            self.cursor += 1;

            if let [mono] = out {
                *mono = frame.mid();
            } else {
                for (channel, sample) in out.iter_mut().enumerate() {
                    *sample = if channel % 2 == 0 { frame.left } else { frame.right };
                }
            }
        }

        self.diagnostics.record_buffer();
        if let Some(started) = started {
            let budget = frames as f64 / f64::from(self.config.sample_rate);
            if started.elapsed().as_secs_f64() > budget {
                self.diagnostics.record_late(frames as u64);
            }
        }
    }

    fn render_block(&mut self) {
        self.controls.tick();
        self.diagnostics.record_tick();
        let tick = self.controls.ticks() - 1;

        for binding in &mut self.bindings {
            let output = self.controls.output(binding.control);
            let notification = Notification {
                binding: binding.event.binding(),
                value: output.value,
                triggered: output.triggered,
                tick,
            };
            binding.event.notify(notification);

            #[cfg(feature = "rtrb")]
            for queue in &mut binding.queues {
                if queue.push(notification).is_err() {
                    self.diagnostics.record_dropped();
                }
            }
        }

        let sample_rate = self.config.sample_rate;
        let outputs = self.controls.outputs();
        for (index, node) in self.shared.iter_mut().enumerate() {
            let (done, rest) = self.shared_blocks.split_at_mut(index);
            let ctx = RenderCtx::new(sample_rate, tick, outputs, done);
            node.render_block(&mut rest[0], &ctx);
        }

        let ctx = RenderCtx::new(sample_rate, tick, outputs, &self.shared_blocks);
        self.output.render_block(&mut self.block, &ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::atomic::AtomicUsize, time::Duration};

    use super::*;
    use crate::{
        control::metro,
        graph::{hold::Hold, noise::white, oscillator::sine},
    };

    #[test]
    fn silent_until_output_is_set() {
        let mut synth = Synth::default();
        let mut buffer = vec![1.0; 256];
        synth.fill_buffer(&mut buffer, 128, 2);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn control_ticks_follow_the_block_grid() {
        let mut synth = Synth::default();
        let mut buffer = vec![0.0; 2 * 100];
        synth.fill_buffer(&mut buffer, 100, 2);
        // Frames 0 and 64 start blocks.
        assert_eq!(synth.control_ticks(), 2);
        synth.fill_buffer(&mut buffer, 28, 2);
        assert_eq!(synth.control_ticks(), 2);
        synth.fill_buffer(&mut buffer, 1, 2);
        assert_eq!(synth.control_ticks(), 3);
    }

    #[test]
    fn mono_and_multichannel_mapping() {
        let mut synth = Synth::default();
        synth
            .set_output(crate::graph::pan::pan(1.0, -1.0))
            .unwrap();

        let mut mono = vec![0.0; 4];
        synth.fill_buffer(&mut mono, 4, 1);
        assert!(mono.iter().all(|&s| (s - 0.5).abs() < 1e-6));

        let mut quad = vec![0.0; 8];
        synth.fill_buffer(&mut quad, 2, 4);
        for frame in quad.chunks(4) {
            assert!((frame[0] - 1.0).abs() < 1e-6 && (frame[2] - 1.0).abs() < 1e-6);
            assert!(frame[1].abs() < 1e-6 && frame[3].abs() < 1e-6);
        }
    }

    #[test]
    fn short_buffer_is_not_overrun() {
        let mut synth = Synth::default();
        synth.set_output(sine(440.0)).unwrap();
        let mut buffer = vec![0.0; 10];
        synth.fill_buffer(&mut buffer, 512, 2);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn foreign_shared_generator_is_rejected() {
        let mut a = Synth::default();
        let mut b = Synth::default();
        let shared = a.share(sine(220.0)).unwrap();
        assert_eq!(b.set_output(shared), Err(SynthError::ForeignHandle));
    }

    struct CountingBlocks(Arc<AtomicUsize>);

    impl Generator for CountingBlocks {
        fn render_block(&mut self, out: &mut [Frame], _ctx: &RenderCtx) {
            self.0.fetch_add(1, Ordering::Relaxed);
            out.fill(Frame::mono(0.25));
        }
    }

    #[test]
    fn shared_generator_renders_once_per_block() {
        let renders = Arc::new(AtomicUsize::new(0));
        let mut synth = Synth::default();
        let shared = synth.share(Gen(CountingBlocks(Arc::clone(&renders)))).unwrap();
        synth
            .set_output(shared.clone() + shared.clone() + shared)
            .unwrap();

        let mut buffer = vec![0.0; 2 * 640];
        synth.fill_buffer(&mut buffer, 640, 2);
        assert_eq!(renders.load(Ordering::Relaxed), 10);
        assert!(buffer.iter().all(|&s| (s - 0.75).abs() < 1e-6));
    }

    #[test]
    fn shared_noise_cancels_against_itself() {
        let mut synth = Synth::default();
        let noise = synth.share(white()).unwrap();
        synth.set_output(noise.clone() - noise).unwrap();

        let mut buffer = vec![1.0; 2 * 256];
        synth.fill_buffer(&mut buffer, 256, 2);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn replaced_output_keeps_its_controls_registered() {
        let mut synth = Synth::default();
        let tempo = Control::from(metro().bpm(600.0));
        synth.set_output(Gen(Hold::new(tempo.clone()))).unwrap();

        let mut buffer = vec![0.0; 2 * 128];
        synth.fill_buffer(&mut buffer, 128, 2);
        assert_eq!(synth.evaluation_count(&tempo), Some(2));

        synth.set_output(sine(220.0)).unwrap();
        synth.fill_buffer(&mut buffer, 128, 2);
        assert_eq!(synth.evaluation_count(&tempo), Some(4));
    }

    #[test]
    fn slow_subscriber_is_counted_late() {
        let config = EngineConfig::default().with_diagnostics(true);
        let mut synth = Synth::new(config).unwrap();
        let event = synth.bridge(&Control::constant(1.0));
        event.subscribe(|_| std::thread::sleep(Duration::from_millis(5)));

        // 64 frames at 44.1 kHz are about 1.5 ms.
        let mut buffer = vec![0.0; 2 * 64];
        synth.fill_buffer(&mut buffer, 64, 2);
        assert_eq!(synth.diagnostics().frames_late(), 64);
        assert_eq!(synth.diagnostics().buffers(), 1);
    }

    #[test]
    fn lateness_is_not_tracked_without_diagnostics() {
        let mut synth = Synth::default();
        let event = synth.bridge(&Control::constant(1.0));
        event.subscribe(|_| std::thread::sleep(Duration::from_millis(5)));

        let mut buffer = vec![0.0; 2 * 64];
        synth.fill_buffer(&mut buffer, 64, 2);
        assert_eq!(synth.diagnostics().frames_late(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig::default().with_channels(0);
        assert!(matches!(Synth::new(config), Err(SynthError::InvalidConfig(_))));
    }
}
