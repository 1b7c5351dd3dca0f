use crate::{
    dsp::oscillator::{OscillatorBlock, Waveform},
    graph::node::{Frame, Gen, Generator, GraphBuilder, IntoGen, RenderCtx},
};

/*
Audio Oscillators
=================

Naive (non band-limited) phase accumulators with an audio-rate frequency
input. The frequency generator is rendered into the output buffer first and
then replaced sample by sample with the waveform, so no scratch buffer is
needed. Frequency is read from the left channel.

  sine      pure tone, fundamental only
  saw       all harmonics, bright and buzzy
  square    odd harmonics, hollow
  triangle  odd harmonics falling off as 1/n², soft

Example:
  let note = synth.add_parameter("midiNumber")?;
  let tone = saw(note.midi_to_freq().hold());
  let vibrato = sine(220.0 + sine(5.0) * 3.0);
*/

pub struct OscNode<F> {
    osc: OscillatorBlock,
    frequency: F,
}

impl<F> OscNode<F> {
    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }
}

fn osc<F: IntoGen>(waveform: Waveform, frequency: F) -> Gen<OscNode<F::Node>> {
    Gen(OscNode {
        osc: OscillatorBlock::new(waveform),
        frequency: frequency.into_gen().into_inner(),
    })
}

pub fn sine<F: IntoGen>(frequency: F) -> Gen<OscNode<F::Node>> {
    osc(Waveform::Sine, frequency)
}

pub fn saw<F: IntoGen>(frequency: F) -> Gen<OscNode<F::Node>> {
    osc(Waveform::Saw, frequency)
}

pub fn square<F: IntoGen>(frequency: F) -> Gen<OscNode<F::Node>> {
    osc(Waveform::Square, frequency)
}

pub fn triangle<F: IntoGen>(frequency: F) -> Gen<OscNode<F::Node>> {
    osc(Waveform::Triangle, frequency)
}

impl<F: Generator> Generator for OscNode<F> {
    fn render_block(&mut self, out: &mut [Frame], ctx: &RenderCtx) {
        self.frequency.render_block(out, ctx);
        for frame in out.iter_mut() {
            *frame = Frame::mono(self.osc.next_sample(frame.left, ctx.sample_rate));
        }
    }

    fn connect(&mut self, graph: &mut GraphBuilder) {
        self.frequency.connect(graph);
    }
}
