use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tonal_graph::{
    control::{metro, midi_to_freq, random, Control},
    graph::{adsr, sine},
    patches, EngineConfig, Synth, SynthError, CONTROL_BLOCK_SIZE,
};

const SAMPLE_RATE: f32 = 44_100.0;

fn render(synth: &mut Synth, frames: usize) -> Vec<f32> {
    let mut buffer = vec![0.0; frames * 2];
    synth.fill_buffer(&mut buffer, frames, 2);
    buffer
}

fn left(buffer: &[f32]) -> Vec<f32> {
    buffer.chunks(2).map(|frame| frame[0]).collect()
}

#[test]
fn midi_number_parameter_converts_to_hz() {
    let mut synth = Synth::default();
    let note = synth.add_parameter("midiNumber").unwrap();
    let freq = midi_to_freq(&note);
    synth.set_output(sine(freq.hold())).unwrap();

    synth.set_parameter("midiNumber", 69.0).unwrap();
    render(&mut synth, CONTROL_BLOCK_SIZE);
    let out = synth.value_of(&freq).unwrap();
    assert!((out.value - 440.0).abs() < 1e-3);

    synth.set_parameter("midiNumber", 81.0).unwrap();
    render(&mut synth, CONTROL_BLOCK_SIZE);
    assert!((synth.value_of(&freq).unwrap().value - 880.0).abs() < 1e-2);
}

#[test]
fn percussive_envelope_decays_to_silence() {
    let mut synth = Synth::default();
    let trigger = synth.add_parameter("trigger").unwrap();
    synth
        .set_output(adsr(0.0, 0.5, 0.0, 0.0).trigger(&trigger))
        .unwrap();

    synth.set_parameter("trigger", 1.0).unwrap();
    let out = left(&render(&mut synth, SAMPLE_RATE as usize * 3 / 4));

    assert!((out[0] - 1.0).abs() < 1e-6);
    assert!(out.windows(2).all(|pair| pair[1] <= pair[0]));
    let half_second = SAMPLE_RATE as usize / 2;
    assert!(out[half_second + 1].abs() < 1e-3);
    assert!(out[half_second + 1..].iter().all(|&s| s.abs() < 1e-3));
}

#[test]
fn constant_sum_is_reported_every_tick() {
    let mut synth = Synth::default();
    let sum = Control::constant(2.0) + 3.0;
    let event = synth.bridge(&sum);

    let values = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&values);
    event.subscribe(move |n| sink.lock().unwrap().push((n.tick, n.value)));

    render(&mut synth, CONTROL_BLOCK_SIZE * 4);
    let values = values.lock().unwrap();
    assert_eq!(*values, vec![(0, 5.0), (1, 5.0), (2, 5.0), (3, 5.0)]);
}

#[test]
fn same_seed_renders_identical_audio() {
    let config = EngineConfig::default().with_seed(7);
    let mut a = patches::synesthesia(config.clone()).unwrap();
    let mut b = patches::synesthesia(config).unwrap();
    let mut c = patches::synesthesia(EngineConfig::default().with_seed(8)).unwrap();

    let frames = SAMPLE_RATE as usize * 2;
    let out_a = render(&mut a.synth, frames);
    let out_b = render(&mut b.synth, frames);
    let out_c = render(&mut c.synth, frames);

    assert_eq!(out_a, out_b);
    assert_ne!(out_a, out_c);
}

#[test]
fn shared_control_is_evaluated_once_per_tick() {
    let mut synth = Synth::default();
    let wobble: Control = random().min(100.0).max(200.0).trigger(metro().bpm(600.0)).into();

    // Read by two audio nodes and a bridge.
    let voice = sine(wobble.hold()) + sine((&wobble * 2.0).hold());
    synth.set_output(voice).unwrap();
    synth.bridge(&wobble);

    render(&mut synth, 4_096);
    let ticks = synth.control_ticks();
    assert_eq!(ticks, 64);
    assert_eq!(synth.evaluation_count(&wobble), Some(ticks));
}

#[test]
fn parameter_writes_land_on_the_next_tick() {
    let mut synth = Synth::default();
    let level = synth.add_parameter("level").unwrap();
    synth.bridge(&level);

    render(&mut synth, 10);
    synth.set_parameter("level", 0.75).unwrap();

    // Still inside the block that started before the write.
    render(&mut synth, CONTROL_BLOCK_SIZE - 10);
    assert_eq!(synth.value_of(&level).unwrap().value, 0.0);

    render(&mut synth, 1);
    let out = synth.value_of(&level).unwrap();
    assert_eq!(out.value, 0.75);
    assert!(out.triggered);
}

#[test]
fn repeated_writes_make_one_trigger() {
    let mut synth = Synth::default();
    let trigger = synth.add_parameter("trigger").unwrap();
    synth
        .set_output(adsr(0.0, 0.5, 0.0, 0.0).trigger(&trigger))
        .unwrap();
    let event = synth.bridge(&trigger);
    let mut queue = synth.event_queue(&event, 256).unwrap();

    synth.set_parameter("trigger", 1.0).unwrap();
    render(&mut synth, CONTROL_BLOCK_SIZE * 172);

    synth.set_parameter("trigger", 1.0).unwrap();
    synth.set_parameter("trigger", 1.0).unwrap();
    let out = left(&render(&mut synth, CONTROL_BLOCK_SIZE));

    // The second write restarts the attack at the next block.
    assert!((out[0] - 1.0).abs() < 1e-6);

    let triggers: Vec<u64> = queue
        .drain()
        .filter(|n| n.triggered)
        .map(|n| n.tick)
        .collect();
    assert_eq!(triggers, vec![0, 172]);
}

#[test]
fn parameter_name_errors() {
    let mut synth = Synth::default();
    synth.add_parameter("cutoff").unwrap();

    assert_eq!(
        synth.add_parameter("cutoff").unwrap_err(),
        SynthError::DuplicateName("cutoff".into())
    );
    assert_eq!(
        synth.set_parameter("resonance", 1.0),
        Err(SynthError::UnknownParameter("resonance".into()))
    );
}

#[test]
fn full_event_queue_drops_and_counts() {
    let mut synth = Synth::default();
    let beat: Control = metro().bpm(120.0).into();
    let event = synth.bridge(&beat);
    let mut queue = synth.event_queue(&event, 4).unwrap();

    render(&mut synth, CONTROL_BLOCK_SIZE * 10);

    let ticks: Vec<u64> = queue.drain().map(|n| n.tick).collect();
    assert_eq!(ticks, vec![0, 1, 2, 3]);
    assert_eq!(synth.diagnostics().events_dropped(), 6);

    // Room again once drained.
    render(&mut synth, CONTROL_BLOCK_SIZE);
    assert_eq!(queue.pop().map(|n| n.tick), Some(10));
}

#[test]
fn foreign_bridge_handle_is_rejected() {
    let mut a = Synth::default();
    let mut b = Synth::default();
    let event = a.bridge(&Control::constant(1.0));
    assert!(matches!(b.event_queue(&event, 8), Err(SynthError::ForeignHandle)));
}

#[test]
fn subscribers_see_pulse_edges() {
    let mut study = patches::synesthesia(EngineConfig::default()).unwrap();
    let edges = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&edges);
    study.voices[0].pulse.subscribe(move |n| {
        if n.triggered {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    });

    render(&mut study.synth, SAMPLE_RATE as usize * 3);
    // At least one full pulse: a rising and a falling edge.
    assert!(edges.load(Ordering::Relaxed) >= 2);
}

#[test]
fn random_over_the_full_float_range_stays_finite() {
    let mut synth = Synth::default();
    let wide = Control::from(random().min(-f32::MAX).max(f32::MAX).trigger(metro().bpm(6000.0)));
    synth.set_output(wide.hold()).unwrap();

    let out = render(&mut synth, CONTROL_BLOCK_SIZE * 64);
    assert!(out.iter().all(|s| s.is_finite()));
    assert!(synth.value_of(&wide).unwrap().value.is_finite());
}

#[test]
fn nan_sustain_parameter_keeps_envelope_in_range() {
    let mut synth = Synth::default();
    let trigger = synth.add_parameter("trigger").unwrap();
    let sustain = synth.add_parameter("sustain").unwrap();
    synth
        .set_output(adsr(0.0, 0.01, &sustain, 0.01).trigger(&trigger))
        .unwrap();

    synth.set_parameter("sustain", f32::NAN).unwrap();
    synth.set_parameter("trigger", 1.0).unwrap();
    let out = left(&render(&mut synth, SAMPLE_RATE as usize / 10));
    assert!(out.iter().all(|s| (0.0..=1.0).contains(s)));
    assert_eq!(out.last().copied(), Some(0.0));
}
