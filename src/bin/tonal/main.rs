//! tonal - play one of the bundled patches on the default output device
//!
//! Run with: cargo run -- [synesthesia|instrument] [seconds]

use std::{thread, time::Duration};

use color_eyre::eyre::{bail, WrapErr};
use tonal_graph::{io::AudioOutput, patches, EngineConfig};
use tracing::info;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let patch = args.next().unwrap_or_else(|| "synesthesia".to_string());
    let seconds: u64 = match args.next() {
        Some(arg) => arg.parse().wrap_err("duration must be whole seconds")?,
        None => 20,
    };

    let config = EngineConfig::default().with_diagnostics(true);
    match patch.as_str() {
        "synesthesia" => run_synesthesia(config, seconds),
        "instrument" => run_instrument(config, seconds),
        other => bail!("unknown patch `{other}` (expected synesthesia or instrument)"),
    }
}

/// Print a line per voice flash, drained from the bridges' event queues.
fn run_synesthesia(config: EngineConfig, seconds: u64) -> color_eyre::Result<()> {
    let mut study = patches::synesthesia(config)?;

    let mut queues = Vec::new();
    for (index, voice) in study.voices.iter().enumerate() {
        queues.push((index, study.synth.event_queue(&voice.pulse, 256)?));
    }
    let diagnostics = study.synth.diagnostics();
    let output = AudioOutput::start(study.synth)?;
    info!(device = output.device_name(), "playing synesthesia");

    let polls = seconds * 1000 / 50;
    for _ in 0..polls {
        thread::sleep(Duration::from_millis(50));
        for (index, queue) in &mut queues {
            for event in queue.drain() {
                if event.triggered && event.value > 0.0 {
                    let bar = " ".repeat(*index * 8);
                    println!("{bar}[voice {index}]");
                }
            }
        }
    }

    info!(
        buffers = diagnostics.buffers(),
        frames_late = diagnostics.frames_late(),
        events_dropped = diagnostics.events_dropped(),
        "done"
    );
    Ok(())
}

/// Walk up and down the pentatonic scale, one note every 250 ms.
fn run_instrument(config: EngineConfig, seconds: u64) -> color_eyre::Result<()> {
    let keys = patches::instrument(config, true)?;
    let parameters = keys.parameters();
    let diagnostics = keys.synth.diagnostics();
    let output = AudioOutput::start(keys.synth)?;
    info!(device = output.device_name(), "playing instrument");

    let steps = patches::PENTATONIC_DEGREES.len();
    let walk = (0..steps).chain((1..steps - 1).rev()).cycle();
    for degree in walk.take((seconds * 4) as usize) {
        patches::play_degree(&parameters, degree)?;
        thread::sleep(Duration::from_millis(250));
    }

    info!(
        buffers = diagnostics.buffers(),
        frames_late = diagnostics.frames_late(),
        "done"
    );
    Ok(())
}
