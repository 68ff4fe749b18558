//! An example which freezes and scrubs a wav file offline, optionally modulating the grain
//! start position with a wavetable LFO.

use std::{
    io,
    path::{Path, PathBuf},
};

use arg::{parse_args, Args};

use grainfreeze::{
    modulation::{LfoTable, WavetableLfo},
    utils::sample_f32_to_i16,
    Error, GrainScrubber, ScrubberConfig, AUDIO_BLOCK_SAMPLES,
};

// -------------------------------------------------------------------------------------------------

#[cfg(all(debug_assertions, feature = "assert-allocs"))]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

// -------------------------------------------------------------------------------------------------

const DEFAULT_LOG_LEVEL: log::Level = if cfg!(debug_assertions) {
    log::Level::Debug
} else {
    log::Level::Warn
};

// -------------------------------------------------------------------------------------------------

#[derive(Args, Debug)]
struct Arguments {
    #[arg(short = "i", long = "input")]
    /// Wav file to read. Multi-channel files get mixed down to mono.
    input_path: Option<PathBuf>,
    #[arg(short = "o", long = "output")]
    /// Wav file to write. By default "scrubbed.wav".
    output_path: Option<PathBuf>,
    #[arg(short = "f", long = "freeze-at")]
    /// Time in seconds at which the input gets frozen. By default 1.0.
    freeze_at: Option<f32>,
    #[arg(short = "r", long = "release-at")]
    /// Time in seconds at which the freeze gets released. By default never.
    release_at: Option<f32>,
    #[arg(short = "b", long = "buffer-ms")]
    /// Length of each of the two buffer halves in milliseconds. By default 1000.
    buffer_ms: Option<u64>,
    #[arg(long = "start")]
    /// Grain start as fraction of the buffer in range 0-0.99. By default 0.
    start: Option<f32>,
    #[arg(long = "length-ms")]
    /// Grain length in milliseconds. By default the whole buffer.
    length_ms: Option<f32>,
    #[arg(short = "s", long = "speed")]
    /// Playback speed in range 0.125-4. By default 1.
    speed: Option<f32>,
    #[arg(long = "reverse")]
    /// Play grains backwards.
    reverse: bool,
    #[arg(long = "lfo")]
    /// Modulate the grain start with one of the LFO shapes: \"Square\", \"Ramp\",
    /// \"Wobble\", \"Triangle\", \"ReverseWobble\" or \"Saw\".
    lfo: Option<LfoTable>,
    #[arg(long = "lfo-ms")]
    /// LFO cycle duration in milliseconds. By default 2000.
    lfo_ms: Option<u64>,
    #[arg(short = "l", long = "log-level")]
    /// Set logging level to \"debug\", \"info\", \"warn\" or \"error\".
    /// By default \"debug\" in dev builds and \"warn\" in release builds.
    log_level: Option<log::Level>,
}

// -------------------------------------------------------------------------------------------------

fn wav_error(err: hound::Error) -> Error {
    match err {
        hound::Error::IoError(err) => Error::IoError(err),
        err => Error::IoError(io::Error::other(err)),
    }
}

fn read_mono_wav(path: &Path) -> Result<(hound::WavSpec, Vec<i16>), Error> {
    let mut reader = hound::WavReader::open(path).map_err(wav_error)?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(sample_f32_to_i16))
            .collect::<Result<Vec<_>, _>>(),
        hound::SampleFormat::Int => {
            let shift = spec.bits_per_sample.saturating_sub(16) as u32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| (s >> shift) as i16))
                .collect::<Result<Vec<_>, _>>()
        }
    }
    .map_err(wav_error)?;

    let channel_count = spec.channels.max(1) as usize;
    let mono = samples
        .chunks(channel_count)
        .map(|frame| (frame.iter().map(|s| *s as i32).sum::<i32>() / frame.len() as i32) as i16)
        .collect();
    Ok((spec, mono))
}

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Error> {
    let args = parse_args::<Arguments>();

    simple_logger::SimpleLogger::new()
        .with_level(args.log_level.unwrap_or(DEFAULT_LOG_LEVEL).to_level_filter())
        .init()
        .expect("Failed to set logger");

    let input_path = args.input_path.ok_or_else(|| {
        Error::IoError(io::Error::new(
            io::ErrorKind::InvalidInput,
            "missing input file, see --help",
        ))
    })?;
    let (spec, mut samples) = read_mono_wav(&input_path)?;
    let sample_rate = spec.sample_rate;
    log::info!(
        "Read {} mono samples from '{}'",
        samples.len(),
        input_path.display()
    );

    // create and configure the scrubber
    let config = ScrubberConfig {
        sample_rate,
        block_size: AUDIO_BLOCK_SAMPLES,
    };
    let half_len = args.buffer_ms.unwrap_or(1000) as usize * sample_rate as usize / 1000;
    let scrubber = GrainScrubber::with_capacity(config, half_len)?;
    let (controller, mut processor) = scrubber.split();

    controller.set_speed(args.speed.unwrap_or(1.0))?;
    controller.set_start_pos(args.start.unwrap_or(0.0))?;
    if let Some(length_ms) = args.length_ms {
        controller.set_length_ms(length_ms)?;
    }
    if args.reverse {
        controller.reverse()?;
    }

    let mut lfo = args
        .lfo
        .map(|table| WavetableLfo::new(args.lfo_ms.unwrap_or(2000), table));

    let freeze_at = (args.freeze_at.unwrap_or(1.0).max(0.0) * sample_rate as f32) as usize;
    let release_at = args
        .release_at
        .map(|secs| (secs.max(0.0) * sample_rate as f32) as usize);

    // process the file in blocks, as an audio host would do
    let mut position = 0;
    for block in samples.chunks_mut(AUDIO_BLOCK_SAMPLES) {
        let now_ms = position as u64 * 1000 / sample_rate as u64;
        if let Some(lfo) = lfo.as_mut() {
            lfo.tick(now_ms);
            controller.set_start_pos(lfo.value() * 0.99)?;
        }
        if position <= freeze_at && freeze_at < position + block.len() {
            controller.start()?;
            controller.request_inspect()?;
        }
        if let Some(release_at) = release_at {
            if position <= release_at && release_at < position + block.len() {
                controller.stop()?;
            }
        }

        processor.process(block);
        position += block.len();

        if let Some(snapshot) = controller.latest_snapshot() {
            log::info!("Frozen at {:.2}s:\n{snapshot}", now_ms as f32 / 1000.0);
        }
    }

    // write the result
    let output_path = args
        .output_path
        .unwrap_or_else(|| PathBuf::from("scrubbed.wav"));
    let output_spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&output_path, output_spec).map_err(wav_error)?;
    for sample in samples {
        writer.write_sample(sample).map_err(wav_error)?;
    }
    writer.finalize().map_err(wav_error)?;
    log::info!("Wrote scrubbed audio to '{}'", output_path.display());

    Ok(())
}
