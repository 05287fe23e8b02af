//! stepwave - four-track step sequencer

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stepwave::config::{self, EXAMPLE_CONFIG};
use stepwave::engine::{default_device_name, list_output_devices, Engine, Player, Recorder};
use stepwave::graph::AudioContext;
use stepwave::sequencer::Track;
use stepwave::viz;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so stay quiet there unless asked
    let default_filter = match cli.command {
        Commands::Play { headless: false, .. } => "off",
        _ => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Play { config, headless } => play(config, headless)?,

        Commands::Record {
            config: config_path,
            output,
            duration,
        } => {
            if !duration.is_finite() || duration <= 0.0 {
                bail!("Duration must be a positive number of seconds");
            }
            let cfg = config::load_or_default(config_path.as_ref())?;
            let sample_rate = cfg.audio.sample_rate;

            println!("Recording {} seconds to {:?}...", duration, output);

            let (context, mut renderer) = AudioContext::new(sample_rate, cfg.master.volume);
            let engine = Engine::from_config(&cfg, context)?;
            let mut recorder = Recorder::create(&output, sample_rate)?;

            engine.set_playing(true);
            engine.render_offline(&mut renderer, duration, cfg.audio.buffer_size, |block| {
                recorder.write_block(block)
            })?;

            let summary = recorder.finalize()?;
            println!(
                "Recorded {:.1}s ({} samples, peak {:.2}) to {:?}",
                summary.duration_secs, summary.samples, summary.peak, summary.path
            );
        }

        Commands::Devices => {
            println!("Available audio devices:\n");

            if let Some(name) = default_device_name() {
                println!("Default output: {}\n", name);
            }

            println!("Output devices:");
            let devices = list_output_devices();
            if devices.is_empty() {
                println!("  (none found)");
            }
            for (name, config) in devices {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    println!("  Master volume: {:.0}%", cfg.master.volume * 100.0);
                    println!("  Tempo: {} BPM", cfg.sequencer.tempo);
                    println!("  Selected: {}", cfg.sequencer.selected);
                    let patterns = cfg.patterns()?;
                    for track in Track::ALL {
                        match patterns.iter().find(|(t, _)| *t == track) {
                            Some((_, pattern)) => println!("    {:<7} {}", track, pattern),
                            None => println!("    {:<7} (empty)", track),
                        }
                    }
                    match &cfg.tracks.sample.path {
                        Some(path) => println!("  Sample: {:?}", path),
                        None => println!("  Sample: none"),
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let path = "stepwave.yaml";
            if std::path::Path::new(path).exists() {
                println!("stepwave.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, EXAMPLE_CONFIG)?;
                println!("Created stepwave.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

fn play(config_path: Option<PathBuf>, headless: bool) -> Result<()> {
    let cfg = config::load_or_default(config_path.as_ref())?;

    let mut player = Player::open(cfg.audio.device.as_deref())?;
    let (context, renderer) = AudioContext::new(player.sample_rate(), cfg.master.volume);
    let engine = Engine::from_config(&cfg, context)?;
    player.start(renderer)?;

    let rt = tokio::runtime::Runtime::new()?;
    let scheduler = rt.spawn(engine.scheduler().run());

    if headless {
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();
        ctrlc::set_handler(move || {
            r.store(false, Ordering::SeqCst);
        })?;

        println!("Playing at {} BPM. Press Ctrl-C to stop.", engine.snapshot().tempo());
        engine.set_playing(true);
        while running.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(100));
        }
        info!("interrupted");
    } else {
        viz::run_tui(&engine)?;
    }

    engine.set_playing(false);
    scheduler.abort();
    player.stop();

    Ok(())
}
