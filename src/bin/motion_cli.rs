use std::fs;
use std::net::UdpSocket;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use motion_logger::analysis::{fit_exponential, RunSummary, VelocitySample};
use motion_logger::config::AppConfig;
use motion_logger::sensor::Clock;
use motion_logger::session::{LogDisplay, UserSignal};
use motion_logger::telemetry::{ChannelRadio, Radio, TelemetryMessage, UdpRadio};
use motion_logger::testing::{MotionProfile, ScriptedInput, SimulatedClock, SyntheticAccelerometer};
use motion_logger::{init_logging, CycleOutcome, MotionSession};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "motion_cli",
    about = "Simulate runs, fit velocity traces and decode run telemetry"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one full session against a synthetic accelerometer on a virtual clock
    Simulate {
        #[arg(long, default_value_t = 5)]
        duration: u32,
        #[arg(long, value_enum, default_value_t = Motion::Step)]
        motion: Motion,
        /// Step acceleration along x in m/s²
        #[arg(long, default_value_t = 1.0)]
        accel: f64,
        /// Asymptotic velocity of the saturating profile in m/s
        #[arg(long, default_value_t = 2.0)]
        vmax: f64,
        /// Time constant of the saturating profile in seconds
        #[arg(long, default_value_t = 0.5)]
        tau: f64,
        /// Uniform sensor noise amplitude in m/s²
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        /// Max random overrun of every sleep in ms
        #[arg(long, default_value_t = 0)]
        jitter: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Broadcast the result over UDP instead of an in-process channel
        #[arg(long)]
        broadcast: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fit (vmax, tau) to a CSV of `t,v` rows
    Fit {
        #[arg(long)]
        input: PathBuf,
    },
    /// Parse a telemetry payload such as `a:0.082,v:0.371,vm:0.404,t:0.396`
    Decode { payload: String },
    /// Receive and decode telemetry broadcasts
    Listen {
        /// Defaults to the configured group's port
        #[arg(long)]
        port: Option<u16>,
        #[arg(long, default_value_t = 1)]
        count: usize,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Motion {
    Rest,
    Step,
    Saturating,
}

#[derive(Serialize)]
struct SimulationReport<'a> {
    summary: &'a RunSummary,
    telemetry: String,
    virtual_ms: u32,
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_default();
    config.validate().context("invalid configuration")?;

    match cli.command {
        Commands::Simulate {
            duration,
            motion,
            accel,
            vmax,
            tau,
            noise,
            jitter,
            seed,
            broadcast,
            output,
        } => {
            let profile = match motion {
                Motion::Rest => MotionProfile::Rest,
                Motion::Step => MotionProfile::Step {
                    accel: [accel, 0.0, 0.0],
                    onset_ms: 0,
                },
                Motion::Saturating => MotionProfile::Saturating {
                    vmax,
                    tau_s: tau,
                    axis: 0,
                    onset_ms: 0,
                },
            };
            run_simulate(
                config, duration, profile, noise, jitter, seed, broadcast, output,
            )
        }
        Commands::Fit { input } => run_fit(&config, &input),
        Commands::Decode { payload } => run_decode(&payload),
        Commands::Listen {
            port,
            count,
            timeout_secs,
        } => run_listen(port.unwrap_or_else(|| config.telemetry.port()), count, timeout_secs),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_simulate(
    config: AppConfig,
    duration: u32,
    mut profile: MotionProfile,
    noise: f64,
    jitter: u32,
    seed: u64,
    broadcast: bool,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    if duration == 0 {
        bail!("--duration must be positive");
    }

    let clock = SimulatedClock::new().with_jitter(jitter, seed);
    let step = config.sampling.interval_ms() + jitter;
    let calibration_ms = config.calibration.samples as u32 * step;
    let countdown_ms = config.session.countdown_secs * (1000 + step);

    // motion starts with measuring; restart once measuring is surely over
    let onset_ms = calibration_ms + countdown_ms;
    match &mut profile {
        MotionProfile::Step { onset_ms: at, .. } | MotionProfile::Saturating { onset_ms: at, .. } => {
            *at = onset_ms
        }
        MotionProfile::Rest => {}
    }
    let restart_ms = onset_ms + duration * 1000 + 2 * step + 1000;

    let sensor = SyntheticAccelerometer::new(
        clock.clone(),
        [0.0, 0.0, -9.806_65],
        profile,
        config.sampling.scale,
    )
    .with_noise(noise, seed.wrapping_add(1));
    let input = ScriptedInput::new(clock.clone(), vec![(restart_ms, UserSignal::Cancel)]);
    let radio: Box<dyn Radio> = if broadcast {
        Box::new(UdpRadio::open(&config.telemetry)?)
    } else {
        Box::new(ChannelRadio::default())
    };

    let mut session = MotionSession::new(config, sensor, clock.clone(), input, LogDisplay::new(), radio)?;
    match session.run_measurement(duration) {
        CycleOutcome::Reported(summary) => {
            let report = SimulationReport {
                telemetry: TelemetryMessage::from(&summary).to_string(),
                summary: &summary,
                virtual_ms: clock.ticks_ms(),
            };
            write_json(&report, output)?;
            Ok(ExitCode::from(0))
        }
        CycleOutcome::Cancelled => {
            eprintln!("Run was cancelled before it completed");
            Ok(ExitCode::from(2))
        }
        CycleOutcome::Failed(err) => Err(anyhow::Error::new(err).context("simulated run failed")),
    }
}

fn run_fit(config: &AppConfig, input: &Path) -> Result<ExitCode> {
    let text = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let samples = parse_trace(&text).with_context(|| format!("parsing {}", input.display()))?;
    let fit = fit_exponential(&samples, &config.fit);
    println!("{}", serde_json::to_string_pretty(&fit)?);
    Ok(ExitCode::from(0))
}

/// `t,v` rows; blank lines, `#` comments and a leading header are skipped.
fn parse_trace(text: &str) -> Result<Vec<VelocitySample>> {
    let mut samples = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (t, v) = line
            .split_once(',')
            .ok_or_else(|| anyhow!("line {}: expected `t,v`", index + 1))?;
        match (t.trim().parse::<f64>(), v.trim().parse::<f64>()) {
            (Ok(t), Ok(v)) => samples.push(VelocitySample { t, v }),
            _ if samples.is_empty() && index == 0 => continue,
            _ => bail!("line {}: {:?} is not a pair of numbers", index + 1, line),
        }
    }
    Ok(samples)
}

fn run_decode(payload: &str) -> Result<ExitCode> {
    let message: TelemetryMessage = payload.parse()?;
    println!("{}", serde_json::to_string_pretty(&message)?);
    Ok(ExitCode::from(0))
}

fn run_listen(port: u16, count: usize, timeout_secs: Option<u64>) -> Result<ExitCode> {
    let socket = UdpSocket::bind(("0.0.0.0", port)).with_context(|| format!("binding port {port}"))?;
    socket.set_read_timeout(timeout_secs.map(Duration::from_secs))?;
    eprintln!("Listening on udp/{port}");

    let mut buf = [0u8; 256];
    for _ in 0..count {
        let (len, from) = socket.recv_from(&mut buf).context("waiting for telemetry")?;
        let payload = String::from_utf8_lossy(&buf[..len]);
        match payload.parse::<TelemetryMessage>() {
            Ok(message) => println!("{}", serde_json::to_string(&message)?),
            Err(err) => eprintln!("Ignoring payload from {from}: {err}"),
        }
    }
    Ok(ExitCode::from(0))
}

fn write_json<T: Serialize>(value: &T, output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    if let Some(path) = output {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(())
}
