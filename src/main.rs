//! Famicore entry point.
//!
//! Loads a cartridge and runs it in a window, or headless for a fixed number
//! of frames. Usage: famicore [OPTIONS] [ROM]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use ansi_term::Colour::{Green, Red};
use clap::Parser;
use famicore::{
    Config, Error, Nes,
    config::parse_address,
    cpu::{TraceLine, flags},
};
use minifb::{Key, Scale, ScaleMode, Window, WindowOptions};

/// One NTSC frame of wall-clock time for the viewer loop.
const FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);

/// 6502 + PPU NES core
#[derive(Parser, Debug)]
#[command(name = "famicore", version, about, long_about = None)]
struct Args {
    /// Path to the iNES ROM file
    #[arg(default_value = "test/nestest.nes")]
    rom: PathBuf,

    /// Start executing here instead of the reset vector (e.g. C000 for nestest)
    #[arg(short, long, value_parser = parse_address)]
    entry: Option<u16>,

    /// Print a nestest-style line for every instruction
    #[arg(short, long)]
    trace: bool,

    /// Only deliver the vblank NMI when PPUCTRL bit 7 is set
    #[arg(long)]
    nmi_gated: bool,

    /// Run this many frames without a window, then print the CPU state
    #[arg(short, long)]
    frames: Option<u64>,

    /// Window scale factor (1, 2, 4 or 8)
    #[arg(short, long, default_value_t = 2)]
    scale: usize,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            rom_path: args.rom,
            entry_point: args.entry,
            trace: args.trace,
            nmi_requires_enable: args.nmi_gated,
            frames: args.frames,
            scale: args.scale,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from(Args::parse());
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{} {e}", Red.bold().paint("ERROR"));
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), Error> {
    let mut nes = Nes::new(config)?;

    match config.frames {
        Some(frames) => run_headless(&mut nes, config, frames),
        None => run_windowed(&mut nes, config),
    }
}

fn print_trace(line: &TraceLine) {
    println!("{line}");
}

fn run_frame(nes: &mut Nes, config: &Config) -> Result<usize, Error> {
    let executed = if config.trace {
        nes.run_frame_with(print_trace)?
    } else {
        nes.run_frame()?
    };
    Ok(executed)
}

fn run_headless(nes: &mut Nes, config: &Config, frames: u64) -> Result<(), Error> {
    let mut executed = 0;
    for _ in 0..frames {
        executed += run_frame(nes, config)?;
    }

    let r = nes.cpu.registers();
    println!(
        "{} {} frames, {} instructions, {} cycles",
        Green.bold().paint("INFO"),
        nes.frame_count(),
        executed,
        nes.cpu.cycles
    );
    println!(
        "{} PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} SP:{:02X} P:{:02X} [{}]",
        Green.bold().paint("INFO"),
        r.pc,
        r.a,
        r.x,
        r.y,
        r.sp,
        r.status,
        flags::describe(r.status)
    );
    Ok(())
}

fn window_scale(scale: usize) -> Scale {
    match scale {
        0 | 1 => Scale::X1,
        2 | 3 => Scale::X2,
        4..=7 => Scale::X4,
        _ => Scale::X8,
    }
}

fn run_windowed(nes: &mut Nes, config: &Config) -> Result<(), Error> {
    let (width, height) = Nes::screen_size();
    let mut window = match Window::new(
        "Famicore",
        width,
        height,
        WindowOptions {
            resize: true,
            scale: window_scale(config.scale),
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        },
    ) {
        Ok(window) => window,
        Err(e) => {
            log::warn!("no window ({e}), running one frame headless");
            return run_headless(nes, config, 1);
        }
    };

    window.set_target_fps(60);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let frame_start = Instant::now();

        run_frame(nes, config)?;

        if let Err(e) = window.update_with_buffer(nes.framebuffer(), width, height) {
            log::warn!("failed to present frame: {e}");
        }

        // Sleep off the rest of the frame budget.
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    Ok(())
}
