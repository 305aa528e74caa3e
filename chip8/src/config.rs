use std::path::PathBuf;
use std::time::Duration;

use anyhow::ensure;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "chip8", version, about = "Run a CHIP-8 ROM in the terminal")]
struct Args {
    /// Path to the ROM to run.
    #[arg(env = "EMU8_ROM")]
    rom: PathBuf,

    /// Instructions executed per second.
    #[arg(long, env = "EMU8_CLOCK_HZ", default_value_t = 500)]
    clock_hz: u32,

    /// Delay/sound timer ticks per second.
    #[arg(long, env = "EMU8_TIMER_HZ", default_value_t = emu8::TIMER_HZ)]
    timer_hz: u32,

    /// Number of past instructions kept for rewinding; 0 disables rewind.
    #[arg(long, env = "EMU8_REWIND_DEPTH", default_value_t = 1000)]
    rewind_depth: usize,

    /// How long a key press counts as held, in milliseconds.
    ///
    /// Most terminals never report key releases, so this stands in for them.
    #[arg(long, env = "EMU8_KEY_HOLD_MS", default_value_t = 150)]
    key_hold_ms: u64,

    /// Stop on the first unknown opcode or stack fault instead of logging it.
    #[arg(long, env = "EMU8_HALT_ON_ERROR")]
    halt_on_error: bool,

    /// Write logs here instead of stderr.
    #[arg(long, env = "EMU8_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Log filter (tracing-subscriber EnvFilter syntax). Falls back to `RUST_LOG`, then `warn`.
    #[arg(long, env = "EMU8_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rom: PathBuf,
    pub clock_hz: u32,
    pub timer_hz: u32,
    pub rewind_depth: usize,
    pub key_hold: Duration,
    pub halt_on_error: bool,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_args(Args::parse())
    }

    fn from_args(args: Args) -> anyhow::Result<Self> {
        ensure!(args.clock_hz > 0, "--clock-hz must be positive");
        ensure!(args.timer_hz > 0, "--timer-hz must be positive");
        Ok(Config {
            rom: args.rom,
            clock_hz: args.clock_hz,
            timer_hz: args.timer_hz,
            rewind_depth: args.rewind_depth,
            key_hold: Duration::from_millis(args.key_hold_ms),
            halt_on_error: args.halt_on_error,
            log_file: args.log_file,
            log_level: args.log_level,
        })
    }

    /// Time budgeted for a single instruction.
    pub fn cycle_time(&self) -> Duration {
        Duration::from_secs(1) / self.clock_hz
    }

    /// Time between two timer ticks.
    pub fn tick_time(&self) -> Duration {
        Duration::from_secs(1) / self.timer_hz
    }

    /// Instructions that run between two timer ticks, at least one.
    pub fn steps_per_tick(&self) -> usize {
        ((self.clock_hz / self.timer_hz) as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Config> {
        Config::from_args(Args::try_parse_from(args)?)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["chip8", "pong.ch8"]).unwrap();
        assert_eq!(config.rom, PathBuf::from("pong.ch8"));
        assert_eq!(config.clock_hz, 500);
        assert_eq!(config.timer_hz, 60);
        assert_eq!(config.key_hold, Duration::from_millis(150));
        assert!(!config.halt_on_error);
        assert_eq!(config.steps_per_tick(), 8);
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "chip8",
            "pong.ch8",
            "--clock-hz",
            "1000",
            "--rewind-depth",
            "0",
            "--halt-on-error",
        ])
        .unwrap();
        assert_eq!(config.clock_hz, 1000);
        assert_eq!(config.rewind_depth, 0);
        assert!(config.halt_on_error);
        assert_eq!(config.cycle_time(), Duration::from_millis(1));
    }

    #[test]
    fn test_rejects_zero_rates() {
        assert!(parse(&["chip8", "pong.ch8", "--clock-hz", "0"]).is_err());
        assert!(parse(&["chip8", "pong.ch8", "--timer-hz", "0"]).is_err());
    }

    #[test]
    fn test_slow_clock_still_steps() {
        let config = parse(&["chip8", "pong.ch8", "--clock-hz", "30"]).unwrap();
        assert_eq!(config.steps_per_tick(), 1);
    }

    #[test]
    fn test_requires_rom() {
        assert!(Args::try_parse_from(&["chip8"]).is_err());
    }
}
