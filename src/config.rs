use std::sync::OnceLock;

use crate::constants::{DEFAULT_CLOCK_HZ, DEFAULT_FRAME_RATE};

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default)
}

/// Runtime settings for a machine and the headless runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub clock_hz: u64,
    pub frame_rate: u64,
    /// Frames the headless runner executes.
    pub frames: u64,
    /// Propagate device faults and halt on unknown instructions.
    pub strict: bool,
    /// Per-instruction trace at `trace` level.
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clock_hz: DEFAULT_CLOCK_HZ,
            frame_rate: DEFAULT_FRAME_RATE,
            frames: 1,
            strict: false,
            trace: false,
        }
    }
}

impl Config {
    /// Reads `RIKU_CLOCK_HZ`, `RIKU_FRAME_RATE`, `RIKU_FRAMES`, `RIKU_STRICT` and
    /// `RIKU_TRACE`. Missing, zero or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            clock_hz: env_u64("RIKU_CLOCK_HZ", defaults.clock_hz),
            frame_rate: env_u64("RIKU_FRAME_RATE", defaults.frame_rate),
            frames: env_u64("RIKU_FRAMES", defaults.frames),
            strict: env_flag("RIKU_STRICT", defaults.strict),
            trace: env_flag("RIKU_TRACE", defaults.trace),
        }
    }

    pub fn ticks_per_frame(&self) -> u64 {
        (self.clock_hz / self.frame_rate.max(1)).max(1)
    }
}

pub fn quiet() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| env_flag("QUIET", false))
}
