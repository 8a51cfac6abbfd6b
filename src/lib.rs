//! Emulation core for a small 8/16-bit machine: a register file, a memory bus
//! routing address ranges onto RAM/ROM devices, and a CPU that fetches, decodes
//! and executes against that bus with a maskable interrupt mechanism.
//!
//! The core never installs a logger; it reports through the `log` facade and
//! returns faults as values.

pub mod bus;
pub mod config;
pub mod constants;
pub mod cpu;
pub mod cpu_bus;
pub mod error;
pub mod instructions;
pub mod machine;
pub mod memory;
pub mod register;
pub mod save_state;

pub use bus::{Bus, FaultPolicy, RegionId, RegionInfo};
pub use config::Config;
pub use cpu::{Cpu, CpuLayout};
pub use cpu_bus::CpuBus;
pub use error::{BusError, CpuError, DeviceFault};
pub use instructions::{Instruction, INSTRUCTIONS, OPCODE_TABLE};
pub use machine::{FrameStats, Machine};
pub use memory::{Device, DeviceKind, Ram, Rom};
pub use register::{Flags, Register, RegisterFile};
pub use save_state::SaveState;
