//! The standard machine: memory map wiring, boot image placement and the frame
//! loop that drives the core and raises the vertical-blank interrupt.

use crate::bus::{Bus, FaultPolicy};
use crate::config::Config;
use crate::constants::*;
use crate::cpu::Cpu;
use crate::error::{BusError, CpuError};
use crate::memory::{Device, DeviceKind, Ram, Rom};
use crate::save_state::{RegionState, SaveState};

/// Region label, backing device kind, start address, size.
pub const STANDARD_LAYOUT: &[(&str, DeviceKind, u16, usize)] = &[
    ("ZERO_PAGE", DeviceKind::Ram, ZP_START, ZP_SIZE),
    ("STACK", DeviceKind::Ram, STACK_END, STACK_SIZE),
    ("IO_REGISTERS", DeviceKind::Ram, IO_START, IO_SIZE),
    ("FREE_1", DeviceKind::Ram, FREE_1_START, FREE_1_SIZE),
    ("ROM", DeviceKind::Rom, ROM_START, ROM_SIZE),
    ("BANK_ROM", DeviceKind::Rom, BANK_ROM_START, BANK_ROM_SIZE),
    ("CART_DATA", DeviceKind::Ram, CART_DATA_START, CART_DATA_SIZE),
    ("RAM", DeviceKind::Ram, RAM_START, RAM_SIZE),
    ("VRAM", DeviceKind::Ram, VRAM_START, VRAM_SIZE),
    ("SPRITE_TABLE", DeviceKind::Ram, SPRITE_TABLE_START, SPRITE_TABLE_SIZE),
    ("SID", DeviceKind::Ram, SID_START, SID_SIZE),
    ("FREE_2", DeviceKind::Rom, FREE_2_START, FREE_2_SIZE),
    ("KERNEL", DeviceKind::Rom, KERNEL_START, KERNEL_SIZE),
];

pub fn map_standard_layout(bus: &mut Bus) -> Result<(), BusError> {
    for &(label, kind, start, size) in STANDARD_LAYOUT {
        let device: Box<dyn Device> = match kind {
            DeviceKind::Ram => Box::new(Ram::new(size)),
            DeviceKind::Rom => Box::new(Rom::new(size)),
        };
        bus.map(label, device, start, size)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub ticks: u64,
    pub instructions: u64,
    pub interrupt: Option<u8>,
}

pub struct Machine {
    cpu: Cpu,
    bus: Bus,
    ticks_per_frame: u64,
    frame: u64,
}

impl Machine {
    pub fn new(config: &Config) -> Result<Self, BusError> {
        let policy = if config.strict {
            FaultPolicy::Propagate
        } else {
            FaultPolicy::Degrade
        };
        let mut bus = Bus::with_policy(policy);
        map_standard_layout(&mut bus)?;
        log::info!("Address space: 0x{:x} bytes", bus.byte_length());

        let mut cpu = Cpu::new();
        cpu.set_halt_on_fault(config.strict);
        cpu.set_trace(config.trace);

        Ok(Machine {
            cpu,
            bus,
            ticks_per_frame: config.ticks_per_frame(),
            frame: 0,
        })
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Split borrow for driving the core against the bus directly.
    pub fn parts_mut(&mut self) -> (&mut Cpu, &mut Bus) {
        (&mut self.cpu, &mut self.bus)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn ticks_per_frame(&self) -> u64 {
        self.ticks_per_frame
    }

    /// Places the boot image at the ROM origin. Must happen before the first cycle.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), BusError> {
        self.bus.load(program, ROM_START)
    }

    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset();
        self.frame = 0;
    }

    /// Single instruction step.
    pub fn step(&mut self) -> Result<u8, CpuError> {
        self.cpu.cycle(&mut self.bus)
    }

    /// Runs instructions until the frame's tick budget is spent, then raises
    /// VBLANK and services one interrupt.
    pub fn run_frame(&mut self) -> Result<FrameStats, CpuError> {
        let mut ticks = 0u64;
        let mut instructions = 0u64;
        while ticks < self.ticks_per_frame {
            ticks += self.cpu.cycle(&mut self.bus)? as u64;
            instructions += 1;
        }

        self.cpu.request_interrupt(&mut self.bus, VBLANK_INTERRUPT)?;
        let interrupt = self.cpu.handle_interrupts(&mut self.bus)?;
        self.frame += 1;

        Ok(FrameStats {
            ticks,
            instructions,
            interrupt,
        })
    }

    pub fn run_frames(&mut self, frames: u64) -> Result<u64, CpuError> {
        let mut ticks = 0;
        for _ in 0..frames {
            ticks += self.run_frame()?.ticks;
        }
        Ok(ticks)
    }

    pub fn save_state(&self) -> SaveState {
        SaveState {
            registers: self.cpu.registers().snapshot(),
            cycles: self.cpu.cycles(),
            stack_depth: self.cpu.stack_depth(),
            frame: self.frame,
            regions: self
                .bus
                .writable_contents()
                .into_iter()
                .map(|(label, data)| RegionState { label, data })
                .collect(),
            timestamp: SaveState::now(),
        }
    }

    /// Applies `state` in full or not at all: every region is checked before
    /// anything is written.
    pub fn restore_state(&mut self, state: &SaveState) -> Result<(), BusError> {
        for region in &state.regions {
            self.bus.check_contents(&region.label, &region.data)?;
        }
        for region in &state.regions {
            if !self.bus.restore_contents(&region.label, &region.data)? {
                log::warn!("Save state region {} has no writable mapping", region.label);
            }
        }
        self.cpu.registers_mut().restore(&state.registers);
        self.cpu.set_cycles(state.cycles);
        self.cpu.set_stack_depth(state.stack_depth);
        self.frame = state.frame;
        log::info!("Restored state at frame {}", self.frame);
        Ok(())
    }
}
