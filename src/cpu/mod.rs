use crate::bus::format_memory;
use crate::constants::{
    BOOT_PC, BOOT_SP, IE_OFFSET, IF_OFFSET, INTERRUPT_LINES, INTERRUPT_VECTOR_OFFSET,
};
use crate::cpu_bus::CpuBus;
use crate::error::CpuError;
use crate::instructions::{self, opcode, Instruction};
use crate::register::{Flags, Register, RegisterFile, X, Y};


/// Boot constants and interrupt addresses the core consumes. The machine owns the
/// address map; the core only needs these few locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuLayout {
    pub boot_pc: u16,
    pub boot_sp: u16,
    pub ie_address: u16,
    pub if_address: u16,
    pub vector_base: u16,
}

impl Default for CpuLayout {
    fn default() -> Self {
        CpuLayout {
            boot_pc: BOOT_PC,
            boot_sp: BOOT_SP,
            ie_address: IE_OFFSET,
            if_address: IF_OFFSET,
            vector_base: INTERRUPT_VECTOR_OFFSET,
        }
    }
}

pub struct Cpu {
    registers: RegisterFile,
    layout: CpuLayout,
    cycles: u64,
    stack_depth: i32, // bytes pushed minus popped, diagnostic only
    halt_on_fault: bool,
    halted: bool,
    trace: bool,
}

fn line_mask(line: u8) -> u8 {
    1u8.checked_shl(line as u32).unwrap_or(0)
}

impl Cpu {
    pub fn new() -> Self {
        Self::with_layout(CpuLayout::default())
    }

    pub fn with_layout(layout: CpuLayout) -> Self {
        let mut cpu = Cpu {
            registers: RegisterFile::new(),
            layout,
            cycles: 0,
            stack_depth: 0,
            halt_on_fault: false,
            halted: false,
            trace: false,
        };
        cpu.init_registers();
        cpu
    }

    fn init_registers(&mut self) {
        self.registers.clear();
        self.registers.write(Register::PC, self.layout.boot_pc as u32);
        self.registers.write(Register::SP, self.layout.boot_sp as u32);
        self.registers.write(Register::FP, self.layout.boot_sp as u32);
    }

    pub fn reset(&mut self) {
        self.init_registers();
        self.cycles = 0;
        self.stack_depth = 0;
        self.halted = false;
    }

    pub fn layout(&self) -> CpuLayout {
        self.layout
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn read_register(&self, reg: Register) -> u16 {
        self.registers.read(reg)
    }

    pub fn write_register(&mut self, reg: Register, value: u32) {
        self.registers.write(reg, value);
    }

    pub fn pc(&self) -> u16 {
        self.registers.read(Register::PC)
    }

    pub fn sp(&self) -> u16 {
        self.registers.read(Register::SP)
    }

    pub fn a(&self) -> u8 {
        self.registers.read(Register::A) as u8
    }

    pub fn flags(&self) -> Flags {
        self.registers.flags()
    }

    /// Total ticks of all instructions executed since the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn set_cycles(&mut self, cycles: u64) {
        self.cycles = cycles;
    }

    pub fn stack_depth(&self) -> i32 {
        self.stack_depth
    }

    pub fn set_stack_depth(&mut self, depth: i32) {
        self.stack_depth = depth;
    }

    /// When set, an unknown instruction halts the core until `resume` or `reset`.
    pub fn set_halt_on_fault(&mut self, halt: bool) {
        self.halt_on_fault = halt;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn resume(&mut self) {
        self.halted = false;
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    pub fn fetch(&mut self, bus: &mut dyn CpuBus, no_increment: bool) -> Result<u8, CpuError> {
        let pc = self.pc();
        let value = bus.read(pc)?;
        if !no_increment {
            self.registers.write(Register::PC, pc as u32 + 1);
        }
        Ok(value)
    }

    pub fn fetch16(&mut self, bus: &mut dyn CpuBus, no_increment: bool) -> Result<u16, CpuError> {
        let pc = self.pc();
        let value = bus.read16(pc)?;
        if !no_increment {
            self.registers.write(Register::PC, pc as u32 + 2);
        }
        Ok(value)
    }

    pub fn fetch_instruction(&mut self, bus: &mut dyn CpuBus) -> Result<u8, CpuError> {
        let ins = self.fetch(bus, false)?;
        self.registers.write(Register::IR, ins as u32);
        Ok(ins)
    }

    /// Writes `value` at SP, then moves SP down one word.
    pub fn push(&mut self, bus: &mut dyn CpuBus, value: u16) -> Result<(), CpuError> {
        let sp = self.sp();
        bus.write16(sp, value)?;
        self.registers.write(Register::SP, sp.wrapping_sub(2) as u32);
        self.stack_depth = self.stack_depth.wrapping_add(2);
        Ok(())
    }

    /// Moves SP up one word, then reads the word there.
    pub fn pop(&mut self, bus: &mut dyn CpuBus) -> Result<u16, CpuError> {
        let next = self.sp().wrapping_add(2);
        let value = bus.read16(next)?;
        self.registers.write(Register::SP, next as u32);
        self.stack_depth = self.stack_depth.wrapping_sub(2);
        Ok(value)
    }

    /// Sets bit `line` of IF. Lines outside 0..8 are ignored.
    pub fn request_interrupt(&mut self, bus: &mut dyn CpuBus, line: u8) -> Result<(), CpuError> {
        let pending = bus.read(self.layout.if_address)? | line_mask(line);
        bus.write(self.layout.if_address, pending)?;
        self.registers.write(Register::IF, pending as u32);
        Ok(())
    }

    pub fn is_interrupt_requested(
        &mut self,
        bus: &mut dyn CpuBus,
        line: u8,
    ) -> Result<bool, CpuError> {
        let pending = bus.read(self.layout.if_address)?;
        self.registers.write(Register::IF, pending as u32);
        Ok(pending & line_mask(line) != 0)
    }

    pub fn clear_interrupt_flag(&mut self, bus: &mut dyn CpuBus, line: u8) -> Result<(), CpuError> {
        let pending = bus.read(self.layout.if_address)? & !line_mask(line);
        bus.write(self.layout.if_address, pending)?;
        self.registers.write(Register::IF, pending as u32);
        Ok(())
    }

    /// Services at most one interrupt: the lowest line that is both enabled and
    /// pending. Returns the dispatched line.
    pub fn handle_interrupts(&mut self, bus: &mut dyn CpuBus) -> Result<Option<u8>, CpuError> {
        let enabled = bus.read(self.layout.ie_address)?;
        let pending = bus.read(self.layout.if_address)?;
        self.registers.write(Register::IE, enabled as u32);
        self.registers.write(Register::IF, pending as u32);

        if enabled == 0 || pending == 0 {
            return Ok(None);
        }

        for line in 0..INTERRUPT_LINES {
            let mask = line_mask(line);
            if pending & mask == 0 || enabled & mask == 0 {
                continue;
            }

            let vector = self.layout.vector_base.wrapping_add(line as u16 * 2);
            let handler = bus.read16(vector)?;
            let return_addr = self.pc();
            self.push(bus, return_addr)?;
            self.registers.write(Register::PC, handler as u32);
            self.clear_interrupt_flag(bus, line)?;

            log::debug!(
                "Interrupt {} dispatched: 0x{:04x} -> 0x{:04x}",
                line,
                return_addr,
                handler
            );
            return Ok(Some(line));
        }
        Ok(None)
    }

    // Data movement into A ORs in flags; nothing here ever clears them.
    fn load_accumulator(&mut self, value: u8) {
        self.registers.write(Register::A, value as u32);
        if value == 0 {
            self.registers.insert_flags(Flags::ZERO);
        }
        if value & 0x80 != 0 {
            self.registers.insert_flags(Flags::NEGATIVE);
        }
    }

    fn index(&self, reg: Register) -> u8 {
        self.registers.read(reg) as u8
    }

    /// Executes one instruction and returns its tick cost.
    pub fn cycle(&mut self, bus: &mut dyn CpuBus) -> Result<u8, CpuError> {
        if self.halted {
            return Err(CpuError::Halted { pc: self.pc() });
        }

        self.sync_interrupt_registers(bus);
        let pc = self.pc();
        let opcode = self.fetch_instruction(bus)?;
        let instruction = match instructions::lookup(opcode) {
            Some(instruction) => instruction,
            None => return Err(self.unknown_instruction(opcode, pc)),
        };

        if self.trace {
            log::trace!(
                "0x{:04x}: {:<9} {}",
                pc,
                instruction.mnemonic,
                self.registers.dump()
            );
        }

        self.execute(bus, instruction, pc)?;
        self.cycles += instruction.ticks as u64;
        Ok(instruction.ticks)
    }

    // IF/IE live on the bus; keep the register copies current for traces and dumps.
    fn sync_interrupt_registers(&mut self, bus: &dyn CpuBus) {
        if let Some(pending) = bus.peek(self.layout.if_address) {
            self.registers.write(Register::IF, pending as u32);
        }
        if let Some(enabled) = bus.peek(self.layout.ie_address) {
            self.registers.write(Register::IE, enabled as u32);
        }
    }

    fn unknown_instruction(&mut self, opcode: u8, pc: u16) -> CpuError {
        log::error!("Unknown instruction: 0x{:02X} at PC: 0x{:04X}", opcode, pc);
        if self.halt_on_fault {
            self.halted = true;
        }
        CpuError::UnknownInstruction { opcode, pc }
    }

    fn execute(
        &mut self,
        bus: &mut dyn CpuBus,
        instruction: &Instruction,
        pc: u16,
    ) -> Result<(), CpuError> {
        match instruction.opcode {
            opcode::NOP => {}
            opcode::LDA_IMM => {
                let value = self.fetch(bus, false)?;
                self.load_accumulator(value);
            }
            opcode::LDA_ZP => {
                let addr = self.fetch(bus, false)? as u16;
                let value = bus.read(addr)?;
                self.load_accumulator(value);
            }
            opcode::LDA_ZP_X => {
                // Stays inside the zero page.
                let addr = self.fetch(bus, false)?.wrapping_add(self.index(X)) as u16;
                let value = bus.read(addr)?;
                self.load_accumulator(value);
            }
            opcode::LDA_ABS => {
                let addr = self.fetch16(bus, false)?;
                let value = bus.read(addr)?;
                self.load_accumulator(value);
            }
            opcode::LDA_ABS_X => {
                let addr = self.fetch16(bus, false)?.wrapping_add(self.index(X) as u16);
                let value = bus.read(addr)?;
                self.load_accumulator(value);
            }
            opcode::LDA_ABS_Y => {
                let addr = self.fetch16(bus, false)?.wrapping_add(self.index(Y) as u16);
                let value = bus.read(addr)?;
                self.load_accumulator(value);
            }
            opcode::JSR => {
                let sub_addr = self.fetch16(bus, false)?;
                let return_addr = self.pc();
                self.push(bus, return_addr)?;
                self.registers.write(Register::PC, sub_addr as u32);
            }
            opcode::RTS => {
                let return_addr = self.pop(bus)?;
                self.registers.write(Register::PC, return_addr as u32);
            }
            other => return Err(self.unknown_instruction(other, pc)),
        }
        Ok(())
    }

    /// `memory @ 0x0f01: 0x04 0x05 0xa3 ...`, without touching device state.
    pub fn view_memory_at(&self, bus: &dyn CpuBus, address: u16, n: usize) -> String {
        format_memory(address, n, |addr| bus.peek(addr))
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
