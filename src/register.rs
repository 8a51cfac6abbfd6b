use bitflags::bitflags;

bitflags! {
    /// Condition bits held in the FR register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        const NEGATIVE = 0b0000_0001;
        const ZERO = 0b0100_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    A,
    PC,
    IR,
    MAR,
    MDR,
    FR,
    SP,
    FP,
    IF,
    IE,
}

// Index registers used by the indexed addressing modes.
pub const X: Register = Register::R0;
pub const Y: Register = Register::R1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterWidth {
    Byte,
    Word,
}

impl RegisterWidth {
    pub fn mask(self) -> u32 {
        match self {
            RegisterWidth::Byte => 0xFF,
            RegisterWidth::Word => 0xFFFF,
        }
    }
}

impl Register {
    pub const COUNT: usize = 18;

    pub const ALL: [Register; Register::COUNT] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
        Register::A,
        Register::PC,
        Register::IR,
        Register::MAR,
        Register::MDR,
        Register::FR,
        Register::SP,
        Register::FP,
        Register::IF,
        Register::IE,
    ];

    pub fn width(self) -> RegisterWidth {
        match self {
            Register::PC | Register::MAR | Register::MDR | Register::SP | Register::FP => {
                RegisterWidth::Word
            }
            _ => RegisterWidth::Byte,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Register::R0 => "R0",
            Register::R1 => "R1",
            Register::R2 => "R2",
            Register::R3 => "R3",
            Register::R4 => "R4",
            Register::R5 => "R5",
            Register::R6 => "R6",
            Register::R7 => "R7",
            Register::A => "A",
            Register::PC => "PC",
            Register::IR => "IR",
            Register::MAR => "MAR",
            Register::MDR => "MDR",
            Register::FR => "FR",
            Register::SP => "SP",
            Register::FP => "FP",
            Register::IF => "IF",
            Register::IE => "IE",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Fixed set of named registers. Every write is masked to the register's width,
/// so overflow wraps silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    values: [u16; Register::COUNT],
}

impl RegisterFile {
    pub fn new() -> Self {
        RegisterFile {
            values: [0; Register::COUNT],
        }
    }

    pub fn read(&self, reg: Register) -> u16 {
        self.values[reg.index()]
    }

    pub fn write(&mut self, reg: Register, value: u32) {
        self.values[reg.index()] = (value & reg.width().mask()) as u16;
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits_retain(self.read(Register::FR) as u8)
    }

    /// ORs `flags` into FR. Bits already set stay set.
    pub fn insert_flags(&mut self, flags: Flags) {
        let merged = self.flags() | flags;
        self.write(Register::FR, merged.bits() as u32);
    }

    pub fn clear(&mut self) {
        self.values = [0; Register::COUNT];
    }

    pub fn snapshot(&self) -> Vec<u16> {
        self.values.to_vec()
    }

    /// Restores values in `Register::ALL` order. Extra entries are ignored and
    /// missing ones are left untouched; each value goes through the width mask.
    pub fn restore(&mut self, values: &[u16]) {
        for (reg, &value) in Register::ALL.iter().zip(values) {
            self.write(*reg, value as u32);
        }
    }

    pub fn dump(&self) -> String {
        Register::ALL
            .iter()
            .map(|&reg| match reg.width() {
                RegisterWidth::Byte => format!("{}=0x{:02x}", reg.name(), self.read(reg)),
                RegisterWidth::Word => format!("{}=0x{:04x}", reg.name(), self.read(reg)),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_discriminant_order() {
        for (i, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(reg.index(), i, "{} out of order", reg.name());
        }
    }

    #[test]
    fn byte_register_masks_write() {
        let mut regs = RegisterFile::new();
        regs.write(Register::A, 0x1FF);
        assert_eq!(regs.read(Register::A), 0xFF);
        regs.write(Register::A, 0x100);
        assert_eq!(regs.read(Register::A), 0x00);
    }

    #[test]
    fn word_register_masks_write() {
        let mut regs = RegisterFile::new();
        regs.write(Register::PC, 0x1_2345);
        assert_eq!(regs.read(Register::PC), 0x2345);
        regs.write(Register::SP, u32::MAX);
        assert_eq!(regs.read(Register::SP), 0xFFFF);
    }

    #[test]
    fn insert_flags_only_ors() {
        let mut regs = RegisterFile::new();
        regs.insert_flags(Flags::ZERO);
        regs.insert_flags(Flags::NEGATIVE);
        assert!(regs.flags().contains(Flags::ZERO | Flags::NEGATIVE));
        assert_eq!(regs.read(Register::FR), 0b0100_0001);
    }

    #[test]
    fn restore_round_trips_snapshot() {
        let mut regs = RegisterFile::new();
        regs.write(Register::PC, 0xBEEF);
        regs.write(Register::R3, 0x7A);
        let snapshot = regs.snapshot();

        let mut other = RegisterFile::new();
        other.restore(&snapshot);
        assert_eq!(other, regs);
    }

    #[test]
    fn dump_lists_every_register() {
        let mut regs = RegisterFile::new();
        regs.write(Register::SP, 0x01FE);
        let dump = regs.dump();
        assert!(dump.contains("SP=0x01fe"));
        assert!(dump.starts_with("R0=0x00"));
        assert!(dump.ends_with("IE=0x00"));
    }
}
