//! Static instruction metadata: opcode, tick cost and encoded size (opcode byte
//! included). The CPU dispatches on the opcode byte; this table is the source of
//! truth for sizes and timing.

pub mod opcode {
    pub const NOP: u8 = 0x00;
    pub const JSR: u8 = 0x20;
    pub const RTS: u8 = 0x60;
    pub const LDA_ZP: u8 = 0xA5;
    pub const LDA_IMM: u8 = 0xA9;
    pub const LDA_ABS: u8 = 0xAD;
    pub const LDA_ZP_X: u8 = 0xB5;
    pub const LDA_ABS_Y: u8 = 0xB9;
    pub const LDA_ABS_X: u8 = 0xBD;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub ticks: u8,
    pub size: u8,
}

const fn ins(mnemonic: &'static str, opcode: u8, ticks: u8, size: u8) -> Instruction {
    Instruction {
        mnemonic,
        opcode,
        ticks,
        size,
    }
}

pub const NOP: Instruction = ins("NOP", opcode::NOP, 1, 1);
pub const LDA_IMM: Instruction = ins("LDA_IMM", opcode::LDA_IMM, 2, 2);
pub const LDA_ZP: Instruction = ins("LDA_ZP", opcode::LDA_ZP, 3, 2);
pub const LDA_ZP_X: Instruction = ins("LDA_ZP_X", opcode::LDA_ZP_X, 4, 2);
pub const LDA_ABS: Instruction = ins("LDA_ABS", opcode::LDA_ABS, 4, 3);
pub const LDA_ABS_X: Instruction = ins("LDA_ABS_X", opcode::LDA_ABS_X, 4, 3);
pub const LDA_ABS_Y: Instruction = ins("LDA_ABS_Y", opcode::LDA_ABS_Y, 4, 3);
pub const JSR: Instruction = ins("JSR", opcode::JSR, 6, 3);
pub const RTS: Instruction = ins("RTS", opcode::RTS, 6, 1);

pub const INSTRUCTIONS: &[Instruction] = &[
    NOP, LDA_IMM, LDA_ZP, LDA_ZP_X, LDA_ABS, LDA_ABS_X, LDA_ABS_Y, JSR, RTS,
];

pub static OPCODE_TABLE: [Option<Instruction>; 256] = build_table();

const fn build_table() -> [Option<Instruction>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < INSTRUCTIONS.len() {
        let entry = INSTRUCTIONS[i];
        table[entry.opcode as usize] = Some(entry);
        i += 1;
    }
    table
}

pub fn lookup(opcode: u8) -> Option<&'static Instruction> {
    OPCODE_TABLE[opcode as usize].as_ref()
}

pub fn by_mnemonic(mnemonic: &str) -> Option<&'static Instruction> {
    INSTRUCTIONS.iter().find(|i| i.mnemonic == mnemonic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn opcodes_are_unique() {
        let mut seen = HashSet::new();
        for ins in INSTRUCTIONS {
            assert!(seen.insert(ins.opcode), "duplicate opcode {:02X}", ins.opcode);
        }
    }

    #[test]
    fn table_matches_list() {
        for ins in INSTRUCTIONS {
            assert_eq!(lookup(ins.opcode), Some(ins));
        }
        let populated = OPCODE_TABLE.iter().filter(|e| e.is_some()).count();
        assert_eq!(populated, INSTRUCTIONS.len());
        assert_eq!(lookup(0xFF), None);
    }

    #[test]
    fn lookup_by_mnemonic() {
        assert_eq!(by_mnemonic("LDA_IMM").map(|i| i.opcode), Some(0xA9));
        assert_eq!(by_mnemonic("LDA_IMM").map(|i| i.ticks), Some(2));
        assert!(by_mnemonic("BRK").is_none());
    }
}
