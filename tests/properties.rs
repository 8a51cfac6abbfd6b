//! Property tests for the register file, bus routing and stack invariants.

use proptest::prelude::*;
use riku::{Bus, Cpu, Device, Ram, Register, RegisterFile, Rom};

fn stack_bus() -> Bus {
    let mut bus = Bus::new();
    bus.map("ZERO_PAGE", Box::new(Ram::new(0x100)), 0x0000, 0x100)
        .unwrap();
    bus.map("STACK", Box::new(Ram::new(0x100)), 0x0100, 0x100)
        .unwrap();
    bus
}

proptest! {
    #[test]
    fn register_writes_are_masked(value in any::<u32>(), index in 0usize..Register::COUNT) {
        let reg = Register::ALL[index];
        let mut regs = RegisterFile::new();
        regs.write(reg, value);
        prop_assert_eq!(regs.read(reg) as u32, value & reg.width().mask());
    }

    #[test]
    fn word_round_trip(addr in 0x1000u16..0x1FFF, word in any::<u16>()) {
        let mut bus = Bus::new();
        bus.map("RAM", Box::new(Ram::new(0x1000)), 0x1000, 0x1000).unwrap();

        bus.write16(addr, word).unwrap();
        prop_assert_eq!(bus.read16(addr).unwrap(), word);
        prop_assert_eq!(bus.read(addr).unwrap(), (word & 0xFF) as u8);
        prop_assert_eq!(bus.read(addr + 1).unwrap(), (word >> 8) as u8);
    }

    #[test]
    fn stack_is_symmetric(values in prop::collection::vec(any::<u16>(), 1..64)) {
        let mut bus = stack_bus();
        let mut cpu = Cpu::new();
        let sp = cpu.sp();

        for &v in &values {
            cpu.push(&mut bus, v).unwrap();
        }
        for &v in values.iter().rev() {
            prop_assert_eq!(cpu.pop(&mut bus).unwrap(), v);
        }
        prop_assert_eq!(cpu.sp(), sp);
        prop_assert_eq!(cpu.stack_depth(), 0);
    }

    #[test]
    fn rom_ignores_writes(image in prop::collection::vec(any::<u8>(), 0x40), offset in 0u16..0x40, value in any::<u8>(), word in any::<u16>()) {
        let mut bus = Bus::new();
        bus.map("ROM", Box::new(Rom::with_image(&image)), 0x4000, 0x40).unwrap();
        let addr = 0x4000 + offset;

        let before = bus.read(addr).unwrap();
        bus.write(addr, value).unwrap();
        prop_assert_eq!(bus.read(addr).unwrap(), before);
        bus.write16(addr, word).unwrap();
        prop_assert_eq!(bus.read(addr).unwrap(), before);
        prop_assert_eq!(bus.fault_count(), 0);
    }

    #[test]
    fn shadowing_only_covers_the_overlap(addr in 0x2000u16..0x3000, value in any::<u8>()) {
        let mut bus = Bus::new();
        bus.map("BASE", Box::new(Ram::new(0x1000)), 0x2000, 0x1000).unwrap();
        bus.map("OVERLAY", Box::new(Ram::new(0x100)), 0x2400, 0x100).unwrap();

        bus.write(addr, value).unwrap();
        let expected = if (0x2400..0x2500).contains(&addr) { "OVERLAY" } else { "BASE" };
        prop_assert_eq!(bus.region_label(addr).unwrap(), expected);
        let (device, offset) = bus.resolve(addr).unwrap();
        prop_assert_eq!(device.contents()[offset], value);
    }

    #[test]
    fn unmapped_writes_change_nothing(addr in 0x0100u16..=0xFFFF, value in any::<u8>()) {
        let mut bus = Bus::new();
        bus.map("ZERO_PAGE", Box::new(Ram::new(0x100)), 0x0000, 0x100).unwrap();

        prop_assert!(bus.write(addr, value).is_err());
        prop_assert!(bus.read(addr).is_err());
        let (device, _) = bus.resolve(0x0000).unwrap();
        prop_assert!(device.contents().iter().all(|&b| b == 0));
    }
}
