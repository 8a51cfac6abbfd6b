use thiserror::Error;

/// Failure raised by a single device while servicing an access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceFault {
    #[error("offset 0x{offset:04X} is outside device of length 0x{len:04X}")]
    OutOfRange { offset: usize, len: usize },
    #[error("ROM image already sealed by an earlier access")]
    RomSealed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("no region mapped at 0x{address:04X}")]
    UnmappedAddress { address: u16 },
    #[error("device fault in {label} at 0x{address:04X} (final address=0x{offset:04X}): {source}")]
    Device {
        address: u16,
        offset: usize,
        label: String,
        #[source]
        source: DeviceFault,
    },
    #[error("region {label} at 0x{start:04X} with size 0x{size:X} does not fit the address space")]
    RegionOverflow {
        label: String,
        start: u16,
        size: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error("unknown instruction 0x{opcode:02X} at 0x{pc:04X}")]
    UnknownInstruction { opcode: u8, pc: u16 },
    #[error("cpu halted at 0x{pc:04X}")]
    Halted { pc: u16 },
}
