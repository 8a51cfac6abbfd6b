//! Trait representing the minimal bus interface required by the CPU core.

use crate::error::BusError;

pub trait CpuBus {
    fn read(&mut self, address: u16) -> Result<u8, BusError>;
    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError>;
    fn read16(&mut self, address: u16) -> Result<u16, BusError> {
        let lo = self.read(address)? as u16;
        let hi = self.read(address.wrapping_add(1))? as u16;
        Ok((hi << 8) | lo)
    }
    fn write16(&mut self, address: u16, value: u16) -> Result<(), BusError> {
        self.write(address, (value & 0xFF) as u8)?;
        self.write(address.wrapping_add(1), (value >> 8) as u8)
    }

    /// Side-effect free read for diagnostics. Defaults to "unknown".
    fn peek(&self, _address: u16) -> Option<u8> {
        None
    }
}
