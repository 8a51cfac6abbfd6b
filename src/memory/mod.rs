//! Byte-addressable storage devices that can be mapped onto the bus.

mod ram;
mod rom;

pub use ram::Ram;
pub use rom::Rom;

use crate::error::DeviceFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Ram,
    Rom,
}

/// Capability contract shared by every mappable device. Offsets are device-local.
///
/// Words are little-endian and composed of two byte accesses, low byte first.
pub trait Device {
    fn kind(&self) -> DeviceKind;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self, offset: usize) -> Result<u8, DeviceFault>;

    fn write(&mut self, offset: usize, value: u8) -> Result<(), DeviceFault>;

    fn read16(&self, offset: usize) -> Result<u16, DeviceFault> {
        let low = self.read(offset)? as u16;
        let high = self.read(offset + 1)? as u16;
        Ok((high << 8) | low)
    }

    fn write16(&mut self, offset: usize, value: u16) -> Result<(), DeviceFault> {
        // Both bytes are checked up front so a fault never leaves half a word behind.
        check_range(offset, 2, self.len())?;
        self.write(offset, (value & 0xFF) as u8)?;
        self.write(offset + 1, (value >> 8) as u8)
    }

    /// Bulk copy of `data` starting at `offset`.
    fn load(&mut self, data: &[u8], offset: usize) -> Result<(), DeviceFault>;

    /// Zeroes storage in place.
    fn reset(&mut self);

    /// Raw view of the backing storage. Reading through it has no side effects.
    fn contents(&self) -> &[u8];
}

pub(crate) fn check_range(offset: usize, count: usize, len: usize) -> Result<(), DeviceFault> {
    if count == 0 {
        return Ok(());
    }
    let last = offset.saturating_add(count - 1);
    if last >= len {
        return Err(DeviceFault::OutOfRange {
            offset: offset.max(len),
            len,
        });
    }
    Ok(())
}
