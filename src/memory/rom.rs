use std::cell::Cell;

use super::{check_range, Device, DeviceKind};
use crate::error::DeviceFault;

/// Read-only memory. Writes are discarded without error.
///
/// The image can be placed with `load` until the first read or write reaches the
/// device; after that the ROM is sealed and further loads are rejected. `reset`
/// zeroes the image and unseals it.
pub struct Rom {
    data: Vec<u8>,
    sealed: Cell<bool>,
}

impl Rom {
    pub fn new(size: usize) -> Self {
        Rom {
            data: vec![0; size],
            sealed: Cell::new(false),
        }
    }

    /// ROM of exactly `image.len()` bytes, still unsealed.
    pub fn with_image(image: &[u8]) -> Self {
        Rom {
            data: image.to_vec(),
            sealed: Cell::new(false),
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.get()
    }
}

impl Device for Rom {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Rom
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn read(&self, offset: usize) -> Result<u8, DeviceFault> {
        self.sealed.set(true);
        self.data
            .get(offset)
            .copied()
            .ok_or(DeviceFault::OutOfRange {
                offset,
                len: self.data.len(),
            })
    }

    fn write(&mut self, _offset: usize, _value: u8) -> Result<(), DeviceFault> {
        self.sealed.set(true);
        Ok(())
    }

    fn write16(&mut self, _offset: usize, _value: u16) -> Result<(), DeviceFault> {
        self.sealed.set(true);
        Ok(())
    }

    fn load(&mut self, data: &[u8], offset: usize) -> Result<(), DeviceFault> {
        if self.sealed.get() {
            return Err(DeviceFault::RomSealed);
        }
        check_range(offset, data.len(), self.data.len())?;
        self.data[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn reset(&mut self) {
        self.data.fill(0);
        self.sealed.set(false);
    }

    fn contents(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_discarded() {
        let mut rom = Rom::with_image(&[0xAA; 4]);
        assert_eq!(rom.write(0, 0xFF), Ok(()));
        assert_eq!(rom.write16(2, 0x1234), Ok(()));
        // Even out-of-range writes are silent.
        assert_eq!(rom.write(100, 0xFF), Ok(()));
        assert_eq!(rom.contents(), &[0xAA; 4]);
    }

    #[test]
    fn load_before_access_then_sealed() {
        let mut rom = Rom::new(8);
        rom.load(&[0xA9, 0x42], 0).unwrap();
        rom.load(&[0xEA], 2).unwrap();
        assert!(!rom.is_sealed());

        assert_eq!(rom.read(0), Ok(0xA9));
        assert!(rom.is_sealed());
        assert_eq!(rom.load(&[0x00], 0), Err(DeviceFault::RomSealed));
        assert_eq!(rom.read(0), Ok(0xA9));
    }

    #[test]
    fn write_also_seals() {
        let mut rom = Rom::new(4);
        rom.write(0, 1).unwrap();
        assert_eq!(rom.load(&[1], 0), Err(DeviceFault::RomSealed));
    }

    #[test]
    fn contents_does_not_seal() {
        let mut rom = Rom::new(4);
        assert_eq!(rom.contents()[0], 0);
        rom.load(&[7], 0).unwrap();
    }

    #[test]
    fn reset_zeroes_and_unseals() {
        let mut rom = Rom::with_image(&[1, 2, 3]);
        rom.read(0).unwrap();
        rom.reset();
        assert!(!rom.is_sealed());
        assert_eq!(rom.contents(), &[0, 0, 0]);
        rom.load(&[4, 5, 6], 0).unwrap();
        assert_eq!(rom.read16(1), Ok(0x0605));
    }

    #[test]
    fn oversized_load_faults() {
        let mut rom = Rom::new(2);
        assert_eq!(
            rom.load(&[1, 2, 3], 0),
            Err(DeviceFault::OutOfRange { offset: 2, len: 2 })
        );
    }
}
