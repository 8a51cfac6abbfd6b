use super::{check_range, Device, DeviceKind};
use crate::error::DeviceFault;

pub struct Ram {
    data: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Ram {
            data: vec![0; size],
        }
    }
}

impl Device for Ram {
    fn kind(&self) -> DeviceKind {
        DeviceKind::Ram
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn read(&self, offset: usize) -> Result<u8, DeviceFault> {
        self.data
            .get(offset)
            .copied()
            .ok_or(DeviceFault::OutOfRange {
                offset,
                len: self.data.len(),
            })
    }

    fn write(&mut self, offset: usize, value: u8) -> Result<(), DeviceFault> {
        let len = self.data.len();
        match self.data.get_mut(offset) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(DeviceFault::OutOfRange { offset, len }),
        }
    }

    fn load(&mut self, data: &[u8], offset: usize) -> Result<(), DeviceFault> {
        check_range(offset, data.len(), self.data.len())?;
        self.data[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn reset(&mut self) {
        self.data.fill(0);
    }

    fn contents(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_byte() {
        let mut ram = Ram::new(16);
        ram.write(3, 0x42).unwrap();
        assert_eq!(ram.read(3), Ok(0x42));
        assert_eq!(ram.read(4), Ok(0x00));
    }

    #[test]
    fn word_is_little_endian() {
        let mut ram = Ram::new(16);
        ram.write16(4, 0xBEEF).unwrap();
        assert_eq!(ram.read(4), Ok(0xEF));
        assert_eq!(ram.read(5), Ok(0xBE));
        assert_eq!(ram.read16(4), Ok(0xBEEF));
    }

    #[test]
    fn out_of_range_access_faults() {
        let mut ram = Ram::new(4);
        assert_eq!(
            ram.read(4),
            Err(DeviceFault::OutOfRange { offset: 4, len: 4 })
        );
        assert!(ram.write(9, 1).is_err());
        assert!(ram.read16(3).is_err());
    }

    #[test]
    fn straddling_word_write_leaves_storage_untouched() {
        let mut ram = Ram::new(4);
        assert!(ram.write16(3, 0xFFFF).is_err());
        assert_eq!(ram.contents(), &[0, 0, 0, 0]);
    }

    #[test]
    fn load_copies_at_offset() {
        let mut ram = Ram::new(8);
        ram.load(&[1, 2, 3], 2).unwrap();
        assert_eq!(ram.contents(), &[0, 0, 1, 2, 3, 0, 0, 0]);
        assert!(ram.load(&[1, 2, 3], 6).is_err());
        // Loads may be repeated.
        ram.load(&[9], 2).unwrap();
        assert_eq!(ram.read(2), Ok(9));
    }

    #[test]
    fn reset_zeroes_in_place() {
        let mut ram = Ram::new(8);
        ram.load(&[0xFF; 8], 0).unwrap();
        ram.reset();
        assert_eq!(ram.len(), 8);
        assert!(ram.contents().iter().all(|&b| b == 0));
    }
}
