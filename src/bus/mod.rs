//! Address-range routing onto devices.
//!
//! Regions are kept in priority order: `map` inserts at the front and lookup takes
//! the first region containing the address, so a newer mapping shadows older ones
//! wherever they overlap. The region count is small and fixed after boot, so a
//! linear scan is enough.

use crate::cpu_bus::CpuBus;
use crate::error::{BusError, DeviceFault};
use crate::memory::{check_range, Device, DeviceKind};


/// Handle returned by [`Bus::map`], used to remove exactly that region later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(u64);

/// What the bus does when a resolved device rejects an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Log the fault, remember it, and hand back zero (reads) or drop the write.
    #[default]
    Degrade,
    /// Return the fault to the caller.
    Propagate,
}

struct Region {
    id: RegionId,
    label: String,
    device: Box<dyn Device>,
    start: u16,
    end: u16,
    remap: bool,
}

impl Region {
    fn contains(&self, address: u16) -> bool {
        self.start <= address && address <= self.end
    }

    fn local_offset(&self, address: u16) -> usize {
        if self.remap {
            (address - self.start) as usize
        } else {
            address as usize
        }
    }
}

/// Read-only description of a mapped region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    pub label: String,
    pub start: u16,
    pub end: u16,
    pub remap: bool,
    pub kind: DeviceKind,
}

#[derive(Default)]
pub struct Bus {
    regions: Vec<Region>,
    next_id: u64,
    policy: FaultPolicy,
    fault_count: u64,
    last_fault: Option<BusError>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: FaultPolicy) -> Self {
        Bus {
            policy,
            ..Self::default()
        }
    }

    pub fn fault_policy(&self) -> FaultPolicy {
        self.policy
    }

    pub fn set_fault_policy(&mut self, policy: FaultPolicy) {
        self.policy = policy;
    }

    /// Maps `device` over `[start, start + size - 1]` with device-local offsets.
    pub fn map(
        &mut self,
        label: &str,
        device: Box<dyn Device>,
        start: u16,
        size: usize,
    ) -> Result<RegionId, BusError> {
        self.map_with(label, device, start, size, true)
    }

    /// Like [`Bus::map`]; with `remap == false` the raw bus address is handed to the device.
    pub fn map_with(
        &mut self,
        label: &str,
        device: Box<dyn Device>,
        start: u16,
        size: usize,
        remap: bool,
    ) -> Result<RegionId, BusError> {
        let end = match (start as usize).checked_add(size) {
            Some(end) if size > 0 && end <= 0x1_0000 => (end - 1) as u16,
            _ => {
                return Err(BusError::RegionOverflow {
                    label: label.to_string(),
                    start,
                    size,
                })
            }
        };

        let id = RegionId(self.next_id);
        self.next_id += 1;

        log::info!("Mapping {} from 0x{:04x} to 0x{:04x}", label, start, end);
        self.regions.insert(
            0,
            Region {
                id,
                label: label.to_string(),
                device,
                start,
                end,
                remap,
            },
        );
        Ok(id)
    }

    /// Removes the region created by the `map` call that returned `id`.
    pub fn unmap(&mut self, id: RegionId) -> Option<Box<dyn Device>> {
        let index = self.regions.iter().position(|r| r.id == id)?;
        let region = self.regions.remove(index);
        log::info!("Unmapped {}", region.label);
        Some(region.device)
    }

    /// Highest mapped address plus one. Diagnostic only.
    pub fn byte_length(&self) -> usize {
        self.regions
            .iter()
            .map(|r| r.end as usize + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn regions(&self) -> impl Iterator<Item = RegionInfo> + '_ {
        self.regions.iter().map(|r| RegionInfo {
            label: r.label.clone(),
            start: r.start,
            end: r.end,
            remap: r.remap,
            kind: r.device.kind(),
        })
    }

    fn find(&self, address: u16) -> Result<(usize, usize), BusError> {
        match self.regions.iter().position(|r| r.contains(address)) {
            Some(index) => Ok((index, self.regions[index].local_offset(address))),
            None => {
                if cfg!(debug_assertions) {
                    log::warn!("No region found for address 0x{:04x}", address);
                }
                Err(BusError::UnmappedAddress { address })
            }
        }
    }

    /// Device and device-local offset that `address` routes to.
    pub fn resolve(&self, address: u16) -> Result<(&dyn Device, usize), BusError> {
        let (index, offset) = self.find(address)?;
        Ok((self.regions[index].device.as_ref(), offset))
    }

    /// Label of the region `address` routes to.
    pub fn region_label(&self, address: u16) -> Result<&str, BusError> {
        let (index, _) = self.find(address)?;
        Ok(&self.regions[index].label)
    }

    fn device_fault<T: Default>(
        &mut self,
        access: &str,
        address: u16,
        index: usize,
        offset: usize,
        source: DeviceFault,
    ) -> Result<T, BusError> {
        let err = BusError::Device {
            address,
            offset,
            label: self.regions[index].label.clone(),
            source,
        };
        match self.policy {
            FaultPolicy::Propagate => Err(err),
            FaultPolicy::Degrade => {
                log::error!(
                    "Attempted {} address 0x{:04x} of mapped device (final address=0x{:04x}): {}",
                    access,
                    address,
                    offset,
                    err
                );
                self.fault_count += 1;
                self.last_fault = Some(err);
                Ok(T::default())
            }
        }
    }

    pub fn read(&mut self, address: u16) -> Result<u8, BusError> {
        let (index, offset) = self.find(address)?;
        match self.regions[index].device.read(offset) {
            Ok(value) => Ok(value),
            Err(fault) => self.device_fault("read from", address, index, offset, fault),
        }
    }

    /// Little-endian word. Both bytes come from the device `address` resolves to.
    pub fn read16(&mut self, address: u16) -> Result<u16, BusError> {
        let (index, offset) = self.find(address)?;
        match self.regions[index].device.read16(offset) {
            Ok(value) => Ok(value),
            Err(fault) => self.device_fault("read from", address, index, offset, fault),
        }
    }

    pub fn write(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        let (index, offset) = self.find(address)?;
        match self.regions[index].device.write(offset, value) {
            Ok(()) => Ok(()),
            Err(fault) => self.device_fault("write to", address, index, offset, fault),
        }
    }

    pub fn write16(&mut self, address: u16, value: u16) -> Result<(), BusError> {
        let (index, offset) = self.find(address)?;
        match self.regions[index].device.write16(offset, value) {
            Ok(()) => Ok(()),
            Err(fault) => self.device_fault("write to", address, index, offset, fault),
        }
    }

    /// Bulk-loads `data` into the device mapped at `address`. Used for image
    /// placement; faults are always returned.
    pub fn load(&mut self, data: &[u8], address: u16) -> Result<(), BusError> {
        let (index, offset) = self.find(address)?;
        let region = &mut self.regions[index];
        region
            .device
            .load(data, offset)
            .map_err(|source| BusError::Device {
                address,
                offset,
                label: region.label.clone(),
                source,
            })?;
        log::info!(
            "Loaded {} bytes into {} at 0x{:04x}",
            data.len(),
            region.label,
            address
        );
        Ok(())
    }

    /// Resets every mapped device. Mappings are kept.
    pub fn reset(&mut self) {
        for region in &mut self.regions {
            region.device.reset();
        }
        self.fault_count = 0;
        self.last_fault = None;
    }

    /// Side-effect free read, `None` when unmapped or outside the device.
    pub fn peek(&self, address: u16) -> Option<u8> {
        let region = self.regions.iter().find(|r| r.contains(address))?;
        region
            .device
            .contents()
            .get(region.local_offset(address))
            .copied()
    }

    /// Formats `n` bytes from `address`, e.g. `memory @ 0x0f01: 0x04 0x05 --`.
    pub fn inspect(&self, address: u16, n: usize) -> String {
        format_memory(address, n, |addr| self.peek(addr))
    }

    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }

    pub fn last_fault(&self) -> Option<&BusError> {
        self.last_fault.as_ref()
    }

    pub fn take_last_fault(&mut self) -> Option<BusError> {
        self.last_fault.take()
    }

    /// Writable region contents keyed by label, in priority order.
    pub fn writable_contents(&self) -> Vec<(String, Vec<u8>)> {
        self.regions
            .iter()
            .filter(|r| r.device.kind() == DeviceKind::Ram)
            .map(|r| (r.label.clone(), r.device.contents().to_vec()))
            .collect()
    }

    /// Checks that `data` would fit the first writable region labelled `label`
    /// without touching it. Labels with no writable mapping pass.
    pub fn check_contents(&self, label: &str, data: &[u8]) -> Result<(), BusError> {
        let region = match self
            .regions
            .iter()
            .find(|r| r.label == label && r.device.kind() == DeviceKind::Ram)
        {
            Some(region) => region,
            None => return Ok(()),
        };
        check_range(0, data.len(), region.device.len()).map_err(|source| BusError::Device {
            address: region.start,
            offset: 0,
            label: region.label.clone(),
            source,
        })
    }

    /// Reloads the first writable region labelled `label` from offset zero.
    pub fn restore_contents(&mut self, label: &str, data: &[u8]) -> Result<bool, BusError> {
        let region = match self
            .regions
            .iter_mut()
            .find(|r| r.label == label && r.device.kind() == DeviceKind::Ram)
        {
            Some(region) => region,
            None => return Ok(false),
        };
        region
            .device
            .load(data, 0)
            .map_err(|source| BusError::Device {
                address: region.start,
                offset: 0,
                label: region.label.clone(),
                source,
            })?;
        Ok(true)
    }
}

/// Renders `n` bytes starting at `address`; unreadable bytes show as `--`.
pub fn format_memory(address: u16, n: usize, peek: impl Fn(u16) -> Option<u8>) -> String {
    let bytes = (0..n)
        .map(|i| match peek(address.wrapping_add(i as u16)) {
            Some(value) => format!("0x{:02x}", value),
            None => "--".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("memory @ 0x{:04x}: {}", address, bytes)
}

impl CpuBus for Bus {
    fn read(&mut self, address: u16) -> Result<u8, BusError> {
        Bus::read(self, address)
    }

    fn write(&mut self, address: u16, value: u8) -> Result<(), BusError> {
        Bus::write(self, address, value)
    }

    fn read16(&mut self, address: u16) -> Result<u16, BusError> {
        Bus::read16(self, address)
    }

    fn write16(&mut self, address: u16, value: u16) -> Result<(), BusError> {
        Bus::write16(self, address, value)
    }

    fn peek(&self, address: u16) -> Option<u8> {
        Bus::peek(self, address)
    }
}
