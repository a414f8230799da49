use std::fmt;

use crate::byte::Byte;
use crate::error::ValidationError;

/// Number of addressable data cells.
pub const MEMORY_SIZE: usize = 1024;

/// A data memory address, validated to lie in `0..MEMORY_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u16);

impl Address {
    pub fn new(addr: usize) -> Result<Address, ValidationError> {
        if addr < MEMORY_SIZE {
            Ok(Address(addr as u16))
        } else {
            Err(ValidationError::AddressOutOfRange(addr))
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-size data memory. Cells never written read as zero.
#[derive(Clone, PartialEq, Eq)]
pub struct DataMemory {
    cells: Box<[Byte; MEMORY_SIZE]>,
}

impl DataMemory {
    pub fn new() -> Self {
        Self {
            cells: Box::new([Byte::ZERO; MEMORY_SIZE]),
        }
    }

    pub fn get(&self, addr: Address) -> Byte {
        self.cells[addr.index()]
    }

    pub fn set(&mut self, addr: Address, value: Byte) {
        self.cells[addr.index()] = value;
    }

    pub fn clear(&mut self) {
        self.cells.fill(Byte::ZERO);
    }

    /// Overwrite every cell with the contents of `other`.
    pub fn copy_from(&mut self, other: &DataMemory) {
        self.cells.copy_from_slice(&other.cells[..]);
    }

    /// Addresses and values of every non-zero cell, in address order.
    pub fn occupied(&self) -> impl Iterator<Item = (Address, Byte)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_zero())
            .map(|(i, &v)| (Address(i as u16), v))
    }
}

impl Default for DataMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.occupied().map(|(a, v)| (a.index(), v.get())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_bounds() {
        assert!(Address::new(0).is_ok());
        assert!(Address::new(1023).is_ok());
        assert_eq!(
            Address::new(1024),
            Err(ValidationError::AddressOutOfRange(1024))
        );
    }

    #[test]
    fn test_unset_reads_zero() {
        let mem = DataMemory::new();
        assert_eq!(mem.get(Address::new(512).unwrap()), Byte::ZERO);
    }

    #[test]
    fn test_set_clear() {
        let mut mem = DataMemory::new();
        let addr = Address::new(7).unwrap();
        mem.set(addr, Byte::from(9));
        assert_eq!(mem.get(addr).get(), 9);
        assert_eq!(mem.occupied().count(), 1);
        mem.clear();
        assert_eq!(mem.get(addr), Byte::ZERO);
        assert_eq!(mem.occupied().count(), 0);
    }

    #[test]
    fn test_copy_from_is_independent() {
        let mut a = DataMemory::new();
        let addr = Address::new(1).unwrap();
        a.set(addr, Byte::from(3));
        let mut b = DataMemory::new();
        b.copy_from(&a);
        a.set(addr, Byte::from(4));
        assert_eq!(b.get(addr).get(), 3);
    }
}
