use std::io::{self, Read};

use crate::error::Chip8Error;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// an access that runs off the end of memory
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("access of {len} byte(s) at {addr:#06X} is outside memory")]
pub struct AccessError {
    pub addr: usize,
    pub len: usize,
}

/// Represents the address space. Bounds are always checked; nothing here
/// panics on a bad address.
pub trait MemoryMap {
    /// Write unknown len of data into memory at a particular address. Reads
    /// at most one byte more than fits, so an endless reader fails fast.
    fn write_any(&mut self, reader: &mut impl io::Read, addr: u16) -> Result<usize, Chip8Error> {
        let max = self.size().saturating_sub(addr as usize);
        let mut buf = Vec::new();
        let len = reader.take(max as u64 + 1).read_to_end(&mut buf)?;
        if len > max {
            return Err(Chip8Error::RomTooLarge { size: len, max });
        }
        self.write(&buf, addr)
            .map_err(|_| Chip8Error::RomTooLarge { size: len, max })?;
        Ok(len)
    }

    /// write a chunk of bytes; all or nothing
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), AccessError> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (an instruction)
    fn get_word(&self, addr: u16) -> Result<u16, AccessError> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    /// total addressable bytes
    fn size(&self) -> usize;

    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], AccessError>;

    /// get a r/o slice of the underlying memory
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], AccessError>;
}

/// Defines the CHIP-8 memory map used here (4K):
///   0x0000-0x004f  font
///   0x0050-0x01ff  unused (the interpreter lived here on the COSMAC VIP)
///   0x0200-0x0fff  program
///
/// the call stack and the display are not memory mapped
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], AccessError> {
        let a = addr as usize;
        self.bytes
            .get_mut(a..a + len)
            .ok_or(AccessError { addr: a, len })
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], AccessError> {
        let a = addr as usize;
        self.bytes.get(a..a + len).ok_or(AccessError { addr: a, len })
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit glyphs live
pub const CHIP8_FONT_ADDR: u16 = 0x0000;

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
            program_addr: CHIP8_PROGRAM_ADDR,
            font_addr: CHIP8_FONT_ADDR,
        };
        mm.load_font();
        mm
    }

    /// (re)write the 80-byte font table at its fixed address
    pub fn load_font(&mut self) {
        let at = self.font_addr as usize;
        self.bytes[at..at + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
    }

    /// load a CHIP-8 program at 0x200 from something readable
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        self.write_any(reader, self.program_addr)
    }

    /// load a CHIP-8 program image already in memory
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        let max = self.size() - self.program_addr as usize;
        if rom.len() > max {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max,
            });
        }
        self.write(rom, self.program_addr)
            .map_err(|_| Chip8Error::RomTooLarge {
                size: rom.len(),
                max,
            })
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

#[rustfmt::skip]
const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x50 because before that we bake in the font
        assert!(m.bytes[0x50..].iter().all(|b| *b == 0));
        assert_eq!(m.size(), 4096);
    }

    #[test]
    fn test_font_loaded_at_zero() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[..80], CHIP8_FONT);
        // glyph A is the 11th, 5 bytes each
        assert_eq!(m.get_ro_slice(50, 5), Ok(&CHIP8_FONT[50..55]));
    }

    #[test]
    fn test_write_any_data_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let mut src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(dst.write_any(&mut src, 0x300)?, 8);
        assert_eq!(dst.bytes[0x2f8..0x308], [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]);
        Ok(())
    }

    #[test]
    fn test_write_slice_ok() {
        let mut dst = Chip8MemoryMap::new();
        dst.write(&[1, 2, 3], 0x400).unwrap();
        assert_eq!(dst.bytes[0x3ff..0x404], [0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_read_word() {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x200).unwrap();
        assert_eq!(m.get_word(0x204), Ok(0x0405));
    }

    #[test]
    fn test_read_word_off_the_end() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_word(0xffe), Ok(0));
        assert_eq!(m.get_word(0xfff), Err(AccessError { addr: 0xfff, len: 2 }));
    }

    #[test]
    fn test_write_too_much_is_rejected_whole() {
        let mut dst = Chip8MemoryMap::new();
        let mut src: &[u8] = &[0xaa; 8];
        let res = dst.write_any(&mut src, 4089);
        // only one byte past the limit is read
        assert!(matches!(res, Err(Chip8Error::RomTooLarge { size: 8, max: 7 })));
        assert!(dst.bytes[4089..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_endless_program_rejected_quickly() {
        let mut dst = Chip8MemoryMap::new();
        let mut src = io::repeat(0xaa);
        let res = dst.load_program(&mut src);
        assert!(matches!(
            res,
            Err(Chip8Error::RomTooLarge {
                size: 0xe01,
                max: 0xe00
            })
        ));
        assert!(dst.bytes[0x200..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_huge_program_reads_no_more_than_fits() {
        let mut dst = Chip8MemoryMap::new();
        let mut src = io::repeat(0x12).take(64 * 1024 * 1024);
        let res = dst.load_program(&mut src);
        assert!(matches!(res, Err(Chip8Error::RomTooLarge { max: 0xe00, .. })));
        // the rest of the reader is still there
        assert_eq!(src.limit(), 64 * 1024 * 1024 - 0xe01);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        dst.load_program(&mut prog)?;
        assert_eq!(dst.get_ro_slice(0x200, 2), Ok(&[0x00, 0xe0][..]));
        Ok(())
    }

    #[test]
    fn test_rom_exactly_fills_memory() -> Result<(), Chip8Error> {
        let mut dst = Chip8MemoryMap::new();
        dst.load_rom(&[0x12; 0xe00])?;
        assert_eq!(dst.bytes[0xfff], 0x12);
        Ok(())
    }

    #[test]
    fn test_rom_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let res = dst.load_rom(&[0x12; 0xe01]);
        assert!(matches!(
            res,
            Err(Chip8Error::RomTooLarge {
                size: 0xe01,
                max: 0xe00
            })
        ));
        assert!(dst.bytes[0x200..].iter().all(|b| *b == 0));
    }
}
