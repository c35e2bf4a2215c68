/// # Opcodes
///
/// Every instruction is 16 bits: two bytes, or four nibbles, so it reads as
/// four hex digits. Which operation it is depends on some combination of:
/// - `(n, _, _, _)` broad categorization; applies to all opcodes
/// - `(_, _, _, n)` specific behaviour within a category
/// - `(_, n, n, n)` fixed functions that take no operands (e.g. 00E0, clear screen)
///
/// Nibbles not used to pick the operation usually carry operands:
/// - `(_, n, n, n)` a 12-bit address
/// - `(_, _, n, n)` an 8-bit immediate assigned to or compared with Vx
/// - `(_, n, _, _)` the register Vx
/// - `(_, _, n, _)` the register Vy
///
/// Decoding is total; every one of the 65536 words gives an `Opcode`. Whether
/// the interpreter knows what to do with it is someone else's problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(u16);

impl Opcode {
    /// build from the high byte (at pc) and low byte (at pc + 1)
    pub fn from_bytes(hi: u8, lo: u8) -> Self {
        Opcode(u16::from_be_bytes([hi, lo]))
    }

    /// the raw instruction word
    pub fn word(&self) -> u16 {
        self.0
    }

    /// all four nibbles, most significant first
    pub fn nibbles(&self) -> (u8, u8, u8, u8) {
        (((self.0 & 0xF000) >> 12) as u8, self.x(), self.y(), self.n())
    }

    /// `[_x__]`
    pub fn x(&self) -> u8 {
        ((self.0 & 0x0F00) >> 8) as u8
    }

    /// `[__y_]`
    pub fn y(&self) -> u8 {
        ((self.0 & 0x00F0) >> 4) as u8
    }

    /// `[___n]`
    pub fn n(&self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// `[__kk]`
    pub fn kk(&self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// `[_nnn]`
    pub fn addr(&self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Self {
        Opcode(word)
    }
}
