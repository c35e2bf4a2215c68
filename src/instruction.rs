use std::fmt;

use crate::opcode::Opcode;

/// The instructions this interpreter knows how to execute, with operands
/// already pulled out of the opcode. Registers are indices 0x0..=0xF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump { addr: u16 },
    /// 2NNN
    Call { addr: u16 },
    /// 3XNN
    SkipIfEqual { x: usize, kk: u8 },
    /// 4XNN
    SkipIfNotEqual { x: usize, kk: u8 },
    /// 5XY0
    SkipIfRegistersEqual { x: usize, y: usize },
    /// 6XNN
    Load { x: usize, kk: u8 },
    /// 7XNN
    AddImmediate { x: usize, kk: u8 },
    /// 8XY0
    Move { x: usize, y: usize },
    /// 8XY1
    Or { x: usize, y: usize },
    /// 8XY2
    And { x: usize, y: usize },
    /// 8XY3
    Xor { x: usize, y: usize },
    /// 8XY4
    AddRegisters { x: usize, y: usize },
    /// 9XY0
    SkipIfRegistersNotEqual { x: usize, y: usize },
    /// ANNN
    LoadIndex { addr: u16 },
    /// DXYN
    Draw { x: usize, y: usize, n: u8 },
}

impl Instruction {
    /// Selects the instruction for an opcode. `None` means the opcode is one
    /// we don't implement (yet); adding one is a new arm here plus a new
    /// variant, the decoder doesn't change.
    pub fn decode(op: Opcode) -> Option<Instruction> {
        let x = op.x() as usize;
        let y = op.y() as usize;
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Instruction::ClearScreen,
            (0x0, 0x0, 0xE, 0xE) => Instruction::Return,
            (0x1, ..) => Instruction::Jump { addr: op.addr() },
            (0x2, ..) => Instruction::Call { addr: op.addr() },
            (0x3, ..) => Instruction::SkipIfEqual { x, kk: op.kk() },
            (0x4, ..) => Instruction::SkipIfNotEqual { x, kk: op.kk() },
            (0x5, .., 0x0) => Instruction::SkipIfRegistersEqual { x, y },
            (0x6, ..) => Instruction::Load { x, kk: op.kk() },
            (0x7, ..) => Instruction::AddImmediate { x, kk: op.kk() },
            (0x8, .., 0x0) => Instruction::Move { x, y },
            (0x8, .., 0x1) => Instruction::Or { x, y },
            (0x8, .., 0x2) => Instruction::And { x, y },
            (0x8, .., 0x3) => Instruction::Xor { x, y },
            (0x8, .., 0x4) => Instruction::AddRegisters { x, y },
            (0x9, .., 0x0) => Instruction::SkipIfRegistersNotEqual { x, y },
            (0xA, ..) => Instruction::LoadIndex { addr: op.addr() },
            (0xD, ..) => Instruction::Draw { x, y, n: op.n() },
            _ => return None,
        };
        Some(instruction)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump { addr } => write!(f, "JP {:#05x}", addr),
            Instruction::Call { addr } => write!(f, "CALL {:#05x}", addr),
            Instruction::SkipIfEqual { x, kk } => write!(f, "SE V{:X}, {:#04x}", x, kk),
            Instruction::SkipIfNotEqual { x, kk } => write!(f, "SNE V{:X}, {:#04x}", x, kk),
            Instruction::SkipIfRegistersEqual { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::Load { x, kk } => write!(f, "LD V{:X}, {:#04x}", x, kk),
            Instruction::AddImmediate { x, kk } => write!(f, "ADD V{:X}, {:#04x}", x, kk),
            Instruction::Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddRegisters { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::SkipIfRegistersNotEqual { x, y } => {
                write!(f, "SNE V{:X}, V{:X}", x, y)
            }
            Instruction::LoadIndex { addr } => write!(f, "LD I, {:#05x}", addr),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
        }
    }
}
