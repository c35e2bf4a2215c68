use std::io;

/// Everything that can stop the interpreter. All of these are fatal: the
/// driver loop halts and hands the error back to whoever called it.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large (at least {size} bytes), at most {max} bytes fit in program memory")]
    RomTooLarge { size: usize, max: usize },

    #[error("stack overflow: call {word:#06X} at {pc:#05X} with a full call stack")]
    StackOverflow { word: u16, pc: u16 },

    #[error("stack underflow: return {word:#06X} at {pc:#05X} with an empty call stack")]
    StackUnderflow { word: u16, pc: u16 },

    #[error("unimplemented opcode {word:#06X} at {pc:#05X}")]
    UnimplementedOpcode { word: u16, pc: u16 },

    /// `word` is `None` when the instruction itself couldn't be fetched
    #[error(
        "memory access out of bounds at address {addr:#06X} (pc {pc:#05X}{})",
        word_suffix(.word)
    )]
    MemoryOutOfBounds {
        addr: usize,
        word: Option<u16>,
        pc: u16,
    },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

fn word_suffix(word: &Option<u16>) -> String {
    match word {
        Some(w) => format!(", {:#06X}", w),
        None => String::new(),
    }
}

impl Chip8Error {
    /// the program counter of the failing instruction, where there is one
    pub fn pc(&self) -> Option<u16> {
        match self {
            Chip8Error::StackOverflow { pc, .. }
            | Chip8Error::StackUnderflow { pc, .. }
            | Chip8Error::UnimplementedOpcode { pc, .. }
            | Chip8Error::MemoryOutOfBounds { pc, .. } => Some(*pc),
            Chip8Error::RomTooLarge { .. } | Chip8Error::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pc_attached() {
        let e = Chip8Error::UnimplementedOpcode {
            word: 0xffff,
            pc: 0x200,
        };
        assert_eq!(e.pc(), Some(0x200));
        assert_eq!(e.to_string(), "unimplemented opcode 0xFFFF at 0x200");
    }

    #[test]
    fn test_out_of_bounds_names_the_word_when_known() {
        let e = Chip8Error::MemoryOutOfBounds {
            addr: 0xffe,
            word: Some(0xd005),
            pc: 0x202,
        };
        assert_eq!(
            e.to_string(),
            "memory access out of bounds at address 0x0FFE (pc 0x202, 0xD005)"
        );
        let e = Chip8Error::MemoryOutOfBounds {
            addr: 0xfff,
            word: None,
            pc: 0xfff,
        };
        assert_eq!(e.pc(), Some(0xfff));
        assert_eq!(
            e.to_string(),
            "memory access out of bounds at address 0x0FFF (pc 0xFFF)"
        );
    }

    #[test]
    fn test_load_errors_have_no_pc() {
        let e = Chip8Error::RomTooLarge {
            size: 4000,
            max: 3584,
        };
        assert_eq!(e.pc(), None);
        let e: Chip8Error = io::Error::new(io::ErrorKind::NotFound, "nope").into();
        assert_eq!(e.pc(), None);
    }
}
