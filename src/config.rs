/// Where 8XY1..8XY4 take their operands from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOperands {
    /// Vx = Vx op Vy, as every CHIP-8 reference documents it
    Standard,
    /// Vx = Vy op Vy; what the first versions of this interpreter did, kept
    /// so their output can be reproduced
    VyOnly,
}

/// What happens to sprite pixels that land off the 64x32 screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteEdge {
    /// off-screen pixels are skipped; neither read nor written
    Clip,
    /// coordinates wrap modulo the screen size
    Wrap,
}

/// Behavioural knobs for the interpreter and its driver loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Chip8Config {
    pub alu: AluOperands,
    pub sprite_edge: SpriteEdge,
    /// DXYN sets VF to 1 if any pixel went from on to off, 0 otherwise
    pub collision_flag: bool,
    /// instructions per second; `None` runs flat out
    pub cycles_per_second: Option<f64>,
    /// treat `1NNN` jumping to itself as the end of the program
    pub halt_on_self_jump: bool,
    /// call stack entries before 2NNN overflows
    pub stack_depth: usize,
}

/// 16 return addresses, as on most interpreters since the COSMAC VIP
pub const DEFAULT_STACK_DEPTH: usize = 16;

/// a comfortable speed for most CHIP-8 programs
pub const DEFAULT_CYCLES_PER_SECOND: f64 = 500.0;

impl Default for Chip8Config {
    fn default() -> Self {
        Chip8Config {
            alu: AluOperands::Standard,
            sprite_edge: SpriteEdge::Clip,
            collision_flag: true,
            cycles_per_second: Some(DEFAULT_CYCLES_PER_SECOND),
            halt_on_self_jump: true,
            stack_depth: DEFAULT_STACK_DEPTH,
        }
    }
}

impl Chip8Config {
    /// the behaviour of the first versions of this interpreter: self-referential
    /// ALU, no collision flag, clipped sprites, 100ms between instructions
    pub fn legacy() -> Self {
        Chip8Config {
            alu: AluOperands::VyOnly,
            collision_flag: false,
            cycles_per_second: Some(10.0),
            halt_on_self_jump: false,
            ..Default::default()
        }
    }

    /// default behaviour with no pacing; handy for tests and benchmarks
    pub fn unthrottled() -> Self {
        Chip8Config {
            cycles_per_second: None,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_standard() {
        let c = Chip8Config::default();
        assert_eq!(c.alu, AluOperands::Standard);
        assert_eq!(c.sprite_edge, SpriteEdge::Clip);
        assert!(c.collision_flag);
        assert_eq!(c.stack_depth, 16);
    }

    #[test]
    fn test_legacy() {
        let c = Chip8Config::legacy();
        assert_eq!(c.alu, AluOperands::VyOnly);
        assert!(!c.collision_flag);
        assert_eq!(c.cycles_per_second, Some(10.0));
        assert!(!c.halt_on_self_jump);
    }
}
