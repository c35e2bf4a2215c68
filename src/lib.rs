//!
//! ## Design
//!
//! * one owned interpreter value; no global state
//! * decode is total and stateless; knowing what an opcode *means* is the
//!   interpreter's job, via the `Instruction` table
//! * abstract display so can plug alternatives; TUI in-console, plain ASCII,
//!   or nothing at all
//! * every failure is a typed, fatal error carrying the failing pc
//! * instructions run as fast as possible then sleep, to match a configured
//!   rate; not cycle-exact
//!
//! Model
//!
//! main
//!  |-- config (cli flags -> Chip8Config)
//!  |-- display (tui | ascii | dummy)
//!  |-- interpreter(display, config)
//!  |    |-- memory: font at 0x000, program at 0x200
//!  |    |-- registers, I, pc, call stack, delay timer
//!  |    `-- frame buffer
//!  `-- main loop
//!       |-- stop requested / cycle limit?  -> done
//!       |-- status = interpreter.step()?   // fetch, decode, execute
//!       |-- redraw if the frame buffer changed
//!       |-- self-jump?                     -> done (if configured)
//!       `-- sleep until the next cycle is due
pub mod config;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod opcode;

pub use config::{AluOperands, Chip8Config, SpriteEdge};
pub use error::Chip8Error;
pub use framebuffer::FrameBuffer;
pub use interpreter::{Chip8Interpreter, CycleStatus, RunSummary, StopHandle, StopReason};
