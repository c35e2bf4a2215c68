//! # interpreter
//!
//! CHIP-8 machine state:
//!  - V0..VF       16 8-bit registers; VF doubles as the carry/collision flag
//!  - I            16-bit index register, only ever used as a memory address
//!  - PC           16-bit program counter, starts at 0x200 where the ROM goes
//!  - call stack   return addresses for 2NNN/00EE, bounded
//!  - delay timer  8-bit; kept for FX07/FX15, which aren't implemented yet
//!  - memory       4K, see `memory`
//!  - frame buffer 64x32 pixels, see `framebuffer`
//!
//! One `step` is fetch, decode, execute. Rendering and pacing belong to the
//! driver loop in `main_loop`, not to the instructions.
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, trace};
use spin_sleep::LoopHelper;

use crate::config::{AluOperands, Chip8Config};
use crate::display;
use crate::error::Chip8Error;
use crate::framebuffer::FrameBuffer;
use crate::instruction::Instruction;
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::opcode::Opcode;

/// bytes per instruction
const INSTRUCTION_BYTES: u16 = 2;

/// What a single step did, as far as the driver cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Continue,
    /// the frame buffer changed
    Redraw,
    /// the instruction jumped to itself; nothing will ever change again
    Idle,
}

/// Why `main_loop` returned without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    CycleLimit,
    SelfJump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub reason: StopReason,
}

/// Cooperative stop flag, checked by `main_loop` once per step. Clones share
/// the same flag, so one can be handed to another thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        StopHandle(Arc::new(AtomicBool::new(false)))
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct Chip8Interpreter<'a> {
    memory: Chip8MemoryMap,
    display: &'a mut dyn display::Display,
    config: Chip8Config,
    v: [u8; 16],
    i: u16,
    program_counter: u16,
    stack: Vec<u16>,
    delay_timer: u8,
    frame: FrameBuffer,
    cycles: u64,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(display: &'a mut dyn display::Display, config: Chip8Config) -> Self {
        let memory = Chip8MemoryMap::new();
        let program_counter = memory.program_addr;
        let stack = Vec::with_capacity(config.stack_depth);
        Chip8Interpreter {
            memory,
            display,
            config,
            v: [0; 16],
            i: 0,
            program_counter,
            stack,
            delay_timer: 0,
            frame: FrameBuffer::new(),
            cycles: 0,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let len = self.memory.load_program(reader)?;
        info!("loaded {} byte program at {:#05x}", len, self.memory.program_addr);
        Ok(())
    }

    /// load a chip8 program that's already in memory
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        self.memory.load_rom(rom)?;
        info!("loaded {} byte program at {:#05x}", rom.len(), self.memory.program_addr);
        Ok(())
    }

    /// read-only view of the screen, for renderers
    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    /// return addresses, oldest first
    pub fn call_stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    /// instructions executed so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// push the current frame to the display
    pub fn refresh(&mut self) -> Result<(), io::Error> {
        self.display.draw(&self.frame)
    }

    /// Fetch, decode and execute one instruction. On error nothing has
    /// changed, the program counter still points at the failing instruction.
    pub fn step(&mut self) -> Result<CycleStatus, Chip8Error> {
        let pc = self.program_counter;
        let word = self
            .memory
            .get_word(pc)
            .map_err(|e| Chip8Error::MemoryOutOfBounds {
                addr: e.addr,
                word: None,
                pc,
            })?;
        let op = Opcode::from(word);
        let instruction =
            Instruction::decode(op).ok_or(Chip8Error::UnimplementedOpcode { word, pc })?;
        debug!("{:#05x}: {:04X}  {}", pc, word, instruction);

        self.program_counter = pc.wrapping_add(INSTRUCTION_BYTES);
        match self.execute(instruction, op, pc) {
            Ok(status) => {
                self.cycles += 1;
                trace!(
                    "v{:02X?} i{:04X} pc{:04X} stack{:04X?}",
                    self.v, self.i, self.program_counter, self.stack
                );
                Ok(status)
            }
            Err(e) => {
                self.program_counter = pc;
                Err(e)
            }
        }
    }

    /// Apply one decoded instruction. `pc` is where it was fetched from; the
    /// program counter has already moved past it.
    fn execute(
        &mut self,
        instruction: Instruction,
        op: Opcode,
        pc: u16,
    ) -> Result<CycleStatus, Chip8Error> {
        match instruction {
            Instruction::ClearScreen => {
                self.frame.clear();
                return Ok(CycleStatus::Redraw);
            }
            Instruction::Return => {
                self.program_counter = self.stack.pop().ok_or(Chip8Error::StackUnderflow {
                    word: op.word(),
                    pc,
                })?;
            }
            Instruction::Jump { addr } => {
                self.program_counter = addr;
                if addr == pc {
                    return Ok(CycleStatus::Idle);
                }
            }
            Instruction::Call { addr } => {
                if self.stack.len() >= self.config.stack_depth {
                    return Err(Chip8Error::StackOverflow {
                        word: op.word(),
                        pc,
                    });
                }
                self.stack.push(self.program_counter);
                self.program_counter = addr;
            }
            Instruction::SkipIfEqual { x, kk } => self.skip_if(self.v[x] == kk),
            Instruction::SkipIfNotEqual { x, kk } => self.skip_if(self.v[x] != kk),
            Instruction::SkipIfRegistersEqual { x, y } => self.skip_if(self.v[x] == self.v[y]),
            Instruction::SkipIfRegistersNotEqual { x, y } => {
                self.skip_if(self.v[x] != self.v[y])
            }
            Instruction::Load { x, kk } => self.v[x] = kk,
            // no carry flag for the immediate form
            Instruction::AddImmediate { x, kk } => self.v[x] = self.v[x].wrapping_add(kk),
            Instruction::Move { x, y } => self.v[x] = self.v[y],
            Instruction::Or { x, y } => {
                let (a, b) = self.alu_operands(x, y);
                self.v[x] = a | b;
            }
            Instruction::And { x, y } => {
                let (a, b) = self.alu_operands(x, y);
                self.v[x] = a & b;
            }
            Instruction::Xor { x, y } => {
                let (a, b) = self.alu_operands(x, y);
                self.v[x] = a ^ b;
            }
            Instruction::AddRegisters { x, y } => {
                let (a, b) = self.alu_operands(x, y);
                let (sum, carry) = a.overflowing_add(b);
                self.v[x] = sum;
                self.v[0xf] = carry as u8;
            }
            Instruction::LoadIndex { addr } => self.i = addr,
            Instruction::Draw { x, y, n } => {
                let sprite = self
                    .memory
                    .get_ro_slice(self.i, n as usize)
                    .map_err(|e| Chip8Error::MemoryOutOfBounds {
                        addr: e.addr,
                        word: Some(op.word()),
                        pc,
                    })?;
                debug!(
                    "draw a {} high sprite at v[{:X}]={} v[{:X}]={}",
                    n, x, self.v[x], y, self.v[y]
                );
                let result =
                    self.frame
                        .draw_sprite(self.v[x], self.v[y], sprite, self.config.sprite_edge);
                if self.config.collision_flag {
                    self.v[0xf] = result.collision as u8;
                }
                return Ok(CycleStatus::Redraw);
            }
        }
        Ok(CycleStatus::Continue)
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.program_counter = self.program_counter.wrapping_add(INSTRUCTION_BYTES);
        }
    }

    /// the two values 8XY1..8XY4 combine
    fn alu_operands(&self, x: usize, y: usize) -> (u8, u8) {
        match self.config.alu {
            AluOperands::Standard => (self.v[x], self.v[y]),
            AluOperands::VyOnly => (self.v[y], self.v[y]),
        }
    }

    /// Run until asked to stop, `max_cycles` instructions have executed, the
    /// program parks itself on a self-jump (if configured), or an error.
    /// The display is redrawn whenever the frame buffer changes.
    pub fn main_loop(
        &mut self,
        max_cycles: Option<u64>,
        stop: &StopHandle,
    ) -> Result<RunSummary, Chip8Error> {
        let mut pacer = self
            .config
            .cycles_per_second
            .filter(|hz| *hz > 0.0)
            .map(|hz| LoopHelper::builder().build_with_target_rate(hz));
        let start = self.cycles;
        info!(
            "running from {:#05x} at {}",
            self.program_counter,
            match self.config.cycles_per_second {
                Some(hz) if hz > 0.0 => format!("{} Hz", hz),
                _ => "full speed".to_string(),
            }
        );

        let reason = loop {
            if stop.is_stopped() {
                break StopReason::Requested;
            }
            if let Some(max) = max_cycles {
                if self.cycles - start >= max {
                    break StopReason::CycleLimit;
                }
            }
            if let Some(p) = pacer.as_mut() {
                p.loop_start();
            }

            match self.step()? {
                CycleStatus::Continue => {}
                CycleStatus::Redraw => self.refresh()?,
                CycleStatus::Idle => {
                    if self.config.halt_on_self_jump {
                        break StopReason::SelfJump;
                    }
                }
            }

            if let Some(p) = pacer.as_mut() {
                p.loop_sleep();
            }
        };

        let summary = RunSummary {
            cycles: self.cycles - start,
            reason,
        };
        info!("stopped after {} cycles: {:?}", summary.cycles, summary.reason);
        Ok(summary)
    }
}
