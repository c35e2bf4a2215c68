use std::error::Error;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn, LevelFilter};

use chip8vm::config::DEFAULT_CYCLES_PER_SECOND;
use chip8vm::display::{AsciiDisplay, Display, DummyDisplay, MonoTermDisplay};
use chip8vm::{AluOperands, Chip8Config, Chip8Interpreter, SpriteEdge, StopHandle, StopReason};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Renderer {
    /// full-screen terminal canvas; Esc or Ctrl-C quits
    Tui,
    /// dump every frame to stdout as text
    Ascii,
    /// don't draw anything
    None,
}

/// Run a CHIP-8 program.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// path to the ROM image; loaded verbatim at 0x200
    rom: PathBuf,

    /// instructions per second, 0 for as fast as possible
    #[arg(long, default_value_t = DEFAULT_CYCLES_PER_SECOND)]
    hz: f64,

    /// stop after this many instructions
    #[arg(long)]
    max_cycles: Option<u64>,

    #[arg(long, value_enum, default_value_t = Renderer::Tui)]
    renderer: Renderer,

    /// 8XY1..8XY4 combine VY with itself, like the first versions did
    #[arg(long)]
    legacy_alu: bool,

    /// leave VF alone when sprites collide
    #[arg(long)]
    no_collision: bool,

    /// wrap sprites around the screen edges instead of clipping them
    #[arg(long)]
    wrap_sprites: bool,

    /// keep going when the program jumps to itself
    #[arg(long)]
    run_forever: bool,

    /// more logging; -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// write log lines here instead of stderr; with the tui renderer and -v
    /// they go to chip8vm.log unless this says otherwise
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// where the tui renderer sends verbose logs when no --log-file is given
const DEFAULT_TUI_LOG_FILE: &str = "chip8vm.log";

impl Args {
    fn config(&self) -> Chip8Config {
        Chip8Config {
            alu: if self.legacy_alu {
                AluOperands::VyOnly
            } else {
                AluOperands::Standard
            },
            sprite_edge: if self.wrap_sprites {
                SpriteEdge::Wrap
            } else {
                SpriteEdge::Clip
            },
            collision_flag: !self.no_collision,
            cycles_per_second: Some(self.hz).filter(|hz| *hz > 0.0),
            halt_on_self_jump: !self.run_forever,
            ..Default::default()
        }
    }

    /// stderr shares the terminal with the tui canvas, so chatty logs go to a file
    fn log_file(&self) -> Option<PathBuf> {
        match (&self.log_file, self.renderer) {
            (Some(path), _) => Some(path.clone()),
            (None, Renderer::Tui) if self.verbose > 0 => Some(PathBuf::from(DEFAULT_TUI_LOG_FILE)),
            (None, _) => None,
        }
    }

    /// a finished program's last frame stays on the tui screen until Esc or Ctrl-C
    fn holds_final_frame(&self, reason: StopReason) -> bool {
        self.renderer == Renderer::Tui && reason == StopReason::SelfJump
    }
}

/// Esc or Ctrl-C (raw mode swallows the signal) asks the main loop to stop
fn spawn_quit_watcher(stop: StopHandle) -> thread::JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        while !stop.is_stopped() {
            if !poll(Duration::from_millis(50))? {
                continue;
            }
            match read()? {
                Event::Key(KeyEvent {
                    code: KeyCode::Esc, ..
                }) => stop.stop(),
                Event::Key(KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers,
                    ..
                }) if modifiers.contains(KeyModifiers::CONTROL) => stop.stop(),
                _ => {}
            }
        }
        Ok(())
    })
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let file = File::open(&args.rom)?;
    let mut reader = BufReader::new(file);

    let mut display: Box<dyn Display> = match args.renderer {
        Renderer::Tui => Box::new(MonoTermDisplay::new()?),
        Renderer::Ascii => Box::new(AsciiDisplay::new(io::stdout())),
        Renderer::None => Box::new(DummyDisplay::new()),
    };
    let stop = StopHandle::new();
    let watcher = match args.renderer {
        Renderer::Tui => Some(spawn_quit_watcher(stop.clone())),
        _ => None,
    };

    let mut interpreter = Chip8Interpreter::new(display.as_mut(), args.config());
    interpreter.load_program(&mut reader)?;
    interpreter.refresh()?;
    let result = interpreter.main_loop(args.max_cycles, &stop);

    if let Ok(summary) = &result {
        if args.holds_final_frame(summary.reason) {
            info!("program finished, waiting for Esc or Ctrl-C");
            let watching = || watcher.as_ref().map_or(false, |w| !w.is_finished());
            while !stop.is_stopped() && watching() {
                thread::sleep(Duration::from_millis(50));
            }
        }
    }
    stop.stop();
    if let Some(watcher) = watcher {
        match watcher.join() {
            Ok(Err(e)) => warn!("keyboard watcher failed: {}", e),
            Err(_) => warn!("keyboard watcher panicked"),
            Ok(Ok(())) => {}
        }
    }

    let summary = result?;
    info!("{:?} after {} cycles", summary.reason, summary.cycles);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    match args.verbose {
        0 => {}
        1 => {
            logger.filter_module("chip8vm", LevelFilter::Debug);
        }
        _ => {
            logger.filter_module("chip8vm", LevelFilter::Trace);
        }
    }
    if let Some(path) = args.log_file() {
        let file = match File::create(&path) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("chip8vm: can't create log file {}: {}", path.display(), e);
                process::exit(1);
            }
        };
        logger.target(env_logger::Target::Pipe(Box::new(file)));
    }
    logger.init();

    // the terminal is restored by the time run() returns
    if let Err(e) = run(&args) {
        eprintln!("chip8vm: {}", e);
        process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let argv = ["chip8vm", "game.ch8"].iter().chain(extra).copied();
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_args_config() {
        let args = parse(&[]);
        assert_eq!(args.renderer, Renderer::Tui);
        assert_eq!(args.config(), Chip8Config::default());
    }

    #[test]
    fn test_flags_map_onto_config() {
        let args = parse(&[
            "--legacy-alu",
            "--no-collision",
            "--wrap-sprites",
            "--run-forever",
            "--hz",
            "0",
        ]);
        let config = args.config();
        assert_eq!(config.alu, AluOperands::VyOnly);
        assert_eq!(config.sprite_edge, SpriteEdge::Wrap);
        assert!(!config.collision_flag);
        assert!(!config.halt_on_self_jump);
        assert_eq!(config.cycles_per_second, None);
    }

    #[test]
    fn test_tui_holds_final_frame_on_self_jump() {
        let args = parse(&[]);
        assert!(args.holds_final_frame(StopReason::SelfJump));
        assert!(!args.holds_final_frame(StopReason::CycleLimit));
        assert!(!args.holds_final_frame(StopReason::Requested));
        for renderer in ["ascii", "none"] {
            let args = parse(&["--renderer", renderer]);
            assert!(!args.holds_final_frame(StopReason::SelfJump), "{}", renderer);
        }
    }

    #[test]
    fn test_verbose_tui_logs_to_file() {
        assert_eq!(parse(&[]).log_file(), None);
        assert_eq!(
            parse(&["-v"]).log_file(),
            Some(PathBuf::from(DEFAULT_TUI_LOG_FILE))
        );
        assert_eq!(parse(&["-vv", "--renderer", "none"]).log_file(), None);
        assert_eq!(
            parse(&["--renderer", "ascii", "--log-file", "run.log"]).log_file(),
            Some(PathBuf::from("run.log"))
        );
    }
}
