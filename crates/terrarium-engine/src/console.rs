//! Line-oriented control console.
//!
//! Reads one command per line and drives the engine through
//! [`SimulationControl`]. World views come from the latest
//! [`WorldSnapshot`] published by the engine thread; the console never
//! touches the simulation itself.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use terrarium_core::{SimulationControl, WorldSnapshot};
use tracing::{debug, info};

use crate::error::EngineError;

/// How long `step` waits for its tick before reporting back.
const STEP_TIMEOUT: Duration = Duration::from_secs(5);

const HELP: &str = "\
Available commands:
  help        Display this help message
  step        Run exactly one tick
  play        Run ticks continuously
  pause       Stop running continuously
  speed <ms>  Delay between continuous ticks, in milliseconds
  display     Show the grid (T = tree)
  metrics     Show population, weather, and soil totals
  dump        Print the full world snapshot as JSON
  status      Show engine state and tick counter
  quit        Stop the engine and exit
";

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print the command list.
    Help,
    /// Run one tick.
    Step,
    /// Enter free-running mode.
    Play,
    /// Leave free-running mode.
    Pause,
    /// Change the delay between free-running ticks.
    Speed {
        /// New delay in milliseconds.
        interval_ms: u64,
    },
    /// Print the grid map.
    Display,
    /// Print counts and totals.
    Metrics,
    /// Print the snapshot as JSON.
    Dump,
    /// Print engine state.
    Status,
    /// Stop and exit.
    Quit,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line was blank.
    #[error("empty command")]
    Empty,

    /// The first word is not a command.
    #[error("unknown command `{command}`; type `help` for available commands")]
    Unknown {
        /// The word that was typed.
        command: String,
    },

    /// `speed` was given without a delay.
    #[error("`speed` needs a delay in milliseconds, e.g. `speed 250`")]
    MissingInterval,

    /// The `speed` argument is not a whole number of milliseconds.
    #[error("`{value}` is not a delay in milliseconds")]
    InvalidInterval {
        /// The argument that was typed.
        value: String,
    },

    /// A command that takes no arguments was given some.
    #[error("`{command}` takes no arguments")]
    UnexpectedArgument {
        /// The command name.
        command: &'static str,
    },
}

impl Command {
    /// Parse one input line. Command names are case-insensitive and
    /// surrounding whitespace is ignored.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ParseError::Empty);
        };
        let name = name.to_ascii_lowercase();

        let command = match name.as_str() {
            "help" => Self::Help,
            "step" => Self::Step,
            "play" => Self::Play,
            "pause" => Self::Pause,
            "display" => Self::Display,
            "metrics" => Self::Metrics,
            "dump" => Self::Dump,
            "status" => Self::Status,
            "quit" | "exit" => Self::Quit,
            "speed" => {
                let value = words.next().ok_or(ParseError::MissingInterval)?;
                let interval_ms = value.parse::<u64>().ok().ok_or_else(|| {
                    ParseError::InvalidInterval {
                        value: value.to_owned(),
                    }
                })?;
                Self::Speed { interval_ms }
            }
            _ => return Err(ParseError::Unknown { command: name }),
        };

        if words.next().is_some() {
            return Err(ParseError::UnexpectedArgument {
                command: command.name(),
            });
        }
        Ok(command)
    }

    /// The canonical command word.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Step => "step",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Speed { .. } => "speed",
            Self::Display => "display",
            Self::Metrics => "metrics",
            Self::Dump => "dump",
            Self::Status => "status",
            Self::Quit => "quit",
        }
    }
}

/// Whether the session continues after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// The operator asked to quit.
    Quit,
}

/// How a console session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The operator typed `quit`.
    Quit,
    /// Input was exhausted.
    EndOfInput,
}

/// Console bound to one engine run.
#[derive(Debug)]
pub struct Console {
    control: Arc<SimulationControl>,
    snapshots: Arc<RwLock<WorldSnapshot>>,
}

impl Console {
    /// Create a console for the engine behind `control`.
    pub const fn new(
        control: Arc<SimulationControl>,
        snapshots: Arc<RwLock<WorldSnapshot>>,
    ) -> Self {
        Self { control, snapshots }
    }

    /// Print the command list.
    pub fn print_help(out: &mut impl Write) -> io::Result<()> {
        out.write_all(HELP.as_bytes())
    }

    /// Read and execute commands until `quit` or end of input.
    ///
    /// Parse errors are printed and the session continues.
    pub fn run(
        &self,
        input: impl BufRead,
        out: &mut impl Write,
    ) -> Result<SessionEnd, EngineError> {
        for line in input.lines() {
            let line = line.map_err(console_error)?;
            if line.trim().is_empty() {
                continue;
            }
            let flow = match Command::parse(&line) {
                Ok(command) => {
                    debug!(command = command.name(), "console command");
                    self.execute(command, out).map_err(console_error)?
                }
                Err(err) => {
                    writeln!(out, "{err}").map_err(console_error)?;
                    Flow::Continue
                }
            };
            out.flush().map_err(console_error)?;
            if flow == Flow::Quit {
                return Ok(SessionEnd::Quit);
            }
        }
        Ok(SessionEnd::EndOfInput)
    }

    /// Execute one command, writing any output to `out`.
    pub fn execute(&self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        match command {
            Command::Help => Self::print_help(out)?,
            Command::Step => {
                let target = self.control.tick().saturating_add(1);
                self.control.request_step();
                let reached = self.control.wait_for_tick(target, STEP_TIMEOUT);
                writeln!(out, "tick {reached}")?;
            }
            Command::Play => {
                self.control.set_playing(true);
                info!(tick = self.control.tick(), "simulation playing");
                writeln!(out, "Simulation started")?;
            }
            Command::Pause => {
                self.control.set_playing(false);
                info!(tick = self.control.tick(), "simulation paused");
                writeln!(out, "Simulation paused")?;
            }
            Command::Speed { interval_ms } => {
                self.control.set_tick_interval_ms(interval_ms);
                info!(tick_interval_ms = interval_ms, "tick interval changed");
                writeln!(out, "Tick interval set to {interval_ms} ms")?;
            }
            Command::Display => {
                let snapshot = self.latest();
                writeln!(out, "Current grid (tick {}):", snapshot.tick)?;
                out.write_all(snapshot.render_grid().as_bytes())?;
            }
            Command::Metrics => out.write_all(self.latest().metrics_report().as_bytes())?,
            Command::Dump => writeln!(out, "{}", self.latest().to_json()?)?,
            Command::Status => self.write_status(out)?,
            Command::Quit => {
                self.control.request_stop();
                writeln!(out, "Stopping")?;
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn latest(&self) -> WorldSnapshot {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write_status(&self, out: &mut impl Write) -> io::Result<()> {
        let control = &self.control;
        let max_ticks = match control.max_ticks() {
            0 => "unlimited".to_owned(),
            n => n.to_string(),
        };
        writeln!(out, "state:      {:?}", control.state())?;
        writeln!(out, "tick:       {}", control.tick())?;
        writeln!(out, "playing:    {}", control.is_playing())?;
        writeln!(out, "interval:   {} ms", control.tick_interval_ms())?;
        writeln!(out, "max ticks:  {max_ticks}")?;
        writeln!(
            out,
            "started:    {} ({}s ago)",
            control.started_at().to_rfc3339(),
            control.elapsed_seconds()
        )
    }
}

fn console_error(err: io::Error) -> EngineError {
    EngineError::Console {
        message: err.to_string(),
    }
}
