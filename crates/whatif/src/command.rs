//! Line-oriented command language
//!
//! One command per line, words separated by whitespace. Blank lines and lines
//! starting with `#` parse to `None`.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { key: String, value: f64 },
    Undo,
    Redo,
    Save { name: String },
    Load { name: String },
    Delete { name: String },
    Snapshots,
    Metrics,
    History,
    /// Compare snapshot `name` with `other`, or with the live set when None
    Compare { name: String, other: Option<String> },
    Enter { name: String },
    Exit,
    Diff,
    Sweep { key: String, steps: usize },
    Sensitivity,
    Stress { iterations: usize, relative_std_dev: f64, seed: u64 },
    Export { format: ExportFormat, path: PathBuf },
    Report,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    Unknown(String),
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    UnexpectedArgument {
        command: &'static str,
        argument: String,
    },
    InvalidNumber {
        argument: &'static str,
        value: String,
    },
    InvalidFormat(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(word) => {
                write!(f, "unknown command '{word}' (try 'help')")
            }
            CommandError::MissingArgument { command, argument } => {
                write!(f, "'{command}' needs {argument}")
            }
            CommandError::UnexpectedArgument { command, argument } => {
                write!(f, "'{command}' does not take '{argument}'")
            }
            CommandError::InvalidNumber { argument, value } => {
                write!(f, "{argument} must be a number, got '{value}'")
            }
            CommandError::InvalidFormat(format) => {
                write!(f, "export format must be 'csv' or 'text', got '{format}'")
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
Commands:
  set KEY VALUE          change a parameter (clamped to its range)
  undo | redo            step through edit history
  save NAME              snapshot the live parameters
  load NAME              replace the live parameters with a snapshot
  delete NAME            remove a snapshot
  snapshots              list snapshots
  metrics                show derived metrics
  history                show history depth and capacity
  compare A [B]          compare snapshot A with B or the live parameters
  enter NAME | exit      enter or leave comparison mode
  diff                   show the active comparison
  sweep KEY STEPS        step KEY across its range
  sensitivity            rank parameters by balance swing
  stress ITER DEV SEED   perturb parameters with seeded noise
  export csv|text PATH   write a report file
  report                 print the report
  reset                  reinitialize from the scenario definition
  help | quit";

/// Positional argument reader for one command line
struct Args<'a> {
    command: &'static str,
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn required(&mut self, argument: &'static str) -> Result<&'a str, CommandError> {
        self.words.next().ok_or(CommandError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn optional(&mut self) -> Option<&'a str> {
        self.words.next()
    }

    fn number<T: std::str::FromStr>(&mut self, argument: &'static str) -> Result<T, CommandError> {
        let raw = self.required(argument)?;
        raw.parse().map_err(|_| CommandError::InvalidNumber {
            argument,
            value: raw.to_string(),
        })
    }

    fn finish(mut self) -> Result<(), CommandError> {
        match self.words.next() {
            Some(extra) => Err(CommandError::UnexpectedArgument {
                command: self.command,
                argument: extra.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let command: &'static str = match head.to_ascii_lowercase().as_str() {
            "set" => "set",
            "undo" => "undo",
            "redo" => "redo",
            "save" => "save",
            "load" => "load",
            "delete" => "delete",
            "snapshots" => "snapshots",
            "metrics" => "metrics",
            "history" => "history",
            "compare" => "compare",
            "enter" => "enter",
            "exit" => "exit",
            "diff" => "diff",
            "sweep" => "sweep",
            "sensitivity" => "sensitivity",
            "stress" => "stress",
            "export" => "export",
            "report" => "report",
            "reset" => "reset",
            "help" | "?" => "help",
            "quit" | "q" => "quit",
            _ => return Err(CommandError::Unknown(head.to_string())),
        };
        let mut args = Args { command, words };

        let parsed = match command {
            "set" => Command::Set {
                key: args.required("a parameter key")?.to_string(),
                value: args.number("VALUE")?,
            },
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "save" => Command::Save {
                name: args.required("a snapshot name")?.to_string(),
            },
            "load" => Command::Load {
                name: args.required("a snapshot name")?.to_string(),
            },
            "delete" => Command::Delete {
                name: args.required("a snapshot name")?.to_string(),
            },
            "snapshots" => Command::Snapshots,
            "metrics" => Command::Metrics,
            "history" => Command::History,
            "compare" => Command::Compare {
                name: args.required("a snapshot name")?.to_string(),
                other: args.optional().map(str::to_string),
            },
            "enter" => Command::Enter {
                name: args.required("a snapshot name")?.to_string(),
            },
            "exit" => Command::Exit,
            "diff" => Command::Diff,
            "sweep" => Command::Sweep {
                key: args.required("a parameter key")?.to_string(),
                steps: args.number("STEPS")?,
            },
            "sensitivity" => Command::Sensitivity,
            "stress" => Command::Stress {
                iterations: args.number("ITER")?,
                relative_std_dev: args.number("DEV")?,
                seed: args.number("SEED")?,
            },
            "export" => {
                let format = match args.required("a format")? {
                    f if f.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
                    f if f.eq_ignore_ascii_case("text") => ExportFormat::Text,
                    other => return Err(CommandError::InvalidFormat(other.to_string())),
                };
                Command::Export {
                    format,
                    path: PathBuf::from(args.required("an output path")?),
                }
            }
            "report" => Command::Report,
            "reset" => Command::Reset,
            "help" => Command::Help,
            _ => Command::Quit,
        };

        args.finish()?;
        Ok(Some(parsed))
    }
}
