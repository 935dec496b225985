use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: kutta <command> [--config PATH] [--output PATH]

Commands:
  decay      Compare Euler and RK4 against the exact solution of dx/dt = -x
  lorenz     Integrate the Lorenz system with the divergence guard
  butterfly  Track the separation of two nearby Lorenz trajectories

Options:
  --config PATH  TOML file overriding the default parameters
  --output PATH  Write the full result as JSON
  -h, --help     Print this message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Decay,
    Lorenz,
    Butterfly,
    Help,
}

impl Command {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "decay" => Ok(Command::Decay),
            "lorenz" => Ok(Command::Lorenz),
            "butterfly" => Ok(Command::Butterfly),
            "help" => Ok(Command::Help),
            other => Err(anyhow!("Unknown command \"{other}\".")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl Args {
    /// Parses everything after the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut command = None;
        let mut config = None;
        let mut output = None;
        let mut iter = args.into_iter().map(Into::into);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" => command = Some(Command::Help),
                "--config" => {
                    let path = iter
                        .next()
                        .ok_or_else(|| anyhow!("--config requires a path."))?;
                    config = Some(PathBuf::from(path));
                }
                "--output" => {
                    let path = iter
                        .next()
                        .ok_or_else(|| anyhow!("--output requires a path."))?;
                    output = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') => bail!("Unknown option \"{flag}\"."),
                name => {
                    if command.is_some() {
                        bail!("Unexpected argument \"{name}\".");
                    }
                    command = Some(Command::parse(name)?);
                }
            }
        }

        let command = command.ok_or_else(|| anyhow!("No command given."))?;
        Ok(Self {
            command,
            config,
            output,
        })
    }
}
