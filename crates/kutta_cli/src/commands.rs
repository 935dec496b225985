//! Command execution. Each command returns the lines it would print so the
//! binary only has to write them to stdout.

use crate::args::{Args, Command, USAGE};
use crate::config::Config;
use crate::report;
use anyhow::Result;
use kutta_core::analysis::{compare_decay, compare_trajectories, separation_growth_rate};
use kutta_core::simulation::simulate;
use log::info;
use std::path::Path;

/// Loads the configuration named by `args` and runs its command.
pub fn execute(args: &Args) -> Result<Vec<String>> {
    if args.command == Command::Help {
        return Ok(USAGE.lines().map(str::to_string).collect());
    }

    let config = Config::load(args.config.as_deref())?;
    let output = args.output.as_deref();
    match args.command {
        Command::Decay => run_decay(&config, output),
        Command::Lorenz => run_lorenz(&config, output),
        Command::Butterfly => run_butterfly(&config, output),
        Command::Help => Ok(Vec::new()),
    }
}

pub fn run_decay(config: &Config, output: Option<&Path>) -> Result<Vec<String>> {
    let decay = &config.decay;
    let comparison = compare_decay(&decay.system(), decay.x0, decay.step_size, decay.steps)?;
    if let Some(path) = output {
        report::write_json(path, &comparison)?;
        info!("wrote decay comparison to {}", path.display());
    }
    Ok(report::decay_table(&comparison))
}

pub fn run_lorenz(config: &Config, output: Option<&Path>) -> Result<Vec<String>> {
    let lorenz = &config.lorenz;
    let result = simulate(&lorenz.system(), &lorenz.initial_state, &lorenz.settings())?;
    if let Some(path) = output {
        report::write_json(path, &result)?;
        info!("wrote trajectory to {}", path.display());
    }
    Ok(report::run_summary(&result.status, result.points()))
}

pub fn run_butterfly(config: &Config, output: Option<&Path>) -> Result<Vec<String>> {
    let lorenz = &config.lorenz;
    let butterfly = &config.butterfly;
    let (first, second) = butterfly.initial_states(lorenz);
    let result = compare_trajectories(
        &lorenz.system(),
        &first,
        &second,
        &butterfly.settings(lorenz),
    )?;
    let rate = separation_growth_rate(&result.times, &result.distances);
    if let Some(path) = output {
        report::write_json(path, &result)?;
        info!("wrote separation report to {}", path.display());
    }
    Ok(report::separation_summary(&result, rate))
}
