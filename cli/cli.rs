mod cli_args;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::env;
use std::process;

use cli_args::Cli;
use repo_packager_core::{
    AppError, ConfigFile, DocumentAssembler, GitProvider, OptionOverrides, PackOptions,
};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);
    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args) {
        Ok(()) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(_))
        | Some(AppError::TomlParse(_))
        | Some(AppError::NotARepository { .. })
        | Some(AppError::InvalidArgument(_)) => 1,
        Some(AppError::FileWrite { .. }) => 2,
        Some(_) => 1,
        None => 1,
    }
}

fn run_app(cli: Cli) -> Result<()> {
    let working_dir = env::current_dir().context("Failed to determine working directory")?;

    let config = ConfigFile::load(&working_dir, cli.config.as_deref(), cli.no_config)
        .context("Failed to load configuration")?;

    let recent = cli.recent_request();
    let options = PackOptions::resolve(
        &config,
        OptionOverrides {
            output: cli.output.clone(),
            include: cli.include.clone(),
            recent_days: recent.map(|r| r.days),
            line_numbers: cli.line_numbers,
        },
    );
    let paths = cli.input_paths();

    let provider = GitProvider::new();
    let document = DocumentAssembler::new(&options, &provider, &working_dir)
        .assemble(&paths)
        .map_err(|e| match e {
            AppError::NotARepository { .. } => anyhow::Error::new(e).context(
                "Cannot use --recent: this tool requires a Git repository. \
                 Run it inside a Git working tree.",
            ),
            other => anyhow::Error::new(other).context("Failed to package repository"),
        })?;

    output::emit_document(&document.text, options.output.as_deref())
        .context("Failed to write output")?;
    Ok(())
}
