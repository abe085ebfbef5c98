// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! anonymiser command-line entry point.
//!
//! The binary only wires user input into the library: it parses flags,
//! sets up diagnostics and hands an `AnonymiserConfig` to `anonymise_file`.

use anonymiser::anonymise_file;
use anonymiser::config::{
    AnonymiserConfig, DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_SKELETON_TABLE, OUTPUT_PREFIX,
};
use anonymiser::names::WindowConfig;
use anonymiser::names::substitution::DEFAULT_FALLBACK_END;
use anyhow::{Result, anyhow};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt};

/// Must agree with `DEFAULT_FALLBACK_END`; clap wants a string default.
const DEFAULT_FALLBACK_WINDOW: &str = "150";

/// Build-time version information.  CI may bake in a release tag via
/// `ANONYMISER_VERSION`; otherwise Cargo's package version is used.
const VERSION: &str = match option_env!("ANONYMISER_VERSION") {
    Some(tag) => tag,
    None => env!("CARGO_PKG_VERSION"),
};

/// Short Git commit captured by `build.rs`, or a recognisable placeholder.
fn sha() -> &'static str {
    option_env!("ANONYMISER_COMMIT").unwrap_or("0000000")
}

/// rustc version captured by `build.rs`.
fn rust_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

fn version_string() -> String {
    format!("{VERSION} (commit:{}) [rust:{}]", sha(), rust_version())
}

/// Cached version string with a 'static lifetime for clap metadata.
fn version_str() -> &'static str {
    static VERSION_STR: OnceLock<String> = OnceLock::new();
    VERSION_STR.get_or_init(version_string).as_str()
}

/// Conventional `main` that defers to `run` so the exit code is decided in
/// one place.
fn main() {
    std::process::exit(match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            1
        }
    });
}

fn run() -> Result<i32> {
    let matches = match build_cli().try_get_matches() {
        Ok(m) => m,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                return Ok(0);
            }
            _ => err.exit(),
        },
    };

    let opts = CliOptions::from_matches(&matches)?;
    init_logging(opts.debug);

    let config = opts.into_config();
    anonymise_file(&config)?;
    Ok(0)
}

/// Construct the `clap` command with all supported arguments.
fn build_cli() -> Command {
    Command::new("anonymiser")
        .about("Anonymise person, email, phone and web entities in an annotated XML corpus file")
        .version(version_str())
        .arg(
            Arg::new("xml_file")
                .value_name("XML_FILE")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("XML file to be modified"),
        )
        .arg(
            Arg::new("db")
                .long("db")
                .short('d')
                .value_name("FILE")
                .default_value(DEFAULT_SKELETON_TABLE)
                .value_parser(value_parser!(PathBuf))
                .help("JSON file with person name skeletons"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .short('f')
                .action(ArgAction::SetTrue)
                .help("Force changes even if the attribute exists in the XML file"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('D')
                .action(ArgAction::SetTrue)
                .help("Debug mode on"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .default_value(DEFAULT_DATA_DIR)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the <cc>_data.csv name datasets"),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .value_name("DIR")
                .default_value(DEFAULT_OUTPUT_DIR)
                .value_parser(value_parser!(PathBuf))
                .help("Directory the anonymised document is written to"),
        )
        .arg(
            Arg::new("fallback-window")
                .long("fallback-window")
                .value_name("RANK")
                .default_value(DEFAULT_FALLBACK_WINDOW)
                .value_parser(value_parser!(usize))
                .help("Highest rank drawn for names missing from the dataset"),
        )
}

/// Structured view of the CLI flags.
struct CliOptions {
    input: PathBuf,
    skeleton_table: PathBuf,
    data_dir: PathBuf,
    output_dir: PathBuf,
    fallback_end: usize,
    force: bool,
    debug: bool,
}

impl CliOptions {
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            input: required_path(matches, "xml_file")?,
            skeleton_table: required_path(matches, "db")?,
            data_dir: required_path(matches, "data-dir")?,
            output_dir: required_path(matches, "output-dir")?,
            fallback_end: matches
                .get_one::<usize>("fallback-window")
                .copied()
                .unwrap_or(DEFAULT_FALLBACK_END),
            force: matches.get_flag("force"),
            debug: matches.get_flag("debug"),
        })
    }

    fn into_config(self) -> AnonymiserConfig {
        AnonymiserConfig {
            input: self.input,
            skeleton_table: self.skeleton_table,
            data_dir: self.data_dir,
            output_dir: self.output_dir,
            output_prefix: OUTPUT_PREFIX.to_string(),
            force: self.force,
            windows: WindowConfig {
                fallback_end: self.fallback_end,
                ..WindowConfig::default()
            },
        }
    }
}

fn required_path(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| anyhow!("missing value for {name}"))
}

/// Diagnostics go to stderr.  `--debug` turns on everything; otherwise
/// `RUST_LOG` is honoured with warnings as the default.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    if let Err(err) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
    {
        eprintln!("warning: logging unavailable ({err})");
    }
}
