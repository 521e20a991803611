//! Command-line interface for stencil
//! Renders stencils from a directory tree, or checks that they compile.
//!
//! Usage:
//!   stencil render `<path>` --root `<dir>` [--data `<file>`] [--locale `<tag>`]  - Render to stdout
//!   stencil check `<path>` --root `<dir>`                                    - Compile and report errors
//!
//! Both accept `--config <file.toml>` and `-v`. Log filtering follows `STENCIL_LOG`.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::Path;
use stencil::config::{EngineConfig, Loader};
use stencil::source::DirectorySource;
use stencil::{Data, Engine, Locale};
use tracing_subscriber::EnvFilter;

fn main() {
    let common = [
        Arg::new("path")
            .help("Stencil path below the root, e.g. /mail/welcome")
            .required(true)
            .index(1),
        Arg::new("root")
            .long("root")
            .short('r')
            .help("Directory holding stencils and message bundles")
            .default_value("."),
        Arg::new("locale")
            .long("locale")
            .short('l')
            .help("Locale tag (defaults to the configured locale)"),
        Arg::new("config")
            .long("config")
            .short('c')
            .help("TOML file layered over the built-in defaults"),
        Arg::new("verbose")
            .long("verbose")
            .short('v')
            .help("Log debug events to stderr")
            .action(ArgAction::SetTrue),
    ];

    let matches = Command::new("stencil")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render and check stencil templates")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("render")
                .about("Render a stencil to stdout")
                .args(common.clone())
                .arg(
                    Arg::new("data")
                        .long("data")
                        .short('d')
                        .help("JSON or YAML file with the render data"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Compile a stencil and report parse errors")
                .args(common),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("render", sub)) => handle_render_command(sub),
        Some(("check", sub)) => handle_check_command(sub),
        _ => unreachable!(),
    };
    if let Err(message) = result {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("STENCIL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the engine shared by both subcommands
fn setup(matches: &ArgMatches) -> Result<(Engine, Locale, String), String> {
    init_logging(matches.get_flag("verbose"));

    let config: EngineConfig = match matches.get_one::<String>("config") {
        Some(file) => Loader::new().with_file(file).build(),
        None => Loader::new().build(),
    }
    .map_err(|e| format!("invalid configuration: {e}"))?;

    let root = matches
        .get_one::<String>("root")
        .map_or(".", String::as_str);
    let source = DirectorySource::with_suffix(root, config.suffix.as_str());
    let engine = Engine::with_config(source, config);
    let locale = matches
        .get_one::<String>("locale")
        .map_or_else(|| engine.default_locale(), |tag| Locale::parse(tag));
    let path = matches
        .get_one::<String>("path")
        .cloned()
        .unwrap_or_default();
    Ok((engine, locale, path))
}

/// Load render data; `.yaml`/`.yml` files are read as YAML, everything else as JSON
fn load_data(file: &str) -> Result<Data, String> {
    let text = std::fs::read_to_string(file).map_err(|e| format!("reading {file}: {e}"))?;
    let is_yaml = Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let json: serde_json::Value = if is_yaml {
        serde_yaml::from_str(&text).map_err(|e| format!("parsing {file}: {e}"))?
    } else {
        serde_json::from_str(&text).map_err(|e| format!("parsing {file}: {e}"))?
    };
    Ok(Data::from_json(json))
}

/// Handle the render command
fn handle_render_command(matches: &ArgMatches) -> Result<(), String> {
    let (engine, locale, path) = setup(matches)?;
    let data = match matches.get_one::<String>("data") {
        Some(file) => load_data(file)?,
        None => Data::empty(),
    };
    let output = engine
        .render_to_string(&path, &locale, &data)
        .map_err(|e| e.to_string())?;
    print!("{output}");
    Ok(())
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches) -> Result<(), String> {
    let (engine, locale, path) = setup(matches)?;
    match engine.stencil(&path, &locale) {
        Ok(template) => {
            println!("{}: ok ({} blocks)", template.name(), template.blocks().len());
            Ok(())
        }
        Err(stencil::StencilError::Parse(err)) => Err(err.to_string()),
        Err(other) => Err(other.to_string()),
    }
}
