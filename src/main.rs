mod debug_report;

use fsleyes_preset::{
    BUNDLED_PRESET, CachedLoader, NiftiLoader, Options, PartitionMode, Preset, PresetError, Viewer, build_command,
    launch, resolve_with,
};
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "FSLEYES_PRESET_LOG";
const DEFAULT_FILTER: &str = "fsleyes_preset=info";

fn main() -> ExitCode {
    let config = match parse_args(std::env::args_os().skip(1)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    init_logging();

    match run(&config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", error_line(&err));
            ExitCode::from(1)
        }
    }
}

fn error_line(err: &PresetError) -> String {
    format!("error: {err}")
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn run(config: &CliConfig) -> Result<ExitCode, PresetError> {
    let (preset, source) = Preset::load(config.preset.as_deref())?;
    let viewer = Viewer::from_preset(preset.viewer.as_deref());
    let loader = CachedLoader::new(NiftiLoader);
    let options = Options { partition: config.partition, ..Options::default() };

    let resolution = resolve_with(&config.files, &preset, &loader, &options)?;
    let invocation = build_command(&viewer, &resolution);

    if config.explain {
        debug_report::print_run(&source, &resolution, &invocation, config.color);
    }

    if config.dry_run {
        if !config.explain {
            println!("{invocation}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let status = launch(&invocation, !config.quiet)?;
    if status.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!("{} exited with {status}", invocation.program);
        Ok(ExitCode::from(1))
    }
}

#[derive(Debug)]
struct CliConfig {
    files: Vec<String>,
    preset: Option<PathBuf>,
    partition: Option<PartitionMode>,
    dry_run: bool,
    explain: bool,
    quiet: bool,
    color: bool,
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<CliConfig, String> {
    let mut config = CliConfig {
        files: Vec::new(),
        preset: None,
        partition: None,
        dry_run: false,
        explain: false,
        quiet: false,
        color: io::stdout().is_terminal(),
    };
    let mut args = args.into_iter().map(utf8_arg);

    while let Some(arg) = args.next() {
        let arg = arg?;
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("fsleyes_preset {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--print-default-preset" => {
                print!("{BUNDLED_PRESET}");
                std::process::exit(0);
            }
            "--color" => config.color = true,
            "--no-color" => config.color = false,
            "--dry-run" => config.dry_run = true,
            "--explain" => config.explain = true,
            "--quiet" | "-q" => config.quiet = true,
            "--exact" => config.partition = Some(PartitionMode::Exact),
            "--config" | "-c" => {
                let value = args.next().ok_or_else(|| "error: --config expects a value".to_string())??;
                set_preset(&mut config, value)?;
            }
            "--" => {
                for rest in args.by_ref() {
                    config.files.push(rest?);
                }
                break;
            }
            _ if arg.starts_with("--config=") => {
                let value = arg.trim_start_matches("--config=").to_string();
                set_preset(&mut config, value)?;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => config.files.push(arg),
        }
    }

    if config.files.is_empty() {
        return Err(format!("error: no input files\n\n{}", help_text()));
    }

    Ok(config)
}

/// Arguments must be valid UTF-8.
fn utf8_arg(arg: OsString) -> Result<String, String> {
    arg.into_string().map_err(|raw| format!("error: argument '{}' is not valid UTF-8", raw.to_string_lossy()))
}

fn set_preset(config: &mut CliConfig, value: String) -> Result<(), String> {
    if config.preset.is_some() {
        return Err("error: --config provided multiple times".to_string());
    }
    if value.trim().is_empty() {
        return Err("error: --config expects a non-empty path".to_string());
    }
    config.preset = Some(PathBuf::from(value));
    Ok(())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "fsleyes_preset {version}

Open NIfTI images in FSLeyes with display options chosen from their file names.

Usage:
  fsleyes_preset [OPTIONS] [--] <file|template>...

Arguments that match a template token from the preset (e.g. MNI) open the
installed reference image instead of a file.

Options:
  -c, --config <path>        Preset file to use. Default: {user_preset}
                             if present, else the bundled preset.
  --dry-run                  Print the viewer command instead of running it.
  --explain                  Print a per-file report of which rules fired.
  --exact                    Partition files by exact directive membership
                             instead of name containment.
  -q, --quiet                Do not echo the command before launching.
  --print-default-preset     Print the bundled preset and exit.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}          Log filter (default: {default_filter}).

Exit codes:
  0  Success.
  1  Missing input, bracket in a file name, invalid preset, or viewer failure.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        user_preset = "~/.fsleyes_preset/config.toml",
        log_env = LOG_ENV,
        default_filter = DEFAULT_FILTER,
    )
}
