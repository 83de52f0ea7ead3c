//! bindforge compiler CLI.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bindforge_compiler::codegen::GenerationMode;
use bindforge_compiler::specialize::identity;
use bindforge_compiler::{Compiler, CompilerConfig, CompilerError, ErrorKind};

mod ui;

#[derive(Parser)]
#[command(name = "bindforge", version)]
#[command(about = "bindforge - compiles interface descriptions to binding code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate binding code
    Generate {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Generate metadata manifests instead of binding code
    Config {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the deterministic identity of a qualified interface name
    Identity {
        /// e.g. `Acme.Media.IPlayer` or `Acme.IList<int>`
        name: String,
    },

    /// Print the parsed and expanded model of one file as JSON
    Inspect {
        input: PathBuf,

        #[command(flatten)]
        options: ParseArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Input files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Target generator (cpp, csharp; anything else uses the fallback)
    #[arg(short, long)]
    target: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Template directory searched before the built-in templates
    #[arg(long)]
    templates: Option<PathBuf>,

    #[command(flatten)]
    options: ParseArgs,
}

#[derive(Args)]
struct ParseArgs {
    /// Front-end (cpp, delphi); inferred from the extension when omitted
    #[arg(short, long)]
    language: Option<String>,

    /// Record syntax errors and keep parsing
    #[arg(long)]
    continue_on_errors: bool,

    /// Treat NAME as a core type (repeatable)
    #[arg(long = "core-type", value_name = "NAME")]
    core_types: Vec<String>,

    /// Override the spelling of a type (repeatable)
    #[arg(long = "map", value_name = "NAME=SPELLING")]
    mappings: Vec<String>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ParseArgs {
    fn into_config(self) -> Result<CompilerConfig, CompilerError> {
        let mut config = match &self.config {
            Some(path) => CompilerConfig::load(path)?,
            None => CompilerConfig::default(),
        };
        if self.language.is_some() {
            config.language = self.language;
        }
        config.continue_on_errors |= self.continue_on_errors;
        config.core_types.extend(self.core_types);
        for spec in &self.mappings {
            config
                .add_mapping(spec)
                .map_err(|message| CompilerError::InvalidConfig {
                    path: PathBuf::from("--map"),
                    message,
                })?;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code(err.kind());
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}

/// Logging goes to stderr, filtered by `BINDFORGE_LOG` (default `warn`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("BINDFORGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Io | ErrorKind::Plugin => 1,
        ErrorKind::Syntax => 2,
        ErrorKind::Semantic => 3,
        ErrorKind::Attribute => 4,
        ErrorKind::Modeling => 5,
        ErrorKind::Template => 6,
    }
}

fn run(cli: Cli) -> Result<(), CompilerError> {
    match cli.command {
        Commands::Generate { run } => generate(run, GenerationMode::Bindings),
        Commands::Config { run } => generate(run, GenerationMode::Config),
        Commands::Identity { name } => {
            println!("{}", identity(&name));
            Ok(())
        }
        Commands::Inspect { input, options } => {
            let compiler = Compiler::new(options.into_config()?);
            println!("{}", compiler.inspect(&input)?);
            Ok(())
        }
    }
}

fn generate(args: RunArgs, mode: GenerationMode) -> Result<(), CompilerError> {
    let mut config = args.options.into_config()?;
    if let Some(target) = args.target {
        config.target = target;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if args.templates.is_some() {
        config.templates = args.templates;
    }
    config.mode = mode;

    let started = Instant::now();
    let compiler = Compiler::new(config);
    let files = compiler.discover(&args.inputs)?;
    if files.is_empty() {
        ui::dim("No interface files found.");
        return Ok(());
    }

    let progress = ui::progress_bar(files.len() as u64);
    let mut written = Vec::new();
    let mut tolerated = 0;
    for path in &files {
        progress.set_message(path.display().to_string());
        match compiler.compile_file(path) {
            Ok(outcome) => {
                tolerated += outcome.syntax_errors;
                written.extend(outcome.outputs);
                progress.inc(1);
            }
            Err(err) => {
                progress.abandon();
                ui::error(&format!("{} failed", path.display()));
                return Err(err);
            }
        }
    }
    progress.finish_and_clear();

    for path in &written {
        ui::output_line(&path.display().to_string());
    }
    if tolerated > 0 {
        ui::dim(&format!("{tolerated} syntax errors skipped"));
    }
    ui::success(&format!(
        "{} files {} {} outputs {} target {}",
        files.len(),
        ui::symbols::DOT,
        written.len(),
        ui::symbols::DOT,
        compiler.config().target
    ));
    ui::timing("Generated", started.elapsed().as_millis());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_args() {
        let cli = Cli::try_parse_from([
            "bindforge",
            "generate",
            "idl",
            "-t",
            "csharp",
            "-o",
            "out",
            "--core-type",
            "IUnknown",
            "--map",
            "HRESULT=uint",
            "--continue-on-errors",
        ])
        .unwrap();
        let Commands::Generate { run } = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(run.target.as_deref(), Some("csharp"));
        assert_eq!(run.output, Some(PathBuf::from("out")));

        let config = run.options.into_config().unwrap();
        assert!(config.continue_on_errors);
        assert_eq!(config.core_types, vec!["IUnknown"]);
        assert_eq!(config.type_mappings["HRESULT"], "uint");
    }

    #[test]
    fn test_bad_mapping_is_rejected() {
        let cli = Cli::try_parse_from(["bindforge", "inspect", "a.h", "--map", "oops"]).unwrap();
        let Commands::Inspect { options, .. } = cli.command else {
            panic!("expected inspect");
        };
        let err = options.into_config().unwrap_err();
        assert_eq!(exit_code(err.kind()), 1);
    }

    #[test]
    fn test_generate_requires_inputs() {
        assert!(Cli::try_parse_from(["bindforge", "generate"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(ErrorKind::Syntax), 2);
        assert_eq!(exit_code(ErrorKind::Semantic), 3);
        assert_eq!(exit_code(ErrorKind::Attribute), 4);
        assert_eq!(exit_code(ErrorKind::Modeling), 5);
        assert_eq!(exit_code(ErrorKind::Template), 6);
        assert_eq!(exit_code(ErrorKind::Plugin), 1);
    }
}
