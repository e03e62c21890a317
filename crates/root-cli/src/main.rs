use clap::Parser;
use miette::Result;
use root_build::{
    BuildFailurePolicy, BuildOptions, DryRunRunner, Pipeline, ProcessRunner, SystemRunner,
    ToolConfig, USAGE_EXIT,
};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rootbuild")]
#[command(author, version, about = "Configure and build the Root engine out of source")]
#[command(after_help = "KEYWORDS:\n  \
    extraflags <value>  extra compiler flags passed to CMake as EXTRA_FLAGS\n  \
    verbose             pass VERBOSE=1 to make\n  \
    withdemos           also compile the demo programs\n  \
    testing             Testing build type, then run the unit tests\n  \
    nosimd              disable SIMD code paths")]
struct Cli {
    /// Directory the build directory is created in
    #[arg(short = 'C', long, default_value = ".")]
    root: PathBuf,

    /// Tool configuration file (default: <root>/rootbuild.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exit 0 even when the build step fails
    #[arg(long)]
    legacy_exit: bool,

    /// Print the commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Log filter, e.g. `debug` or `root_build=trace` (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Build keywords; options must come before the first keyword
    #[arg(trailing_var_arg = true, value_name = "KEYWORDS")]
    tokens: Vec<OsString>,
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };

    let builder = EnvFilter::builder().with_default_directive(default_level.into());
    let filter = match &cli.log {
        Some(directives) => builder.parse_lossy(directives),
        None => builder.from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: &Cli) -> root_build::Result<i32> {
    let options = BuildOptions::parse(&cli.tokens)?;
    tracing::debug!(?options, "parsed keywords");

    let mut config = ToolConfig::discover(&cli.root, cli.config.as_deref())?;
    if cli.legacy_exit {
        config.policy.build_failure = BuildFailurePolicy::Ignore;
    }

    let mut runner: Box<dyn ProcessRunner> = if cli.dry_run {
        Box::new(DryRunRunner::new(std::io::stdout()))
    } else {
        Box::new(SystemRunner)
    };

    let report = Pipeline::new(&config, &options).run(&cli.root, runner.as_mut())?;
    Ok(report.exit_code)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(&cli);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            let code = if err.is_usage() { USAGE_EXIT } else { 1 };
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };

    std::process::exit(code);
}
