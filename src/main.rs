use anyhow::{bail, Context, Result};
use callable_timer::benchmark::BenchmarkRegistry;
use callable_timer::callable::{CallableCatalog, CallableSpec};
use callable_timer::cli::Cli;
use callable_timer::config::TimerConfig;
use callable_timer::report::{self, ReportFormat};
use callable_timer::timed::TimedCallableUnit;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Print built-in function names, one per line
fn print_builtins() {
    for name in CallableCatalog::builtins().function_names() {
        println!("{}", name);
    }
}

fn run(args: &Cli) -> Result<()> {
    let (function, label) = match (&args.function, args.effective_label()) {
        (Some(function), Some(label)) => (function, label),
        _ => bail!("Must specify a FUNCTION. Usage: callable-timer FUNCTION [ARGS...] (see --list)"),
    };
    if args.repeat == 0 {
        bail!("Invalid value for --repeat: 0 (must be >= 1)");
    }

    let mut config = TimerConfig::from_env()?;
    if let Some(mode) = args.call_site {
        config = config.with_call_site(mode);
    }

    let registry = BenchmarkRegistry::new();
    let mut unit = TimedCallableUnit::new(label, CallableSpec::named(function.as_str()))
        .with_context(|| format!("Failed to set up `{}`", function))?
        .with_registry(registry.clone())
        .with_config(&config);

    for _ in 0..args.repeat {
        let mut call_args = args.parsed_args();
        let result = unit
            .invoke(&mut call_args)
            .with_context(|| format!("Call to `{}` failed", function))?;
        if args.format == ReportFormat::Text {
            println!("{}", result);
        }
    }

    let records = registry.all();
    match args.format {
        ReportFormat::Text => report::print_summary(&records),
        format => println!("{}", report::render(&records, format).trim_end()),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    if args.list {
        print_builtins();
        return Ok(());
    }

    run(&args)
}
