use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;
use uqlca::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = &cli.global;
    match cli.command {
        Commands::Run(args) => uqlca::cli::commands::run::run(args, global),
        Commands::Layers(args) => uqlca::cli::commands::layers::run(args, global),
        Commands::Det(args) => uqlca::cli::commands::det::run(args, global),
        Commands::Contrib(args) => uqlca::cli::commands::contrib::run(args, global),
        Commands::Compare(args) => uqlca::cli::commands::compare::run(args, global),
        Commands::Completions(args) => uqlca::cli::commands::completions::run(args),
    }
}

/// Log to stderr; RUST_LOG wins over the -v flags
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
