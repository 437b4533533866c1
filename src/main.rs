use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;

#[derive(Parser)]
#[command(
    name = "sparse-lower",
    version,
    about = "Lower sparse tensor primitives to sparse runtime library calls"
)]
struct Cli {
    /// Log pattern applications (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the runtime entry points and numeric encodings
    Abi,
    /// Print the machine parameters of a SPIR target
    Target(cli::target::TargetArgs),
    /// Lower a small sample module and print it before and after
    Demo(cli::demo::DemoArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Command::Abi => cli::abi::cmd_abi(),
        Command::Target(args) => cli::target::cmd_target(args),
        Command::Demo(args) => cli::demo::cmd_demo(args),
    }
}
