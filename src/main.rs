use std::io::Write;

use clap::Parser;
use miette::Result;
use respack::cli::{Cli, Commands};
use respack::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();

    let printer = if cli.quiet {
        Printer::quiet()
    } else {
        Printer::default()
    };

    match cli.command {
        Commands::Build(args) => respack::cli::build::run(args, &cli.config, &printer, cli.debug)?,
        Commands::Info(args) => respack::cli::info::run(args, &cli.config, &printer)?,
        Commands::Init(args) => respack::cli::init::run(args, &printer)?,
        Commands::Completions(args) => respack::cli::completions::run(args)?,
    }

    Ok(())
}
