use clap::Parser;
use miette::Result;
use safari::cli::{self as commands, Cli, Commands};
use safari::output::Printer;
use tracing_subscriber::filter::LevelFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let printer = Printer::new();

    let config = || commands::load_config(&cli.config);

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &printer)?,
        Commands::Info => commands::info::run(&config()?, &printer)?,
        Commands::Compose(args) => commands::compose::run(args, &config()?, &printer)?,
        Commands::Gallery(args) => commands::gallery::run(args, &config()?, &printer)?,
        Commands::Settings(args) => commands::settings::run(args, &config()?, &printer)?,
        Commands::Rsvp(args) => commands::rsvp::run(args, &config()?, &printer)?,
        Commands::Unlock(args) => commands::unlock::run(args, &config()?, &printer)?,
        Commands::Completions(args) => commands::completions::run(args)?,
    }

    Ok(())
}
