use clap::Parser;

mod cmd;

use cmd::{report, Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("BVSIMP_LOG", "info")).init();
    let cli = Cli::parse();

    let res = match cli.command {
        Commands::Check(a) => a.run(),
        Commands::Show(a) => a.run(),
    };
    if let Err(err) = res {
        report(&err);
        std::process::exit(1);
    }
}
