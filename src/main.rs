use clap::Parser;
use stratforge::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
