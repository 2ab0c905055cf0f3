use std::process::ExitCode;

mod app;
mod cli;
mod logging;

fn main() -> ExitCode {
    let args = cli::parse();
    ExitCode::from(app::run(args))
}
