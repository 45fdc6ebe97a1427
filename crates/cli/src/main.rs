use std::process::ExitCode;

fn main() -> ExitCode {
    vanguide_cli::run()
}
