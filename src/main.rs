use std::process::ExitCode;

fn main() -> ExitCode {
    bigblob_lib::run()
}
