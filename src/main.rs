use std::process::ExitCode;

fn main() -> ExitCode {
    zipstream_lib::run()
}
