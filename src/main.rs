use std::process::ExitCode;

fn main() -> ExitCode {
    match filetimer_lib::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
