use std::process::ExitCode;

fn main() -> ExitCode {
    match composite_index::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("cpi: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
