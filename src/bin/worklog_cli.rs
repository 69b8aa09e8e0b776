use std::process;

fn main() {
    worklog_core::init();
    if let Err(err) = worklog_core::cli::run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
