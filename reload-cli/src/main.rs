//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = reload_cli::run() {
        eprintln!("reload: {err}");
        std::process::exit(1);
    }
}
