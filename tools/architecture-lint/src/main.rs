//! `cargo run -p architecture-lint [BACKEND_DIR]`
//!
//! Lints `backend/` next to this tool unless a directory is given.

use std::process::ExitCode;

use architecture_lint::lint_backend;
use camino::{Utf8Path, Utf8PathBuf};

fn main() -> ExitCode {
    let backend = std::env::args()
        .nth(1)
        .map(Utf8PathBuf::from)
        .unwrap_or_else(|| Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("../../backend"));

    match lint_backend(&backend) {
        Ok(()) => {
            println!("{backend}: boundaries hold");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{backend}: {err}");
            ExitCode::FAILURE
        }
    }
}
