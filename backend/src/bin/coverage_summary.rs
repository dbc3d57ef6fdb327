//! Print the fixed test coverage report.

use std::io::{self, Write as _};

use vaultke::summary::render_summary;

fn main() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(render_summary().as_bytes())?;
    stdout.flush()
}
