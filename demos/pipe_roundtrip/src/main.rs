use pipeproc::{CommandLine, Process};
use std::io::{Read, Write};
use tracing::info;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Run the command given on our own command line, or `sort` by default.
    let parts: Vec<String> = std::env::args().skip(1).collect();
    let command_line = if parts.is_empty() {
        CommandLine::builder().program("sort").build()?
    } else {
        CommandLine::from_parts(&parts)?
    };

    info!(platform = pipeproc::platform_name(), "Running `{}`", command_line);
    let mut process = Process::spawn(&command_line)?;

    // Small enough to fit in the pipe buffer, so no reader thread is needed.
    process.stdin()?.write_all(b"pear\napple\nfig\n")?;
    let code = process.join()?;

    let mut out = String::new();
    process.stdout()?.read_to_string(&mut out)?;
    let mut err = String::new();
    process.stderr()?.read_to_string(&mut err)?;
    process.destroy()?;

    print!("{out}");
    if !err.is_empty() {
        eprint!("{err}");
    }
    println!("exit code: {code}");

    Ok(())
}
