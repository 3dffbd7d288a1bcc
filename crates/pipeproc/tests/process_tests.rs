#![cfg(unix)]

use pipeproc::{
    ErrorKind, ProcessState, create, destroy, join, stderr_stream, stdin_stream, stdout_stream,
};
use std::io::{Read, Write};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_file(true)
        .with_thread_ids(false)
        .with_target(false)
        .with_line_number(true)
        .with_test_writer()
        .try_init();
}

/// Create a child with echo and read its greeting
#[test]
fn test_echo_hello() -> anyhow::Result<()> {
    init_tracing();

    let mut process = create(&["echo", "hello"])?;
    assert_eq!(process.state(), ProcessState::Created);
    assert_eq!(process.command_line(), "echo hello");

    let mut out = Vec::new();
    stdout_stream(&process)?.read_to_end(&mut out)?;
    assert_eq!(out, b"hello\n");

    assert_eq!(join(&mut process)?, 0);
    destroy(&mut process)?;
    Ok(())
}

#[test]
fn test_all_streams_available_after_create() -> anyhow::Result<()> {
    init_tracing();

    let mut process = create(&["true"])?;
    assert_eq!(process.command_line(), "true");
    assert!(process.id() > 0);
    assert!(stdin_stream(&process).is_ok());
    assert!(stdout_stream(&process).is_ok());
    assert!(stderr_stream(&process).is_ok());

    join(&mut process)?;
    destroy(&mut process)?;
    Ok(())
}

#[test]
fn test_written_bytes_are_echoed_back() -> anyhow::Result<()> {
    init_tracing();

    let mut process = create(&["cat"])?;
    stdin_stream(&process)?.write_all(b"round trip\n")?;

    // join closes stdin, which lets cat finish
    assert_eq!(join(&mut process)?, 0);

    let mut out = String::new();
    stdout_stream(&process)?.read_to_string(&mut out)?;
    assert_eq!(out, "round trip\n");

    destroy(&mut process)?;
    Ok(())
}

#[test]
fn test_large_payload_with_reader_thread() -> anyhow::Result<()> {
    init_tracing();

    // Larger than any pipe buffer, so stdout must be drained while writing
    let payload: Vec<u8> = (0..4 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    let len = payload.len();
    let mut process = create(&["cat"])?;

    let echoed = std::thread::scope(|scope| -> anyhow::Result<Vec<u8>> {
        let stdout = stdout_stream(&process)?;
        let reader = scope.spawn(move || -> std::io::Result<Vec<u8>> {
            let mut stdout = stdout;
            let mut buf = vec![0; len];
            stdout.read_exact(&mut buf)?;
            Ok(buf)
        });

        stdin_stream(&process)?.write_all(&payload)?;
        let echoed = reader
            .join()
            .map_err(|_| anyhow::anyhow!("reader thread panicked"))??;
        Ok(echoed)
    })?;

    assert_eq!(echoed.len(), payload.len());
    assert!(echoed == payload);
    assert_eq!(join(&mut process)?, 0);
    destroy(&mut process)?;
    Ok(())
}

#[test]
fn test_stderr_stream() -> anyhow::Result<()> {
    init_tracing();

    let mut process = create(&["sh", "-c", "echo to-stderr >&2; echo to-stdout"])?;
    assert_eq!(join(&mut process)?, 0);

    let mut err = String::new();
    stderr_stream(&process)?.read_to_string(&mut err)?;
    assert_eq!(err, "to-stderr\n");

    let mut out = String::new();
    stdout_stream(&process)?.read_to_string(&mut out)?;
    assert_eq!(out, "to-stdout\n");

    destroy(&mut process)?;
    Ok(())
}

#[test]
fn test_false_exits_with_one() -> anyhow::Result<()> {
    init_tracing();

    let mut process = create(&["false"])?;
    assert_eq!(join(&mut process)?, 1);
    assert_eq!(process.exit_code(), Some(1));
    destroy(&mut process)?;
    Ok(())
}

#[test]
fn test_exit_code_range() -> anyhow::Result<()> {
    init_tracing();

    for code in 0..=255 {
        let script = format!("exit {code}");
        let mut process = create(&["sh", "-c", script.as_str()])?;
        assert_eq!(join(&mut process)?, code);
        destroy(&mut process)?;
    }
    Ok(())
}

#[test]
fn test_nonexistent_binary() {
    init_tracing();

    let err = create(&["nonexistent-binary-xyz"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LaunchFailed);
    assert!(err.os_error().is_some());
}

#[test]
fn test_empty_command_line() {
    let empty: [&str; 0] = [];
    let err = create(&empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCommandLine);
}

#[test]
fn test_misuse_is_reported() -> anyhow::Result<()> {
    init_tracing();

    let mut process = create(&["true"])?;
    join(&mut process)?;

    assert_eq!(join(&mut process).unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(stdin_stream(&process).unwrap_err().kind(), ErrorKind::InvalidState);

    destroy(&mut process)?;
    assert_eq!(destroy(&mut process).unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(stdout_stream(&process).unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(stderr_stream(&process).unwrap_err().kind(), ErrorKind::InvalidState);
    Ok(())
}

#[test]
fn test_destroy_without_join() -> anyhow::Result<()> {
    init_tracing();

    let mut process = create(&["cat"])?;
    stdin_stream(&process)?.write_all(b"never read")?;
    destroy(&mut process)?;
    assert_eq!(process.state(), ProcessState::Destroyed);
    assert_eq!(process.exit_code(), None);
    Ok(())
}

#[test]
fn test_drop_releases_without_destroy() -> anyhow::Result<()> {
    init_tracing();

    let mut process = create(&["echo", "dropped"])?;
    join(&mut process)?;
    drop(process);
    Ok(())
}
