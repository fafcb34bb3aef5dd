mod common;

use common::{init_tracing, patterned_bytes, with_timeout, TestResult};
use shellexec::{spawn, ProcessSpec, ShellProcess, StdinSource};
use shellexec_test_utils::builders::ExecConfigBuilder;

const TEN_MIB: usize = 10 * 1024 * 1024;

#[tokio::test]
async fn large_stdin_round_trips_through_cat() -> TestResult {
    init_tracing();
    let payload = patterned_bytes(1 << 20);

    let out = with_timeout(spawn(
        ProcessSpec::new("cat"),
        StdinSource::Bytes(payload.clone()),
    ))
    .await?;

    assert_eq!(out.code, 0);
    assert_eq!(out.stdout.len(), payload.len());
    assert!(out.stdout == payload, "stdout differs from stdin");
    Ok(())
}

#[tokio::test]
async fn ten_mib_of_stdout_with_empty_stdin() -> TestResult {
    init_tracing();

    let out = with_timeout(spawn(
        ProcessSpec::new("head").args(["-c", &TEN_MIB.to_string(), "/dev/zero"]),
        StdinSource::Bytes(Vec::new()),
    ))
    .await?;

    assert_eq!(out.code, 0);
    assert_eq!(out.stdout.len(), TEN_MIB);
    assert!(out.stdout.iter().all(|&b| b == 0));
    Ok(())
}

#[tokio::test]
async fn both_output_pipes_filled_at_once() -> TestResult {
    init_tracing();
    let script = "head -c 2097152 /dev/zero >&2; head -c 2097152 /dev/zero";

    let out = with_timeout(spawn(
        ProcessSpec::new("sh").args(["-c", script]),
        StdinSource::None,
    ))
    .await?;

    assert_eq!(out.code, 0);
    assert_eq!(out.stdout.len(), 2 * 1024 * 1024);
    assert_eq!(out.stderr.len(), 2 * 1024 * 1024);
    Ok(())
}

#[tokio::test]
async fn small_read_chunks_still_drain_everything() -> TestResult {
    init_tracing();
    let payload = patterned_bytes(4 << 20);
    let shell = ShellProcess::new(ExecConfigBuilder::new().read_chunk_size(4096).build());

    let out = with_timeout(shell.run(
        ProcessSpec::new("cat"),
        StdinSource::Bytes(payload.clone()),
    ))
    .await?;

    assert!(out.stdout == payload, "stdout differs from stdin");
    Ok(())
}
