mod common;

use std::fs::File;
use std::os::fd::OwnedFd;

use common::{init_tracing, patterned_bytes, tmpdir, tmpfile, with_timeout, TestResult};
use shellexec::errors::ShellExecError;
use shellexec::{spawn, ProcessSpec, StdinSource};
use tokio::sync::mpsc;

#[tokio::test]
async fn absent_stdin_reads_as_empty() -> TestResult {
    init_tracing();

    let out = with_timeout(spawn(ProcessSpec::new("cat"), StdinSource::None)).await?;

    assert_eq!(out.code, 0);
    assert!(out.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn bytes_are_fed_and_closed() -> TestResult {
    init_tracing();

    let out = with_timeout(spawn(
        ProcessSpec::new("wc").arg("-c"),
        StdinSource::text("hello\n"),
    ))
    .await?;

    assert_eq!(out.stdout_string().trim(), "6");
    Ok(())
}

#[tokio::test]
async fn empty_bytes_give_immediate_eof() -> TestResult {
    init_tracing();

    let out = with_timeout(spawn(ProcessSpec::new("cat"), StdinSource::Bytes(Vec::new()))).await?;

    assert_eq!(out.code, 0);
    assert!(out.stdout.is_empty());
    Ok(())
}

#[tokio::test]
async fn path_source_is_opened_for_the_child() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;
    let payload = patterned_bytes(200_000);
    let path = tmpfile(&dir, "input.bin", &payload)?;

    let out = with_timeout(spawn(ProcessSpec::new("cat"), StdinSource::Path(path))).await?;

    assert_eq!(out.stdout, payload);
    Ok(())
}

#[tokio::test]
async fn missing_path_source_fails_before_spawn() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;

    let res = spawn(
        ProcessSpec::new("cat"),
        StdinSource::Path(dir.path().join("absent")),
    )
    .await;

    match res {
        Err(ShellExecError::Spawn { step, .. }) => assert_eq!(step, "open stdin file"),
        other => panic!("expected spawn failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn descriptor_source_is_duplicated_onto_stdin() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;
    let path = tmpfile(&dir, "input.txt", "from a descriptor\n")?;
    let fd = OwnedFd::from(File::open(&path)?);

    let out = with_timeout(spawn(ProcessSpec::new("cat"), StdinSource::Descriptor(fd))).await?;

    assert_eq!(out.stdout, b"from a descriptor\n");
    Ok(())
}

#[tokio::test]
async fn stream_chunks_arrive_in_order() -> TestResult {
    init_tracing();
    let (tx, rx) = mpsc::channel(4);

    let producer = tokio::spawn(async move {
        for i in 0..50 {
            if tx.send(format!("line {i}\n").into_bytes()).await.is_err() {
                break;
            }
        }
    });

    let out = with_timeout(spawn(ProcessSpec::new("cat"), StdinSource::Stream(rx))).await?;
    producer.await?;

    let expected: String = (0..50).map(|i| format!("line {i}\n")).collect();
    assert_eq!(out.stdout_string(), expected);
    Ok(())
}

#[tokio::test]
async fn child_ignoring_stdin_does_not_fail_the_invocation() -> TestResult {
    init_tracing();

    // `true` exits without reading; the feed sees a broken pipe.
    let out = with_timeout(spawn(
        ProcessSpec::new("true"),
        StdinSource::Bytes(patterned_bytes(1 << 20)),
    ))
    .await?;

    assert_eq!(out.code, 0);
    Ok(())
}

#[tokio::test]
async fn stdin_and_stderr_are_independent() -> TestResult {
    init_tracing();

    let out = with_timeout(spawn(
        ProcessSpec::new("sh").args(["-c", "cat; echo done >&2"]),
        StdinSource::text("payload"),
    ))
    .await?;

    assert_eq!(out.stdout, b"payload");
    assert_eq!(out.stderr, "done\n");
    Ok(())
}

#[test]
fn only_parent_fed_sources_need_a_pipe() {
    let (_tx, rx) = mpsc::channel(1);

    assert!(StdinSource::text("x").needs_pipe());
    assert!(StdinSource::Stream(rx).needs_pipe());
    assert!(!StdinSource::None.needs_pipe());
    assert!(!StdinSource::Path("/dev/null".into()).needs_pipe());
}
