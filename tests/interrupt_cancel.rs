mod common;

use std::time::Duration;

use common::{init_tracing, with_timeout, TestResult};
use shellexec::{ProcessRunner, ProcessSpec, ShellProcess, StdinSource};
use tokio::sync::mpsc;
use tokio::time::sleep;

async fn wait_for_pid(shell: &ShellProcess) {
    while shell.pid().is_none() {
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn interrupt_stops_a_sleeping_child() -> TestResult {
    init_tracing();
    let shell = ShellProcess::default();

    let runner = shell.clone();
    let run = tokio::spawn(async move {
        runner
            .run(ProcessSpec::new("sleep").arg("30"), StdinSource::None)
            .await
    });

    with_timeout(wait_for_pid(&shell)).await;
    shell.interrupt()?;

    let out = with_timeout(run).await??;
    assert_eq!(out.code, 128 + libc::SIGINT);
    assert_eq!(shell.exit_code(), Some(out.code));
    Ok(())
}

#[tokio::test]
async fn interrupt_after_exit_is_a_no_op() -> TestResult {
    init_tracing();
    let shell = ShellProcess::default();

    let out = with_timeout(shell.run(
        ProcessSpec::new("sh").args(["-c", "exit 4"]),
        StdinSource::None,
    ))
    .await?;

    shell.interrupt()?;
    shell.interrupt()?;
    shell.kill()?;

    assert_eq!(out.code, 4);
    assert_eq!(shell.exit_code(), Some(4));
    Ok(())
}

#[tokio::test]
async fn interrupt_before_spawn_is_a_no_op() -> TestResult {
    init_tracing();
    let shell = ShellProcess::default();

    shell.interrupt()?;
    ProcessRunner::interrupt(&shell)?;
    assert_eq!(shell.pid(), None);
    Ok(())
}

#[tokio::test]
async fn kill_ends_a_child_that_traps_sigint() -> TestResult {
    init_tracing();
    let shell = ShellProcess::default();

    let runner = shell.clone();
    let run = tokio::spawn(async move {
        runner
            .run(
                ProcessSpec::new("sh").args(["-c", "trap '' INT; sleep 30 >/dev/null 2>&1"]),
                StdinSource::None,
            )
            .await
    });

    with_timeout(wait_for_pid(&shell)).await;
    shell.kill()?;

    let out = with_timeout(run).await??;
    assert_eq!(out.code, 128 + libc::SIGKILL);
    Ok(())
}

#[tokio::test]
async fn cancel_closes_an_endless_stream() -> TestResult {
    init_tracing();
    let shell = ShellProcess::default();
    let (tx, rx) = mpsc::channel::<Vec<u8>>(1);

    let runner = shell.clone();
    let run = tokio::spawn(async move {
        runner
            .run(ProcessSpec::new("cat"), StdinSource::Stream(rx))
            .await
    });

    tx.send(b"first chunk\n".to_vec()).await?;
    // Give the feed time to hand the chunk to the child.
    sleep(Duration::from_millis(200)).await;
    shell.cancel();

    let out = with_timeout(run).await??;
    assert_eq!(out.code, 0);
    assert_eq!(out.stdout, b"first chunk\n");

    // The sender is still alive: only cancellation ended the feed.
    drop(tx);
    Ok(())
}
