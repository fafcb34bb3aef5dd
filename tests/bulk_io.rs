mod common;

use std::io::{self, Cursor, Read, Write};

use common::{patterned_bytes, TestResult};
use shellexec::errors::ShellExecError;
use shellexec::io::{read_all_bytes, write_all_bytes};
use shellexec::CancelToken;

/// Reader that fails with `Interrupted` before every successful read.
struct Flaky<R> {
    inner: R,
    interrupt_next: bool,
}

impl<R: Read> Read for Flaky<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt_next = !self.interrupt_next;
        if self.interrupt_next {
            return Err(io::ErrorKind::Interrupted.into());
        }
        self.inner.read(buf)
    }
}

/// Writer that accepts `limit` bytes and then reports a closed pipe.
struct ClosesAfter {
    written: Vec<u8>,
    limit: usize,
}

impl Write for ClosesAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.written.len();
        if room == 0 {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        let n = room.min(buf.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn read_retries_interrupted_reads() -> TestResult {
    let payload = patterned_bytes(10_000);
    let mut reader = Flaky {
        inner: Cursor::new(payload.clone()),
        interrupt_next: false,
    };

    let read = read_all_bytes(&mut reader, 1000, None)?;
    assert_eq!(read, payload);
    Ok(())
}

#[test]
fn read_stops_when_cancelled() -> TestResult {
    let token = CancelToken::new();
    token.cancel();

    let mut reader = Cursor::new(vec![1u8; 16]);
    let res = read_all_bytes(&mut reader, 4, Some(&token));
    assert!(matches!(res, Err(ShellExecError::Cancelled)), "got {res:?}");
    Ok(())
}

#[test]
fn write_reports_unwritten_bytes_on_closed_pipe() -> TestResult {
    let payload = patterned_bytes(100);
    let mut writer = ClosesAfter {
        written: Vec::new(),
        limit: 60,
    };

    match write_all_bytes(&mut writer, &payload, None) {
        Err(ShellExecError::BrokenPipe { remaining }) => assert_eq!(remaining, 40),
        other => panic!("expected BrokenPipe, got {other:?}"),
    }
    assert_eq!(writer.written, payload[..60]);
    Ok(())
}

#[test]
fn write_of_empty_payload_is_a_no_op() -> TestResult {
    let mut sink = Vec::new();
    write_all_bytes(&mut sink, &[], None)?;
    assert!(sink.is_empty());
    Ok(())
}

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

#[tokio::test]
async fn cancelled_future_resolves_after_cancel() -> TestResult {
    let token = CancelToken::new();
    let waiter = {
        let token = token.clone();
        tokio::spawn(async move { token.cancelled().await })
    };

    token.cancel();
    common::with_timeout(waiter).await?;
    Ok(())
}
