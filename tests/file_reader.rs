mod common;

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::thread;

use common::{init_tracing, patterned_bytes, tmpdir, tmpfile, TestResult};
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use shellexec::errors::ShellExecError;
use shellexec::fixtures::{read_fixture_string, FixtureDir, MemoryResolver};
use shellexec::io::read_fd_bytes;
use shellexec::{read_file_bytes, read_fixture};

#[test]
fn empty_file_reads_as_empty() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;
    let path = tmpfile(&dir, "empty", b"")?;

    assert!(read_file_bytes(&path)?.is_empty());
    Ok(())
}

#[test]
fn large_file_matches_a_plain_read() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;
    let path = tmpfile(&dir, "big.bin", patterned_bytes(5 * 1024 * 1024))?;

    let mapped = read_file_bytes(&path)?;
    let reference = fs::read(&path)?;
    assert_eq!(mapped.len(), reference.len());
    assert!(mapped == reference, "contents differ");
    Ok(())
}

#[test]
fn open_file_handle_can_be_read_directly() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;
    let path = tmpfile(&dir, "small.txt", "abc")?;

    assert_eq!(read_fd_bytes(fs::File::open(&path)?)?, b"abc");
    Ok(())
}

#[test]
fn fifo_is_streamed_until_the_writer_closes() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;
    let path = dir.path().join("pipe");
    mkfifo(&path, Mode::S_IRUSR | Mode::S_IWUSR)?;

    let payload = patterned_bytes(300_000);
    let writer = {
        let path = path.clone();
        let payload = payload.clone();
        thread::spawn(move || -> std::io::Result<()> {
            let mut f = OpenOptions::new().write(true).open(&path)?;
            f.write_all(&payload)
        })
    };

    let read = read_file_bytes(&path)?;
    writer.join().expect("writer thread panicked")?;

    assert!(read == payload, "fifo contents differ");
    Ok(())
}

#[test]
fn character_device_is_streamed() -> TestResult {
    init_tracing();
    assert!(read_file_bytes("/dev/null")?.is_empty());
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn procfs_files_are_read_despite_zero_size() -> TestResult {
    init_tracing();
    let path = "/proc/self/status";
    assert_eq!(fs::metadata(path)?.len(), 0);

    let bytes = read_file_bytes(path)?;
    let text = String::from_utf8(bytes)?;
    assert!(text.starts_with("Name:"), "unexpected contents: {text:?}");
    assert!(text.lines().any(|l| l.starts_with("Pid:")));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;

    match read_file_bytes(dir.path().join("nope")) {
        Err(ShellExecError::Io(e)) => assert_eq!(e.kind(), ErrorKind::NotFound),
        other => panic!("expected NotFound, got {other:?}"),
    }
    Ok(())
}

#[test]
fn fixture_dir_resolves_existing_files_only() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;
    tmpfile(&dir, "data/config.json", r#"{"ok":true}"#)?;
    let fixtures = FixtureDir::new(dir.path());

    assert_eq!(fixtures.root(), dir.path());
    assert_eq!(read_fixture(&fixtures, "data/config.json")?, br#"{"ok":true}"#);

    let missing = read_fixture(&fixtures, "data/absent.json");
    assert!(matches!(missing, Err(ShellExecError::NotFound(_))), "got {missing:?}");
    Ok(())
}

#[test]
fn fixture_dir_under_joins_relative_root() -> TestResult {
    let dir = tmpdir()?;
    let fixtures = FixtureDir::under(dir.path(), "tests/fixtures");
    assert_eq!(fixtures.root(), dir.path().join("tests/fixtures"));
    Ok(())
}

#[test]
fn memory_resolver_maps_names_to_paths() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;
    let path = tmpfile(&dir, "greeting.txt", "hi there")?;

    let resolver = MemoryResolver::new();
    resolver.insert("greeting", &path);

    assert_eq!(read_fixture_string(&resolver, "greeting")?, "hi there");
    assert!(matches!(
        read_fixture(&resolver, "unknown"),
        Err(ShellExecError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn fixture_string_rejects_invalid_utf8() -> TestResult {
    init_tracing();
    let dir = tmpdir()?;
    let path = tmpfile(&dir, "bad.bin", [0xffu8, 0xfe])?;

    let resolver = MemoryResolver::new();
    resolver.insert("bad", path);

    match read_fixture_string(&resolver, "bad") {
        Err(ShellExecError::Io(e)) => assert_eq!(e.kind(), ErrorKind::InvalidData),
        other => panic!("expected InvalidData, got {other:?}"),
    }
    Ok(())
}
