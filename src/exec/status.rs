// src/exec/status.rs

//! Wait-status decoding.

/// Offset added to a signal number when a child is killed by a signal,
/// following the shell convention (`SIGKILL` -> 137).
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// Normalise a raw wait status into a single exit code.
///
/// - Normal exit: the low byte of the exit status (0..=255).
/// - Killed by a signal: `128 + signal`.
///
/// `waitpid` without `WUNTRACED`/`WCONTINUED` reports nothing else; the raw
/// value is passed through unchanged as a last resort.
pub fn decode_wait_status(status: libc::c_int) -> i32 {
    if libc::WIFEXITED(status) {
        libc::WEXITSTATUS(status) & 0xff
    } else if libc::WIFSIGNALED(status) {
        SIGNAL_EXIT_BASE + libc::WTERMSIG(status)
    } else {
        status
    }
}

