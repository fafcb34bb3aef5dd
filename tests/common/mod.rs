#![allow(dead_code)]

pub use shellexec_test_utils::scratch::{patterned_bytes, tmpdir, tmpdir_in, tmpfile};
pub use shellexec_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
