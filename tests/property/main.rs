// tests/property/main.rs

use proptest::prelude::*;
use shellexec::{spawn, ProcessSpec, StdinSource};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("tokio runtime")
}

proptest! {
    // Every case spawns a real process; keep the count modest.
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn cat_echoes_arbitrary_stdin(payload in prop::collection::vec(any::<u8>(), 0..300_000)) {
        let out = runtime()
            .block_on(spawn(ProcessSpec::new("cat"), StdinSource::Bytes(payload.clone())))
            .expect("cat runs");

        prop_assert_eq!(out.code, 0);
        prop_assert_eq!(out.stdout, payload);
    }

    #[test]
    fn exit_codes_survive_normalisation(code in 0i32..=255) {
        let script = format!("exit {code}");
        let out = runtime()
            .block_on(spawn(ProcessSpec::new("sh").args(["-c", script.as_str()]), StdinSource::None))
            .expect("sh runs");

        prop_assert_eq!(out.code, code);
    }

    #[test]
    fn arguments_are_passed_literally(arg in "[^\\x00]{0,64}") {
        let out = runtime()
            .block_on(spawn(
                ProcessSpec::new("printf").args(["%s", arg.as_str()]),
                StdinSource::None,
            ))
            .expect("printf runs");

        prop_assert_eq!(out.stdout_string(), arg);
    }
}
