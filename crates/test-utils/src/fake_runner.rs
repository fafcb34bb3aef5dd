use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use shellexec::errors::Result;
use shellexec::{ProcessOutput, ProcessRunner, ProcessSpec, StdinSource};

/// A fake runner that:
/// - records every spec it was asked to run (plus the stdin variant)
/// - immediately returns a canned `ProcessOutput`.
pub struct FakeRunner {
    output: ProcessOutput,
    calls: Arc<Mutex<Vec<(ProcessSpec, String)>>>,
    interrupts: Arc<Mutex<usize>>,
}

impl FakeRunner {
    pub fn new(output: ProcessOutput) -> Self {
        Self {
            output,
            calls: Arc::new(Mutex::new(Vec::new())),
            interrupts: Arc::new(Mutex::new(0)),
        }
    }

    /// Recorded `(spec, format!("{stdin:?}"))` pairs, in call order.
    pub fn calls(&self) -> Vec<(ProcessSpec, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn interrupt_count(&self) -> usize {
        *self.interrupts.lock().unwrap()
    }
}

impl ProcessRunner for FakeRunner {
    fn run_process(
        &self,
        spec: ProcessSpec,
        stdin: StdinSource,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + '_>> {
        let calls = Arc::clone(&self.calls);
        let output = self.output.clone();

        Box::pin(async move {
            {
                let mut guard = calls.lock().unwrap();
                guard.push((spec, format!("{stdin:?}")));
            }
            Ok(output)
        })
    }

    fn interrupt(&self) -> Result<()> {
        *self.interrupts.lock().unwrap() += 1;
        Ok(())
    }
}
