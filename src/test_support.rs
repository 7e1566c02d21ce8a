use crate::generation::{Completion, GenerationError, Generator};
use crate::prompt::Prompt;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // The working directory is process-global.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// In-memory generator that replays queued responses and records prompts.
///
/// Once the queue is exhausted every call returns `Completion::Empty`.
pub(crate) struct ScriptedGenerator {
    responses: VecDeque<Result<Completion, GenerationError>>,
    pub(crate) prompts: Vec<Prompt>,
}

impl ScriptedGenerator {
    pub(crate) fn new(responses: Vec<Result<Completion, GenerationError>>) -> Self {
        Self {
            responses: responses.into(),
            prompts: Vec::new(),
        }
    }

    /// Generator answering each call with the next text.
    pub(crate) fn texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(Completion::Text(t.to_string())))
                .collect(),
        )
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&mut self, prompt: &Prompt) -> Result<Completion, GenerationError> {
        self.prompts.push(prompt.clone());
        self.responses.pop_front().unwrap_or(Ok(Completion::Empty))
    }
}

/// UART plan with three features, as a CSV sheet.
pub(crate) const UART_PLAN_CSV: &str = "\
Feature,Testcase Inputs,Testcase Steps,Testcase Outputs,Coverage Method
Baud Rate,divisor=651,configure divisor; send 0x55,tx period matches,baud_bins
Parity Check,0xFF,\"send byte, assert parity\",parity_error=0,parity_bins
Loopback,0xA5,enable loopback; send byte,rx == tx,
";

/// Write `content` to `<dir>/<name>` and return the path.
pub(crate) fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
