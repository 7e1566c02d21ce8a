//! Subprocess generation backend.
//!
//! Runs any CLI that prints a completion for a prompt. The command template is
//! split into arguments first and placeholders are substituted per argument,
//! so a prompt containing quotes or newlines is passed through intact.

use super::{Completion, GenerationError, Generator};
use crate::config::GeneratorConfig;
use crate::error::{Result, TbgenError};
use crate::prompt::{Prompt, TemplateError, render};
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Lines of stderr kept in a failure message.
const STDERR_TAIL_LINES: usize = 20;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Stand-in for the prompt used to find out whether the template references it.
const PROMPT_PROBE: &str = "\u{1}tbgen-prompt\u{1}";

/// Generator backed by an external command.
#[derive(Debug)]
pub struct CommandGenerator {
    args: Vec<String>,
    model: String,
    environment: BTreeMap<String, String>,
    timeout_seconds: Option<u64>,
    /// Prompt goes to stdin because no argument references `{prompt}`.
    prompt_on_stdin: bool,
}

impl CommandGenerator {
    /// Parse and check the configured command template.
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let args = shell_words::split(&config.command).map_err(|e| {
            TbgenError::UserError(format!(
                "failed to parse generator command '{}': {}\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                config.command, e
            ))
        })?;

        if args.is_empty() {
            return Err(TbgenError::UserError(
                "generator.command is empty; the command backend needs a program to run"
                    .to_string(),
            ));
        }

        let probe = placeholders(PROMPT_PROBE, &config.model, "");
        let mut prompt_on_stdin = true;
        for arg in &args {
            let rendered =
                render(arg, &probe).map_err(|e| command_template_error(&config.command, e))?;
            if rendered.contains(PROMPT_PROBE) {
                prompt_on_stdin = false;
            }
        }

        Ok(Self {
            args,
            model: config.model.clone(),
            environment: config.environment.clone(),
            timeout_seconds: config.timeout_seconds,
            prompt_on_stdin,
        })
    }

    fn command_line(&self, prompt: &Prompt) -> std::result::Result<Vec<String>, GenerationError> {
        let variables = placeholders(&prompt.text, &self.model, &prompt.unit);
        self.args
            .iter()
            .map(|arg| render(arg, &variables).map_err(|e| GenerationError::Command(e.to_string())))
            .collect()
    }
}

impl Generator for CommandGenerator {
    fn generate(&mut self, prompt: &Prompt) -> std::result::Result<Completion, GenerationError> {
        let args = self.command_line(prompt)?;
        let program = &args[0];

        let mut command = Command::new(program);
        command
            .args(&args[1..])
            .stdin(if self.prompt_on_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &self.environment {
            command.env(key, value);
        }

        tracing::debug!(unit = %prompt.unit, program = %program, stdin = self.prompt_on_stdin, "running generator command");

        let start = Instant::now();
        let mut child = command.spawn().map_err(|e| {
            GenerationError::Command(format!(
                "failed to execute '{}': {}. Ensure the command is installed and in PATH.",
                program, e
            ))
        })?;

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());
        let stdin = spawn_writer(child.stdin.take(), prompt.text.clone());

        let status = wait_with_timeout(&mut child, self.timeout_seconds)?;
        let stdout = join_reader(stdout);
        let stderr = join_reader(stderr);
        let written = join_writer(stdin);

        let Some(status) = status else {
            return Err(GenerationError::Timeout(self.timeout_seconds.unwrap_or_default()));
        };

        if let Err(e) = written
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(GenerationError::Command(format!(
                "failed to write prompt to '{}': {}",
                program, e
            )));
        }

        tracing::debug!(
            unit = %prompt.unit,
            exit_code = ?status.code(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generator command finished"
        );

        if !status.success() {
            let code = status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            let tail = stderr_tail(&stderr);
            return Err(GenerationError::Command(if tail.is_empty() {
                format!("'{}' exited with status {}", program, code)
            } else {
                format!("'{}' exited with status {}: {}", program, code, tail)
            }));
        }

        Ok(Completion::from_text(stdout))
    }
}

fn placeholders(prompt: &str, model: &str, unit: &str) -> HashMap<String, String> {
    crate::prompt::vars([("prompt", prompt), ("model", model), ("unit", unit)])
}

fn command_template_error(command: &str, e: TemplateError) -> TbgenError {
    match e {
        TemplateError::UndefinedVariable { name, .. } => TbgenError::UserError(format!(
            "generator command references undefined variable '{}'\n\
             Command: {}\n\
             Available variables: model, prompt, unit",
            name, command
        )),
        other => TbgenError::UserError(format!(
            "generator command '{}' is not a valid template: {}",
            command, other
        )),
    }
}

/// Drain a pipe on its own thread so a chatty child never blocks on a full pipe.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    let mut pipe = pipe?;
    Some(std::thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    }))
}

/// Feed the prompt on its own thread so the timeout covers a child that never reads stdin.
fn spawn_writer<W: Write + Send + 'static>(
    pipe: Option<W>,
    text: String,
) -> Option<JoinHandle<std::io::Result<()>>> {
    let mut pipe = pipe?;
    Some(std::thread::spawn(move || pipe.write_all(text.as_bytes())))
}

fn join_writer(handle: Option<JoinHandle<std::io::Result<()>>>) -> std::io::Result<()> {
    match handle {
        Some(h) => h
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("prompt writer panicked"))),
        None => Ok(()),
    }
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Wait for the child, killing it once the timeout elapses.
///
/// Returns `None` when the process was killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout_seconds: Option<u64>,
) -> std::result::Result<Option<ExitStatus>, GenerationError> {
    let Some(secs) = timeout_seconds else {
        return child
            .wait()
            .map(Some)
            .map_err(|e| GenerationError::Command(format!("failed to wait for process: {}", e)));
    };

    let timeout = Duration::from_secs(secs);
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Ok(None);
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(GenerationError::Command(format!(
                    "failed to check process status: {}",
                    e
                )));
            }
        }
    }
}

fn kill_process(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n").trim().to_string()
}
