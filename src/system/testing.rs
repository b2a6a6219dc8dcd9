// src/system/testing.rs
//
// In-memory stand-ins for the process and prompt boundaries.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

use super::executor::{CommandOutput, CommandRunner, CommandSpec, ExecutionError};
use super::prompt::Prompter;

enum Scripted {
    Output(CommandOutput),
    SpawnError,
}

/// Records every command and answers from a table keyed by command-line
/// prefix. Unmatched commands succeed with empty output.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: RefCell<Vec<CommandSpec>>,
    responses: RefCell<Vec<(String, Scripted)>>,
}

impl std::fmt::Debug for RecordingRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingRunner")
            .field("calls", &self.calls.borrow().len())
            .finish()
    }
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Later registrations take precedence over earlier ones.
    pub(crate) fn respond(&self, prefix: &str, output: CommandOutput) -> &Self {
        self.responses
            .borrow_mut()
            .push((prefix.to_string(), Scripted::Output(output)));
        self
    }

    pub(crate) fn respond_stdout(&self, prefix: &str, stdout: &str) -> &Self {
        self.respond(prefix, CommandOutput::success(stdout))
    }

    pub(crate) fn fail_to_spawn(&self, prefix: &str) -> &Self {
        self.responses
            .borrow_mut()
            .push((prefix.to_string(), Scripted::SpawnError));
        self
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    pub(crate) fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(CommandSpec::command_line).collect()
    }

    pub(crate) fn find(&self, prefix: &str) -> Option<CommandSpec> {
        self.calls
            .borrow()
            .iter()
            .find(|c| c.command_line().starts_with(prefix))
            .cloned()
    }

    pub(crate) fn ran(&self, prefix: &str) -> bool {
        self.find(prefix).is_some()
    }

    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.command_line().starts_with(prefix))
            .count()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecutionError> {
        self.calls.borrow_mut().push(spec.clone());
        let line = spec.command_line();
        let responses = self.responses.borrow();
        match responses.iter().rev().find(|(prefix, _)| line.starts_with(prefix.as_str())) {
            Some((_, Scripted::Output(output))) => Ok(output.clone()),
            Some((_, Scripted::SpawnError)) => Err(ExecutionError::CommandFailed(
                line,
                io::Error::new(io::ErrorKind::NotFound, "scripted spawn failure"),
            )),
            None => Ok(CommandOutput::success("")),
        }
    }
}

/// Answers prompts from queues, falling back to each prompt's default once a
/// queue runs dry. Every prompt text is recorded.
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    confirms: RefCell<VecDeque<bool>>,
    inputs: RefCell<VecDeque<String>>,
    selects: RefCell<VecDeque<usize>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_confirms(self, answers: &[bool]) -> Self {
        self.confirms.borrow_mut().extend(answers.iter().copied());
        self
    }

    pub(crate) fn with_inputs(self, answers: &[&str]) -> Self {
        self.inputs
            .borrow_mut()
            .extend(answers.iter().map(|s| s.to_string()));
        self
    }

    pub(crate) fn with_selects(self, answers: &[usize]) -> Self {
        self.selects.borrow_mut().extend(answers.iter().copied());
        self
    }

    pub(crate) fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> dialoguer::Result<bool> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.confirms.borrow_mut().pop_front().unwrap_or(default))
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> dialoguer::Result<String> {
        self.asked.borrow_mut().push(prompt.to_string());
        let answer = self.inputs.borrow_mut().pop_front().unwrap_or_default();
        if answer.is_empty() {
            Ok(default.unwrap_or_default().to_string())
        } else {
            Ok(answer)
        }
    }

    fn select(&self, prompt: &str, _items: &[&str], default: usize) -> dialoguer::Result<usize> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.selects.borrow_mut().pop_front().unwrap_or(default))
    }
}
