//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Input is read through the [`Prompter`] trait so the resolver never touches
//! stdin directly. [`TerminalPrompter`] reads from the terminal; tests use
//! [`ScriptedPrompter`] with canned answers.
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input fail with [`PromptError::NotInteractive`].
//! Every read is raced against the caller's [`Context`].

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

use crate::core::context::{Context, ContextError};

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("input closed")]
    Eof,

    #[error("IO error: {0}")]
    IoError(String),

    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Source of user answers.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask `question`; an empty answer yields `default`.
    async fn prompt(&self, ctx: &Context, question: &str, default: &str)
        -> Result<String, PromptError>;

    /// Show a line of information (menus, notices).
    fn say(&self, message: &str);

    /// Ask a yes/no question, re-asking on unrecognised input.
    async fn confirm(
        &self,
        ctx: &Context,
        question: &str,
        default: bool,
    ) -> Result<bool, PromptError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let question = format!("{} {}", question, hint);
        let default_answer = if default { "y" } else { "n" };
        loop {
            let answer = self.prompt(ctx, &question, default_answer).await?;
            match parse_yes_no(&answer) {
                Some(value) => return Ok(value),
                None => self.say("Please answer y or n."),
            }
        }
    }
}

/// Parse a yes/no answer.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Reads answers from the terminal.
pub struct TerminalPrompter {
    interactive: bool,
    reader: tokio::sync::Mutex<BufReader<Stdin>>,
}

impl std::fmt::Debug for TerminalPrompter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalPrompter")
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl TerminalPrompter {
    /// Create a prompter; with `interactive == false` every prompt fails.
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            reader: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn prompt(
        &self,
        ctx: &Context,
        question: &str,
        default: &str,
    ) -> Result<String, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive);
        }

        {
            let mut stderr = std::io::stderr().lock();
            let written = if default.is_empty() {
                write!(stderr, "{}: ", question)
            } else {
                write!(stderr, "{} ({}): ", question, default)
            };
            written
                .and_then(|_| stderr.flush())
                .map_err(|e| PromptError::IoError(e.to_string()))?;
        }

        let mut reader = self.reader.lock().await;
        let mut line = String::new();
        let read = ctx
            .run(reader.read_line(&mut line))
            .await?
            .map_err(|e| PromptError::IoError(e.to_string()))?;
        if read == 0 {
            return Err(PromptError::Eof);
        }

        let answer = line.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }

    fn say(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Replays canned answers; for tests.
///
/// An empty-string answer selects the default. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    inner: Arc<Mutex<ScriptedInner>>,
}

#[derive(Debug, Default)]
struct ScriptedInner {
    answers: VecDeque<String>,
    questions: Vec<String>,
    said: Vec<String>,
}

impl ScriptedPrompter {
    /// Create a prompter that answers with `answers`, in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(Mutex::new(ScriptedInner {
                answers: answers.into_iter().map(Into::into).collect(),
                ..Default::default()
            })),
        }
    }

    /// Questions asked so far.
    pub fn questions(&self) -> Vec<String> {
        self.lock().questions.clone()
    }

    /// Informational lines shown so far.
    pub fn said(&self) -> Vec<String> {
        self.lock().said.clone()
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lock().answers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn prompt(
        &self,
        ctx: &Context,
        question: &str,
        default: &str,
    ) -> Result<String, PromptError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        let mut inner = self.lock();
        inner.questions.push(question.to_string());
        let answer = inner.answers.pop_front().ok_or(PromptError::Eof)?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    fn say(&self, message: &str) {
        self.lock().said.push(message.to_string());
    }
}
