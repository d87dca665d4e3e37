//! The parsed plan document.
//!
//! A [`Document`] is a line-preserving view of the text: the preamble (title
//! and Summary section), the threads with their tasks, and the optional audit
//! trail. [`Document::render`] of an unmodified parse returns the input
//! byte-for-byte.

pub(crate) mod block;
pub(crate) mod parser;

use crate::error::{ParseError, PlanError};
use crate::model::{Operation, Target};

use block::{ThreadBlock, ensure_eol};

#[derive(Debug, Clone)]
pub struct Document {
    /// Everything before the first thread heading, verbatim.
    pub(crate) preamble: Vec<String>,
    pub(crate) threads: Vec<ThreadBlock>,
    /// The audit trail section including its heading, verbatim.
    pub(crate) audit: Option<Vec<String>>,
    /// Line ending for new lines, taken from the first line of the text.
    pub(crate) eol: &'static str,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            preamble: Vec::new(),
            threads: Vec::new(),
            audit: None,
            eol: "\n",
        }
    }
}

impl Document {
    /// Parse plan text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parser::parse_document(text)
    }

    /// Parse on behalf of an operation, attaching the operation to errors.
    pub(crate) fn load(op: Operation, text: &str) -> Result<Self, PlanError> {
        Self::parse(text).map_err(|e| PlanError::parse(op, e))
    }

    /// Render the document back to text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.preamble {
            out.push_str(line);
        }
        for thread in &self.threads {
            thread.render_into(&mut out);
        }
        if let Some(audit) = &self.audit {
            for line in audit {
                out.push_str(line);
            }
        }
        out
    }

    /// Number of threads in the document.
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Position of the thread numbered `number`.
    pub(crate) fn thread_index(&self, op: Operation, number: u32) -> Result<usize, PlanError> {
        let mut matches = self
            .threads
            .iter()
            .enumerate()
            .filter(|(_, t)| t.heading.number == number);
        let Some((idx, _)) = matches.next() else {
            return Err(PlanError::NotFound {
                op,
                target: Target::Thread(number),
            });
        };
        if let Some((_, dup)) = matches.next() {
            return Err(PlanError::parse(
                op,
                ParseError::new(
                    dup.heading.line,
                    format!("thread number {number} appears more than once; repair numbering first"),
                ),
            ));
        }
        Ok(idx)
    }

    /// Positions of the thread numbered `thread` and its task numbered `task`.
    pub(crate) fn task_index(
        &self,
        op: Operation,
        thread: u32,
        task: u32,
    ) -> Result<(usize, usize), PlanError> {
        let thread_idx = self.thread_index(op, thread)?;
        let mut matches = self.threads[thread_idx]
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.heading.number == task);
        let Some((idx, _)) = matches.next() else {
            return Err(PlanError::NotFound {
                op,
                target: Target::Task { thread, task },
            });
        };
        if let Some((_, dup)) = matches.next() {
            return Err(PlanError::parse(
                op,
                ParseError::new(
                    dup.heading.line,
                    format!(
                        "task number {task} appears more than once in thread {thread}; repair numbering first"
                    ),
                ),
            ));
        }
        Ok((thread_idx, idx))
    }

    /// End a non-empty preamble with a blank line.
    pub(crate) fn ensure_preamble_blank(&mut self) {
        let eol = self.eol;
        match self.preamble.last_mut() {
            Some(line) if !block::is_blank(line) => {
                ensure_eol(line, eol);
                self.preamble.push(eol.to_owned());
            }
            _ => {}
        }
    }

    /// Give every block that has a successor a terminated last line, so that
    /// inserted or moved blocks never fuse with their neighbours.
    ///
    /// On a freshly parsed document this is a no-op: only the final line of
    /// the text can lack a terminator.
    pub(crate) fn seal(&mut self) {
        let eol = self.eol;
        let has_body = !self.threads.is_empty() || self.audit.is_some();
        if has_body {
            if let Some(line) = self.preamble.last_mut() {
                ensure_eol(line, eol);
            }
        }
        let count = self.threads.len();
        let audit = self.audit.is_some();
        for (idx, thread) in self.threads.iter_mut().enumerate() {
            if !thread.tasks.is_empty() {
                thread.ensure_intro_eol(eol);
            }
            let tasks = thread.tasks.len();
            for task in thread.tasks.iter_mut().take(tasks.saturating_sub(1)) {
                task.ensure_trailing_eol(eol);
            }
            if idx + 1 < count || audit {
                thread.ensure_trailing_eol(eol);
            }
        }
    }
}
