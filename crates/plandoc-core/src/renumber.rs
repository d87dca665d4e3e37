//! Dense sequential numbering of threads and tasks.
//!
//! Threads are numbered `1..N` across the document. Tasks are numbered
//! `1..M` within their thread and carry their thread's number as qualifier.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::document::Document;
use crate::document::block::ThreadBlock;
use crate::error::PlanError;
use crate::model::Operation;

/// Renumber the tasks of one thread. Returns how many headings changed.
pub(crate) fn renumber_tasks(thread: &mut ThreadBlock) -> usize {
    let thread_no = thread.heading.number;
    let mut changed = 0;
    for (idx, task) in thread.tasks.iter_mut().enumerate() {
        if task.heading.set_numbers(thread_no, idx as u32 + 1) {
            changed += 1;
        }
    }
    changed
}

/// Renumber threads and update every task's thread qualifier. Task numbers
/// inside a thread are left alone.
pub(crate) fn renumber_threads(doc: &mut Document) -> usize {
    let mut changed = 0;
    for (idx, thread) in doc.threads.iter_mut().enumerate() {
        let number = idx as u32 + 1;
        if thread.heading.set_number(number) {
            changed += 1;
        }
        for task in &mut thread.tasks {
            let task_no = task.heading.number;
            if task.heading.set_numbers(number, task_no) {
                changed += 1;
            }
        }
    }
    changed
}

/// Full pass over the document: threads, qualifiers and task numbers.
pub(crate) fn renumber_all(doc: &mut Document) -> usize {
    let mut changed = renumber_threads(doc);
    for thread in &mut doc.threads {
        changed += renumber_tasks(thread);
    }
    changed
}

/// Restore dense numbering over a whole document edited outside the engine.
///
/// Mechanical repair: no rationale is taken and no audit entry is written.
pub fn repair_numbering(text: &str) -> Result<String, PlanError> {
    let mut doc = Document::load(Operation::RepairNumbering, text)?;
    let changed = renumber_all(&mut doc);
    debug!(changed, "repaired plan numbering");
    if changed == 0 {
        return Ok(text.to_owned());
    }
    Ok(doc.render())
}

// ---------------------------------------------------------------------------
// Numbering check
// ---------------------------------------------------------------------------

/// A numbering defect that [`repair_numbering`] would fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumberingIssue {
    /// The thread at 1-based `position` is numbered `found`.
    ThreadOutOfSequence { position: u32, found: u32 },
    /// The task at `position` in thread `thread` is numbered `found`.
    TaskOutOfSequence {
        thread: u32,
        position: u32,
        found: u32,
    },
    /// Task `task` of thread `thread` is qualified with `found`.
    StaleQualifier { thread: u32, task: u32, found: u32 },
}

impl fmt::Display for NumberingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreadOutOfSequence { position, found } => {
                write!(f, "thread at position {position} is numbered {found}")
            }
            Self::TaskOutOfSequence {
                thread,
                position,
                found,
            } => write!(
                f,
                "task at position {position} of thread {thread} is numbered {found}"
            ),
            Self::StaleQualifier {
                thread,
                task,
                found,
            } => write!(
                f,
                "task {task} of thread {thread} is written as {found}.{task}"
            ),
        }
    }
}

/// List numbering defects without changing anything.
pub fn check_numbering(text: &str) -> Result<Vec<NumberingIssue>, PlanError> {
    let doc = Document::load(Operation::CheckNumbering, text)?;
    let mut issues = Vec::new();
    for (idx, thread) in doc.threads.iter().enumerate() {
        let position = idx as u32 + 1;
        let number = thread.heading.number;
        if number != position {
            issues.push(NumberingIssue::ThreadOutOfSequence {
                position,
                found: number,
            });
        }
        for (task_idx, task) in thread.tasks.iter().enumerate() {
            let task_position = task_idx as u32 + 1;
            if task.heading.number != task_position {
                issues.push(NumberingIssue::TaskOutOfSequence {
                    thread: position,
                    position: task_position,
                    found: task.heading.number,
                });
            }
            if task.heading.thread != position {
                issues.push(NumberingIssue::StaleQualifier {
                    thread: position,
                    task: task_position,
                    found: task.heading.thread,
                });
            }
        }
    }
    Ok(issues)
}
