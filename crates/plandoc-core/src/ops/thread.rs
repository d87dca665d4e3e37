//! Thread-scope edits. Every structural change renumbers threads and the
//! thread qualifier of every task.

use crate::document::Document;
use crate::error::PlanError;
use crate::input::ThreadSpec;
use crate::model::{Operation, Placement};
use crate::renumber::renumber_threads;
use crate::serialize::thread_block;

use super::{anchor_number, apply, landing_index, move_item, permutation};

fn anchor_index(
    doc: &Document,
    op: Operation,
    placement: Placement,
) -> Result<Option<usize>, PlanError> {
    anchor_number(placement)
        .map(|n| doc.thread_index(op, n))
        .transpose()
}

/// Blank-line separation between the thread at `at` and its neighbours,
/// including a following audit trail.
fn separate(doc: &mut Document, at: usize) {
    let eol = doc.eol;
    match at.checked_sub(1) {
        Some(prev) => doc.threads[prev].ensure_trailing_blank(eol),
        None => doc.ensure_preamble_blank(),
    }
    if at + 1 < doc.threads.len() || doc.audit.is_some() {
        doc.threads[at].ensure_trailing_blank(eol);
    }
}

/// Insert a new thread before/after an existing one, or at the end.
pub fn insert_thread(
    text: &str,
    placement: Placement,
    spec: &ThreadSpec,
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::InsertThread;
    apply(op, text, rationale, |doc| {
        let anchor = anchor_index(doc, op, placement)?;
        let at = landing_index(placement, anchor, doc.threads.len());
        let block = thread_block(op, at as u32 + 1, spec, doc.eol)?;
        doc.threads.insert(at, block);
        separate(doc, at);
        renumber_threads(doc);
        Ok(())
    })
}

/// Delete a thread with all of its tasks.
pub fn delete_thread(text: &str, thread: u32, rationale: &str) -> Result<String, PlanError> {
    let op = Operation::DeleteThread;
    apply(op, text, rationale, |doc| {
        let idx = doc.thread_index(op, thread)?;
        doc.threads.remove(idx);
        renumber_threads(doc);
        Ok(())
    })
}

/// Replace a thread's title, introduction and tasks, keeping its number.
pub fn replace_thread(
    text: &str,
    thread: u32,
    spec: &ThreadSpec,
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::ReplaceThread;
    apply(op, text, rationale, |doc| {
        let idx = doc.thread_index(op, thread)?;
        doc.threads[idx] = thread_block(op, thread, spec, doc.eol)?;
        Ok(())
    })
}

/// Reorder all threads. `order[i]` is the current number of the thread that
/// becomes thread `i + 1`.
pub fn reorder_threads(text: &str, order: &[u32], rationale: &str) -> Result<String, PlanError> {
    let op = Operation::ReorderThreads;
    apply(op, text, rationale, |doc| {
        let current: Vec<(u32, usize)> = doc
            .threads
            .iter()
            .map(|t| (t.heading.number, t.heading.line))
            .collect();
        let resolved = permutation::resolve(op, "threads", &current, order)?;
        permutation::apply(&mut doc.threads, &resolved);
        for idx in 0..doc.threads.len() {
            separate(doc, idx);
        }
        renumber_threads(doc);
        Ok(())
    })
}

/// Move one thread before/after another, or to the end.
pub fn move_thread(
    text: &str,
    thread: u32,
    placement: Placement,
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::MoveThread;
    apply(op, text, rationale, |doc| {
        let from = doc.thread_index(op, thread)?;
        if anchor_number(placement) == Some(thread) {
            return Err(PlanError::malformed(
                op,
                "placement",
                format!("thread {thread} cannot be moved relative to itself"),
            ));
        }
        let anchor = anchor_index(doc, op, placement)?;
        let at = move_item(&mut doc.threads, from, placement, anchor);
        separate(doc, at);
        renumber_threads(doc);
        Ok(())
    })
}
