//! Task-scope edits: completion, insert, delete, replace, reorder, move.

use crate::document::Document;
use crate::document::block::ThreadBlock;
use crate::error::PlanError;
use crate::input::TaskSpec;
use crate::model::{CompletionState, Operation, Placement, Target};
use crate::renumber::renumber_tasks;
use crate::serialize::task_block;

use super::{anchor_number, apply, landing_index, move_item, permutation};

/// Mark a task complete, together with all of its steps.
pub fn mark_task_complete(
    text: &str,
    thread: u32,
    task: u32,
    rationale: &str,
) -> Result<String, PlanError> {
    set_completion(Operation::MarkTaskComplete, text, thread, task, true, rationale)
}

/// Mark a task incomplete, resetting all of its steps.
pub fn mark_task_incomplete(
    text: &str,
    thread: u32,
    task: u32,
    rationale: &str,
) -> Result<String, PlanError> {
    set_completion(Operation::MarkTaskIncomplete, text, thread, task, false, rationale)
}

fn set_completion(
    op: Operation,
    text: &str,
    thread: u32,
    task: u32,
    completed: bool,
    rationale: &str,
) -> Result<String, PlanError> {
    apply(op, text, rationale, |doc| {
        let (t, k) = doc.task_index(op, thread, task)?;
        let block = &mut doc.threads[t].tasks[k];
        if block.completed() == completed {
            return Err(PlanError::AlreadyInState {
                op,
                target: Target::Task { thread, task },
                state: CompletionState::from_flag(completed),
            });
        }
        block.heading.set_completed(completed);
        for step in block.steps_mut() {
            step.set_completed(completed);
        }
        Ok(())
    })
}

/// Index of the anchor task named by `placement`, if any.
fn anchor_index(
    doc: &Document,
    op: Operation,
    thread: u32,
    placement: Placement,
) -> Result<Option<usize>, PlanError> {
    match anchor_number(placement) {
        Some(n) => Ok(Some(doc.task_index(op, thread, n)?.1)),
        None => Ok(None),
    }
}

/// Blank-line separation between the task at `at` and its neighbours.
fn separate(scope: &mut ThreadBlock, at: usize, eol: &str) {
    match at.checked_sub(1) {
        Some(prev) => scope.tasks[prev].ensure_trailing_blank(eol),
        None => scope.ensure_intro_blank(eol),
    }
    if at + 1 < scope.tasks.len() {
        scope.tasks[at].ensure_trailing_blank(eol);
    }
}

/// Insert a new task before/after an existing task, or at the end of the
/// thread. Tasks after it are renumbered.
pub fn insert_task(
    text: &str,
    thread: u32,
    placement: Placement,
    spec: &TaskSpec,
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::InsertTask;
    apply(op, text, rationale, |doc| {
        let t = doc.thread_index(op, thread)?;
        let anchor = anchor_index(doc, op, thread, placement)?;
        let at = landing_index(placement, anchor, doc.threads[t].tasks.len());
        let block = task_block(op, thread, at as u32 + 1, spec, doc.eol)?;
        let eol = doc.eol;
        let scope = &mut doc.threads[t];
        scope.tasks.insert(at, block);
        separate(scope, at, eol);
        renumber_tasks(scope);
        Ok(())
    })
}

/// Delete a task and its steps. Later tasks move up one number.
pub fn delete_task(
    text: &str,
    thread: u32,
    task: u32,
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::DeleteTask;
    apply(op, text, rationale, |doc| {
        let (t, k) = doc.task_index(op, thread, task)?;
        let scope = &mut doc.threads[t];
        scope.tasks.remove(k);
        renumber_tasks(scope);
        Ok(())
    })
}

/// Replace a task's whole content, keeping its number.
pub fn replace_task(
    text: &str,
    thread: u32,
    task: u32,
    spec: &TaskSpec,
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::ReplaceTask;
    apply(op, text, rationale, |doc| {
        let (t, k) = doc.task_index(op, thread, task)?;
        doc.threads[t].tasks[k] = task_block(op, thread, task, spec, doc.eol)?;
        Ok(())
    })
}

/// Reorder all tasks of a thread. `order[i]` is the current number of the
/// task that becomes task `i + 1`.
pub fn reorder_tasks(
    text: &str,
    thread: u32,
    order: &[u32],
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::ReorderTasks;
    apply(op, text, rationale, |doc| {
        let t = doc.thread_index(op, thread)?;
        let eol = doc.eol;
        let scope = &mut doc.threads[t];
        let current: Vec<(u32, usize)> = scope
            .tasks
            .iter()
            .map(|task| (task.heading.number, task.heading.line))
            .collect();
        let resolved =
            permutation::resolve(op, &format!("tasks of thread {thread}"), &current, order)?;
        permutation::apply(&mut scope.tasks, &resolved);
        for idx in 0..scope.tasks.len() {
            separate(scope, idx, eol);
        }
        renumber_tasks(scope);
        Ok(())
    })
}

/// Move one task to sit immediately before/after another task of the same
/// thread, or to the end of the thread.
pub fn move_task(
    text: &str,
    thread: u32,
    task: u32,
    placement: Placement,
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::MoveTask;
    apply(op, text, rationale, |doc| {
        let (t, from) = doc.task_index(op, thread, task)?;
        if anchor_number(placement) == Some(task) {
            return Err(PlanError::malformed(
                op,
                "placement",
                format!("task {thread}.{task} cannot be moved relative to itself"),
            ));
        }
        let anchor = anchor_index(doc, op, thread, placement)?;
        let eol = doc.eol;
        let scope = &mut doc.threads[t];
        let at = move_item(&mut scope.tasks, from, placement, anchor);
        separate(scope, at, eol);
        renumber_tasks(scope);
        Ok(())
    })
}
