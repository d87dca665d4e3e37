//! Step-scope edits. Step state never propagates up to the task.

use crate::document::Document;
use crate::document::block::{StepLine, TaskLine, is_blank, mark_for, split_eol};
use crate::error::PlanError;
use crate::input::StepSpec;
use crate::model::{CompletionState, Operation, Target};

use super::apply;

/// Mark one step (1-based position within its task) complete.
pub fn mark_step_complete(
    text: &str,
    thread: u32,
    task: u32,
    step: u32,
    rationale: &str,
) -> Result<String, PlanError> {
    set_completion(Operation::MarkStepComplete, text, thread, task, step, true, rationale)
}

/// Mark one step incomplete. The parent task keeps its own flag.
pub fn mark_step_incomplete(
    text: &str,
    thread: u32,
    task: u32,
    step: u32,
    rationale: &str,
) -> Result<String, PlanError> {
    set_completion(Operation::MarkStepIncomplete, text, thread, task, step, false, rationale)
}

/// Body line index of step `step` (1-based), or Not Found.
fn step_index(
    doc: &Document,
    op: Operation,
    thread: u32,
    task: u32,
    step: u32,
) -> Result<(usize, usize, usize), PlanError> {
    let (t, k) = doc.task_index(op, thread, task)?;
    let line = step
        .checked_sub(1)
        .and_then(|pos| doc.threads[t].tasks[k].step_line_index(pos as usize))
        .ok_or(PlanError::NotFound {
            op,
            target: Target::Step { thread, task, step },
        })?;
    Ok((t, k, line))
}

fn set_completion(
    op: Operation,
    text: &str,
    thread: u32,
    task: u32,
    step: u32,
    completed: bool,
    rationale: &str,
) -> Result<String, PlanError> {
    apply(op, text, rationale, |doc| {
        let (t, k, line) = step_index(doc, op, thread, task, step)?;
        if let TaskLine::Step(s) = &mut doc.threads[t].tasks[k].body[line] {
            if s.completed() == completed {
                return Err(PlanError::AlreadyInState {
                    op,
                    target: Target::Step { thread, task, step },
                    state: CompletionState::from_flag(completed),
                });
            }
            s.set_completed(completed);
        }
        Ok(())
    })
}

/// Add a step to a task, before the step at 1-based position `before`, or
/// after the last step when `before` is `None`. A task without steps gets a
/// `Steps:` block after its metadata.
pub fn add_step(
    text: &str,
    thread: u32,
    task: u32,
    spec: &StepSpec,
    before: Option<u32>,
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::AddStep;
    apply(op, text, rationale, |doc| {
        spec.validate(op, "step")?;
        let (t, k) = doc.task_index(op, thread, task)?;
        let eol = doc.eol;
        let anchor = match before {
            Some(step) => Some(step_index(doc, op, thread, task, step)?.2),
            None => None,
        };
        let block = &mut doc.threads[t].tasks[k];
        let last_step = block
            .body
            .iter()
            .rposition(|line| matches!(line, TaskLine::Step(_)));

        // Reuse the indentation of a neighbouring step.
        let indent = anchor
            .or(last_step)
            .and_then(|idx| match &block.body[idx] {
                TaskLine::Step(s) => Some(s.indent().to_owned()),
                _ => None,
            })
            .unwrap_or_default();
        let mark = mark_for(spec.completed);
        let raw = format!("{indent}- [{mark}] {}{eol}", spec.description);
        let line = TaskLine::Step(StepLine::new(&indent, mark, spec.description.clone(), &raw));

        match (anchor, last_step) {
            (Some(at), _) => block.body.insert(at, line),
            (None, Some(last)) => {
                block.body.insert(last + 1, line);
                terminate_before(&mut block.body, last + 1, eol);
            }
            (None, None) => {
                let at = block
                    .body
                    .iter()
                    .rposition(|l| !is_blank(l.raw()))
                    .map_or(0, |idx| idx + 1);
                if at == 0 {
                    block.heading.ensure_eol(eol);
                }
                block.body.insert(at, line);
                block.body.insert(at, TaskLine::Text(format!("Steps:{eol}")));
                block.body.insert(at, TaskLine::Text(eol.to_owned()));
                terminate_before(&mut block.body, at, eol);
            }
        }
        Ok(())
    })
}

/// Make sure the line before `idx` is terminated.
fn terminate_before(body: &mut [TaskLine], idx: usize, eol: &str) {
    if let Some(prev) = idx.checked_sub(1).and_then(|i| body.get_mut(i)) {
        prev.ensure_eol(eol);
    }
}

/// Remove a step. When the last step goes, an empty `Steps:` label goes too.
pub fn delete_step(
    text: &str,
    thread: u32,
    task: u32,
    step: u32,
    rationale: &str,
) -> Result<String, PlanError> {
    let op = Operation::DeleteStep;
    apply(op, text, rationale, |doc| {
        let (t, k, line) = step_index(doc, op, thread, task, step)?;
        let block = &mut doc.threads[t].tasks[k];
        block.body.remove(line);
        if block.steps().next().is_none() {
            let label = block
                .body
                .iter()
                .position(|l| matches!(l, TaskLine::Text(s) if split_eol(s).0.trim() == "Steps:"));
            if let Some(idx) = label {
                block.body.remove(idx);
                if idx > 0 && is_blank(block.body[idx - 1].raw()) {
                    block.body.remove(idx - 1);
                }
            }
        }
        Ok(())
    })
}
