//! Mutating commands. Each one reads the document, makes exactly one engine
//! call, and commits the result atomically.

use std::path::Path;

use anyhow::{Context, Result};

use plandoc_core::{
    PlanError, StepSpec, TaskSpec, ThreadSpec, add_step, delete_step, delete_task, delete_thread,
    insert_task, insert_thread, mark_step_complete, mark_step_incomplete, mark_task_complete,
    mark_task_incomplete, move_task, move_thread, read_document, reorder_tasks, reorder_threads,
    repair_numbering, replace_task, replace_thread, write_atomic,
};

use crate::resolve::{load_spec, parse_order, placement};
use crate::{StepCommands, TaskCommands, ThreadCommands};

/// Read, edit, commit.
fn commit<F>(path: &Path, edit: F) -> Result<()>
where
    F: FnOnce(&str) -> Result<String, PlanError>,
{
    let text = read_document(path)?;
    let updated = edit(&text)?;
    write_atomic(path, &updated)?;
    Ok(())
}

// -----------------------------------------------------------------------
// plandoc task ...
// -----------------------------------------------------------------------

pub fn run_task_command(command: TaskCommands, path: &Path) -> Result<()> {
    match command {
        TaskCommands::Complete { task, rationale } => {
            commit(path, |text| {
                mark_task_complete(text, task.thread, task.task, &rationale)
            })?;
            println!("Task {task} marked complete.");
        }
        TaskCommands::Reopen { task, rationale } => {
            commit(path, |text| {
                mark_task_incomplete(text, task.thread, task.task, &rationale)
            })?;
            println!("Task {task} marked incomplete.");
        }
        TaskCommands::Insert {
            thread,
            before,
            after,
            spec,
            rationale,
        } => {
            let at = placement(before, after)?;
            let spec: TaskSpec = load_spec(&spec)?;
            commit(path, |text| insert_task(text, thread, at, &spec, &rationale))?;
            println!("Task {:?} inserted into thread {thread}.", spec.title);
        }
        TaskCommands::Delete { task, rationale } => {
            commit(path, |text| delete_task(text, task.thread, task.task, &rationale))?;
            println!("Task {task} deleted.");
        }
        TaskCommands::Replace {
            task,
            spec,
            rationale,
        } => {
            let spec: TaskSpec = load_spec(&spec)?;
            commit(path, |text| {
                replace_task(text, task.thread, task.task, &spec, &rationale)
            })?;
            println!("Task {task} replaced.");
        }
        TaskCommands::Reorder {
            thread,
            order,
            rationale,
        } => {
            let order = parse_order(&order)?;
            commit(path, |text| reorder_tasks(text, thread, &order, &rationale))?;
            println!("Tasks of thread {thread} reordered.");
        }
        TaskCommands::Move {
            task,
            before,
            after,
            rationale,
        } => {
            let at = placement(before, after)?;
            commit(path, |text| move_task(text, task.thread, task.task, at, &rationale))?;
            println!("Task {task} moved.");
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// plandoc step ...
// -----------------------------------------------------------------------

pub fn run_step_command(command: StepCommands, path: &Path) -> Result<()> {
    match command {
        StepCommands::Complete {
            task,
            step,
            rationale,
        } => {
            commit(path, |text| {
                mark_step_complete(text, task.thread, task.task, step, &rationale)
            })?;
            println!("Step {step} of task {task} marked complete.");
        }
        StepCommands::Reopen {
            task,
            step,
            rationale,
        } => {
            commit(path, |text| {
                mark_step_incomplete(text, task.thread, task.task, step, &rationale)
            })?;
            println!("Step {step} of task {task} marked incomplete.");
        }
        StepCommands::Add {
            task,
            description,
            before,
            done,
            rationale,
        } => {
            let spec = StepSpec {
                description,
                completed: done,
            };
            commit(path, |text| {
                add_step(text, task.thread, task.task, &spec, before, &rationale)
            })?;
            println!("Step added to task {task}.");
        }
        StepCommands::Delete {
            task,
            step,
            rationale,
        } => {
            commit(path, |text| {
                delete_step(text, task.thread, task.task, step, &rationale)
            })?;
            println!("Step {step} of task {task} deleted.");
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// plandoc thread ...
// -----------------------------------------------------------------------

pub fn run_thread_command(command: ThreadCommands, path: &Path) -> Result<()> {
    match command {
        ThreadCommands::Insert {
            before,
            after,
            spec,
            rationale,
        } => {
            let at = placement(before, after)?;
            let spec: ThreadSpec = load_spec(&spec)?;
            commit(path, |text| insert_thread(text, at, &spec, &rationale))?;
            println!("Thread {:?} inserted.", spec.title);
        }
        ThreadCommands::Delete { thread, rationale } => {
            commit(path, |text| delete_thread(text, thread, &rationale))?;
            println!("Thread {thread} deleted.");
        }
        ThreadCommands::Replace {
            thread,
            spec,
            rationale,
        } => {
            let spec: ThreadSpec = load_spec(&spec)?;
            commit(path, |text| replace_thread(text, thread, &spec, &rationale))?;
            println!("Thread {thread} replaced.");
        }
        ThreadCommands::Reorder { order, rationale } => {
            let order = parse_order(&order)?;
            commit(path, |text| reorder_threads(text, &order, &rationale))?;
            println!("Threads reordered.");
        }
        ThreadCommands::Move {
            thread,
            before,
            after,
            rationale,
        } => {
            let at = placement(before, after)?;
            commit(path, |text| move_thread(text, thread, at, &rationale))?;
            println!("Thread {thread} moved.");
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// plandoc repair-numbering
// -----------------------------------------------------------------------

/// Repair numbering in place. The file is only rewritten when something
/// changed.
pub fn run_repair_numbering(path: &Path) -> Result<()> {
    let text = read_document(path)?;
    let repaired = repair_numbering(&text)
        .with_context(|| format!("cannot repair numbering of {}", path.display()))?;
    if repaired == text {
        println!("Numbering already dense.");
        return Ok(());
    }
    write_atomic(path, &repaired)?;
    println!("Numbering repaired.");
    Ok(())
}
