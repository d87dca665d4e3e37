//! Read-only commands: `summary`, `threads`, `show`, `next`,
//! `check-numbering`.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use plandoc_core::{
    NextTask, TaskView, check_numbering, get_next_task, get_summary, get_thread, list_threads,
    read_document,
};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn check(completed: bool) -> char {
    if completed { 'x' } else { ' ' }
}

fn print_task(task: &TaskView) {
    println!(
        "[{}] Task {}.{}: {}",
        check(task.completed),
        task.thread,
        task.number,
        task.title
    );
    println!("    classification: {}", task.classification);
    println!("    entrypoint:     {}", task.entrypoint);
    println!("    observable:     {}", task.observable);
    println!("    evidence:       {}", task.evidence);
    for step in &task.steps {
        println!(
            "    {}. [{}] {}",
            step.number,
            check(step.completed),
            step.description
        );
    }
}

// -----------------------------------------------------------------------
// plandoc summary
// -----------------------------------------------------------------------

pub fn run_summary(path: &Path, json: bool) -> Result<()> {
    let text = read_document(path)?;
    let summary = get_summary(&text)?;
    if json {
        return print_json(&summary);
    }

    println!("{}", summary.title.as_deref().unwrap_or("(untitled plan)"));
    for field in &summary.fields {
        println!("  {}: {}", field.label, field.value);
    }
    println!();
    println!(
        "Threads: {}  Tasks: {}/{} complete",
        summary.thread_count, summary.completed_task_count, summary.task_count
    );
    Ok(())
}

// -----------------------------------------------------------------------
// plandoc threads
// -----------------------------------------------------------------------

pub fn run_threads(path: &Path, json: bool) -> Result<()> {
    let text = read_document(path)?;
    let threads = list_threads(&text)?;
    if json {
        return print_json(&threads);
    }

    if threads.is_empty() {
        println!("No threads.");
        return Ok(());
    }
    for thread in &threads {
        println!(
            "{:>3}. {} ({}/{} complete)",
            thread.number, thread.title, thread.completed_count, thread.task_count
        );
    }
    Ok(())
}

// -----------------------------------------------------------------------
// plandoc show <thread>
// -----------------------------------------------------------------------

pub fn run_show(path: &Path, thread: u32, json: bool) -> Result<()> {
    let text = read_document(path)?;
    let view = get_thread(&text, thread)?;
    if json {
        return print_json(&view);
    }

    println!("Thread {}: {}", view.number, view.title);
    if !view.introduction.is_empty() {
        println!();
        println!("{}", view.introduction);
    }
    for task in &view.tasks {
        println!();
        print_task(task);
    }
    Ok(())
}

// -----------------------------------------------------------------------
// plandoc next
// -----------------------------------------------------------------------

pub fn run_next(path: &Path, json: bool) -> Result<()> {
    let text = read_document(path)?;
    let next = get_next_task(&text)?;
    if json {
        return print_json(&next);
    }

    match next {
        NextTask::Task { thread_title, task } => {
            println!("Thread {}: {}", task.thread, thread_title);
            print_task(&task);
        }
        NextTask::AllComplete => println!("All tasks complete."),
    }
    Ok(())
}

// -----------------------------------------------------------------------
// plandoc check-numbering
// -----------------------------------------------------------------------

pub fn run_check_numbering(path: &Path, json: bool) -> Result<()> {
    let text = read_document(path)?;
    let issues = check_numbering(&text)?;
    if json {
        return print_json(&issues);
    }

    if issues.is_empty() {
        println!("Numbering is dense.");
    } else {
        for issue in &issues {
            println!("  {issue}");
        }
        println!("Run `plandoc repair-numbering` to fix {} issue(s).", issues.len());
    }
    Ok(())
}
