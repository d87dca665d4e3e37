//! Shared fixtures for plandoc integration tests.
//!
//! Provides a sample plan document in the canonical layout, builders for
//! structured task/thread input, and small inspection helpers that go
//! through the public query API so tests assert on what a caller would see.

use plandoc_core::{Classification, StepSpec, TaskSpec, ThreadSpec, get_thread, list_threads};

/// A plan with a summary, three threads and no audit trail.
///
/// Thread 1 has three tasks (1.1 complete), thread 2 has two tasks with a
/// fenced code block in its introduction, thread 3 has no tasks.
pub const SAMPLE_PLAN: &str = "\
# Compiler Plan

## Summary

- **Classification:** greenfield
- **Owner:** language team

## Thread 1: Front end

Lexer and parser for the surface syntax.

### [x] Task 1.1: Lexer

- **Classification:** implementation
- **Entrypoint:** src/lexer.rs
- **Observable:** source text becomes a token stream
- **Evidence:** lexer unit tests pass

Steps:
- [x] keywords and identifiers
- [x] string literals

### [ ] Task 1.2: Parser

- **Classification:** implementation
- **Entrypoint:** src/parser.rs
- **Observable:** tokens become an AST
- **Evidence:** parser unit tests pass

Steps:
- [ ] expressions
- [ ] statements
- [ ] error recovery

### [ ] Task 1.3: Pretty printer

- **Classification:** refactor
- **Entrypoint:** src/pretty.rs
- **Observable:** AST prints back as source
- **Evidence:** round-trip tests

## Thread 2: Back end

Code generation. The IR looks like this:

```
## Thread 99: not a heading
### [ ] Task 9.9: not a task
```

### [ ] Task 2.1: Codegen

- **Classification:** implementation
- **Entrypoint:** src/codegen.rs
- **Observable:** binaries run
- **Evidence:** end-to-end tests

### [ ] Task 2.2: Optimizer

- **Classification:** investigation
- **Entrypoint:** src/opt.rs
- **Observable:** smaller output
- **Evidence:** benchmark report

## Thread 3: Release

Nothing scheduled yet.
";

/// A plan where every task is complete.
pub const COMPLETED_PLAN: &str = "\
# Done

## Thread 1: Only

### [x] Task 1.1: Ship

- **Classification:** docs
- **Entrypoint:** CHANGELOG.md
- **Observable:** release notes published
- **Evidence:** tag exists
";

/// A task spec with placeholder metadata and no steps.
pub fn task_spec(title: &str) -> TaskSpec {
    TaskSpec {
        title: title.to_owned(),
        completed: false,
        classification: Classification::Implementation,
        entrypoint: format!("src/{}.rs", title.to_lowercase().replace(' ', "_")),
        observable: format!("{title} works"),
        evidence: "tests pass".to_owned(),
        steps: Vec::new(),
    }
}

/// A task spec with the given step descriptions, all open.
pub fn task_spec_with_steps(title: &str, steps: &[&str]) -> TaskSpec {
    TaskSpec {
        steps: steps.iter().map(|s| StepSpec::new(*s)).collect(),
        ..task_spec(title)
    }
}

/// A thread spec with one task per title.
pub fn thread_spec(title: &str, task_titles: &[&str]) -> ThreadSpec {
    ThreadSpec {
        title: title.to_owned(),
        introduction: format!("Work on {title}."),
        tasks: task_titles.iter().map(|t| task_spec(t)).collect(),
    }
}

/// Thread numbers in document order.
pub fn thread_numbers(text: &str) -> Vec<u32> {
    list_threads(text)
        .expect("fixture should parse")
        .into_iter()
        .map(|t| t.number)
        .collect()
}

/// Thread titles in document order.
pub fn thread_titles(text: &str) -> Vec<String> {
    list_threads(text)
        .expect("fixture should parse")
        .into_iter()
        .map(|t| t.title)
        .collect()
}

/// `(number, title)` of every task in `thread`, in document order.
pub fn tasks_of(text: &str, thread: u32) -> Vec<(u32, String)> {
    get_thread(text, thread)
        .expect("thread should exist")
        .tasks
        .into_iter()
        .map(|t| (t.number, t.title))
        .collect()
}

/// Lines of the audit trail section that are entries.
pub fn audit_entries(text: &str) -> Vec<String> {
    let Some(start) = text.find("## Audit Trail") else {
        return Vec::new();
    };
    text[start..]
        .lines()
        .filter(|line| line.starts_with("- "))
        .map(str::to_owned)
        .collect()
}

/// Every task heading line outside code fences, for checking qualifiers.
pub fn task_headings(text: &str) -> Vec<String> {
    let mut in_fence = false;
    let mut headings = Vec::new();
    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        } else if !in_fence && line.starts_with("### [") {
            headings.push(line.to_owned());
        }
    }
    headings
}

/// The document text before its audit trail section.
pub fn without_audit(text: &str) -> &str {
    match text.find("## Audit Trail") {
        Some(start) => &text[..start],
        None => text,
    }
}
