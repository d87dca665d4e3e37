//! Canonical text for structured threads and tasks.
//!
//! Output follows the same conventions the parser reads (heading levels,
//! checkbox markers, field labels), and blocks are built by parsing that
//! output, so what gets inserted is exactly what a later parse will see.

use crate::document::block::{
    FieldLabel, TaskBlock, ThreadBlock, mark_for, trim_blank_lines, with_eol,
};
use crate::document::parser;
use crate::error::{ParseError, PlanError};
use crate::input::{TaskSpec, ThreadSpec};
use crate::model::Operation;

/// Render one task block, numbered `<thread>.<number>`.
pub fn render_task(thread: u32, number: u32, spec: &TaskSpec) -> String {
    let mut out = format!(
        "### [{}] Task {thread}.{number}: {}\n\n",
        mark_for(spec.completed),
        spec.title
    );
    let values = [
        (FieldLabel::Classification, spec.classification.to_string()),
        (FieldLabel::Entrypoint, spec.entrypoint.clone()),
        (FieldLabel::Observable, spec.observable.clone()),
        (FieldLabel::Evidence, spec.evidence.clone()),
    ];
    for (label, value) in values {
        out.push_str(&format!("- **{}:** {value}\n", label.as_str()));
    }
    out.push('\n');
    if !spec.steps.is_empty() {
        out.push_str("Steps:\n");
        for step in &spec.steps {
            out.push_str(&render_step(step.completed, &step.description));
        }
        out.push('\n');
    }
    out
}

/// Render a thread block numbered `number`, its tasks numbered from 1.
pub fn render_thread(number: u32, spec: &ThreadSpec) -> String {
    let mut out = format!("## Thread {number}: {}\n\n", spec.title);
    let intro = trim_blank_lines(spec.introduction.lines());
    if !intro.is_empty() {
        out.push_str(&intro);
        out.push_str("\n\n");
    }
    for (idx, task) in spec.tasks.iter().enumerate() {
        out.push_str(&render_task(number, idx as u32 + 1, task));
    }
    out
}

pub(crate) fn render_step(completed: bool, description: &str) -> String {
    format!("- [{}] {description}\n", mark_for(completed))
}

fn reparse_failed(op: Operation, err: ParseError) -> PlanError {
    // Validated input always re-parses; reaching this means the input slipped
    // past validation, so report it as input trouble rather than a document
    // problem.
    PlanError::malformed(op, "spec", format!("rendered text does not parse: {err}"))
}

/// Validate `spec` and build the task block for it, with `eol` line endings.
pub(crate) fn task_block(
    op: Operation,
    thread: u32,
    number: u32,
    spec: &TaskSpec,
    eol: &str,
) -> Result<TaskBlock, PlanError> {
    spec.validate(op, "")?;
    let text = with_eol(&render_task(thread, number, spec), eol);
    let mut tasks = parser::parse_task_fragment(&text).map_err(|e| reparse_failed(op, e))?;
    match tasks.pop() {
        Some(block) if tasks.is_empty() => Ok(block),
        _ => Err(PlanError::malformed(
            op,
            "spec",
            "rendered text did not produce exactly one task",
        )),
    }
}

/// Validate `spec` and build the thread block for it, with `eol` line
/// endings.
pub(crate) fn thread_block(
    op: Operation,
    number: u32,
    spec: &ThreadSpec,
    eol: &str,
) -> Result<ThreadBlock, PlanError> {
    spec.validate(op)?;
    let text = with_eol(&render_thread(number, spec), eol);
    let mut doc = parser::parse_document(&text).map_err(|e| reparse_failed(op, e))?;
    match doc.threads.pop() {
        Some(block) if doc.threads.is_empty() && doc.preamble.is_empty() => Ok(block),
        _ => Err(PlanError::malformed(
            op,
            "spec",
            "rendered text did not produce exactly one thread",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StepSpec;
    use crate::model::Classification;

    fn spec() -> TaskSpec {
        TaskSpec {
            title: "Lexer".to_owned(),
            completed: true,
            classification: Classification::Test,
            entrypoint: "src/lexer.rs".to_owned(),
            observable: "tokens".to_owned(),
            evidence: "cargo test".to_owned(),
            steps: vec![
                StepSpec::new("scaffold"),
                StepSpec {
                    description: "edge cases".to_owned(),
                    completed: true,
                },
            ],
        }
    }

    #[test]
    fn renders_canonical_task() {
        let text = render_task(2, 3, &spec());
        assert_eq!(
            text,
            "### [x] Task 2.3: Lexer\n\
             \n\
             - **Classification:** test\n\
             - **Entrypoint:** src/lexer.rs\n\
             - **Observable:** tokens\n\
             - **Evidence:** cargo test\n\
             \n\
             Steps:\n\
             - [ ] scaffold\n\
             - [x] edge cases\n\
             \n"
        );
    }

    #[test]
    fn task_without_steps_has_no_steps_block() {
        let mut spec = spec();
        spec.steps.clear();
        let text = render_task(1, 1, &spec);
        assert!(!text.contains("Steps:"));
        assert!(text.ends_with("- **Evidence:** cargo test\n\n"));
    }

    #[test]
    fn task_block_reproduces_spec_fields() {
        let block = task_block(Operation::InsertTask, 2, 3, &spec(), "\n").unwrap();
        assert_eq!(block.heading.thread, 2);
        assert_eq!(block.heading.number, 3);
        assert_eq!(block.heading.title, "Lexer");
        assert!(block.completed());
        assert_eq!(block.classification, Classification::Test);
        assert_eq!(block.field(FieldLabel::Evidence), Some("cargo test"));
        assert_eq!(block.steps().count(), 2);
    }

    #[test]
    fn thread_block_numbers_tasks_from_one() {
        let thread = ThreadSpec {
            title: "Parsing".to_owned(),
            introduction: "\nWhy we parse.\n\n".to_owned(),
            tasks: vec![spec(), spec()],
        };
        let block = thread_block(Operation::InsertThread, 4, &thread, "\n").unwrap();
        assert_eq!(block.heading.number, 4);
        assert_eq!(block.introduction(), "Why we parse.");
        let numbers: Vec<(u32, u32)> = block
            .tasks
            .iter()
            .map(|t| (t.heading.thread, t.heading.number))
            .collect();
        assert_eq!(numbers, vec![(4, 1), (4, 2)]);
    }

    #[test]
    fn thread_block_keeps_indented_introduction() {
        let thread = ThreadSpec {
            title: "Codegen".to_owned(),
            introduction: "\n    emit(ir)\nthen link\n".to_owned(),
            tasks: vec![],
        };
        assert_eq!(
            render_thread(2, &thread),
            "## Thread 2: Codegen\n\n    emit(ir)\nthen link\n\n"
        );
        let block = thread_block(Operation::InsertThread, 2, &thread, "\n").unwrap();
        assert_eq!(block.introduction(), "    emit(ir)\nthen link");
    }

    #[test]
    fn crlf_blocks_have_no_bare_newlines() {
        let block = task_block(Operation::InsertTask, 1, 1, &spec(), "\r\n").unwrap();
        let mut out = String::new();
        block.render_into(&mut out);
        assert!(out.ends_with("\r\n"));
        assert_eq!(out.matches('\n').count(), out.matches("\r\n").count());
    }

    #[test]
    fn invalid_spec_is_rejected_before_rendering() {
        let mut bad = spec();
        bad.title = String::new();
        let err = task_block(Operation::ReplaceTask, 1, 1, &bad, "\n").unwrap_err();
        assert!(matches!(err, PlanError::MalformedInput { ref field, .. } if field == "title"));
    }
}
