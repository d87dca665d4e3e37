//! Line state machine that turns plan text into a [`Document`].
//!
//! States advance Preamble -> ThreadIntro <-> TaskBody -> Audit. Each line is
//! classified once: section boundary (`##`), task heading (`###`), metadata
//! field, step checkbox, or free text. Free text is kept verbatim in whatever
//! element is open. Anything that could be read two ways is a [`ParseError`].

use crate::error::ParseError;
use crate::model::Classification;

use super::Document;
use super::block::{
    FieldLabel, FieldLine, StepLine, TaskBlock, TaskHeading, TaskLine, ThreadBlock,
    ThreadHeading, detect_eol, split_eol,
};

pub(crate) const AUDIT_HEADING: &str = "## Audit Trail";
const THREAD_PREFIX: &str = "## Thread ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Preamble,
    ThreadIntro,
    TaskBody,
    Audit,
}

pub(crate) struct Parser {
    doc: Document,
    state: State,
    /// Line number of the currently open code fence.
    fence_open: Option<usize>,
}

/// Parse a complete document.
pub(crate) fn parse_document(text: &str) -> Result<Document, ParseError> {
    let mut parser = Parser::new();
    parser.doc.eol = detect_eol(text);
    for (idx, raw) in text.split_inclusive('\n').enumerate() {
        parser.feed(idx + 1, raw)?;
    }
    parser.finish()
}

/// Parse a fragment holding only task blocks, as if it appeared inside a
/// thread. Used to turn serializer output back into blocks.
pub(crate) fn parse_task_fragment(text: &str) -> Result<Vec<TaskBlock>, ParseError> {
    let mut parser = Parser::new();
    let host = ThreadHeading::new(0, String::new(), 0, "");
    parser.doc.threads.push(ThreadBlock::new(host));
    parser.state = State::ThreadIntro;
    for (idx, raw) in text.split_inclusive('\n').enumerate() {
        parser.feed(idx + 1, raw)?;
    }
    let mut doc = parser.finish()?;
    let host = doc.threads.pop().unwrap_or_else(|| {
        ThreadBlock::new(ThreadHeading::new(0, String::new(), 0, ""))
    });
    if host.intro.iter().any(|line| !super::block::is_blank(line)) {
        return Err(ParseError::new(1, "task fragment has text before its first task"));
    }
    Ok(host.tasks)
}

impl Parser {
    fn new() -> Self {
        Self {
            doc: Document::default(),
            state: State::Preamble,
            fence_open: None,
        }
    }

    fn feed(&mut self, line_no: usize, raw: &str) -> Result<(), ParseError> {
        let (content, _) = split_eol(raw);
        let is_fence = content.trim_start().starts_with("```");

        if is_fence || self.fence_open.is_some() {
            if is_fence {
                self.fence_open = match self.fence_open {
                    Some(_) => None,
                    None => Some(line_no),
                };
            }
            self.push_text(raw);
            return Ok(());
        }

        if self.state == State::Audit {
            if content.starts_with(THREAD_PREFIX) {
                return Err(ParseError::new(
                    line_no,
                    "thread heading after the audit trail section",
                ));
            }
            if content.trim_end() == AUDIT_HEADING {
                return Err(ParseError::new(line_no, "duplicate audit trail section"));
            }
            self.push_text(raw);
            return Ok(());
        }

        if content.trim_end() == AUDIT_HEADING {
            self.close_task()?;
            self.doc.audit = Some(vec![raw.to_owned()]);
            self.state = State::Audit;
            return Ok(());
        }

        if content.starts_with(THREAD_PREFIX) {
            let heading = parse_thread_heading(line_no, content, raw)?;
            self.close_task()?;
            self.doc.threads.push(ThreadBlock::new(heading));
            self.state = State::ThreadIntro;
            return Ok(());
        }

        if content.starts_with("## ") {
            if self.state == State::Preamble {
                self.push_text(raw);
                return Ok(());
            }
            return Err(ParseError::new(
                line_no,
                format!("unrecognized section heading {content:?} after the first thread"),
            ));
        }

        if content.starts_with("### [") || content.starts_with("### Task ") {
            if self.state == State::Preamble {
                return Err(ParseError::new(
                    line_no,
                    "task heading appears before the first thread",
                ));
            }
            let heading = parse_task_heading(line_no, content, raw)?;
            self.close_task()?;
            if let Some(thread) = self.doc.threads.last_mut() {
                thread.tasks.push(TaskBlock::new(heading));
            }
            self.state = State::TaskBody;
            return Ok(());
        }

        if self.state == State::TaskBody {
            let Some(task) = self.open_task_mut() else {
                return Err(ParseError::new(line_no, "task body without a task heading"));
            };
            let line = match parse_field_line(content, raw) {
                Some(field) => {
                    if task.field(field.label).is_some() {
                        return Err(ParseError::new(
                            line_no,
                            format!(
                                "task {}.{} has a second {} field",
                                task.heading.thread,
                                task.heading.number,
                                field.label.as_str()
                            ),
                        ));
                    }
                    if field.label == FieldLabel::Classification {
                        task.classification = field
                            .value
                            .trim()
                            .parse::<Classification>()
                            .map_err(|e| ParseError::new(line_no, e.to_string()))?;
                    }
                    TaskLine::Field(field)
                }
                None => match parse_step_line(content, raw) {
                    Some(step) => TaskLine::Step(step),
                    None => TaskLine::Text(raw.to_owned()),
                },
            };
            task.body.push(line);
            return Ok(());
        }

        self.push_text(raw);
        Ok(())
    }

    fn finish(mut self) -> Result<Document, ParseError> {
        if let Some(line) = self.fence_open {
            return Err(ParseError::new(line, "code fence is never closed"));
        }
        self.close_task()?;
        tracing::debug!(
            threads = self.doc.threads.len(),
            audit = self.doc.audit.is_some(),
            "parsed plan document"
        );
        Ok(self.doc)
    }

    /// Validate the task being closed: every metadata field present.
    fn close_task(&mut self) -> Result<(), ParseError> {
        if self.state != State::TaskBody {
            return Ok(());
        }
        let Some(task) = self.doc.threads.last().and_then(|t| t.tasks.last()) else {
            return Ok(());
        };
        for label in FieldLabel::ALL {
            if task.field(label).is_none() {
                return Err(ParseError::new(
                    task.heading.line,
                    format!(
                        "task {}.{} is missing the {} field",
                        task.heading.thread,
                        task.heading.number,
                        label.as_str()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn open_task_mut(&mut self) -> Option<&mut TaskBlock> {
        self.doc.threads.last_mut().and_then(|t| t.tasks.last_mut())
    }

    fn push_text(&mut self, raw: &str) {
        let raw = raw.to_owned();
        match self.state {
            State::Preamble => self.doc.preamble.push(raw),
            State::ThreadIntro => {
                if let Some(thread) = self.doc.threads.last_mut() {
                    thread.intro.push(raw);
                }
            }
            State::TaskBody => {
                if let Some(task) = self.open_task_mut() {
                    task.body.push(TaskLine::Text(raw));
                }
            }
            State::Audit => {
                if let Some(audit) = self.doc.audit.as_mut() {
                    audit.push(raw);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Line recognizers
// ---------------------------------------------------------------------------

fn parse_number(line_no: usize, text: &str, what: &str) -> Result<u32, ParseError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(
            line_no,
            format!("{what} number {text:?} is not a number"),
        ));
    }
    text.parse::<u32>()
        .map_err(|_| ParseError::new(line_no, format!("{what} number {text:?} is out of range")))
}

/// Split `"<numbers>: <title>"` into the numbers and the title.
fn split_title(line_no: usize, rest: &str, what: &str) -> Result<(String, String), ParseError> {
    let (numbers, title) = rest
        .split_once(':')
        .ok_or_else(|| ParseError::new(line_no, format!("{what} heading has no ':' after its number")))?;
    let title = title.strip_prefix(' ').unwrap_or(title);
    Ok((numbers.to_owned(), title.to_owned()))
}

fn parse_thread_heading(
    line_no: usize,
    content: &str,
    raw: &str,
) -> Result<ThreadHeading, ParseError> {
    let rest = &content[THREAD_PREFIX.len()..];
    let (number, title) = split_title(line_no, rest, "thread")?;
    let number = parse_number(line_no, &number, "thread")?;
    Ok(ThreadHeading::new(number, title, line_no, raw))
}

fn parse_task_heading(line_no: usize, content: &str, raw: &str) -> Result<TaskHeading, ParseError> {
    let rest = &content["### ".len()..];
    let rest = rest.strip_prefix('[').ok_or_else(|| {
        ParseError::new(line_no, "task heading is missing its completion marker `[ ]`")
    })?;
    let mut chars = rest.chars();
    let mark = chars.next().unwrap_or(']');
    if !matches!(mark, ' ' | 'x' | 'X') {
        return Err(ParseError::new(
            line_no,
            format!("task heading has invalid completion marker {mark:?}"),
        ));
    }
    let rest = chars.as_str().strip_prefix("] Task ").ok_or_else(|| {
        ParseError::new(line_no, "task heading must read `### [ ] Task <thread>.<task>: <title>`")
    })?;
    let (numbers, title) = split_title(line_no, rest, "task")?;
    let (thread, number) = numbers.split_once('.').ok_or_else(|| {
        ParseError::new(
            line_no,
            format!("task number {numbers:?} must be qualified as <thread>.<task>"),
        )
    })?;
    let thread = parse_number(line_no, thread, "thread")?;
    let number = parse_number(line_no, number, "task")?;
    Ok(TaskHeading::new(mark, thread, number, title, line_no, raw))
}

/// `- **<Label>:** <value>` for one of the fixed labels.
fn parse_field_line(content: &str, raw: &str) -> Option<FieldLine> {
    let rest = content.strip_prefix("- **")?;
    let (label, value) = rest.split_once(":**")?;
    let label = FieldLabel::from_label(label)?;
    let value = value.strip_prefix(' ').unwrap_or(value);
    Some(FieldLine::new(label, value.to_owned(), raw))
}

/// `<indent>- [<mark>] <description>`
fn parse_step_line(content: &str, raw: &str) -> Option<StepLine> {
    let trimmed = content.trim_start();
    let indent = &content[..content.len() - trimmed.len()];
    let rest = trimmed.strip_prefix("- [")?;
    let mut chars = rest.chars();
    let mark = chars.next()?;
    if !matches!(mark, ' ' | 'x' | 'X') {
        return None;
    }
    let description = chars.as_str().strip_prefix("] ")?;
    Some(StepLine::new(indent, mark, description.to_owned(), raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASK: &str = "\
### [ ] Task 1.1: Lexer

- **Classification:** implementation
- **Entrypoint:** src/lexer.rs
- **Observable:** tokens are emitted
- **Evidence:** unit tests

Steps:
- [x] scaffold
  - [ ] keywords
";

    fn doc(body: &str) -> String {
        format!("# Plan\n\n## Thread 1: Parsing\n\nIntro.\n\n{body}")
    }

    #[test]
    fn parses_thread_task_and_steps() {
        let text = doc(TASK);
        let doc = parse_document(&text).expect("should parse");
        assert_eq!(doc.threads.len(), 1);
        let thread = &doc.threads[0];
        assert_eq!(thread.heading.number, 1);
        assert_eq!(thread.heading.title, "Parsing");
        assert_eq!(thread.introduction(), "Intro.");

        let task = &thread.tasks[0];
        assert_eq!(task.heading.title, "Lexer");
        assert!(!task.completed());
        assert_eq!(task.classification, Classification::Implementation);
        assert_eq!(task.field(FieldLabel::Entrypoint), Some("src/lexer.rs"));
        let steps: Vec<(&str, bool)> = task
            .steps()
            .map(|s| (s.description.as_str(), s.completed()))
            .collect();
        assert_eq!(steps, vec![("scaffold", true), ("keywords", false)]);
    }

    #[test]
    fn rejects_task_before_thread() {
        let err = parse_document(TASK).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.reason.contains("before the first thread"), "{err}");
    }

    #[test]
    fn rejects_missing_field_at_heading_line() {
        let text = doc(&TASK.replace("- **Evidence:** unit tests\n", ""));
        let err = parse_document(&text).unwrap_err();
        assert_eq!(err.line, 7);
        assert!(err.reason.contains("missing the Evidence field"), "{err}");
    }

    #[test]
    fn rejects_duplicate_field() {
        let text = doc(&TASK.replace(
            "- **Evidence:** unit tests\n",
            "- **Evidence:** unit tests\n- **Evidence:** again\n",
        ));
        let err = parse_document(&text).unwrap_err();
        assert!(err.reason.contains("second Evidence field"), "{err}");
    }

    #[test]
    fn rejects_unknown_classification() {
        let text = doc(&TASK.replace("implementation", "chore"));
        let err = parse_document(&text).unwrap_err();
        assert!(err.reason.contains("invalid classification"), "{err}");
    }

    #[test]
    fn rejects_malformed_task_heading() {
        let text = doc("### [?] Task 1.1: Odd\n");
        let err = parse_document(&text).unwrap_err();
        assert!(err.reason.contains("invalid completion marker"), "{err}");

        let text = doc("### Task 1.1: No marker\n");
        let err = parse_document(&text).unwrap_err();
        assert!(err.reason.contains("completion marker"), "{err}");

        let text = doc("### [ ] Task 3: Unqualified\n");
        let err = parse_document(&text).unwrap_err();
        assert!(err.reason.contains("<thread>.<task>"), "{err}");
    }

    #[test]
    fn rejects_unknown_section_after_threads() {
        let text = doc("## Appendix\n");
        let err = parse_document(&text).unwrap_err();
        assert!(err.reason.contains("unrecognized section heading"), "{err}");
    }

    #[test]
    fn allows_extra_sections_in_preamble() {
        let text = "# Plan\n\n## Summary\n\n## Context\n\n## Thread 1: A\n";
        let doc = parse_document(text).expect("should parse");
        assert_eq!(doc.preamble.len(), 6);
    }

    #[test]
    fn audit_trail_must_be_last_and_unique() {
        let text = "## Audit Trail\n\n## Thread 1: Late\n";
        let err = parse_document(text).unwrap_err();
        assert_eq!(err.line, 3);

        let text = "## Audit Trail\n## Audit Trail\n";
        let err = parse_document(text).unwrap_err();
        assert!(err.reason.contains("duplicate audit trail"), "{err}");
    }

    #[test]
    fn fenced_lines_are_text() {
        let text = "## Thread 1: A\n\n```md\n## Thread 9: not real\n### [ ] Task 9.9: nope\n```\n";
        let doc = parse_document(text).expect("should parse");
        assert_eq!(doc.threads.len(), 1);
        assert!(doc.threads[0].tasks.is_empty());
        assert_eq!(doc.threads[0].intro.len(), 5);
    }

    #[test]
    fn rejects_unterminated_fence() {
        let err = parse_document("## Thread 1: A\n```\ncode\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn unknown_bold_labels_are_text() {
        let text = doc(&TASK.replace("Steps:\n", "- **Owner:** sam\nSteps:\n"));
        let doc = parse_document(&text).expect("should parse");
        let task = &doc.threads[0].tasks[0];
        assert!(
            task.body
                .iter()
                .any(|l| matches!(l, TaskLine::Text(t) if t == "- **Owner:** sam\n"))
        );
    }

    #[test]
    fn accepts_non_dense_numbers() {
        let text = "## Thread 4: A\n\n## Thread 4: B\n";
        let doc = parse_document(text).expect("numbering is checked at lookup time");
        assert_eq!(doc.threads.len(), 2);
    }

    #[test]
    fn task_fragment_round_trip() {
        let tasks = parse_task_fragment(TASK).expect("should parse");
        assert_eq!(tasks.len(), 1);
        let mut out = String::new();
        tasks[0].render_into(&mut out);
        assert_eq!(out, TASK);
    }
}
