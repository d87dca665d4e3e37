//! Line-preserving building blocks of a parsed document.
//!
//! Every structural line keeps its original text in `raw`. Setters only
//! regenerate `raw` when a value actually changes, so untouched lines render
//! byte-for-byte as they were read.

use crate::model::Classification;

/// Split a raw line into its content and its terminator (`"\n"`, `"\r\n"`
/// or `""` for a final line without newline).
pub(crate) fn split_eol(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, "\n")
    } else {
        (raw, "")
    }
}

/// Line ending of a document: that of its first line, `"\n"` when the
/// first line has none.
pub(crate) fn detect_eol(text: &str) -> &'static str {
    let first = text.split_inclusive('\n').next().unwrap_or("");
    if first.ends_with("\r\n") { "\r\n" } else { "\n" }
}

/// Terminate a raw line that has no line ending with `eol`.
pub(crate) fn ensure_eol(raw: &mut String, eol: &str) -> bool {
    if raw.ends_with('\n') {
        false
    } else {
        raw.push_str(eol);
        true
    }
}

/// Rewrite `"\n"`-terminated text with `eol` terminators.
pub(crate) fn with_eol(text: &str, eol: &str) -> String {
    if eol == "\n" {
        return text.to_owned();
    }
    text.lines().map(|line| format!("{line}{eol}")).collect()
}

/// Join lines after dropping blank lines at both ends. Indentation of the
/// remaining lines is kept; only the last line loses trailing whitespace.
pub(crate) fn trim_blank_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    let lines: Vec<&str> = lines.into_iter().collect();
    let Some(start) = lines.iter().position(|line| !is_blank(line)) else {
        return String::new();
    };
    let end = lines.iter().rposition(|line| !is_blank(line)).unwrap_or(start);
    let mut out = lines[start..=end].join("\n");
    out.truncate(out.trim_end().len());
    out
}

/// Heading text from the `:` after the number to the end of the line, as
/// written. Renumbering keeps it untouched.
fn heading_tail(raw: &str, title: &str) -> String {
    let (content, _) = split_eol(raw);
    match content.find(':') {
        Some(idx) => content[idx..].to_owned(),
        None => format!(": {title}"),
    }
}

pub(crate) fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Checkbox marker as written: `' '` for open, `'x'`/`'X'` for done.
pub(crate) fn mark_for(completed: bool) -> char {
    if completed { 'x' } else { ' ' }
}

pub(crate) fn mark_is_done(mark: char) -> bool {
    mark == 'x' || mark == 'X'
}

// ---------------------------------------------------------------------------
// Headings
// ---------------------------------------------------------------------------

/// `## Thread <n>: <title>`
#[derive(Debug, Clone)]
pub(crate) struct ThreadHeading {
    pub number: u32,
    pub title: String,
    pub line: usize,
    tail: String,
    eol: String,
    raw: String,
}

impl ThreadHeading {
    pub(crate) fn new(number: u32, title: String, line: usize, raw: &str) -> Self {
        let (_, eol) = split_eol(raw);
        Self {
            tail: heading_tail(raw, &title),
            number,
            title,
            line,
            eol: eol.to_owned(),
            raw: raw.to_owned(),
        }
    }

    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn set_number(&mut self, number: u32) -> bool {
        if self.number == number {
            return false;
        }
        self.number = number;
        self.raw = format!("## Thread {}{}{}", self.number, self.tail, self.eol);
        true
    }

    pub(crate) fn ensure_eol(&mut self, eol: &str) {
        if ensure_eol(&mut self.raw, eol) {
            self.eol = eol.to_owned();
        }
    }
}

/// `### [<mark>] Task <thread>.<number>: <title>`
#[derive(Debug, Clone)]
pub(crate) struct TaskHeading {
    /// Thread qualifier as written; may be stale until renumbered.
    pub thread: u32,
    pub number: u32,
    pub title: String,
    pub line: usize,
    mark: char,
    tail: String,
    eol: String,
    raw: String,
}

impl TaskHeading {
    pub(crate) fn new(
        mark: char,
        thread: u32,
        number: u32,
        title: String,
        line: usize,
        raw: &str,
    ) -> Self {
        let (_, eol) = split_eol(raw);
        Self {
            tail: heading_tail(raw, &title),
            thread,
            number,
            title,
            line,
            mark,
            eol: eol.to_owned(),
            raw: raw.to_owned(),
        }
    }

    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn completed(&self) -> bool {
        mark_is_done(self.mark)
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        if self.completed() != completed {
            self.mark = mark_for(completed);
            self.rebuild();
        }
    }

    /// Set both numbers; returns whether the heading changed.
    pub(crate) fn set_numbers(&mut self, thread: u32, number: u32) -> bool {
        if self.thread == thread && self.number == number {
            return false;
        }
        self.thread = thread;
        self.number = number;
        self.rebuild();
        true
    }

    pub(crate) fn ensure_eol(&mut self, eol: &str) {
        if ensure_eol(&mut self.raw, eol) {
            self.eol = eol.to_owned();
        }
    }

    fn rebuild(&mut self) {
        self.raw = format!(
            "### [{}] Task {}.{}{}{}",
            self.mark, self.thread, self.number, self.tail, self.eol
        );
    }
}

// ---------------------------------------------------------------------------
// Task body lines
// ---------------------------------------------------------------------------

/// Fixed metadata labels of a task. These strings are a contract with any
/// external renderer and are never rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldLabel {
    Classification,
    Entrypoint,
    Observable,
    Evidence,
}

impl FieldLabel {
    pub(crate) const ALL: [FieldLabel; 4] = [
        Self::Classification,
        Self::Entrypoint,
        Self::Observable,
        Self::Evidence,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Classification => "Classification",
            Self::Entrypoint => "Entrypoint",
            Self::Observable => "Observable",
            Self::Evidence => "Evidence",
        }
    }

    pub(crate) fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == label)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FieldLine {
    pub label: FieldLabel,
    pub value: String,
    raw: String,
}

impl FieldLine {
    pub(crate) fn new(label: FieldLabel, value: String, raw: &str) -> Self {
        Self {
            label,
            value,
            raw: raw.to_owned(),
        }
    }
}

/// `<indent>- [<mark>] <description>`
#[derive(Debug, Clone)]
pub(crate) struct StepLine {
    pub description: String,
    indent: String,
    mark: char,
    eol: String,
    raw: String,
}

impl StepLine {
    pub(crate) fn new(indent: &str, mark: char, description: String, raw: &str) -> Self {
        let (_, eol) = split_eol(raw);
        Self {
            description,
            indent: indent.to_owned(),
            mark,
            eol: eol.to_owned(),
            raw: raw.to_owned(),
        }
    }

    pub(crate) fn indent(&self) -> &str {
        &self.indent
    }

    pub(crate) fn completed(&self) -> bool {
        mark_is_done(self.mark)
    }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        if self.completed() != completed {
            self.mark = mark_for(completed);
            self.raw = format!(
                "{}- [{}] {}{}",
                self.indent, self.mark, self.description, self.eol
            );
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum TaskLine {
    Field(FieldLine),
    Step(StepLine),
    Text(String),
}

impl TaskLine {
    pub(crate) fn raw(&self) -> &str {
        match self {
            Self::Field(f) => &f.raw,
            Self::Step(s) => &s.raw,
            Self::Text(t) => t,
        }
    }

    pub(crate) fn ensure_eol(&mut self, eol: &str) {
        match self {
            Self::Field(f) => {
                ensure_eol(&mut f.raw, eol);
            }
            Self::Step(s) => {
                if ensure_eol(&mut s.raw, eol) {
                    s.eol = eol.to_owned();
                }
            }
            Self::Text(t) => {
                ensure_eol(t, eol);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct TaskBlock {
    pub heading: TaskHeading,
    pub body: Vec<TaskLine>,
    /// Parsed value of the Classification field; valid once the block is
    /// closed by the parser.
    pub classification: Classification,
}

impl TaskBlock {
    pub(crate) fn new(heading: TaskHeading) -> Self {
        Self {
            heading,
            body: Vec::new(),
            classification: Classification::Implementation,
        }
    }

    pub(crate) fn completed(&self) -> bool {
        self.heading.completed()
    }

    pub(crate) fn field(&self, label: FieldLabel) -> Option<&str> {
        self.body.iter().find_map(|line| match line {
            TaskLine::Field(f) if f.label == label => Some(f.value.as_str()),
            _ => None,
        })
    }

    pub(crate) fn steps(&self) -> impl Iterator<Item = &StepLine> {
        self.body.iter().filter_map(|line| match line {
            TaskLine::Step(s) => Some(s),
            _ => None,
        })
    }

    pub(crate) fn steps_mut(&mut self) -> impl Iterator<Item = &mut StepLine> {
        self.body.iter_mut().filter_map(|line| match line {
            TaskLine::Step(s) => Some(s),
            _ => None,
        })
    }

    /// Index into `body` of the step at 0-based step position `pos`.
    pub(crate) fn step_line_index(&self, pos: usize) -> Option<usize> {
        self.body
            .iter()
            .enumerate()
            .filter(|(_, line)| matches!(line, TaskLine::Step(_)))
            .map(|(idx, _)| idx)
            .nth(pos)
    }

    pub(crate) fn ensure_trailing_eol(&mut self, eol: &str) {
        match self.body.last_mut() {
            Some(line) => line.ensure_eol(eol),
            None => self.heading.ensure_eol(eol),
        }
    }

    /// End the block with a blank line so a following block stays separate.
    pub(crate) fn ensure_trailing_blank(&mut self, eol: &str) {
        if self.body.last().is_some_and(|line| is_blank(line.raw())) {
            return;
        }
        self.ensure_trailing_eol(eol);
        self.body.push(TaskLine::Text(eol.to_owned()));
    }

    pub(crate) fn render_into(&self, out: &mut String) {
        out.push_str(self.heading.raw());
        for line in &self.body {
            out.push_str(line.raw());
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ThreadBlock {
    pub heading: ThreadHeading,
    /// Introduction lines between the heading and the first task.
    pub intro: Vec<String>,
    pub tasks: Vec<TaskBlock>,
}

impl ThreadBlock {
    pub(crate) fn new(heading: ThreadHeading) -> Self {
        Self {
            heading,
            intro: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Introduction text with surrounding blank lines removed.
    pub(crate) fn introduction(&self) -> String {
        trim_blank_lines(self.intro.iter().map(|raw| split_eol(raw).0))
    }

    /// Terminate the last line of the heading+introduction segment.
    pub(crate) fn ensure_intro_eol(&mut self, eol: &str) {
        match self.intro.last_mut() {
            Some(line) => {
                ensure_eol(line, eol);
            }
            None => self.heading.ensure_eol(eol),
        }
    }

    pub(crate) fn ensure_trailing_eol(&mut self, eol: &str) {
        match self.tasks.last_mut() {
            Some(task) => task.ensure_trailing_eol(eol),
            None => self.ensure_intro_eol(eol),
        }
    }

    /// End the heading+introduction segment with a blank line.
    pub(crate) fn ensure_intro_blank(&mut self, eol: &str) {
        if self.intro.last().is_some_and(|line| is_blank(line)) {
            return;
        }
        self.ensure_intro_eol(eol);
        self.intro.push(eol.to_owned());
    }

    pub(crate) fn ensure_trailing_blank(&mut self, eol: &str) {
        match self.tasks.last_mut() {
            Some(task) => task.ensure_trailing_blank(eol),
            None => self.ensure_intro_blank(eol),
        }
    }

    pub(crate) fn render_into(&self, out: &mut String) {
        out.push_str(self.heading.raw());
        for line in &self.intro {
            out.push_str(line);
        }
        for task in &self.tasks {
            task.render_into(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_eol_handles_all_terminators() {
        assert_eq!(split_eol("abc\n"), ("abc", "\n"));
        assert_eq!(split_eol("abc\r\n"), ("abc", "\r\n"));
        assert_eq!(split_eol("abc"), ("abc", ""));
    }

    #[test]
    fn task_heading_keeps_raw_until_changed() {
        let raw = "### [X] Task 1.2: Title  \r\n";
        let mut heading = TaskHeading::new('X', 1, 2, "Title  ".to_owned(), 1, raw);
        assert!(heading.completed());

        heading.set_completed(true);
        assert!(!heading.set_numbers(1, 2));
        assert_eq!(heading.raw(), raw);

        assert!(heading.set_numbers(3, 1));
        assert_eq!(heading.raw(), "### [X] Task 3.1: Title  \r\n");

        heading.set_completed(false);
        assert_eq!(heading.raw(), "### [ ] Task 3.1: Title  \r\n");
    }

    #[test]
    fn step_line_preserves_indent_on_toggle() {
        let mut step = StepLine::new("  ", ' ', "write tests".to_owned(), "  - [ ] write tests\n");
        step.set_completed(true);
        assert_eq!(TaskLine::Step(step).raw(), "  - [x] write tests\n");
    }

    #[test]
    fn introduction_is_trimmed() {
        let heading = ThreadHeading::new(1, "T".to_owned(), 1, "## Thread 1: T\n");
        let mut thread = ThreadBlock::new(heading);
        thread.intro = vec![
            "\n".to_owned(),
            "First paragraph.\n".to_owned(),
            "\n".to_owned(),
            "Second.\n".to_owned(),
            "\n".to_owned(),
        ];
        assert_eq!(thread.introduction(), "First paragraph.\n\nSecond.");
    }

    #[test]
    fn introduction_keeps_indentation() {
        let heading = ThreadHeading::new(1, "T".to_owned(), 1, "## Thread 1: T\n");
        let mut thread = ThreadBlock::new(heading);
        thread.intro = vec![
            "\n".to_owned(),
            "    indented code\r\n".to_owned(),
            "more  \n".to_owned(),
            "  \n".to_owned(),
        ];
        assert_eq!(thread.introduction(), "    indented code\nmore");
    }

    #[test]
    fn renumbering_keeps_heading_text_after_number() {
        let mut thread = ThreadHeading::new(1, "Alpha".to_owned(), 1, "## Thread 1:Alpha\n");
        assert!(thread.set_number(2));
        assert_eq!(thread.raw(), "## Thread 2:Alpha\n");

        let raw = "### [ ] Task 1.1:  Spaced  \n";
        let mut task = TaskHeading::new(' ', 1, 1, " Spaced  ".to_owned(), 1, raw);
        assert!(task.set_numbers(2, 3));
        assert_eq!(task.raw(), "### [ ] Task 2.3:  Spaced  \n");
    }

    #[test]
    fn detect_and_apply_line_endings() {
        assert_eq!(detect_eol("# Plan\r\n\n"), "\r\n");
        assert_eq!(detect_eol("# Plan\n"), "\n");
        assert_eq!(detect_eol("# Plan"), "\n");
        assert_eq!(with_eol("a\n\nb\n", "\r\n"), "a\r\n\r\nb\r\n");
        assert_eq!(with_eol("a\n", "\n"), "a\n");
    }

    #[test]
    fn ensure_trailing_blank_is_idempotent() {
        let heading = ThreadHeading::new(1, "T".to_owned(), 1, "## Thread 1: T");
        let mut thread = ThreadBlock::new(heading);
        thread.ensure_trailing_blank("\n");
        thread.ensure_trailing_blank("\n");
        let mut out = String::new();
        thread.render_into(&mut out);
        assert_eq!(out, "## Thread 1: T\n\n");
    }

    #[test]
    fn ensure_trailing_blank_uses_document_line_ending() {
        let heading = ThreadHeading::new(1, "T".to_owned(), 1, "## Thread 1: T");
        let mut thread = ThreadBlock::new(heading);
        thread.ensure_trailing_blank("\r\n");
        let mut out = String::new();
        thread.render_into(&mut out);
        assert_eq!(out, "## Thread 1: T\r\n\r\n");
    }

    #[test]
    fn ensure_trailing_eol_on_headings_only_thread() {
        let heading = ThreadHeading::new(1, "T".to_owned(), 1, "## Thread 1: T");
        let mut thread = ThreadBlock::new(heading);
        thread.ensure_trailing_eol("\n");
        let mut out = String::new();
        thread.render_into(&mut out);
        assert_eq!(out, "## Thread 1: T\n");
    }
}
