//! Read-only projections over a plan document.
//!
//! Every query parses the text afresh and returns owned, serializable views;
//! nothing is cached between calls.

use serde::Serialize;

use crate::document::Document;
use crate::document::block::{FieldLabel, TaskBlock, ThreadBlock, split_eol};
use crate::error::PlanError;
use crate::model::{Classification, Operation};

/// One row of [`list_threads`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSummary {
    pub number: u32,
    pub title: String,
    pub task_count: usize,
    /// Tasks whose own flag is set; step state is not consulted.
    pub completed_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    /// 1-based position within the task.
    pub number: u32,
    pub description: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub thread: u32,
    pub number: u32,
    pub title: String,
    pub completed: bool,
    pub classification: Classification,
    pub entrypoint: String,
    pub observable: String,
    pub evidence: String,
    pub steps: Vec<StepView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadView {
    pub number: u32,
    pub title: String,
    pub introduction: String,
    pub tasks: Vec<TaskView>,
}

/// Result of [`get_next_task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NextTask {
    /// The first task whose completion flag is unset.
    Task { thread_title: String, task: TaskView },
    /// Every task in the document is complete (or there are none).
    AllComplete,
}

/// A `- **Label:** value` line from the document preamble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryField {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    /// Text of the first `# ` heading, if the document has one.
    pub title: Option<String>,
    pub fields: Vec<SummaryField>,
    pub thread_count: usize,
    pub task_count: usize,
    pub completed_task_count: usize,
}

impl DocumentSummary {
    /// Value of the summary field with `label`, if present.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }

    /// Document-level classification text.
    pub fn classification(&self) -> Option<&str> {
        self.field(FieldLabel::Classification.as_str())
    }
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

fn task_view(thread: u32, block: &TaskBlock) -> TaskView {
    let field = |label| block.field(label).unwrap_or_default().to_owned();
    TaskView {
        thread,
        number: block.heading.number,
        title: block.heading.title.clone(),
        completed: block.completed(),
        classification: block.classification,
        entrypoint: field(FieldLabel::Entrypoint),
        observable: field(FieldLabel::Observable),
        evidence: field(FieldLabel::Evidence),
        steps: block
            .steps()
            .enumerate()
            .map(|(idx, step)| StepView {
                number: idx as u32 + 1,
                description: step.description.clone(),
                completed: step.completed(),
            })
            .collect(),
    }
}

fn thread_view(block: &ThreadBlock) -> ThreadView {
    let number = block.heading.number;
    ThreadView {
        number,
        title: block.heading.title.clone(),
        introduction: block.introduction(),
        tasks: block.tasks.iter().map(|t| task_view(number, t)).collect(),
    }
}

/// Every thread with its task counts, in document order.
pub fn list_threads(text: &str) -> Result<Vec<ThreadSummary>, PlanError> {
    let doc = Document::load(Operation::ListThreads, text)?;
    Ok(doc
        .threads
        .iter()
        .map(|thread| ThreadSummary {
            number: thread.heading.number,
            title: thread.heading.title.clone(),
            task_count: thread.tasks.len(),
            completed_count: thread.tasks.iter().filter(|t| t.completed()).count(),
        })
        .collect())
}

/// Full detail of one thread.
pub fn get_thread(text: &str, thread: u32) -> Result<ThreadView, PlanError> {
    let op = Operation::GetThread;
    let doc = Document::load(op, text)?;
    let idx = doc.thread_index(op, thread)?;
    Ok(thread_view(&doc.threads[idx]))
}

/// The first incomplete task, scanning threads then tasks in ascending
/// number order.
pub fn get_next_task(text: &str) -> Result<NextTask, PlanError> {
    let doc = Document::load(Operation::GetNextTask, text)?;

    let mut threads: Vec<&ThreadBlock> = doc.threads.iter().collect();
    threads.sort_by_key(|t| t.heading.number);
    for thread in threads {
        let mut tasks: Vec<&TaskBlock> = thread.tasks.iter().collect();
        tasks.sort_by_key(|t| t.heading.number);
        if let Some(task) = tasks.into_iter().find(|t| !t.completed()) {
            return Ok(NextTask::Task {
                thread_title: thread.heading.title.clone(),
                task: task_view(thread.heading.number, task),
            });
        }
    }
    Ok(NextTask::AllComplete)
}

/// Title, summary fields and aggregate counts.
pub fn get_summary(text: &str) -> Result<DocumentSummary, PlanError> {
    let doc = Document::load(Operation::GetSummary, text)?;

    let mut title = None;
    let mut fields = Vec::new();
    let mut in_fence = false;
    for raw in &doc.preamble {
        let (content, _) = split_eol(raw);
        if content.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if title.is_none() {
            if let Some(text) = content.strip_prefix("# ") {
                title = Some(text.trim().to_owned());
                continue;
            }
        }
        if let Some(field) = summary_field(content) {
            fields.push(field);
        }
    }

    let task_count = doc.threads.iter().map(|t| t.tasks.len()).sum();
    let completed_task_count = doc
        .threads
        .iter()
        .flat_map(|t| &t.tasks)
        .filter(|t| t.completed())
        .count();

    Ok(DocumentSummary {
        title,
        fields,
        thread_count: doc.thread_count(),
        task_count,
        completed_task_count,
    })
}

fn summary_field(content: &str) -> Option<SummaryField> {
    let rest = content.strip_prefix("- **")?;
    let (label, value) = rest.split_once(":**")?;
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some(SummaryField {
        label: label.to_owned(),
        value: value.trim().to_owned(),
    })
}
