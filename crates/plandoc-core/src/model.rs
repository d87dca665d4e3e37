use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Classification of a task. The set is closed: the document stores the
/// lowercase name and anything else is rejected by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Implementation,
    Refactor,
    Test,
    Docs,
    Investigation,
}

impl Classification {
    /// Every variant, in the order they are listed in error messages.
    pub const ALL: [Classification; 5] = [
        Self::Implementation,
        Self::Refactor,
        Self::Test,
        Self::Docs,
        Self::Investigation,
    ];
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Implementation => "implementation",
            Self::Refactor => "refactor",
            Self::Test => "test",
            Self::Docs => "docs",
            Self::Investigation => "investigation",
        };
        f.write_str(s)
    }
}

impl FromStr for Classification {
    type Err = ClassificationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "implementation" => Ok(Self::Implementation),
            "refactor" => Ok(Self::Refactor),
            "test" => Ok(Self::Test),
            "docs" => Ok(Self::Docs),
            "investigation" => Ok(Self::Investigation),
            other => Err(ClassificationParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Classification`] string.
#[derive(Debug, Clone)]
pub struct ClassificationParseError(pub String);

impl fmt::Display for ClassificationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = Classification::ALL.iter().map(|c| c.to_string()).collect();
        write!(
            f,
            "invalid classification: {:?} (expected one of {})",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for ClassificationParseError {}

// ---------------------------------------------------------------------------

/// Name of an engine operation. Used in audit entries and carried by every
/// error so callers can tell which call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ListThreads,
    GetThread,
    GetNextTask,
    GetSummary,
    CheckNumbering,
    MarkTaskComplete,
    MarkTaskIncomplete,
    MarkStepComplete,
    MarkStepIncomplete,
    AddStep,
    DeleteStep,
    InsertTask,
    DeleteTask,
    ReplaceTask,
    ReorderTasks,
    MoveTask,
    InsertThread,
    DeleteThread,
    ReplaceThread,
    ReorderThreads,
    MoveThread,
    RepairNumbering,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ListThreads => "list_threads",
            Self::GetThread => "get_thread",
            Self::GetNextTask => "get_next_task",
            Self::GetSummary => "get_summary",
            Self::CheckNumbering => "check_numbering",
            Self::MarkTaskComplete => "mark_task_complete",
            Self::MarkTaskIncomplete => "mark_task_incomplete",
            Self::MarkStepComplete => "mark_step_complete",
            Self::MarkStepIncomplete => "mark_step_incomplete",
            Self::AddStep => "add_step",
            Self::DeleteStep => "delete_step",
            Self::InsertTask => "insert_task",
            Self::DeleteTask => "delete_task",
            Self::ReplaceTask => "replace_task",
            Self::ReorderTasks => "reorder_tasks",
            Self::MoveTask => "move_task",
            Self::InsertThread => "insert_thread",
            Self::DeleteThread => "delete_thread",
            Self::ReplaceThread => "replace_thread",
            Self::ReorderThreads => "reorder_threads",
            Self::MoveThread => "move_thread",
            Self::RepairNumbering => "repair_numbering",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------

/// Completion state of a task or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
    Complete,
    Incomplete,
}

impl CompletionState {
    pub fn from_flag(completed: bool) -> Self {
        if completed {
            Self::Complete
        } else {
            Self::Incomplete
        }
    }
}

impl fmt::Display for CompletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("complete"),
            Self::Incomplete => f.write_str("incomplete"),
        }
    }
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// A reference to an element of the document by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    Thread(u32),
    Task { thread: u32, task: u32 },
    /// `step` is the 1-based position of the step within its task.
    Step { thread: u32, task: u32, step: u32 },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thread(n) => write!(f, "thread {n}"),
            Self::Task { thread, task } => write!(f, "task {thread}.{task}"),
            Self::Step { thread, task, step } => {
                write!(f, "step {step} of task {thread}.{task}")
            }
        }
    }
}

/// Where a new or moved element lands relative to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Immediately before the element with this number.
    Before(u32),
    /// Immediately after the element with this number.
    After(u32),
    /// After the last element of the scope (the only choice for an empty scope).
    End,
}
