//! Plan document engine: parse, query and edit markdown plan documents.
//!
//! A plan document is an ordered list of numbered threads, each holding
//! numbered tasks with fixed metadata and a checklist of steps, followed by
//! an append-only audit trail. Every operation here is a pure function from
//! document text to new text (or to a read-only view); storage is handled
//! separately by [`persist`].

pub mod audit;
pub mod document;
pub mod error;
pub mod input;
pub mod model;
pub mod ops;
pub mod persist;
pub mod queries;
pub mod renumber;
pub mod serialize;

pub use audit::AuditEntry;
pub use document::Document;
pub use error::{ParseError, PermutationDefect, PersistError, PlanError};
pub use input::{StepSpec, TaskSpec, ThreadSpec};
pub use model::{Classification, CompletionState, Operation, Placement, Target};
pub use ops::{
    add_step, delete_step, delete_task, delete_thread, insert_task, insert_thread,
    mark_step_complete, mark_step_incomplete, mark_task_complete, mark_task_incomplete, move_task,
    move_thread, reorder_tasks, reorder_threads, replace_task, replace_thread,
};
pub use persist::{read_document, write_atomic};
pub use queries::{
    DocumentSummary, NextTask, StepView, SummaryField, TaskView, ThreadSummary, ThreadView,
    get_next_task, get_summary, get_thread, list_threads,
};
pub use renumber::{NumberingIssue, check_numbering, repair_numbering};
pub use serialize::{render_task, render_thread};
