//! Mutation operations: pure text-to-text edits of a plan document.
//!
//! Every operation re-parses the input, validates all references and input
//! before changing anything, renumbers the affected scope after structural
//! edits, appends one audit entry, and returns the new text. On error the
//! caller's text is untouched because nothing is edited in place.

mod permutation;
pub mod step;
pub mod task;
pub mod thread;

use tracing::info;

use crate::audit::AuditEntry;
use crate::document::Document;
use crate::error::PlanError;
use crate::model::{Operation, Placement};

pub use step::{add_step, delete_step, mark_step_complete, mark_step_incomplete};
pub use task::{
    delete_task, insert_task, mark_task_complete, mark_task_incomplete, move_task, reorder_tasks,
    replace_task,
};
pub use thread::{delete_thread, insert_thread, move_thread, reorder_threads, replace_thread};

/// Run one audited edit: parse, apply, record, render.
fn apply<F>(op: Operation, text: &str, rationale: &str, edit: F) -> Result<String, PlanError>
where
    F: FnOnce(&mut Document) -> Result<(), PlanError>,
{
    let entry = AuditEntry::now(op, rationale)?;
    let mut doc = Document::load(op, text)?;
    edit(&mut doc)?;
    doc.seal();
    doc.append_audit(&entry);
    info!(op = %op, rationale = %entry.rationale, "applied plan edit");
    Ok(doc.render())
}

/// Index at which an element lands for `placement`, given the index of the
/// anchor element (if any) and the current length of the sequence.
fn landing_index(placement: Placement, anchor: Option<usize>, len: usize) -> usize {
    match (placement, anchor) {
        (Placement::Before(_), Some(idx)) => idx,
        (Placement::After(_), Some(idx)) => idx + 1,
        _ => len,
    }
}

/// Move `items[from]` so it sits before/after `items[anchor]`, or at the
/// end. Returns the index it lands at.
fn move_item<T>(
    items: &mut Vec<T>,
    from: usize,
    placement: Placement,
    anchor: Option<usize>,
) -> usize {
    let item = items.remove(from);
    let anchor = anchor.map(|a| if from < a { a - 1 } else { a });
    let at = landing_index(placement, anchor, items.len());
    items.insert(at, item);
    at
}

/// Anchor number named by a placement, if any.
fn anchor_number(placement: Placement) -> Option<u32> {
    match placement {
        Placement::Before(n) | Placement::After(n) => Some(n),
        Placement::End => None,
    }
}
