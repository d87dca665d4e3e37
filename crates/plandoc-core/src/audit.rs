//! Append-only audit trail kept at the end of the document.
//!
//! Entry format: `- <UTC timestamp> | <operation> | <rationale>`.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::document::Document;
use crate::document::block::{ensure_eol, is_blank};
use crate::document::parser::AUDIT_HEADING;
use crate::error::PlanError;
use crate::model::Operation;

/// One audit trail record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub rationale: String,
}

impl AuditEntry {
    /// Build an entry stamped with the current time. The rationale must be
    /// non-empty; internal whitespace (including newlines) collapses to
    /// single spaces so the entry stays on one line.
    pub fn now(operation: Operation, rationale: &str) -> Result<Self, PlanError> {
        Self::at(Utc::now(), operation, rationale)
    }

    pub fn at(
        timestamp: DateTime<Utc>,
        operation: Operation,
        rationale: &str,
    ) -> Result<Self, PlanError> {
        let rationale = rationale.split_whitespace().collect::<Vec<_>>().join(" ");
        if rationale.is_empty() {
            return Err(PlanError::malformed(
                operation,
                "rationale",
                "a rationale is required for this operation",
            ));
        }
        Ok(Self {
            timestamp,
            operation,
            rationale,
        })
    }

    /// The entry as a document line, without its terminator.
    pub fn to_line(&self) -> String {
        format!(
            "- {} | {} | {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.operation,
            self.rationale
        )
    }
}

impl Document {
    /// Append an entry, creating the audit trail section if the document has
    /// none. Existing entries are never touched.
    pub(crate) fn append_audit(&mut self, entry: &AuditEntry) {
        self.seal();
        let eol = self.eol;
        let line = format!("{}{eol}", entry.to_line());
        match self.audit.as_mut() {
            Some(section) => {
                // Insert after the last non-blank line so trailing blank lines
                // stay at the end of the section.
                let insert_at = section
                    .iter()
                    .rposition(|l| !is_blank(l))
                    .map_or(section.len(), |idx| idx + 1);
                if let Some(prev) = insert_at.checked_sub(1).and_then(|i| section.get_mut(i)) {
                    ensure_eol(prev, eol);
                }
                section.insert(insert_at, line);
            }
            None => {
                let needs_gap = self.ensure_trailing_blank_line();
                let mut section = Vec::with_capacity(3);
                if needs_gap {
                    section.push(eol.to_owned());
                }
                section.push(format!("{AUDIT_HEADING}{eol}"));
                section.push(eol.to_owned());
                section.push(line);
                self.audit = Some(section);
            }
        }
    }

    /// Terminate the document's last line; returns whether a blank line is
    /// still needed before new content.
    fn ensure_trailing_blank_line(&mut self) -> bool {
        let rendered = self.render();
        if rendered.is_empty() {
            return false;
        }
        if !rendered.ends_with('\n') {
            self.terminate_last_line();
        }
        !is_blank(rendered.lines().last().unwrap_or(""))
    }

    fn terminate_last_line(&mut self) {
        let eol = self.eol;
        if let Some(thread) = self.threads.last_mut() {
            thread.ensure_trailing_eol(eol);
        } else if let Some(line) = self.preamble.last_mut() {
            ensure_eol(line, eol);
        }
    }
}
