//! Argument parsing helpers: task references, permutations, placements and
//! structured spec files.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;

use plandoc_core::Placement;

/// A `<thread>.<task>` reference such as `2.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRef {
    pub thread: u32,
    pub task: u32,
}

impl std::str::FromStr for TaskRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (thread, task) = s
            .split_once('.')
            .ok_or_else(|| format!("expected <thread>.<task>, got {s:?}"))?;
        let number = |part: &str| {
            part.parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("invalid number {part:?} in task reference {s:?}"))
        };
        Ok(Self {
            thread: number(thread)?,
            task: number(task)?,
        })
    }
}

impl std::fmt::Display for TaskRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.thread, self.task)
    }
}

/// Parse a comma-separated permutation such as `3,1,2`.
pub fn parse_order(input: &str) -> Result<Vec<u32>> {
    input
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<u32>()
                .with_context(|| format!("invalid number {part:?} in order {input:?}"))
        })
        .collect()
}

/// Build a placement from `--before` / `--after`; neither means the end.
pub fn placement(before: Option<u32>, after: Option<u32>) -> Result<Placement> {
    match (before, after) {
        (Some(_), Some(_)) => bail!("--before and --after are mutually exclusive"),
        (Some(n), None) => Ok(Placement::Before(n)),
        (None, Some(n)) => Ok(Placement::After(n)),
        (None, None) => Ok(Placement::End),
    }
}

/// Read a structured spec from a `.json` or TOML file.
pub fn load_spec<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read spec file: {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON from {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("failed to parse TOML from {}", path.display()))
    }
}
