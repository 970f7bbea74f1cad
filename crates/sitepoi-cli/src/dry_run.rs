use crate::output::OutputWriter;
use serde::Serialize;
use std::fmt;

/// Work a run would do, reported instead of executed under `--dry-run`
#[derive(Debug, Clone, Serialize)]
pub struct PlannedAction {
    pub action_type: ActionType,
    pub description: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// One request to the POI source
    QueryPois,
    /// A staging or output file
    WriteFile,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionType::QueryPois => "query",
            ActionType::WriteFile => "write",
        })
    }
}

impl PlannedAction {
    pub fn new(action_type: ActionType, description: impl Into<String>) -> Self {
        Self { action_type, description: description.into(), details: Vec::new() }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }
}

/// Print what a run would do; nothing is sent or written
pub fn display_planned_actions(output: &OutputWriter, actions: &[PlannedAction]) -> anyhow::Result<()> {
    let queries = actions.iter().filter(|a| a.action_type == ActionType::QueryPois).count();

    if output.is_json() {
        return output.result(serde_json::json!({
            "dry_run": true,
            "query_count": queries,
            "planned_actions": actions,
        }));
    }

    output.section("Dry Run");
    for (i, action) in actions.iter().enumerate() {
        output.info(format!("{:>3}. [{}] {}", i + 1, action.action_type, action.description));
        for detail in &action.details {
            output.info(format!("       {}", detail));
        }
    }
    output.info(format!("\n{} POI queries planned; none were sent and no files were written.", queries));
    Ok(())
}
