//! Recommendation document model
//!
//! The structured plan produced by the advisory service: AI workflows to
//! build, human roles to hire, and phased budgets. Workflow and role items are
//! addressed positionally (`wf-{index}` / `role-{index}`), so the arrays must
//! never be reordered once a report is saved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::null_default;

/// A monetary amount in XZT
///
/// Usually a number, but generated plans sometimes carry free text such as
/// "500-800".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Amount {
    /// True when the amount carries no information (zero or blank)
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(n) => n.as_f64().map(|v| v == 0.0).unwrap_or(false),
            Self::Text(s) => s.trim().is_empty(),
        }
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    write!(f, "{}", n)
                } else {
                    match n.as_f64() {
                        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", v as i64),
                        _ => write!(f, "{}", n),
                    }
                }
            }
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Budget breakdown for a phase: itemized entries or a prose description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BudgetBreakdown {
    Itemized(BTreeMap<String, Amount>),
    Text(String),
}

/// Publication status of a workflow or role item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// A task draft exists but has not been published yet
    DraftCreated,
    /// A task is live in the task system
    Published,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DraftCreated => write!(f, "draft_created"),
            Self::Published => write!(f, "published"),
        }
    }
}

/// Status and task link of one item; `None` status means unpublished
///
/// Also the body of the item update request, so both fields always serialize
/// (explicit `null` clears them server-side).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemState {
    pub status: Option<ItemStatus>,
    pub task_id: Option<String>,
}

impl ItemState {
    pub fn published(task_id: impl Into<String>) -> Self {
        Self {
            status: Some(ItemStatus::Published),
            task_id: Some(task_id.into()),
        }
    }

    pub fn unpublished() -> Self {
        Self::default()
    }

    pub fn is_unpublished(&self) -> bool {
        self.status.is_none()
    }
}

/// Which list an item lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    Workflow,
    Role,
}

impl ItemKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Workflow => "wf",
            Self::Role => "role",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workflow => write!(f, "workflow"),
            Self::Role => write!(f, "role"),
        }
    }
}

/// Positional identity of a workflow or role item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    pub kind: ItemKind,
    pub index: usize,
}

impl ItemId {
    pub fn workflow(index: usize) -> Self {
        Self {
            kind: ItemKind::Workflow,
            index,
        }
    }

    pub fn role(index: usize) -> Self {
        Self {
            kind: ItemKind::Role,
            index,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.prefix(), self.index)
    }
}

impl FromStr for ItemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, index) = s
            .rsplit_once('-')
            .ok_or_else(|| format!("Invalid item id: {}. Use wf-N or role-N", s))?;
        let index: usize = index
            .parse()
            .map_err(|_| format!("Invalid item index in {}: expected a number", s))?;
        match prefix {
            "wf" => Ok(Self::workflow(index)),
            "role" => Ok(Self::role(index)),
            _ => Err(format!("Invalid item id: {}. Use wf-N or role-N", s)),
        }
    }
}

/// An AI workflow to build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workflow {
    #[serde(deserialize_with = "null_default")]
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub description: String,
    #[serde(deserialize_with = "null_default")]
    pub input_requirements: String,
    #[serde(deserialize_with = "null_default")]
    pub output_requirements: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<Amount>,
    #[serde(deserialize_with = "null_default")]
    pub priority: String,
    #[serde(deserialize_with = "null_default")]
    pub complexity: String,
    #[serde(deserialize_with = "null_default")]
    pub tools_needed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// A human role to hire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanRole {
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub responsibilities: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub requirements: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub work_hours: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<Amount>,
    #[serde(deserialize_with = "null_default")]
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_period_criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// An implementation phase with its budget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Phase {
    #[serde(deserialize_with = "null_default")]
    pub phase_name: String,
    #[serde(deserialize_with = "null_default")]
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_breakdown: Option<BudgetBreakdown>,
    #[serde(deserialize_with = "null_default")]
    pub milestones: Vec<String>,
}

/// The structured recommendation produced at the end of a conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_goal: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_default")]
    pub ai_workflows: Vec<Workflow>,
    #[serde(deserialize_with = "null_default")]
    pub human_roles: Vec<HumanRole>,
    #[serde(deserialize_with = "null_default")]
    pub phases: Vec<Phase>,
    /// Item states recorded by the report service, keyed by item id
    #[serde(skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "null_default")]
    pub item_statuses: BTreeMap<String, ItemState>,
}

impl RecommendationDocument {
    pub fn workflow(&self, index: usize) -> Option<&Workflow> {
        self.ai_workflows.get(index)
    }

    pub fn role(&self, index: usize) -> Option<&HumanRole> {
        self.human_roles.get(index)
    }

    /// Does the document address this item?
    pub fn contains(&self, id: ItemId) -> bool {
        match id.kind {
            ItemKind::Workflow => id.index < self.ai_workflows.len(),
            ItemKind::Role => id.index < self.human_roles.len(),
        }
    }

    /// Current state of an item, or `None` if the id is out of range
    ///
    /// A recorded entry in `item_statuses` takes precedence over the inline
    /// fields on the item.
    pub fn item_state(&self, id: ItemId) -> Option<ItemState> {
        if !self.contains(id) {
            return None;
        }
        if let Some(state) = self.item_statuses.get(&id.to_string()) {
            return Some(state.clone());
        }
        let state = match id.kind {
            ItemKind::Workflow => {
                let wf = &self.ai_workflows[id.index];
                ItemState {
                    status: wf.status,
                    task_id: wf.task_id.clone(),
                }
            }
            ItemKind::Role => {
                let role = &self.human_roles[id.index];
                ItemState {
                    status: role.status,
                    task_id: role.task_id.clone(),
                }
            }
        };
        Some(state)
    }

    /// Record a new state for an item; returns false if the id is out of range
    pub fn apply_item_state(&mut self, id: ItemId, state: &ItemState) -> bool {
        match id.kind {
            ItemKind::Workflow => match self.ai_workflows.get_mut(id.index) {
                Some(wf) => {
                    wf.status = state.status;
                    wf.task_id = state.task_id.clone();
                }
                None => return false,
            },
            ItemKind::Role => match self.human_roles.get_mut(id.index) {
                Some(role) => {
                    role.status = state.status;
                    role.task_id = state.task_id.clone();
                }
                None => return false,
            },
        }
        if let Some(entry) = self.item_statuses.get_mut(&id.to_string()) {
            *entry = state.clone();
        }
        true
    }

    /// All addressable items in display order
    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.ai_workflows.len())
            .map(ItemId::workflow)
            .chain((0..self.human_roles.len()).map(ItemId::role))
    }

    /// Number of items currently published as tasks
    pub fn published_count(&self) -> usize {
        self.item_ids()
            .filter_map(|id| self.item_state(id))
            .filter(|state| state.status == Some(ItemStatus::Published))
            .count()
    }
}
