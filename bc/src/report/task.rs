//! Task payloads built from recommendation items

use crate::domain::{Amount, HumanRole, ItemId, ItemKind, RecommendationDocument, Workflow};
use crate::gateway::TaskDraft;

/// Task name prefix for AI workflow items
pub const WORKFLOW_TASK_PREFIX: &str = "开发AI工作流：";

/// Task name prefix for human role items
pub const ROLE_TASK_PREFIX: &str = "招聘：";

/// Acceptance criteria used when a workflow carries none
pub const DEFAULT_WORKFLOW_CRITERIA: &str = "1. API调用成功\n2. 输出格式正确\n3. 性能达标";

/// Trial-period criteria used when a role carries none
pub const DEFAULT_ROLE_CRITERIA: &str = "试用期1个月，考核标准：\n1. 按时完成工作\n2. 沟通顺畅\n3. 质量达标";

/// Tasks created from reports are visible to everyone
const VISIBILITY: &str = "global";

/// The recommendation item a task is created from
#[derive(Debug, Clone, Copy)]
pub enum TaskSource<'a> {
    Workflow(&'a Workflow),
    Role(&'a HumanRole),
}

impl<'a> TaskSource<'a> {
    /// Resolve an item id against a document
    pub fn lookup(doc: &'a RecommendationDocument, id: ItemId) -> Option<Self> {
        match id.kind {
            ItemKind::Workflow => doc.workflow(id.index).map(Self::Workflow),
            ItemKind::Role => doc.role(id.index).map(Self::Role),
        }
    }

    pub fn classification_text(&self) -> String {
        match self {
            Self::Workflow(wf) => workflow_classification_text(wf),
            Self::Role(role) => role_classification_text(role),
        }
    }

    pub fn draft(&self, project_id: &str, tags: Vec<String>) -> TaskDraft {
        match self {
            Self::Workflow(wf) => workflow_task(project_id, wf, tags),
            Self::Role(role) => role_task(project_id, role, tags),
        }
    }
}

/// Text sent to the tag identification service for a workflow
pub fn workflow_classification_text(wf: &Workflow) -> String {
    format!(
        "{}\n{}\n输入要求：{}\n输出要求：{}",
        wf.name, wf.description, wf.input_requirements, wf.output_requirements
    )
}

/// Text sent to the tag identification service for a role
pub fn role_classification_text(role: &HumanRole) -> String {
    format!(
        "{}\n职责：{}\n要求：{}",
        role.title,
        role.responsibilities.join(", "),
        role.requirements.join(", ")
    )
}

pub fn workflow_task(project_id: &str, wf: &Workflow, tags: Vec<String>) -> TaskDraft {
    TaskDraft {
        project_id: project_id.to_string(),
        task_name: format!("{}{}", WORKFLOW_TASK_PREFIX, wf.name),
        task_description: format!(
            "{}\n\n**输入要求**：\n{}\n\n**输出要求**：\n{}",
            wf.description, wf.input_requirements, wf.output_requirements
        ),
        acceptance_criteria: criteria_or(wf.acceptance_criteria.as_deref(), DEFAULT_WORKFLOW_CRITERIA),
        reward_amount: reward(wf.estimated_cost.as_ref()),
        visibility: VISIBILITY.to_string(),
        profession_tags: tags,
    }
}

pub fn role_task(project_id: &str, role: &HumanRole, tags: Vec<String>) -> TaskDraft {
    let work_hours = if role.work_hours.is_empty() {
        "待定"
    } else {
        role.work_hours.as_str()
    };
    TaskDraft {
        project_id: project_id.to_string(),
        task_name: format!("{}{}", ROLE_TASK_PREFIX, role.title),
        task_description: format!(
            "**职责**：\n{}\n\n**要求**：\n{}\n\n**工作时间**：\n{}",
            role.responsibilities.join("\n"),
            role.requirements.join("\n"),
            work_hours
        ),
        acceptance_criteria: criteria_or(role.trial_period_criteria.as_deref(), DEFAULT_ROLE_CRITERIA),
        reward_amount: reward(role.monthly_budget.as_ref()),
        visibility: VISIBILITY.to_string(),
        profession_tags: tags,
    }
}

fn criteria_or(given: Option<&str>, default: &str) -> String {
    given
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Stringified amount, `0` when absent
fn reward(amount: Option<&Amount>) -> String {
    amount
        .filter(|a| !matches!(a, Amount::Text(t) if t.trim().is_empty()))
        .map(|a| a.to_string())
        .unwrap_or_else(|| "0".to_string())
}
