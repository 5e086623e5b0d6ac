//! Plain-text export of a consultation
//!
//! Markdown-flavoured text: transcript (when there is one), the plan, and a
//! closing note on the XZT exchange rate.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use eyre::{Context, Result};
use tracing::{debug, info};

use crate::domain::{Amount, BudgetBreakdown, Message, RecommendationDocument, Role};

const TITLE: &str = "# 一人公司商业咨询报告";

const FOOTER: &str = "\n---\n当前汇率: 1 XZT ≈ 1 CNY\n以上建议仅供参考，实际执行时请根据市场变化和个人情况调整。\n";

/// Render the export text
///
/// `business_goal` is used when the document itself does not state one.
pub fn render_txt(
    messages: &[Message],
    business_goal: &str,
    doc: Option<&RecommendationDocument>,
    generated_at: DateTime<Local>,
) -> String {
    let mut content = format!("{}\n\n", TITLE);
    content.push_str(&format!("生成时间: {}\n\n", generated_at.format("%Y/%m/%d %H:%M:%S")));

    if !messages.is_empty() {
        content.push_str("## 对话记录\n\n");
        for msg in messages {
            let speaker = match msg.role {
                Role::User => "用户",
                Role::Assistant => "顾问",
            };
            content.push_str(&format!("**{}**: {}\n\n", speaker, msg.content));
        }
    }

    if let Some(doc) = doc {
        let goal = doc
            .business_goal
            .as_deref()
            .filter(|g| !g.is_empty())
            .unwrap_or(business_goal);
        content.push_str("\n## 推荐方案\n\n");
        content.push_str(&format!("**商业目标**: {}\n\n", goal));
        if !doc.summary.is_empty() {
            content.push_str(&format!("**方案概述**: {}\n\n", doc.summary));
        }

        if !doc.ai_workflows.is_empty() {
            content.push_str("### AI工作流推荐\n\n");
            for (i, wf) in doc.ai_workflows.iter().enumerate() {
                content.push_str(&format!("{}. **{}**\n", i + 1, wf.name));
                content.push_str(&format!("   - 描述: {}\n", wf.description));
                content.push_str(&format!("   - 预估成本: {} XZT/月\n", amount(&wf.estimated_cost)));
                content.push_str(&format!("   - 优先级: {}\n", wf.priority));
                content.push_str(&format!("   - 复杂度: {}\n\n", wf.complexity));
            }
        }

        if !doc.human_roles.is_empty() {
            content.push_str("### 真人岗位推荐\n\n");
            for (i, role) in doc.human_roles.iter().enumerate() {
                content.push_str(&format!("{}. **{}**\n", i + 1, role.title));
                content.push_str(&format!("   - 职责: {}\n", role.responsibilities.join(", ")));
                content.push_str(&format!("   - 要求: {}\n", role.requirements.join(", ")));
                content.push_str(&format!("   - 工作时间: {}\n", role.work_hours));
                content.push_str(&format!("   - 月度预算: {} XZT\n\n", amount(&role.monthly_budget)));
            }
        }

        if !doc.phases.is_empty() {
            content.push_str("### 分阶段预算\n\n");
            for (i, phase) in doc.phases.iter().enumerate() {
                content.push_str(&format!("{}. **{}**\n", i + 1, phase.phase_name));
                content.push_str(&format!("   - 时长: {}\n", phase.duration));
                content.push_str(&format!("   - 月度预算: {} XZT\n", amount(&phase.monthly_budget)));
                content.push_str("   - 预算明细:\n");
                match &phase.budget_breakdown {
                    Some(BudgetBreakdown::Itemized(entries)) => {
                        for (key, value) in entries {
                            content.push_str(&format!("     * {}: {} XZT\n", key, value));
                        }
                    }
                    Some(BudgetBreakdown::Text(text)) => content.push_str(&format!("     * {}\n", text)),
                    None => {}
                }
                content.push_str(&format!("   - 里程碑: {}\n\n", phase.milestones.join(", ")));
            }
        }
    }

    content.push_str(FOOTER);
    content
}

/// `商业咨询报告_{millis}.txt`
pub fn file_name(at: DateTime<Utc>) -> String {
    format!("商业咨询报告_{}.txt", at.timestamp_millis())
}

/// Write an export into `dir`, returning the file path
pub fn write_txt(dir: &Path, content: &str) -> Result<PathBuf> {
    debug!(dir = %dir.display(), "write_txt: called");
    fs::create_dir_all(dir).context(format!("Failed to create {}", dir.display()))?;
    let path = dir.join(file_name(Utc::now()));
    fs::write(&path, content).context(format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "write_txt: exported");
    Ok(path)
}

fn amount(value: &Option<Amount>) -> String {
    value.as_ref().map(|a| a.to_string()).unwrap_or_default()
}
