//! Turn advisory replies into the assistant's chat text

use crate::domain::{Amount, BudgetBreakdown, RecommendationDocument};

/// Header used when a plan arrives without an accompanying message
pub const RECOMMENDATION_HEADER: &str = "根据您的情况，我为您制定了以下方案：";

/// Shown when the advisor replies with nothing usable
pub const CONTINUE_PLACEHOLDER: &str = "请继续...";

/// Composite message for a finished plan
///
/// Fixed order: header, summary, AI workflows, human roles, phases. Blank
/// fields are left out.
pub fn render_recommendations(message: Option<&str>, doc: &RecommendationDocument) -> String {
    let mut content = message
        .filter(|m| !m.is_empty())
        .unwrap_or(RECOMMENDATION_HEADER)
        .to_string();

    if !doc.summary.is_empty() {
        content.push_str("\n\n📋 方案概述：\n");
        content.push_str(&doc.summary);
    }

    if !doc.ai_workflows.is_empty() {
        content.push_str("\n\n🤖 AI自动化工作流：");
        for (i, wf) in doc.ai_workflows.iter().enumerate() {
            content.push_str(&format!("\n\n{}. {}", i + 1, wf.name));
            push_line(&mut content, "描述", &wf.description);
            push_line(&mut content, "输入要求", &wf.input_requirements);
            push_line(&mut content, "输出要求", &wf.output_requirements);
            if let Some(cost) = present(&wf.estimated_cost) {
                content.push_str(&format!("\n   预算：{} XZT/月", cost));
            }
            push_line(&mut content, "优先级", &wf.priority);
        }
    }

    if !doc.human_roles.is_empty() {
        content.push_str("\n\n👥 人力资源配置：");
        for (i, role) in doc.human_roles.iter().enumerate() {
            content.push_str(&format!("\n\n{}. {}", i + 1, role.title));
            push_line(&mut content, "职责", &role.responsibilities.join("、"));
            push_line(&mut content, "要求", &role.requirements.join("、"));
            push_line(&mut content, "工作时间", &role.work_hours);
            if let Some(budget) = present(&role.monthly_budget) {
                content.push_str(&format!("\n   预算：{} XZT/月", budget));
            }
            push_line(&mut content, "优先级", &role.priority);
        }
    }

    if !doc.phases.is_empty() {
        content.push_str("\n\n📅 实施阶段：");
        for (i, phase) in doc.phases.iter().enumerate() {
            content.push_str(&format!("\n\n{}. {}", i + 1, phase.phase_name));
            push_line(&mut content, "时长", &phase.duration);
            if let Some(budget) = present(&phase.monthly_budget) {
                content.push_str(&format!("\n   月预算：{} XZT", budget));
            }
            match &phase.budget_breakdown {
                Some(BudgetBreakdown::Itemized(entries)) => {
                    content.push_str("\n   预算明细：");
                    for (key, value) in entries {
                        content.push_str(&format!("\n     - {}: {} XZT", key, value));
                    }
                }
                Some(BudgetBreakdown::Text(text)) => {
                    content.push_str("\n   预算明细：");
                    content.push_str(&format!("\n     {}", text));
                }
                None => {}
            }
        }
    }

    content
}

/// Message followed by the numbered follow-up questions
pub fn render_questions(message: &str, questions: &[String]) -> String {
    let numbered = questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q))
        .collect::<Vec<_>>()
        .join("\n");

    match (message.is_empty(), numbered.is_empty()) {
        (_, true) => message.to_string(),
        (true, false) => numbered,
        (false, false) => format!("{}\n\n{}", message, numbered),
    }
}

/// Free-text reply, or the placeholder when there is none
pub fn render_other(message: Option<&str>) -> String {
    message
        .filter(|m| !m.is_empty())
        .unwrap_or(CONTINUE_PLACEHOLDER)
        .to_string()
}

fn push_line(content: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        content.push_str(&format!("\n   {}：{}", label, value));
    }
}

fn present(amount: &Option<Amount>) -> Option<&Amount> {
    amount.as_ref().filter(|a| !a.is_blank())
}
