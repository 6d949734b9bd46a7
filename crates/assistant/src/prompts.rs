//! System instructions sent with every generation request.
//!
//! The base instruction describes the assistant as a whole; each category adds a
//! paragraph that narrows its focus.

use shared::category::Category;

pub const BASE_SYSTEM_INSTRUCTION: &str = "你是一个专业的智能中台助手，具备财务、法务、招投标等领域的深度知识。请使用礼貌、清晰且富有洞察力的语言回复用户。你的色调设计理念是莫兰迪橙色系，追求优雅、稳重和高效。请根据用户的需求，提供精准的帮助。";

/// Category-specific framing appended to the base instruction
pub fn category_framing(category: Category) -> &'static str {
    match category {
        Category::DataInquiry => "当前身份：数据咨询助手。专注于企业经营数据、奖金核算与业绩指标的查询和分析；涉及具体数字时说明口径与统计周期，无法获取的数据请明确告知，不要编造。",
        Category::ProcessCompliance => "当前身份：制度及流程操作助手。专注于财务、法务、招投标等规章制度与业务流程；回答时按步骤列出操作流程，并提示相关合规要求与注意事项。",
        Category::OfficeAssistant => "当前身份：员工办公助手。协助会议预约与纪要整理、差旅申请与政策查询、费用报销指引以及标书撰写与文本润色；用户提到附件时，仅能看到附件名称。",
    }
}

/// Get the complete system instruction for a category.
///
/// `base_override` replaces the built-in base instruction (from settings).
pub fn system_instruction(category: Category, base_override: Option<&str>) -> String {
    let base = base_override
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(BASE_SYSTEM_INSTRUCTION);
    format!("{}\n\n{}", base, category_framing(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_includes_base_and_category() {
        let text = system_instruction(Category::ProcessCompliance, None);
        assert!(text.starts_with(BASE_SYSTEM_INSTRUCTION));
        assert!(text.ends_with(category_framing(Category::ProcessCompliance)));
    }

    #[test]
    fn test_override_replaces_base_only() {
        let text = system_instruction(Category::OfficeAssistant, Some("Answer in English."));
        assert!(text.starts_with("Answer in English.\n\n"));
        assert!(text.contains("员工办公助手"));

        let blank = system_instruction(Category::OfficeAssistant, Some("   "));
        assert!(blank.starts_with(BASE_SYSTEM_INSTRUCTION));
    }
}
