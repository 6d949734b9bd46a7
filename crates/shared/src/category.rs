//! Assistant categories.
//!
//! Each category is a distinct assistant persona. Switching between them starts a
//! fresh conversation, so the provider never sees turns written for another persona.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    DataInquiry,
    ProcessCompliance,
    OfficeAssistant,
}

/// A shortcut shown on the welcome screen of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickModule {
    pub name: &'static str,
    pub icon: &'static str,
    pub desc: &'static str,
}

const DATA_MODULES: &[QuickModule] = &[
    QuickModule {
        name: "奖金数据问询",
        icon: "💰",
        desc: "核算详情、发放进度",
    },
    QuickModule {
        name: "业绩数据问询",
        icon: "📈",
        desc: "指标达成、经营分析",
    },
];

const PROCESS_MODULES: &[QuickModule] = &[
    QuickModule {
        name: "财务咨询助手",
        icon: "💰",
        desc: "报销规范、财务制度",
    },
    QuickModule {
        name: "法务咨询助手",
        icon: "⚖️",
        desc: "合同合规、法律条款",
    },
    QuickModule {
        name: "招投标咨询助手",
        icon: "🏗️",
        desc: "流程规范、资质管理",
    },
];

const OFFICE_MODULES: &[QuickModule] = &[
    QuickModule {
        name: "会议助手",
        icon: "📝",
        desc: "会议预约、纪要整理",
    },
    QuickModule {
        name: "差旅助手",
        icon: "✈️",
        desc: "差旅申请、政策查询",
    },
    QuickModule {
        name: "报销助手",
        icon: "🧾",
        desc: "快速报销、额度核算",
    },
    QuickModule {
        name: "标书撰写",
        icon: "🖊️",
        desc: "方案起草、文本润色",
    },
];

impl Category {
    pub const ALL: [Category; 3] = [
        Category::DataInquiry,
        Category::ProcessCompliance,
        Category::OfficeAssistant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DataInquiry => "data",
            Category::ProcessCompliance => "process",
            Category::OfficeAssistant => "office",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::DataInquiry => "数据咨询助手",
            Category::ProcessCompliance => "制度及流程操作助手",
            Category::OfficeAssistant => "员工办公助手",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::DataInquiry => "📊",
            Category::ProcessCompliance => "📜",
            Category::OfficeAssistant => "🏢",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::DataInquiry => "为您提供企业经营数据、奖金核算及业绩指标的专业查询与分析服务，助力数据驱动决策。",
            Category::ProcessCompliance => "整合财务、法务、招投标等维度的规章制度与管理规范，为您提供一站式的业务流程指引。",
            Category::OfficeAssistant => "您的全能数字化办公伙伴，提供会议纪要自动化、差旅订票协助、费用报销指引及专业标书撰写辅助。",
        }
    }

    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Category::DataInquiry => &[
                "查询我本季度的绩效奖金核算详情",
                "分析所属部门近半年的业绩达成率趋势",
                "统计本月度经营目标的完成进度",
                "对比各区域主要产品线的销售数据",
            ],
            Category::ProcessCompliance => &[
                "差旅费报销的标准流程及要求是什么？",
                "合同在线审批的具体步骤及注意事项有哪些？",
                "如何获取公司最新的招投标资质证明文件？",
                "查询最新的竞业禁止协议条款详情",
                "标书撰写过程中对企业实力的描述有何规范？",
            ],
            Category::OfficeAssistant => &[
                "帮我预约下午2点的视频会议室",
                "查询下周前往上海的差旅政策限制",
                "如何在线提交加班餐费及打车报销？",
                "请根据附件内容生成一份项目技术方案大纲",
                "帮我润色一段关于项目售后服务的专业描述",
            ],
        }
    }

    pub fn modules(&self) -> &'static [QuickModule] {
        match self {
            Category::DataInquiry => DATA_MODULES,
            Category::ProcessCompliance => PROCESS_MODULES,
            Category::OfficeAssistant => OFFICE_MODULES,
        }
    }

    /// The message sent when a quick module is picked.
    pub fn module_prompt(&self, module: &QuickModule) -> String {
        match self {
            Category::DataInquiry => format!("我想进行{}", module.name),
            Category::ProcessCompliance => format!("我想咨询{}相关业务", module.name),
            Category::OfficeAssistant => format!("我想了解{}的相关功能", module.name),
        }
    }

    pub fn welcome(&self) -> String {
        format!("您好，我是您的{}", self.display_name())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0} (expected data, process or office)")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s) || c.display_name() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_and_display_names() {
        assert_eq!("office".parse::<Category>().unwrap(), Category::OfficeAssistant);
        assert_eq!(" Process ".parse::<Category>().unwrap(), Category::ProcessCompliance);
        assert_eq!("数据咨询助手".parse::<Category>().unwrap(), Category::DataInquiry);
        assert!("finance".parse::<Category>().is_err());
    }

    #[test]
    fn test_module_prompts_follow_category_phrasing() {
        let data = Category::DataInquiry;
        assert_eq!(data.module_prompt(&data.modules()[0]), "我想进行奖金数据问询");

        let process = Category::ProcessCompliance;
        assert_eq!(
            process.module_prompt(&process.modules()[1]),
            "我想咨询法务咨询助手相关业务"
        );

        let office = Category::OfficeAssistant;
        assert_eq!(
            office.module_prompt(&office.modules()[3]),
            "我想了解标书撰写的相关功能"
        );
    }

    #[test]
    fn test_every_category_has_suggestions() {
        for category in Category::ALL {
            assert!(!category.suggestions().is_empty());
            assert!(!category.modules().is_empty());
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Category::ProcessCompliance).unwrap();
        assert_eq!(json, "\"process_compliance\"");
    }
}
