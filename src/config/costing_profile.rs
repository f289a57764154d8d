use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    Category, CostStage, Element, InputPattern, ProcessCostSheet, SpoilagePolicy, ValuationMethod,
};
use crate::error::{CostingError, CostingResult};

/// 成本核算配置（外部输入 DTO）
///
/// 字符串字段在 build 时经枚举解析校验，非法取值立即拒绝，
/// 不做静默回退。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostingProfile {
    /// 核算期间（如 "2026-07"）
    #[serde(default)]
    pub period: String,

    /// 主数量表记录
    pub master: Vec<MasterRecord>,

    /// 成本项目配置（顺序即结转顺序）
    pub stages: Vec<StageProfile>,
}

/// 主数量表单条记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterRecord {
    /// 要素类别（BEGINNING_WIP / UNITS_STARTED / ...）
    pub category: String,

    /// 实物数量
    pub quantity: i64,

    /// 加工进度（0~1）
    #[serde(default)]
    pub progress: f64,
}

/// 成本项目配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProfile {
    /// 成本项目名称（如 直接材料/加工费）
    pub component: String,

    /// 投入方式（POINT_IN_TIME / CONTINUOUS）
    pub input_pattern: String,

    /// 定点投入的投入点进度
    #[serde(default)]
    pub input_timing: f64,

    /// 计价方法（FIFO / WEIGHTED_AVERAGE）
    pub valuation_method: String,

    /// 废品处理政策（NEGLECT / NON_NEGLECT），缺省为度外视法
    #[serde(default = "default_spoilage_policy")]
    pub spoilage_policy: String,

    /// 期初结转成本
    #[serde(default)]
    pub beginning_cost: f64,

    /// 本期投入成本
    #[serde(default)]
    pub added_cost: f64,
}

fn default_spoilage_policy() -> String {
    SpoilagePolicy::Neglect.as_str().to_string()
}

impl CostingProfile {
    /// 从 JSON 文本解析配置
    pub fn from_json(raw: &str) -> CostingResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// 构造成本计算单，所有字符串字段经枚举校验
    pub fn build(&self) -> CostingResult<ProcessCostSheet> {
        let mut master = HashMap::new();
        for record in &self.master {
            let category = Category::from_str(&record.category)
                .ok_or_else(|| CostingError::UnknownCategory(record.category.clone()))?;
            let element = Element::new(category, record.quantity, record.progress);
            if master.insert(category, element).is_some() {
                return Err(CostingError::InvalidConfiguration(format!(
                    "主数量表类别重复: {}",
                    category
                )));
            }
        }

        let mut stages = Vec::with_capacity(self.stages.len());
        for profile in &self.stages {
            let input_pattern =
                InputPattern::from_mode(&profile.input_pattern, profile.input_timing).ok_or_else(
                    || CostingError::UnknownInputPattern(profile.input_pattern.clone()),
                )?;
            let valuation_method = ValuationMethod::from_str(&profile.valuation_method)
                .ok_or_else(|| {
                    CostingError::UnknownValuationMethod(profile.valuation_method.clone())
                })?;
            let spoilage_policy = SpoilagePolicy::from_str(&profile.spoilage_policy)
                .ok_or_else(|| {
                    CostingError::UnknownSpoilagePolicy(profile.spoilage_policy.clone())
                })?;
            stages.push(CostStage::new(
                &profile.component,
                input_pattern,
                valuation_method,
                spoilage_policy,
                profile.beginning_cost,
                profile.added_cost,
            ));
        }

        Ok(ProcessCostSheet::new(&self.period, master, stages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_profile_json() -> &'static str {
        r#"{
            "period": "2026-07",
            "master": [
                { "category": "BEGINNING_WIP", "quantity": 300, "progress": 0.6 },
                { "category": "UNITS_STARTED", "quantity": 1380 },
                { "category": "COMPLETED_OUTPUT", "quantity": 1440, "progress": 1.0 },
                { "category": "ENDING_WIP", "quantity": 240, "progress": 0.3 }
            ],
            "stages": [
                {
                    "component": "直接材料",
                    "input_pattern": "POINT_IN_TIME",
                    "input_timing": 0.0,
                    "valuation_method": "WEIGHTED_AVERAGE",
                    "beginning_cost": 206400.0,
                    "added_cost": 717600.0
                },
                {
                    "component": "加工费",
                    "input_pattern": "CONTINUOUS",
                    "valuation_method": "WEIGHTED_AVERAGE",
                    "spoilage_policy": "NON_NEGLECT",
                    "beginning_cost": 161640.0,
                    "added_cost": 972360.0
                }
            ]
        }"#
    }

    #[test]
    fn test_from_json_and_build() {
        let profile = CostingProfile::from_json(base_profile_json()).unwrap();
        let sheet = profile.build().unwrap();

        assert_eq!(sheet.period, "2026-07");
        assert_eq!(sheet.stages.len(), 2);
        assert_eq!(
            sheet.master_element(Category::UnitsStarted).unwrap().quantity,
            1380
        );
        assert_eq!(
            sheet.master_element(Category::UnitsStarted).unwrap().progress,
            0.0,
            "缺省进度应为 0"
        );
        assert_eq!(
            sheet.stages[0].input_pattern,
            InputPattern::PointInTime { timing: 0.0 }
        );
        assert_eq!(sheet.stages[1].input_pattern, InputPattern::Continuous);
        assert_eq!(sheet.stages[1].spoilage_policy, SpoilagePolicy::NonNeglect);
        assert_eq!(
            sheet.stages[0].spoilage_policy,
            SpoilagePolicy::Neglect,
            "未指定政策缺省为度外视法"
        );
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = CostingProfile::from_json("{ not json");
        assert!(matches!(result, Err(CostingError::ProfileParse(_))));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let profile = CostingProfile {
            period: "2026-07".to_string(),
            master: vec![MasterRecord {
                category: "WIP".to_string(),
                quantity: 10,
                progress: 0.0,
            }],
            stages: vec![],
        };
        assert!(matches!(
            profile.build(),
            Err(CostingError::UnknownCategory(s)) if s == "WIP"
        ));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let profile = CostingProfile {
            period: "2026-07".to_string(),
            master: vec![
                MasterRecord {
                    category: "ENDING_WIP".to_string(),
                    quantity: 10,
                    progress: 0.3,
                },
                MasterRecord {
                    category: "ENDING_WIP".to_string(),
                    quantity: 20,
                    progress: 0.5,
                },
            ],
            stages: vec![],
        };
        assert!(matches!(
            profile.build(),
            Err(CostingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unknown_valuation_method_rejected() {
        let mut profile = CostingProfile::from_json(base_profile_json()).unwrap();
        profile.stages[0].valuation_method = "LIFO".to_string();
        assert!(matches!(
            profile.build(),
            Err(CostingError::UnknownValuationMethod(s)) if s == "LIFO"
        ));
    }

    #[test]
    fn test_unknown_spoilage_policy_rejected() {
        let mut profile = CostingProfile::from_json(base_profile_json()).unwrap();
        profile.stages[1].spoilage_policy = "IGNORE".to_string();
        assert!(matches!(
            profile.build(),
            Err(CostingError::UnknownSpoilagePolicy(_))
        ));
    }

    #[test]
    fn test_unknown_input_pattern_rejected() {
        let mut profile = CostingProfile::from_json(base_profile_json()).unwrap();
        profile.stages[0].input_pattern = "BATCH".to_string();
        assert!(matches!(
            profile.build(),
            Err(CostingError::UnknownInputPattern(_))
        ));
    }
}
