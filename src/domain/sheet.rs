// ==========================================
// 成本计算单领域模型
// ==========================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CostingError, CostingResult};

use super::element::Element;
use super::stage::CostStage;
use super::types::Category;

/// 成本计算单: 一个核算期间内一道工序的完整核算载体
///
/// 主数量表记录各类别的实物数量与加工进度,是各成本项目
/// 约当产量折算的唯一来源;成本项目按结转顺序排列。
/// 三个合计字段由编排器在汇总阶段写入。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessCostSheet {
    // ===== 输入 =====
    pub period: String,                     // 核算期间(如 "2026-07")
    pub master: HashMap<Category, Element>, // 主数量表(实物数量 + 进度)
    pub stages: Vec<CostStage>,             // 成本项目(顺序即结转顺序)

    // ===== 计算结果 =====
    pub ending_wip_total_cost: f64,     // 期末在制品成本合计
    pub finished_goods_total_cost: f64, // 完工产品成本合计
    pub finished_goods_unit_cost: f64,  // 完工产品单位成本
}

impl ProcessCostSheet {
    pub fn new(
        period: &str,
        master: HashMap<Category, Element>,
        stages: Vec<CostStage>,
    ) -> Self {
        ProcessCostSheet {
            period: period.to_string(),
            master,
            stages,
            ending_wip_total_cost: 0.0,
            finished_goods_total_cost: 0.0,
            finished_goods_unit_cost: 0.0,
        }
    }

    pub fn master_element(&self, category: Category) -> Option<&Element> {
        self.master.get(&category)
    }

    /// 完工产品实物数量(主数量表口径),缺失视为 0
    pub fn output_quantity(&self) -> i64 {
        self.master
            .get(&Category::CompletedOutput)
            .map_or(0, |e| e.quantity)
    }

    /// 输入校验: 必需类别齐全、数量非负、进度与投入点在 [0,1] 内
    ///
    /// 核算开始前调用,任何一项不满足即拒绝整张计算单。
    pub fn validate(&self) -> CostingResult<()> {
        for category in Category::REQUIRED {
            if !self.master.contains_key(&category) {
                return Err(CostingError::MissingCategory(category));
            }
        }

        for category in Category::ALL {
            let Some(element) = self.master.get(&category) else {
                continue;
            };
            if element.category != category {
                return Err(CostingError::InvalidMasterData {
                    category,
                    message: format!("键与要素类别不一致: {}", element.category),
                });
            }
            if element.quantity < 0 {
                return Err(CostingError::InvalidMasterData {
                    category,
                    message: format!("数量为负: {}", element.quantity),
                });
            }
            if !(0.0..=1.0).contains(&element.progress) {
                return Err(CostingError::InvalidMasterData {
                    category,
                    message: format!("加工进度越界: {}", element.progress),
                });
            }
        }

        for stage in &self.stages {
            if stage.beginning_cost < 0.0 || stage.added_cost < 0.0 {
                return Err(CostingError::InvalidConfiguration(format!(
                    "成本项目 {} 的成本为负: 期初={}, 本期={}",
                    stage.component, stage.beginning_cost, stage.added_cost
                )));
            }
            if let Some(timing) = stage.input_pattern.timing() {
                if !(0.0..=1.0).contains(&timing) {
                    return Err(CostingError::InvalidConfiguration(format!(
                        "成本项目 {} 的投入点越界: {}",
                        stage.component, timing
                    )));
                }
            }
        }

        Ok(())
    }
}
