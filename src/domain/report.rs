// ==========================================
// 核算报告领域模型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::element::Element;
use super::sheet::ProcessCostSheet;
use super::stage::CostStage;
use super::types::{Category, SpoilagePolicy, ValuationMethod};

/// 单个成本项目的核算明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub component: String,                 // 成本项目名称
    pub valuation_method: ValuationMethod, // 计价方法
    pub spoilage_policy: SpoilagePolicy,   // 废品处理政策
    pub beginning_cost: f64,               // 期初结转成本
    pub added_cost: f64,                   // 本期投入成本
    pub reallocated_spoilage_cost: f64,    // 再分摊的废品成本
    pub elements: Vec<Element>,            // 计价后要素(固定类别顺序)
    pub allocation_note: Option<String>,   // 分摊决策说明(JSON)
}

impl StageReport {
    /// 由计价完成的成本项目生成,要素按固定类别顺序摘录
    pub fn from_stage(stage: &CostStage, reallocated_spoilage_cost: f64) -> Self {
        let elements = Category::ALL
            .iter()
            .filter_map(|c| stage.element(*c).cloned())
            .collect();
        StageReport {
            component: stage.component.clone(),
            valuation_method: stage.valuation_method,
            spoilage_policy: stage.spoilage_policy,
            beginning_cost: stage.beginning_cost,
            added_cost: stage.added_cost,
            reallocated_spoilage_cost,
            elements,
            allocation_note: stage.allocation_note.clone(),
        }
    }

    pub fn element(&self, category: Category) -> Option<&Element> {
        self.elements.iter().find(|e| e.category == category)
    }

    /// 本项目完工产品单价
    pub fn output_unit_cost(&self) -> f64 {
        self.element(Category::CompletedOutput)
            .map_or(0.0, |e| e.unit_cost)
    }

    /// 本项目投入总成本
    pub fn total_cost(&self) -> f64 {
        self.beginning_cost + self.added_cost
    }
}

/// 核算报告: 一次完整核算的结果快照
///
/// 与计算单解耦的值对象,供外部展示层直接序列化传输。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostingReport {
    // ===== 标识 =====
    pub report_id: String, // 报告唯一标识
    pub period: String,    // 核算期间

    // ===== 合计 =====
    pub ending_wip_total_cost: f64,     // 期末在制品成本合计
    pub finished_goods_total_cost: f64, // 完工产品成本合计
    pub finished_goods_unit_cost: f64,  // 完工产品单位成本

    // ===== 明细 =====
    pub stages: Vec<StageReport>,   // 各成本项目明细
    pub generated_at: NaiveDateTime, // 生成时间(UTC)
}

impl CostingReport {
    /// 由汇总完成的计算单生成,`reallocated` 与成本项目一一对应
    pub fn from_sheet(sheet: &ProcessCostSheet, reallocated: &[f64]) -> Self {
        let stages = sheet
            .stages
            .iter()
            .enumerate()
            .map(|(i, stage)| {
                StageReport::from_stage(stage, reallocated.get(i).copied().unwrap_or(0.0))
            })
            .collect();
        CostingReport {
            report_id: Uuid::new_v4().to_string(),
            period: sheet.period.clone(),
            ending_wip_total_cost: sheet.ending_wip_total_cost,
            finished_goods_total_cost: sheet.finished_goods_total_cost,
            finished_goods_unit_cost: sheet.finished_goods_unit_cost,
            stages,
            generated_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn stage(&self, component: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.component == component)
    }

    /// 全部成本项目的投入总成本(期初 + 本期),守恒核对用
    pub fn total_input_cost(&self) -> f64 {
        self.stages.iter().map(|s| s.total_cost()).sum()
    }
}
