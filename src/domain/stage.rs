// ==========================================
// 成本项目(核算阶段)领域模型
// ==========================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::element::Element;
use super::types::{Category, InputPattern, SpoilagePolicy, ValuationMethod};

/// 成本项目: 流经工序的一种成本(如直接材料、加工费)
///
/// 持有本项目的要素表、投入方式、计价方法与废品处理政策。
/// 要素表由本结构独占,引擎经由 `element_mut` / `set_elements`
/// 写回,修改不经过任何临时副本。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostStage {
    // ===== 配置 =====
    pub component: String,                  // 成本项目名称(如 直接材料/加工费)
    pub input_pattern: InputPattern,        // 投入方式
    pub valuation_method: ValuationMethod,  // 计价方法
    pub spoilage_policy: SpoilagePolicy,    // 废品处理政策

    // ===== 本期成本 =====
    pub beginning_cost: f64, // 期初在制品结转成本
    pub added_cost: f64,     // 本期投入成本

    // ===== 计算状态 =====
    elements: HashMap<Category, Element>, // 要素表(每次核算由主数量表重建)
    pub allocation_note: Option<String>,  // 废品分摊决策说明(JSON)
}

impl CostStage {
    pub fn new(
        component: &str,
        input_pattern: InputPattern,
        valuation_method: ValuationMethod,
        spoilage_policy: SpoilagePolicy,
        beginning_cost: f64,
        added_cost: f64,
    ) -> Self {
        CostStage {
            component: component.to_string(),
            input_pattern,
            valuation_method,
            spoilage_policy,
            beginning_cost,
            added_cost,
            elements: HashMap::new(),
            allocation_note: None,
        }
    }

    // ===== 要素访问 =====

    pub fn elements(&self) -> &HashMap<Category, Element> {
        &self.elements
    }

    pub fn element(&self, category: Category) -> Option<&Element> {
        self.elements.get(&category)
    }

    pub fn element_mut(&mut self, category: Category) -> Option<&mut Element> {
        self.elements.get_mut(&category)
    }

    /// 整体替换要素表(约当产量引擎每次核算调用,保证幂等)
    pub fn set_elements(&mut self, elements: HashMap<Category, Element>) {
        self.elements = elements;
    }

    /// 某类别的约当产量,类别缺失视为 0
    pub fn quantity_of(&self, category: Category) -> i64 {
        self.elements.get(&category).map_or(0, |e| e.quantity)
    }

    // ===== 数量合计 =====

    /// 投入侧约当产量合计(期初在制品 + 本期投入)
    pub fn left_quantity_total(&self) -> i64 {
        self.elements
            .values()
            .filter(|e| e.category.is_left_side())
            .map(|e| e.quantity)
            .sum()
    }

    /// 产出侧约当产量合计
    pub fn right_quantity_total(&self) -> i64 {
        self.elements
            .values()
            .filter(|e| e.category.is_right_side())
            .map(|e| e.quantity)
            .sum()
    }

    /// 先进先出法下完工产品的废品负担量:
    /// 本期投入 - 期末在制品 - 正常废品(期初结转部分不参与)
    pub fn fifo_output_burden(&self) -> i64 {
        self.quantity_of(Category::UnitsStarted)
            - self.quantity_of(Category::EndingWip)
            - self.quantity_of(Category::NormalSpoilage)
    }

    // ===== 废品相关 =====

    /// 废品发生点(正常废品要素的加工进度),无废品要素时为 None
    pub fn spoilage_point(&self) -> Option<f64> {
        self.elements
            .get(&Category::NormalSpoilage)
            .map(|e| e.progress)
    }

    pub fn normal_spoilage_quantity(&self) -> i64 {
        self.quantity_of(Category::NormalSpoilage)
    }

    /// 正常废品要素的计价后成本(分摊池)
    pub fn normal_spoilage_cost(&self) -> f64 {
        self.elements
            .get(&Category::NormalSpoilage)
            .map_or(0.0, |e| e.cost())
    }

    /// 负担方的废品负担量合计(分摊分母),异常类别永不负担故不计入
    pub fn total_spoilage_burden(&self) -> i64 {
        self.elements
            .values()
            .filter(|e| !e.category.is_abnormal())
            .map(|e| e.spoilage_burden)
            .sum()
    }

    // ===== 成本合计 =====

    /// 本项目投入总成本 = 期初结转 + 本期投入
    pub fn total_cost(&self) -> f64 {
        self.beginning_cost + self.added_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_stage() -> CostStage {
        let mut stage = CostStage::new(
            "直接材料",
            InputPattern::PointInTime { timing: 0.0 },
            ValuationMethod::WeightedAverage,
            SpoilagePolicy::Neglect,
            206400.0,
            717600.0,
        );
        let mut elements = HashMap::new();
        elements.insert(
            Category::BeginningWip,
            Element::new(Category::BeginningWip, 300, 0.6),
        );
        elements.insert(
            Category::UnitsStarted,
            Element::new(Category::UnitsStarted, 1380, 0.0),
        );
        elements.insert(
            Category::CompletedOutput,
            Element::new(Category::CompletedOutput, 1400, 1.0),
        );
        elements.insert(
            Category::EndingWip,
            Element::new(Category::EndingWip, 240, 0.3),
        );
        elements.insert(
            Category::NormalSpoilage,
            Element::new(Category::NormalSpoilage, 40, 0.5),
        );
        stage.set_elements(elements);
        stage
    }

    #[test]
    fn test_quantity_totals() {
        let stage = base_stage();
        assert_eq!(stage.left_quantity_total(), 1680, "投入侧合计 300 + 1380");
        assert_eq!(stage.right_quantity_total(), 1680, "产出侧合计 1400 + 240 + 40");
    }

    #[test]
    fn test_quantity_of_missing_category_is_zero() {
        let stage = base_stage();
        assert_eq!(stage.quantity_of(Category::AbnormalSpoilage), 0);
    }

    #[test]
    fn test_fifo_output_burden_residual() {
        let stage = base_stage();
        assert_eq!(stage.fifo_output_burden(), 1100, "1380 - 240 - 40");
    }

    #[test]
    fn test_spoilage_lookups() {
        let stage = base_stage();
        assert_eq!(stage.spoilage_point(), Some(0.5));
        assert_eq!(stage.normal_spoilage_quantity(), 40);
        assert_eq!(stage.normal_spoilage_cost(), 0.0, "未计价时分摊池为零");
    }

    #[test]
    fn test_spoilage_point_absent() {
        let mut stage = base_stage();
        let mut elements = stage.elements().clone();
        elements.remove(&Category::NormalSpoilage);
        stage.set_elements(elements);
        assert_eq!(stage.spoilage_point(), None, "无正常废品要素应返回 None");
    }

    #[test]
    fn test_element_mut_writes_back() {
        let mut stage = base_stage();
        stage
            .element_mut(Category::CompletedOutput)
            .unwrap()
            .spoilage_burden = 1100;
        assert_eq!(
            stage.element(Category::CompletedOutput).unwrap().spoilage_burden,
            1100,
            "经 element_mut 的修改必须落在要素表上"
        );
        assert_eq!(stage.total_spoilage_burden(), 1100);
    }

    #[test]
    fn test_total_spoilage_burden_excludes_abnormal() {
        let mut stage = base_stage();
        let mut elements = stage.elements().clone();
        elements.insert(
            Category::AbnormalSpoilage,
            Element::new(Category::AbnormalSpoilage, 30, 0.9),
        );
        stage.set_elements(elements);
        stage
            .element_mut(Category::CompletedOutput)
            .unwrap()
            .spoilage_burden = 1100;
        stage
            .element_mut(Category::AbnormalSpoilage)
            .unwrap()
            .spoilage_burden = 30;

        assert_eq!(
            stage.total_spoilage_burden(),
            1100,
            "异常类别的负担量不计入分摊分母"
        );
    }

    #[test]
    fn test_total_cost() {
        let stage = base_stage();
        assert!((stage.total_cost() - 924000.0).abs() < 1e-9);
    }
}
