// ==========================================
// 计价引擎
// ==========================================

use tracing::{debug, instrument};

use crate::domain::{Category, CostStage, ValuationMethod};
use crate::error::{CostingError, CostingResult};

/// 计价引擎
///
/// 职责: 在约当产量与负担量确定后,为成本项目的产出侧要素计算单价
/// 输入: 已折算约当产量并完成负担判定的成本项目
/// 输出: 写回各产出侧要素的单价;分母为零时返回错误
///
/// 先进先出法: 本期投入单价 = 本期投入成本 ÷ 本期投入约当量,
///             完工产品成本取总成本轧差(期初成本随完工产品结转);
/// 加权平均法: 单一单价 = (期初成本 + 本期成本) ÷ 投入侧约当量合计。
pub struct ValuationEngine {}

impl ValuationEngine {
    pub fn new() -> Self {
        ValuationEngine {}
    }

    /// 基础计价入口,按计价方法分派
    #[instrument(skip(self, stage), fields(component = %stage.component, method = %stage.valuation_method))]
    pub fn value_stage(&self, stage: &mut CostStage) -> CostingResult<()> {
        match stage.valuation_method {
            ValuationMethod::Fifo => self.value_fifo(stage),
            ValuationMethod::WeightedAverage => self.value_weighted_average(stage),
        }
    }

    /// 先进先出法计价
    fn value_fifo(&self, stage: &mut CostStage) -> CostingResult<()> {
        let started_units = stage.quantity_of(Category::UnitsStarted);
        if started_units == 0 {
            return Err(CostingError::ZeroDenominator {
                component: stage.component.clone(),
                context: "先进先出单价(本期投入约当量为零)".to_string(),
            });
        }
        let output_units = stage.quantity_of(Category::CompletedOutput);
        if output_units == 0 {
            return Err(CostingError::ZeroDenominator {
                component: stage.component.clone(),
                context: "完工产品单价(完工产品约当量为零)".to_string(),
            });
        }

        // 先进先出假定非完工产出全部出自本期投入,约当量不足即数据不一致
        let non_output_units: i64 = Category::ALL
            .iter()
            .copied()
            .filter(|c| c.is_right_side() && *c != Category::CompletedOutput)
            .map(|c| stage.quantity_of(c))
            .sum();
        if non_output_units > started_units {
            return Err(CostingError::InvalidMasterData {
                category: Category::UnitsStarted,
                message: format!(
                    "本期投入约当量 {} 小于非完工产出约当量 {}",
                    started_units, non_output_units
                ),
            });
        }

        let added_price = stage.added_cost / started_units as f64;

        // 完工产品之外的产出侧要素按本期投入单价计价
        for category in Category::ALL {
            if !category.is_right_side() || category == Category::CompletedOutput {
                continue;
            }
            if let Some(element) = stage.element_mut(category) {
                element.unit_cost = added_price;
            }
        }

        // 期初成本全额随完工产品结转,完工产品成本取轧差
        let output_cost = stage.total_cost() - added_price * non_output_units as f64;
        if let Some(output) = stage.element_mut(Category::CompletedOutput) {
            output.unit_cost = output_cost / output_units as f64;
        }

        debug!(added_price, output_cost, "先进先出计价完成");
        Ok(())
    }

    /// 加权平均法计价
    fn value_weighted_average(&self, stage: &mut CostStage) -> CostingResult<()> {
        let left_units = stage.left_quantity_total();
        if left_units == 0 {
            return Err(CostingError::ZeroDenominator {
                component: stage.component.clone(),
                context: "加权平均单价(投入侧约当量为零)".to_string(),
            });
        }

        let rate = stage.total_cost() / left_units as f64;
        for category in Category::ALL {
            if !category.is_right_side() {
                continue;
            }
            if let Some(element) = stage.element_mut(category) {
                element.unit_cost = rate;
            }
        }

        debug!(rate, "加权平均计价完成");
        Ok(())
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}
