// ==========================================
// 约当产量引擎
// ==========================================

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::{Category, CostStage, Element, InputPattern};
use crate::error::{CostingError, CostingResult};

/// 约当产量引擎
///
/// 职责: 按成本项目的投入方式把主数量表的实物数量折算为约当产量,
///       并校验投入侧与产出侧守恒
/// 输入: 主数量表(实物数量 + 加工进度) + 待折算的成本项目
/// 输出: 写回成本项目的要素表;不守恒时返回错误
///
/// 每次折算整体重建要素表,重复核算结果不变。
pub struct EquivalentUnitEngine {}

impl EquivalentUnitEngine {
    pub fn new() -> Self {
        EquivalentUnitEngine {}
    }

    /// 折算一个成本项目的约当产量并校验守恒
    #[instrument(skip(self, master, stage), fields(component = %stage.component, pattern = %stage.input_pattern))]
    pub fn quantify_stage(
        &self,
        master: &HashMap<Category, Element>,
        stage: &mut CostStage,
    ) -> CostingResult<()> {
        let elements = match stage.input_pattern {
            InputPattern::PointInTime { timing } => self.point_in_time_units(master, timing),
            InputPattern::Continuous => self.continuous_units(master)?,
        };
        stage.set_elements(elements);
        self.verify_balance(stage)?;

        debug!(
            left_total = stage.left_quantity_total(),
            right_total = stage.right_quantity_total(),
            "约当产量折算完成"
        );
        Ok(())
    }

    /// 定点投入折算
    ///
    /// 进度达到投入点的类别照抄实物数量,未达到的记 0。
    /// 完工产品进度恒为 1.0,必然越过任何投入点。
    fn point_in_time_units(
        &self,
        master: &HashMap<Category, Element>,
        timing: f64,
    ) -> HashMap<Category, Element> {
        let mut elements = HashMap::new();
        for category in Category::ALL {
            let Some(m) = master.get(&category) else {
                continue;
            };
            let progress = if category == Category::CompletedOutput {
                1.0
            } else {
                m.progress
            };
            let quantity = if progress < timing { 0 } else { m.quantity };
            elements.insert(category, Element::new(category, quantity, progress));
        }
        elements
    }

    /// 平均投入折算
    ///
    /// 约当产量 = 实物数量 × 加工进度(向零截断);
    /// 本期投入不可直接观测,以 产出侧合计 - 期初约当量 轧差得出。
    fn continuous_units(
        &self,
        master: &HashMap<Category, Element>,
    ) -> CostingResult<HashMap<Category, Element>> {
        let mut elements = HashMap::new();
        let mut right_total = 0i64;
        let mut left_total_excl_started = 0i64;

        for category in Category::ALL {
            let Some(m) = master.get(&category) else {
                continue;
            };
            let element = match category {
                // 轧差回填,先占位
                Category::UnitsStarted => Element::new(category, 0, m.progress),
                Category::CompletedOutput => Element::new(category, m.quantity, 1.0),
                _ => {
                    let units = (m.quantity as f64 * m.progress) as i64;
                    Element::new(category, units, m.progress)
                }
            };
            if category.is_right_side() {
                right_total += element.quantity;
            } else if category != Category::UnitsStarted {
                left_total_excl_started += element.quantity;
            }
            elements.insert(category, element);
        }

        let derived = right_total - left_total_excl_started;
        if derived < 0 {
            return Err(CostingError::InvalidMasterData {
                category: Category::UnitsStarted,
                message: format!("轧差投入约当量为负: {}", derived),
            });
        }
        if let Some(started) = elements.get_mut(&Category::UnitsStarted) {
            started.quantity = derived;
        }
        Ok(elements)
    }

    /// 守恒校验: 投入侧约当量合计 == 产出侧约当量合计
    fn verify_balance(&self, stage: &CostStage) -> CostingResult<()> {
        let left_total = stage.left_quantity_total();
        let right_total = stage.right_quantity_total();
        if left_total != right_total {
            return Err(CostingError::UnitBalanceMismatch {
                component: stage.component.clone(),
                left_total,
                right_total,
            });
        }
        Ok(())
    }
}

impl Default for EquivalentUnitEngine {
    fn default() -> Self {
        Self::new()
    }
}
