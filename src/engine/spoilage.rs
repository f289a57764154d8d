// ==========================================
// 废品成本分摊引擎
// ==========================================

use serde_json::json;
use tracing::{debug, instrument};

use crate::domain::{Category, CostStage, SpoilagePolicy, ValuationMethod};
use crate::error::{CostingError, CostingResult};

/// 废品成本分摊引擎
///
/// 职责: 约当产量折算后判定正常废品成本的负担方与负担量,
///       计价完成后把废品成本按负担量再分摊给负担方
/// 输入: 已折算约当产量(负担判定)或已完成基础计价(再分摊)的成本项目
/// 输出: 写回要素的负担量与单价;每次判定输出 JSON 决策说明
///
/// 规则:
/// 1. 无正常废品要素或其约当量为 0 时显式跳过,不产生任何负担
/// 2. 度外视法: 完工产品必然负担;期末在制品进度严格越过发生点才负担,
///    且此时定点投入项目的本期投入量扣减期末在制品量(双重计入防护),
///    投入量不足以扣减时报数据不一致错误
/// 3. 非度外视法: 进度达到发生点(含相等)即负担;期末在制品不负担时
///    完工产品负担全部废品约当量
/// 4. 先进先出法下完工产品负担量取 本期投入-期末在制品-正常废品 轧差
/// 5. 异常废品/异常损耗只参与计价,永不负担
pub struct SpoilageAllocator {}

impl SpoilageAllocator {
    pub fn new() -> Self {
        SpoilageAllocator {}
    }

    /// 判定正常废品成本的负担方与负担量
    ///
    /// 返回 JSON 决策说明,由编排器写入成本项目备查。
    #[instrument(skip(self, stage), fields(component = %stage.component, policy = %stage.spoilage_policy))]
    pub fn assign_burden(&self, stage: &mut CostStage) -> CostingResult<String> {
        let Some(spoilage_point) = stage.spoilage_point() else {
            debug!("无正常废品要素,跳过负担判定");
            return Ok(json!({ "skipped": true, "reason": "无正常废品要素" }).to_string());
        };
        if stage.normal_spoilage_quantity() == 0 {
            debug!("正常废品约当量为零,跳过负担判定");
            return Ok(json!({ "skipped": true, "reason": "正常废品约当量为零" }).to_string());
        }

        match stage.spoilage_policy {
            SpoilagePolicy::Neglect => self.assign_neglect(stage, spoilage_point),
            SpoilagePolicy::NonNeglect => self.assign_non_neglect(stage, spoilage_point),
        }
    }

    /// 度外视法负担判定
    fn assign_neglect(&self, stage: &mut CostStage, spoilage_point: f64) -> CostingResult<String> {
        // 扣减本期投入之前先取轧差,先进先出负担量以折算值为准
        let output_burden = self.output_burden_quantity(stage);

        let last = stage
            .element(Category::EndingWip)
            .ok_or(CostingError::MissingCategory(Category::EndingWip))?;
        let last_quantity = last.quantity;
        let last_bears = last.progress > spoilage_point;

        let output = stage
            .element_mut(Category::CompletedOutput)
            .ok_or(CostingError::MissingCategory(Category::CompletedOutput))?;
        output.spoilage_burden = output_burden;

        let mut started_reduced = false;
        if last_bears {
            if let Some(last) = stage.element_mut(Category::EndingWip) {
                last.spoilage_burden = last_quantity;
            }
            // 定点投入下同一批数量同时站在投入侧与产出侧,扣减投入量防止重复负担
            if !stage.input_pattern.is_continuous() {
                let started = stage
                    .element_mut(Category::UnitsStarted)
                    .ok_or(CostingError::MissingCategory(Category::UnitsStarted))?;
                if started.quantity < last_quantity {
                    return Err(CostingError::InvalidMasterData {
                        category: Category::UnitsStarted,
                        message: format!(
                            "本期投入量 {} 不足以扣减期末在制品量 {}",
                            started.quantity, last_quantity
                        ),
                    });
                }
                started.quantity -= last_quantity;
                started_reduced = true;
            }
        }

        let note = json!({
            "policy": stage.spoilage_policy.as_str(),
            "spoilage_point": spoilage_point,
            "output_burden": output_burden,
            "ending_wip_burden": if last_bears { last_quantity } else { 0 },
            "units_started_reduced": started_reduced,
        })
        .to_string();
        debug!(%note, "度外视法负担判定完成");
        Ok(note)
    }

    /// 非度外视法负担判定
    fn assign_non_neglect(
        &self,
        stage: &mut CostStage,
        spoilage_point: f64,
    ) -> CostingResult<String> {
        let spoiled_quantity = stage.normal_spoilage_quantity();

        let last = stage
            .element(Category::EndingWip)
            .ok_or(CostingError::MissingCategory(Category::EndingWip))?;
        let last_quantity = last.quantity;
        let last_bears = last.bears_spoilage(spoilage_point);

        // 完工产品进度恒为 1.0,必然达到发生点
        let mut output_burden = self.output_burden_quantity(stage);
        if !last_bears {
            // 在制品尚未到达发生点,废品只可能出自完工产品,由其负担全部废品量
            output_burden = spoiled_quantity;
        }

        let output = stage
            .element_mut(Category::CompletedOutput)
            .ok_or(CostingError::MissingCategory(Category::CompletedOutput))?;
        output.spoilage_burden = output_burden;
        if let Some(last) = stage.element_mut(Category::EndingWip) {
            last.spoilage_burden = if last_bears { last_quantity } else { 0 };
        }

        let note = json!({
            "policy": stage.spoilage_policy.as_str(),
            "spoilage_point": spoilage_point,
            "output_burden": output_burden,
            "ending_wip_burden": if last_bears { last_quantity } else { 0 },
            "units_started_reduced": false,
        })
        .to_string();
        debug!(%note, "非度外视法负担判定完成");
        Ok(note)
    }

    /// 完工产品的负担量口径: 加权平均取自身约当量,先进先出取本期轧差
    fn output_burden_quantity(&self, stage: &CostStage) -> i64 {
        match stage.valuation_method {
            ValuationMethod::WeightedAverage => stage.quantity_of(Category::CompletedOutput),
            ValuationMethod::Fifo => stage.fifo_output_burden(),
        }
    }

    /// 把正常废品的计价成本按负担量比例再分摊给负担方
    ///
    /// 分摊后废品要素单价清零(成本已转出,不重复计入),
    /// 返回转出的分摊池金额。
    #[instrument(skip(self, stage), fields(component = %stage.component))]
    pub fn redistribute(&self, stage: &mut CostStage) -> CostingResult<f64> {
        let pool = stage.normal_spoilage_cost();
        if pool == 0.0 {
            return Ok(0.0);
        }

        let total_burden = stage.total_spoilage_burden();
        if total_burden <= 0 {
            return Err(CostingError::ZeroDenominator {
                component: stage.component.clone(),
                context: format!("废品成本再分摊(负担量合计={})", total_burden),
            });
        }

        for category in Category::ALL {
            // 异常类别只参与计价,永不吸收废品成本
            if category.is_abnormal() {
                continue;
            }
            let Some(element) = stage.element_mut(category) else {
                continue;
            };
            // 零数量要素无法承载单价,不参与分摊
            if element.spoilage_burden > 0 && element.quantity > 0 {
                let share = pool * element.spoilage_burden as f64 / total_burden as f64;
                element.add_cost(share);
            }
        }
        if let Some(spoilage) = stage.element_mut(Category::NormalSpoilage) {
            spoilage.unit_cost = 0.0;
        }

        debug!(pool, total_burden, "废品成本再分摊完成");
        Ok(pool)
    }
}

impl Default for SpoilageAllocator {
    fn default() -> Self {
        Self::new()
    }
}
