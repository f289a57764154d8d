// ==========================================
// 成本核算编排器
// ==========================================

use tracing::{debug, info, instrument};

use crate::domain::{Category, CostingReport, ProcessCostSheet};
use crate::engine::equivalent_units::EquivalentUnitEngine;
use crate::engine::spoilage::SpoilageAllocator;
use crate::engine::valuation::ValuationEngine;
use crate::error::CostingResult;

/// 成本核算编排器
///
/// 职责: 串联 输入校验 → 约当产量折算 → 废品负担判定 →
///       基础计价与再分摊 → 汇总,任一步失败立即终止且不写合计
/// 输入: 已填充主数量表与成本项目的成本计算单
/// 输出: 计算单上的三项合计 + 独立的核算报告
///
/// 流程单向无回环;重复运行同一张计算单结果不变。
pub struct CostingOrchestrator {
    quantifier: EquivalentUnitEngine,
    allocator: SpoilageAllocator,
    valuer: ValuationEngine,
}

impl CostingOrchestrator {
    pub fn new() -> Self {
        CostingOrchestrator {
            quantifier: EquivalentUnitEngine::new(),
            allocator: SpoilageAllocator::new(),
            valuer: ValuationEngine::new(),
        }
    }

    /// 执行完整核算流程
    #[instrument(skip(self, sheet), fields(period = %sheet.period, stage_count = sheet.stages.len()))]
    pub fn run(&self, sheet: &mut ProcessCostSheet) -> CostingResult<CostingReport> {
        info!(
            period = %sheet.period,
            stage_count = sheet.stages.len(),
            "开始成本核算"
        );

        // ==========================================
        // 步骤1: 输入校验
        // ==========================================
        debug!("步骤1: 执行输入校验");
        sheet.validate()?;

        // ==========================================
        // 步骤2: 约当产量折算(整体重建各项目要素表)
        // ==========================================
        debug!("步骤2: 执行约当产量折算");
        for stage in &mut sheet.stages {
            self.quantifier.quantify_stage(&sheet.master, stage)?;
        }
        info!(stage_count = sheet.stages.len(), "约当产量折算完成");

        // ==========================================
        // 步骤3: 废品负担判定
        // ==========================================
        debug!("步骤3: 执行废品负担判定");
        for stage in &mut sheet.stages {
            let note = self.allocator.assign_burden(stage)?;
            stage.allocation_note = Some(note);
        }
        info!("废品负担判定完成");

        // ==========================================
        // 步骤4: 基础计价与废品成本再分摊
        // ==========================================
        debug!("步骤4: 执行计价与再分摊");
        let mut reallocated = Vec::with_capacity(sheet.stages.len());
        for stage in &mut sheet.stages {
            self.valuer.value_stage(stage)?;
            let moved = self.allocator.redistribute(stage)?;
            debug!(component = %stage.component, moved, "成本项目计价完成");
            reallocated.push(moved);
        }
        info!("计价与再分摊完成");

        // ==========================================
        // 步骤5: 汇总
        // ==========================================
        debug!("步骤5: 执行汇总");
        self.aggregate(sheet);
        let report = CostingReport::from_sheet(sheet, &reallocated);
        info!(
            ending_wip_total = sheet.ending_wip_total_cost,
            finished_goods_total = sheet.finished_goods_total_cost,
            finished_goods_unit = sheet.finished_goods_unit_cost,
            "成本核算完成"
        );
        Ok(report)
    }

    /// 跨成本项目汇总三项合计
    fn aggregate(&self, sheet: &mut ProcessCostSheet) {
        let ending_wip_total: f64 = sheet
            .stages
            .iter()
            .map(|s| s.element(Category::EndingWip).map_or(0.0, |e| e.cost()))
            .sum();
        let finished_goods_total: f64 = sheet
            .stages
            .iter()
            .map(|s| s.element(Category::CompletedOutput).map_or(0.0, |e| e.cost()))
            .sum();
        let output_quantity = sheet.output_quantity();

        sheet.ending_wip_total_cost = ending_wip_total;
        sheet.finished_goods_total_cost = finished_goods_total;
        // 完工数量为零是合法退化输入,平均单位成本按零处理
        sheet.finished_goods_unit_cost = if output_quantity > 0 {
            finished_goods_total / output_quantity as f64
        } else {
            0.0
        };
    }
}

impl Default for CostingOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CostStage, Element, InputPattern, SpoilagePolicy, ValuationMethod};
    use crate::error::CostingError;
    use std::collections::HashMap;

    fn create_test_sheet() -> ProcessCostSheet {
        let mut master = HashMap::new();
        master.insert(
            Category::BeginningWip,
            Element::new(Category::BeginningWip, 300, 0.6),
        );
        master.insert(
            Category::UnitsStarted,
            Element::new(Category::UnitsStarted, 1380, 0.0),
        );
        master.insert(
            Category::CompletedOutput,
            Element::new(Category::CompletedOutput, 1440, 1.0),
        );
        master.insert(
            Category::EndingWip,
            Element::new(Category::EndingWip, 240, 0.3),
        );
        let stage = CostStage::new(
            "直接材料",
            InputPattern::PointInTime { timing: 0.0 },
            ValuationMethod::WeightedAverage,
            SpoilagePolicy::Neglect,
            206400.0,
            717600.0,
        );
        ProcessCostSheet::new("2026-07", master, vec![stage])
    }

    #[test]
    fn test_run_writes_totals_and_report() {
        let orchestrator = CostingOrchestrator::new();
        let mut sheet = create_test_sheet();

        let report = orchestrator.run(&mut sheet).unwrap();

        assert!((sheet.finished_goods_total_cost - 792000.0).abs() < 1e-6, "1440 × 550");
        assert!((sheet.ending_wip_total_cost - 132000.0).abs() < 1e-6, "240 × 550");
        assert!((sheet.finished_goods_unit_cost - 550.0).abs() < 1e-9);
        assert_eq!(report.period, "2026-07");
        assert!((report.finished_goods_unit_cost - 550.0).abs() < 1e-9);
        assert!(report.stages[0].allocation_note.is_some(), "决策说明应写回报告");
    }

    #[test]
    fn test_run_zero_output_quantity_falls_back_to_zero() {
        let orchestrator = CostingOrchestrator::new();
        let mut master = HashMap::new();
        master.insert(
            Category::BeginningWip,
            Element::new(Category::BeginningWip, 100, 0.5),
        );
        master.insert(
            Category::UnitsStarted,
            Element::new(Category::UnitsStarted, 100, 0.0),
        );
        master.insert(
            Category::CompletedOutput,
            Element::new(Category::CompletedOutput, 0, 1.0),
        );
        master.insert(
            Category::EndingWip,
            Element::new(Category::EndingWip, 200, 0.4),
        );
        let stage = CostStage::new(
            "直接材料",
            InputPattern::PointInTime { timing: 0.0 },
            ValuationMethod::WeightedAverage,
            SpoilagePolicy::Neglect,
            1000.0,
            1000.0,
        );
        let mut sheet = ProcessCostSheet::new("2026-08", master, vec![stage]);

        orchestrator.run(&mut sheet).unwrap();

        assert!((sheet.ending_wip_total_cost - 2000.0).abs() < 1e-9, "200 × 10");
        assert_eq!(sheet.finished_goods_total_cost, 0.0);
        assert_eq!(
            sheet.finished_goods_unit_cost, 0.0,
            "完工数量为零时平均单位成本按零处理"
        );
    }

    #[test]
    fn test_run_rejects_invalid_sheet_before_computing() {
        let orchestrator = CostingOrchestrator::new();
        let mut sheet = create_test_sheet();
        sheet.master.remove(&Category::EndingWip);

        let result = orchestrator.run(&mut sheet);

        assert!(matches!(
            result,
            Err(CostingError::MissingCategory(Category::EndingWip))
        ));
        assert_eq!(sheet.finished_goods_total_cost, 0.0, "失败的核算不写合计");
    }
}
