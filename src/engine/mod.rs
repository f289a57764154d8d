// ==========================================
// 分步成本核算引擎 - 引擎层
// ==========================================
// 职责: 实现核算规则引擎,不碰外部 I/O
// 红线: 引擎只读写计算单, 所有分摊决策必须输出 reason
// ==========================================

pub mod equivalent_units;
pub mod orchestrator;
pub mod spoilage;
pub mod valuation;

// 重导出核心引擎
pub use equivalent_units::EquivalentUnitEngine;
pub use orchestrator::CostingOrchestrator;
pub use spoilage::SpoilageAllocator;
pub use valuation::ValuationEngine;
