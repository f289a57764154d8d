// ==========================================
// 领域模型层 - Domain Models
// ==========================================

pub mod element; // 成本要素
pub mod report;  // 核算报告
pub mod sheet;   // 成本计算单
pub mod stage;   // 成本项目
pub mod types;   // 枚举类型

pub use element::Element;
pub use report::{CostingReport, StageReport};
pub use sheet::ProcessCostSheet;
pub use stage::CostStage;
pub use types::{Category, InputPattern, SpoilagePolicy, ValuationMethod};
