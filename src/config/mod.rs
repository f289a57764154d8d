// ==========================================
// 分步成本核算引擎 - 配置层
// ==========================================
// 职责: 外部核算配置的解析与校验
// 红线: 非法取值立即拒绝, 不做静默回退
// ==========================================

pub mod costing_profile;

// 重导出配置 DTO
pub use costing_profile::{CostingProfile, MasterRecord, StageProfile};
