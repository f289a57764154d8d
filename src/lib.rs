// ==========================================
// 分步成本核算引擎 - 核心库
// ==========================================
// 技术栈: Rust (纯同步计算, 无外部 I/O)
// 系统定位: 工序成本核算内核 (展示层/持久化由调用方承担)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 核算规则
pub mod engine;

// 配置层 - 外部核算配置
pub mod config;

// 错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Category, InputPattern, SpoilagePolicy, ValuationMethod};

// 领域实体
pub use domain::{CostStage, CostingReport, Element, ProcessCostSheet, StageReport};

// 引擎
pub use engine::{CostingOrchestrator, EquivalentUnitEngine, SpoilageAllocator, ValuationEngine};

// 配置
pub use config::{CostingProfile, MasterRecord, StageProfile};

// 错误
pub use error::{CostingError, CostingResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "分步成本核算引擎";

// ==========================================
// 预编译检查
// ==========================================
