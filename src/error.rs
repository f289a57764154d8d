// ==========================================
// 错误类型定义 - 成本核算错误
// ==========================================

use crate::domain::Category;
use thiserror::Error;

/// 成本核算错误类型
///
/// 错误分为三族：数据不一致（致命，立即终止本次核算）、
/// 计价除零（退化输入）、配置错误（构造边界拒绝非法参数）。
#[derive(Error, Debug)]
pub enum CostingError {
    // ===== 数据不一致错误 =====
    #[error("约当产量不守恒: 成本项目={component}, 左侧合计={left_total}, 右侧合计={right_total}")]
    UnitBalanceMismatch {
        component: String,
        left_total: i64,
        right_total: i64,
    },

    #[error("主数量表缺少必需类别: {0}")]
    MissingCategory(Category),

    #[error("主数量表数据非法: 类别={category}, 原因={message}")]
    InvalidMasterData { category: Category, message: String },

    // ===== 计价除零错误 =====
    #[error("计价分母为零: 成本项目={component}, 环节={context}")]
    ZeroDenominator { component: String, context: String },

    // ===== 配置错误 =====
    #[error("配置非法: {0}")]
    InvalidConfiguration(String),

    #[error("未知的要素类别: {0}")]
    UnknownCategory(String),

    #[error("未知的计价方法: {0}")]
    UnknownValuationMethod(String),

    #[error("未知的废品处理政策: {0}")]
    UnknownSpoilagePolicy(String),

    #[error("未知的投入方式: {0}")]
    UnknownInputPattern(String),

    // ===== 配置解析错误 =====
    #[error("核算配置解析失败: {0}")]
    ProfileParse(#[from] serde_json::Error),

    // ===== 其他错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 成本核算结果类型
pub type CostingResult<T> = Result<T, CostingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_balance_mismatch_message() {
        let err = CostingError::UnitBalanceMismatch {
            component: "直接材料".to_string(),
            left_total: 1680,
            right_total: 1600,
        };
        let msg = err.to_string();
        assert!(msg.contains("直接材料"), "错误信息应包含成本项目名称");
        assert!(msg.contains("1680"), "错误信息应包含左侧合计");
        assert!(msg.contains("1600"), "错误信息应包含右侧合计");
    }

    #[test]
    fn test_missing_category_message() {
        let err = CostingError::MissingCategory(Category::CompletedOutput);
        assert!(
            err.to_string().contains("COMPLETED_OUTPUT"),
            "错误信息应包含缺失类别"
        );
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: CostingError = anyhow::anyhow!("底层错误").into();
        assert!(matches!(err, CostingError::Other(_)));
    }
}
