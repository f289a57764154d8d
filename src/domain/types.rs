// ==========================================
// 分步成本核算引擎 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 要素类别 (Element Category)
// ==========================================
// 数量流转的八个去向: 投入侧 = 期初在制品 + 本期投入, 其余为产出侧
// 约当产量计算后两侧合计必须相等(守恒校验)
// 序列化格式: SCREAMING_SNAKE_CASE (与外部配置一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    BeginningWip,      // 期初在制品
    UnitsStarted,      // 本期投入
    CompletedOutput,   // 完工产品
    EndingWip,         // 期末在制品
    NormalSpoilage,    // 正常废品
    AbnormalSpoilage,  // 异常废品
    NormalShrinkage,   // 正常损耗
    AbnormalShrinkage, // 异常损耗
}

impl Category {
    /// 全部类别,固定遍历顺序(分摊与报表输出按此顺序)
    pub const ALL: [Category; 8] = [
        Category::BeginningWip,
        Category::UnitsStarted,
        Category::CompletedOutput,
        Category::EndingWip,
        Category::NormalSpoilage,
        Category::AbnormalSpoilage,
        Category::NormalShrinkage,
        Category::AbnormalShrinkage,
    ];

    /// 主数量表必须提供的流转类别
    pub const REQUIRED: [Category; 4] = [
        Category::BeginningWip,
        Category::UnitsStarted,
        Category::CompletedOutput,
        Category::EndingWip,
    ];

    /// 是否为投入侧类别
    pub fn is_left_side(&self) -> bool {
        matches!(self, Category::BeginningWip | Category::UnitsStarted)
    }

    /// 是否为产出侧类别
    pub fn is_right_side(&self) -> bool {
        !self.is_left_side()
    }

    /// 是否为异常类别(参与计价,永不参与废品负担)
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Category::AbnormalSpoilage | Category::AbnormalShrinkage)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BeginningWip => "BEGINNING_WIP",
            Category::UnitsStarted => "UNITS_STARTED",
            Category::CompletedOutput => "COMPLETED_OUTPUT",
            Category::EndingWip => "ENDING_WIP",
            Category::NormalSpoilage => "NORMAL_SPOILAGE",
            Category::AbnormalSpoilage => "ABNORMAL_SPOILAGE",
            Category::NormalShrinkage => "NORMAL_SHRINKAGE",
            Category::AbnormalShrinkage => "ABNORMAL_SHRINKAGE",
        }
    }

    /// 从字符串解析类别,未知值返回 None(配置边界拒绝非法输入)
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BEGINNING_WIP" => Some(Category::BeginningWip),
            "UNITS_STARTED" => Some(Category::UnitsStarted),
            "COMPLETED_OUTPUT" => Some(Category::CompletedOutput),
            "ENDING_WIP" => Some(Category::EndingWip),
            "NORMAL_SPOILAGE" => Some(Category::NormalSpoilage),
            "ABNORMAL_SPOILAGE" => Some(Category::AbnormalSpoilage),
            "NORMAL_SHRINKAGE" => Some(Category::NormalShrinkage),
            "ABNORMAL_SHRINKAGE" => Some(Category::AbnormalShrinkage),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 计价方法 (Valuation Method)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValuationMethod {
    Fifo,            // 先进先出法: 本期投入单独计价,完工产品单价轧差
    WeightedAverage, // 加权平均法: 期初与本期成本合并计算单一单价
}

impl ValuationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationMethod::Fifo => "FIFO",
            ValuationMethod::WeightedAverage => "WEIGHTED_AVERAGE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "FIFO" => Some(ValuationMethod::Fifo),
            "WEIGHTED_AVERAGE" => Some(ValuationMethod::WeightedAverage),
            _ => None,
        }
    }
}

impl fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 废品处理政策 (Spoilage Policy)
// ==========================================
// 决定正常废品成本由谁吸收
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpoilagePolicy {
    Neglect,    // 度外视法: 废品视同不存在,成本由合格产出吸收
    NonNeglect, // 非度外视法: 按废品发生点判定负担方后明细分摊
}

impl SpoilagePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpoilagePolicy::Neglect => "NEGLECT",
            SpoilagePolicy::NonNeglect => "NON_NEGLECT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "NEGLECT" => Some(SpoilagePolicy::Neglect),
            "NON_NEGLECT" => Some(SpoilagePolicy::NonNeglect),
            _ => None,
        }
    }
}

impl fmt::Display for SpoilagePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 投入方式 (Input Pattern)
// ==========================================
// 决定约当产量折算规则: 定点投入按是否越过投入点取全量或零,
// 平均投入按加工进度折算
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputPattern {
    /// 定点投入(timing = 投入点进度, 0.0 表示开工即投入)
    PointInTime { timing: f64 },
    /// 随加工进度平均投入
    Continuous,
}

impl InputPattern {
    /// 是否随加工进度平均投入
    pub fn is_continuous(&self) -> bool {
        matches!(self, InputPattern::Continuous)
    }

    /// 定点投入的投入点进度
    pub fn timing(&self) -> Option<f64> {
        match self {
            InputPattern::PointInTime { timing } => Some(*timing),
            InputPattern::Continuous => None,
        }
    }

    pub fn mode_str(&self) -> &'static str {
        match self {
            InputPattern::PointInTime { .. } => "POINT_IN_TIME",
            InputPattern::Continuous => "CONTINUOUS",
        }
    }

    /// 从模式字符串与投入点构造(配置解析用)
    pub fn from_mode(mode: &str, timing: f64) -> Option<Self> {
        match mode {
            "POINT_IN_TIME" => Some(InputPattern::PointInTime { timing }),
            "CONTINUOUS" => Some(InputPattern::Continuous),
            _ => None,
        }
    }
}

impl fmt::Display for InputPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mode_str())
    }
}
