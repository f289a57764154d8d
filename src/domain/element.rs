// ==========================================
// 成本要素领域模型
// ==========================================

use serde::{Deserialize, Serialize};

use super::types::Category;

/// 成本要素: 某一流转类别在一个成本项目内的数量与计价数据点
///
/// 数量一律为约当产量口径(由约当产量引擎折算后写入),
/// 单价与废品负担量在计价/分摊阶段填充。
/// 要素只在单次核算内有效,每次运行由主数量表重建。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub category: Category,   // 要素类别
    pub unit_cost: f64,       // 单位成本(计价阶段写入, >= 0)
    pub quantity: i64,        // 约当产量(>= 0)
    pub progress: f64,        // 加工进度 [0.0, 1.0]
    pub spoilage_burden: i64, // 正常废品负担量(约当量口径)
}

impl Element {
    /// 创建要素,单价与负担量为零
    pub fn new(category: Category, quantity: i64, progress: f64) -> Self {
        Element {
            category,
            unit_cost: 0.0,
            quantity,
            progress,
            spoilage_burden: 0,
        }
    }

    /// 要素总成本 = 单价 × 约当产量
    pub fn cost(&self) -> f64 {
        self.unit_cost * self.quantity as f64
    }

    /// 吸收一笔分摊成本并重算单价
    ///
    /// 调用方必须保证 quantity > 0,零数量要素由分摊方排除。
    pub fn add_cost(&mut self, amount: f64) {
        self.unit_cost =
            (self.unit_cost * self.quantity as f64 + amount) / self.quantity as f64;
    }

    /// 加工进度是否已达废品发生点(达到即可负担废品成本)
    pub fn bears_spoilage(&self, spoilage_point: f64) -> bool {
        self.progress >= spoilage_point
    }
}
