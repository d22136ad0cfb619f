/*
 * @Author       : 老董
 * @Description  : 优化器模块，实现 PyTorch 风格的梯度优化算法
 */

mod adam;
mod base;
mod sgd;

pub use adam::Adam;
pub use base::{Optimizer, OptimizerKind};
pub use sgd::SGD;

use serde::{Deserialize, Serialize};

/// 可配置的优化器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerType {
    Sgd,
    #[default]
    Adam,
}

impl OptimizerKind {
    /// 按种类与学习率创建（Adam 使用默认的β1、β2、ε）
    pub fn new(kind: OptimizerType, learning_rate: f32) -> Self {
        match kind {
            OptimizerType::Sgd => SGD::new(learning_rate).into(),
            OptimizerType::Adam => Adam::new_default(learning_rate).into(),
        }
    }
}
