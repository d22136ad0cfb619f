use std::path::PathBuf;

use thiserror::Error;
mod ops;
pub use self::ops::*;

/// 动态图嵌入相关的统一错误类型
#[derive(Error, Debug)]
pub enum DynGeError {
    // 超参数/配置非法
    #[error("配置错误：{0}")]
    Configuration(String),
    // 数字比较用
    #[error("配置错误：{value_name}须{operator}{threshold}")]
    ValueMustSatisfyComparison {
        value_name: String,
        operator: ComparisonOperator,
        threshold: String,
    },

    #[error("数值错误：{0}")]
    Value(String),
    #[error("索引越界：{index}不在[0, {len})范围内")]
    Index { index: usize, len: usize },
    #[error("状态错误：{0}")]
    State(String),

    #[error("已保存的模型数量({found})与快照数量({expected})不一致")]
    MissingModel { expected: usize, found: usize },
    #[error("找不到模型文件：{0}")]
    ModelNotFound(PathBuf),
    #[error("路径无效：{0}")]
    InvalidPath(PathBuf),

    #[error("IO 错误：{0}")]
    Io(#[from] std::io::Error),
    #[error("序列化错误：{0}")]
    Serialization(String),

    #[error("训练在第{epoch}个epoch发散，损失值为{loss}")]
    Diverged { epoch: usize, loss: f32 },
}

impl DynGeError {
    /// 构造一个“某值须满足某比较条件”的配置错误
    pub fn must_satisfy<T: ToString>(
        value_name: &str,
        operator: ComparisonOperator,
        threshold: T,
    ) -> Self {
        Self::ValueMustSatisfyComparison {
            value_name: value_name.to_string(),
            operator,
            threshold: threshold.to_string(),
        }
    }
}

impl From<bincode::Error> for DynGeError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(format!("bincode: {e}"))
    }
}

impl From<serde_json::Error> for DynGeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(format!("json: {e}"))
    }
}

impl From<ndarray_npy::WriteNpyError> for DynGeError {
    fn from(e: ndarray_npy::WriteNpyError) -> Self {
        Self::Serialization(format!("npy写入: {e}"))
    }
}

impl From<ndarray_npy::ReadNpyError> for DynGeError {
    fn from(e: ndarray_npy::ReadNpyError) -> Self {
        Self::Serialization(format!("npy读取: {e}"))
    }
}
