//! # Dyn GE
//!
//! `dyn_ge`用纯rust实现动态图（按时间排列的一串图快照）上的节点嵌入：
//! 每个快照用一个深度自编码器重构节点的邻接行，
//! 后一个快照的模型由前一个快照训练好的模型经结构扩展（可选 [net2net](https://arxiv.org/abs/1511.05641) 加宽）得到，
//! 从而把在小图上学到的权重迁移到更大的图上，而不是从头再学。
//!

pub mod data;
pub mod dynge;
pub mod errors;
pub mod eval;
pub mod nn;
pub mod tensor;

pub use dynge::{
    CheckpointConfig, DynGeConfig, DynGraphEmbedding, PreviousModel, Settings,
    StaticGraphEmbedding, TrainConfig, TrainReport, TrainingState,
};
pub use errors::DynGeError;
