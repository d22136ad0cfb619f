/*
 * @Author       : 老董
 * @Description  : 动态图嵌入
 *
 * - `config`: 强类型配置（模型超参数、训练参数、检查点策略、整体设置）
 * - `static_ge`: 单个快照的训练器与状态机
 * - `dyn_ge`: 跨快照的编排器
 * - `checkpoint`: 训练过程中的检查点与轮转
 * - `persistence`: 按快照序号组织的文件布局
 */

mod checkpoint;
mod config;
mod dyn_ge;
pub mod persistence;
mod static_ge;

#[cfg(test)]
mod tests;

pub use checkpoint::{Checkpoint, CheckpointManager};
pub use config::{CheckpointConfig, CheckpointTrigger, DynGeConfig, Settings, TrainConfig};
pub use dyn_ge::{DynGraphEmbedding, PreviousModel};
pub use static_ge::{StaticGraphEmbedding, TrainReport, TrainingState};
