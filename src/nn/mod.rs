/*
 * @Author       : 老董
 * @Description  : 神经网络模块：深度自编码器及其训练所需的全部部件
 *
 * - `activation`: 激活函数（前向与基于输出的导数）
 * - `layer`: 全连接层，含手写的反向传播与增长/复制等结构手术原语
 * - `autoencoder`: 对称的编码器/解码器
 * - `schedule`: 隐藏层宽度表的计算
 * - `surgery`: 输入维度扩展（可选 net2net 加宽）
 * - `criterion`: 图重构损失（加权重构项 + 一阶邻近项）
 * - `optimizer`: SGD / Adam
 * - `model_io`: 模型描述(.json) + 参数(.bin) 的保存与加载
 */

mod activation;
mod autoencoder;
mod criterion;
pub mod layer;
mod model_io;
mod module;
pub mod optimizer;
mod schedule;
mod surgery;

#[cfg(test)]
mod tests;

pub use activation::Activation;
pub use autoencoder::{Autoencoder, AutoencoderConfig, ForwardCache, Gradients};
pub use criterion::{GraphReconstructionLoss, LossGrads, LossTerms};
pub use layer::Linear;
pub use model_io::{ModelDescriptor, PARAMS_MAGIC, PARAMS_VERSION};
pub use module::Module;
pub use optimizer::{Adam, Optimizer, OptimizerKind, OptimizerType, SGD};
pub use schedule::hidden_layer_schedule;
pub use surgery::{ExpandOptions, expand_model, net2wider};
