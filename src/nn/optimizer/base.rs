/*
 * @Author       : 老董
 * @Description  : 优化器基础trait
 */

use enum_dispatch::enum_dispatch;

use super::{Adam, SGD};
use crate::tensor::Tensor;

/// 优化器核心 trait
#[enum_dispatch]
pub trait Optimizer {
    /// 参数更新（使用已计算的梯度）
    ///
    /// ```ignore
    /// let cache = model.forward_cached(&x);
    /// let grads = model.backward(&cache, &g_rec, &g_emb);
    /// optimizer.step(&mut model.parameters_mut(), grads.as_slice());
    /// ```
    ///
    /// `params`与`grads`按下标一一对应，长度须一致。
    fn step(&mut self, params: &mut [&mut Tensor], grads: &[Tensor]);

    /// 重置累积状态
    fn reset(&mut self);

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);
}

/// 静态分发的优化器
#[enum_dispatch(Optimizer)]
#[derive(Debug, Clone)]
pub enum OptimizerKind {
    SGD,
    Adam,
}
