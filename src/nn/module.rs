/*
 * @Description  : Module trait 定义
 */

use crate::tensor::Tensor;

/// 模块 trait
///
/// - `forward()` **不是** trait 方法（签名各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()` / `parameters_mut()` 的顺序必须一致，
///   优化器与参数文件都按这一顺序对齐
pub trait Module {
    /// 获取所有可训练参数
    fn parameters(&self) -> Vec<&Tensor>;

    /// 获取所有可训练参数的可变引用（与`parameters()`同序）
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// 获取参数张量的数量
    fn num_params(&self) -> usize {
        self.parameters().len()
    }

    /// 获取标量参数的总个数
    fn num_scalars(&self) -> usize {
        self.parameters().iter().map(|p| p.size()).sum()
    }
}
