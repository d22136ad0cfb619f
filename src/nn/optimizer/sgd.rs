/*
 * @Author       : 老董
 * @Description  : SGD优化器实现
 */

use super::base::Optimizer;
use crate::tensor::Tensor;

/// 随机梯度下降：`θ = θ - lr * g`
#[derive(Debug, Clone)]
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [&mut Tensor], grads: &[Tensor]) {
        assert_eq!(params.len(), grads.len(), "参数与梯度的数量须一致");
        for (param, grad) in params.iter_mut().zip(grads) {
            **param -= &(grad * self.learning_rate);
        }
    }

    fn reset(&mut self) {}

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}
