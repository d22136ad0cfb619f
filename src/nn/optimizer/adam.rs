/*
 * @Author       : 老董
 * @Description  : Adam优化器实现
 */

use std::collections::HashMap;

use super::base::Optimizer;
use crate::tensor::Tensor;

/// Adam优化器
///
/// 一阶/二阶矩按参数在`parameters()`中的下标保存。
/// 若某下标处参数的形状变了（例如模型被扩展），该参数的矩估计会被重新置零。
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// 一阶矩估计
    m: HashMap<usize, Tensor>,
    /// 二阶矩估计
    v: HashMap<usize, Tensor>,
    /// 时间步
    t: usize,
}

impl Adam {
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    /// 使用默认参数创建Adam优化器
    pub fn new_default(learning_rate: f32) -> Self {
        Self::new(learning_rate, 0.9, 0.999, 1e-8)
    }

    /// 当前时间步
    pub fn time_step(&self) -> usize {
        self.t
    }

    fn moment<'a>(moments: &'a mut HashMap<usize, Tensor>, idx: usize, like: &Tensor) -> &'a mut Tensor {
        let slot = moments
            .entry(idx)
            .or_insert_with(|| Tensor::zeros(like.shape()));
        if !slot.is_same_shape(like) {
            *slot = Tensor::zeros(like.shape());
        }
        slot
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Tensor], grads: &[Tensor]) {
        assert_eq!(params.len(), grads.len(), "参数与梯度的数量须一致");
        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);

        for (idx, (param, gradient)) in params.iter_mut().zip(grads).enumerate() {
            // 原地更新一阶矩估计: m = β1 * m + (1 - β1) * g
            let m = Self::moment(&mut self.m, idx, gradient);
            *m *= self.beta1;
            *m += &(gradient * (1.0 - self.beta1));
            let m_hat = &*m / bias_correction1;

            // 原地更新二阶矩估计: v = β2 * v + (1 - β2) * g²
            let v = Self::moment(&mut self.v, idx, gradient);
            *v *= self.beta2;
            *v += &(&(gradient * gradient) * (1.0 - self.beta2));
            let v_hat = &*v / bias_correction2;

            // 参数更新: θ = θ - α * m_hat / (√v_hat + ε)
            let denominator = &v_hat.sqrt() + self.epsilon;
            let update = &m_hat / &denominator;
            **param -= &(&update * self.learning_rate);
        }
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}
