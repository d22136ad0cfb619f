/*
 * @Author       : 老董
 * @Description  : 图重构损失
 *
 * 对一个含`b`行（下标集合为`I`）的批次：
 *   L = (1/b)·Σ((X̂−X)⊙B)² + α·(1/b)·Σ_{i,j∈I} A_ij·‖y_i−y_j‖²
 * 其中`B_ij = β`（若`X_ij > 0`）否则为1。正则项由`Autoencoder::regularization_loss`给出。
 *
 * 邻近项借助拉普拉斯形式计算：令`S = A[I, I]`，`M = D_out + D_in − S − Sᵀ`，
 * 则`Σ S_ij‖y_i−y_j‖² = tr(YᵀMY)`，对`Y`的梯度为`2MY`。
 */

use crate::tensor::Tensor;

/// 一个批次的各项损失
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LossTerms {
    pub reconstruction: f32,
    pub proximity: f32,
    pub regularization: f32,
}

impl LossTerms {
    pub fn total(&self) -> f32 {
        self.reconstruction + self.proximity + self.regularization
    }
}

/// 损失对网络两个出口的梯度
#[derive(Debug, Clone)]
pub struct LossGrads {
    /// 对重构`X̂`的梯度
    pub reconstruction: Tensor,
    /// 对嵌入`Y`的梯度
    pub embedding: Tensor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphReconstructionLoss {
    alpha: f32,
    beta: f32,
}

impl GraphReconstructionLoss {
    pub fn new(alpha: f32, beta: f32) -> Self {
        Self { alpha, beta }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn beta(&self) -> f32 {
        self.beta
    }

    /// 计算重构项与邻近项及其梯度（正则项不在此处）
    ///
    /// - `x`: 批次的邻接行`[b, n]`
    /// - `x_hat`: 重构`[b, n]`
    /// - `y`: 嵌入`[b, d]`
    /// - `batch_adjacency`: 批次内部的邻接子块`A[I, I]`，形状`[b, b]`
    pub fn compute(
        &self,
        x: &Tensor,
        x_hat: &Tensor,
        y: &Tensor,
        batch_adjacency: &Tensor,
    ) -> (LossTerms, LossGrads) {
        let b = x.rows().max(1) as f32;

        // ↓↓↓ 加权重构项 ↓↓↓
        let beta = self.beta;
        let weight = |v: f32| if v > 0.0 { beta } else { 1.0 };
        let weighted_diff = x_hat.zip_map(x, |h, v| (h - v) * weight(v));
        let reconstruction = weighted_diff.square_sum() / b;
        let grad_reconstruction = weighted_diff.zip_map(x, |d, v| d * weight(v)) * (2.0 / b);
        // ↑↑↑ 加权重构项 ↑↑↑

        // ↓↓↓ 一阶邻近项 ↓↓↓
        let degrees = batch_adjacency.sum_cols() + batch_adjacency.sum_rows().transpose();
        let my = y.scale_rows(&degrees)
            - &batch_adjacency.mat_mul(y)
            - &batch_adjacency.t_mat_mul(y);
        let proximity = self.alpha / b * (y * &my).sum();
        let grad_embedding = my * (2.0 * self.alpha / b);
        // ↑↑↑ 一阶邻近项 ↑↑↑

        (
            LossTerms {
                reconstruction,
                proximity,
                regularization: 0.0,
            },
            LossGrads {
                reconstruction: grad_reconstruction,
                embedding: grad_embedding,
            },
        )
    }
}
