/*
 * @Author       : 老董
 * @Description  : Linear (全连接) 层
 *
 * 前向为`output = x @ W + b`，反向传播手写完成。
 * 另外提供模型扩展所需的结构手术原语：
 * - `grow_inputs` / `grow_outputs`：追加新初始化的输入行 / 输出列
 * - `replicate_outputs` / `replicate_inputs`：net2net 加宽时复制单元并拆分出边权重
 */

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Init;
use crate::nn::Module;
use crate::tensor::Tensor;

/// Linear (全连接) 层
///
/// # 输入/输出形状
/// - 输入：[batch_size, in_features]
/// - 输出：[batch_size, out_features]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    /// 权重参数 [in_features, out_features]
    weights: Tensor,
    /// 偏置参数 [1, out_features]
    bias: Tensor,
}

/// 一次反向传播得到的梯度
#[derive(Debug, Clone)]
pub struct LinearGrads {
    pub weights: Tensor,
    pub bias: Tensor,
    /// 对该层输入的梯度，用于继续向前传播
    pub input: Tensor,
}

impl Linear {
    /// 创建新的 Linear 层：权重 Xavier 初始化，偏置零初始化
    pub fn new<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        Self {
            weights: Init::Xavier.generate(&[in_features, out_features], rng),
            bias: Tensor::zeros(&[1, out_features]),
        }
    }

    /// 由现成的权重与偏置组装，形状不匹配时panic
    pub fn from_parts(weights: Tensor, bias: Tensor) -> Self {
        assert!(
            bias.rows() == 1 && bias.cols() == weights.cols(),
            "偏置形状{:?}与权重形状{:?}不匹配",
            bias.shape(),
            weights.shape()
        );
        Self { weights, bias }
    }

    /// 全零的层，用于加载参数前占位
    pub fn zeros(in_features: usize, out_features: usize) -> Self {
        Self {
            weights: Tensor::zeros(&[in_features, out_features]),
            bias: Tensor::zeros(&[1, out_features]),
        }
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        x.mat_mul(&self.weights) + &self.bias
    }

    /// 已知对输出（激活前）的梯度`grad_output`，求各参数与输入的梯度
    pub fn backward(&self, input: &Tensor, grad_output: &Tensor) -> LinearGrads {
        LinearGrads {
            weights: input.t_mat_mul(grad_output),
            bias: grad_output.sum_rows(),
            input: grad_output.mat_mul_t(&self.weights),
        }
    }

    pub fn in_features(&self) -> usize {
        self.weights.rows()
    }

    pub fn out_features(&self) -> usize {
        self.weights.cols()
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }
}

// 结构手术
impl Linear {
    /// 追加`extra`个输入：权重末尾追加新初始化的行，已有的行保持不变
    pub(crate) fn grow_inputs<R: Rng + ?Sized>(&mut self, extra: usize, rng: &mut R) {
        if extra == 0 {
            return;
        }
        let fresh = Init::Xavier.generate(&[extra, self.out_features()], rng);
        self.weights = self.weights.pad_rows(&fresh);
    }

    /// 追加`extra`个输出：权重末尾追加新初始化的列，偏置追加0
    pub(crate) fn grow_outputs<R: Rng + ?Sized>(&mut self, extra: usize, rng: &mut R) {
        if extra == 0 {
            return;
        }
        let fresh = Init::Xavier.generate(&[self.in_features(), extra], rng);
        self.weights = self.weights.pad_cols(&fresh);
        self.bias = self.bias.pad_cols(&Tensor::zeros(&[1, extra]));
    }

    /// 按映射`mapping`重排输出单元：新的第`j`个输出是原第`mapping[j]`个输出的副本
    pub(crate) fn replicate_outputs(&mut self, mapping: &[usize]) {
        self.weights = self.weights.select_cols(mapping);
        self.bias = self.bias.select_cols(mapping);
    }

    /// 按映射`mapping`重排输入，并把第`j`行缩放`scales[j]`
    ///
    /// 同一源单元的所有副本的缩放系数之和为1时，层的输出保持不变。
    pub(crate) fn replicate_inputs(&mut self, mapping: &[usize], scales: &[f32]) {
        assert_eq!(mapping.len(), scales.len(), "映射与缩放系数的长度须一致");
        let factors = Tensor::new(scales, &[scales.len(), 1]);
        self.weights = self.weights.select_rows(mapping).scale_rows(&factors);
    }
}

impl Module for Linear {
    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weights, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weights, &mut self.bias]
    }
}
