/*
 * @Author       : 老董
 * @Description  : 对称的深度自编码器
 *
 * 编码端宽度依次为`input_dim → hidden_dims[0] → … → hidden_dims[L-1](=embedding_dim)`，
 * 解码端严格镜像。隐藏层使用配置的激活函数，解码端最后一层固定为 Sigmoid
 * （重构的是取值在[0, 1]的邻接行）。
 */

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Activation, Linear, Module};
use crate::errors::{ComparisonOperator, DynGeError};
use crate::tensor::Tensor;

/// 自编码器的结构与正则化超参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderConfig {
    pub input_dim: usize,
    pub embedding_dim: usize,
    /// 编码端各层宽度，最后一个即`embedding_dim`
    pub hidden_dims: Vec<usize>,
    pub l1: f32,
    pub l2: f32,
    pub activation: Activation,
}

impl AutoencoderConfig {
    pub fn validate(&self) -> Result<(), DynGeError> {
        if self.input_dim == 0 {
            return Err(DynGeError::must_satisfy(
                "input_dim",
                ComparisonOperator::GreaterThan,
                0,
            ));
        }
        if self.embedding_dim == 0 {
            return Err(DynGeError::must_satisfy(
                "embedding_dim",
                ComparisonOperator::GreaterThan,
                0,
            ));
        }
        let Some((&last, inner)) = self.hidden_dims.split_last() else {
            return Err(DynGeError::Configuration("hidden_dims不能为空".to_string()));
        };
        if last != self.embedding_dim {
            return Err(DynGeError::Configuration(format!(
                "hidden_dims的最后一层须等于embedding_dim({})，而非{last}",
                self.embedding_dim
            )));
        }
        if let Some(&w) = inner.iter().find(|&&w| w <= self.embedding_dim) {
            return Err(DynGeError::Configuration(format!(
                "隐藏层宽度{w}不大于embedding_dim({})",
                self.embedding_dim
            )));
        }
        if self.hidden_dims.windows(2).any(|w| w[0] <= w[1]) {
            return Err(DynGeError::Configuration(format!(
                "hidden_dims须严格递减：{:?}",
                self.hidden_dims
            )));
        }
        for (name, value) in [("l1", self.l1), ("l2", self.l2)] {
            if !(value >= 0.0) {
                return Err(DynGeError::must_satisfy(
                    name,
                    ComparisonOperator::GreaterOrEqual,
                    0,
                ));
            }
        }
        Ok(())
    }

    /// 编码端各层（含输入层）的宽度：`[input_dim, hidden_dims...]`
    pub fn widths(&self) -> Vec<usize> {
        std::iter::once(self.input_dim)
            .chain(self.hidden_dims.iter().copied())
            .collect()
    }
}

/// 一次前向传播中各层激活后的输出，供反向传播使用
#[derive(Debug, Clone)]
pub struct ForwardCache {
    /// `[x, a_1, …, a_L]`，`a_L`即嵌入
    encoder: Vec<Tensor>,
    /// `[d_1, …, d_L]`，`d_L`即重构
    decoder: Vec<Tensor>,
}

impl ForwardCache {
    pub fn embedding(&self) -> &Tensor {
        self.encoder.last().expect("前向缓存至少含输入")
    }

    pub fn reconstruction(&self) -> &Tensor {
        self.decoder.last().expect("解码端至少有一层")
    }
}

/// 与`Autoencoder::parameters()`同序的梯度
#[derive(Debug, Clone)]
pub struct Gradients {
    tensors: Vec<Tensor>,
}

impl Gradients {
    pub fn as_slice(&self) -> &[Tensor] {
        &self.tensors
    }

    pub fn is_finite(&self) -> bool {
        self.tensors.iter().all(Tensor::is_finite)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Autoencoder {
    pub(crate) config: AutoencoderConfig,
    pub(crate) encoder: Vec<Linear>,
    pub(crate) decoder: Vec<Linear>,
}

impl Autoencoder {
    /// 按配置新建自编码器，参数由`rng`初始化
    pub fn new<R: Rng + ?Sized>(config: AutoencoderConfig, rng: &mut R) -> Result<Self, DynGeError> {
        config.validate()?;
        let widths = config.widths();
        let encoder = widths
            .windows(2)
            .map(|w| Linear::new(w[0], w[1], rng))
            .collect();
        let decoder = widths
            .windows(2)
            .rev()
            .map(|w| Linear::new(w[1], w[0], rng))
            .collect();
        Ok(Self {
            config,
            encoder,
            decoder,
        })
    }

    /// 按配置建立全零参数的自编码器（加载参数前的占位）
    pub(crate) fn zeroed(config: AutoencoderConfig) -> Result<Self, DynGeError> {
        config.validate()?;
        let widths = config.widths();
        let encoder = widths.windows(2).map(|w| Linear::zeros(w[0], w[1])).collect();
        let decoder = widths
            .windows(2)
            .rev()
            .map(|w| Linear::zeros(w[1], w[0]))
            .collect();
        Ok(Self {
            config,
            encoder,
            decoder,
        })
    }

    pub fn config(&self) -> &AutoencoderConfig {
        &self.config
    }

    pub fn input_dim(&self) -> usize {
        self.config.input_dim
    }

    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    pub fn hidden_dims(&self) -> &[usize] {
        &self.config.hidden_dims
    }

    pub fn encoder(&self) -> &[Linear] {
        &self.encoder
    }

    pub fn decoder(&self) -> &[Linear] {
        &self.decoder
    }

    fn decoder_activation(&self, layer: usize) -> Activation {
        if layer + 1 == self.decoder.len() {
            Activation::Sigmoid
        } else {
            self.config.activation
        }
    }

    /// 编码：`[batch, input_dim] → [batch, embedding_dim]`
    pub fn encode(&self, x: &Tensor) -> Tensor {
        self.encoder.iter().fold(x.clone(), |h, layer| {
            self.config.activation.forward(&layer.forward(&h))
        })
    }

    /// 解码：`[batch, embedding_dim] → [batch, input_dim]`
    pub fn decode(&self, y: &Tensor) -> Tensor {
        self.decoder
            .iter()
            .enumerate()
            .fold(y.clone(), |h, (k, layer)| {
                self.decoder_activation(k).forward(&layer.forward(&h))
            })
    }

    /// 返回`(嵌入, 重构)`
    pub fn forward(&self, x: &Tensor) -> (Tensor, Tensor) {
        let embedding = self.encode(x);
        let reconstruction = self.decode(&embedding);
        (embedding, reconstruction)
    }

    /// 前向传播并保留每层输出
    pub fn forward_cached(&self, x: &Tensor) -> ForwardCache {
        let mut encoder = Vec::with_capacity(self.encoder.len() + 1);
        encoder.push(x.clone());
        for layer in &self.encoder {
            let h = self.config.activation.forward(&layer.forward(encoder.last().expect("非空")));
            encoder.push(h);
        }

        let mut decoder: Vec<Tensor> = Vec::with_capacity(self.decoder.len());
        for (k, layer) in self.decoder.iter().enumerate() {
            let input = decoder.last().unwrap_or_else(|| encoder.last().expect("非空"));
            let h = self.decoder_activation(k).forward(&layer.forward(input));
            decoder.push(h);
        }
        ForwardCache { encoder, decoder }
    }

    /// 反向传播
    ///
    /// - `grad_reconstruction`：损失对重构（Sigmoid之后）的梯度
    /// - `grad_embedding`：损失对嵌入的额外梯度（来自邻近项）
    ///
    /// 返回的梯度已包含 L1/L2 正则项（只作用于权重，不作用于偏置）。
    pub fn backward(
        &self,
        cache: &ForwardCache,
        grad_reconstruction: &Tensor,
        grad_embedding: &Tensor,
    ) -> Gradients {
        let mut decoder_grads = Vec::with_capacity(self.decoder.len());
        let mut grad = grad_reconstruction.clone();
        for k in (0..self.decoder.len()).rev() {
            let output = &cache.decoder[k];
            let input = if k == 0 {
                cache.embedding()
            } else {
                &cache.decoder[k - 1]
            };
            let dz = grad * &self.decoder_activation(k).derivative(output);
            let g = self.decoder[k].backward(input, &dz);
            grad = g.input;
            decoder_grads.push((g.weights, g.bias));
        }
        decoder_grads.reverse();

        grad += grad_embedding;
        let mut encoder_grads = Vec::with_capacity(self.encoder.len());
        for k in (0..self.encoder.len()).rev() {
            let dz = grad * &self.config.activation.derivative(&cache.encoder[k + 1]);
            let g = self.encoder[k].backward(&cache.encoder[k], &dz);
            grad = g.input;
            encoder_grads.push((g.weights, g.bias));
        }
        encoder_grads.reverse();

        let tensors = encoder_grads
            .into_iter()
            .zip(&self.encoder)
            .chain(decoder_grads.into_iter().zip(&self.decoder))
            .flat_map(|((w_grad, b_grad), layer)| {
                [w_grad + &self.regularization_grad(layer.weights()), b_grad]
            })
            .collect();
        Gradients { tensors }
    }

    /// `l1 * sign(W) + 2 * l2 * W`
    fn regularization_grad(&self, weights: &Tensor) -> Tensor {
        weights.sign() * self.config.l1 + weights * (2.0 * self.config.l2)
    }

    /// `l1 * Σ|W| + l2 * ΣW²`，对编码端与解码端所有权重求和
    pub fn regularization_loss(&self) -> f32 {
        self.encoder
            .iter()
            .chain(&self.decoder)
            .map(|layer| {
                let w = layer.weights();
                self.config.l1 * w.abs_sum() + self.config.l2 * w.square_sum()
            })
            .sum()
    }
}

impl Module for Autoencoder {
    fn parameters(&self) -> Vec<&Tensor> {
        self.encoder
            .iter()
            .chain(&self.decoder)
            .flat_map(|layer| layer.parameters())
            .collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.encoder
            .iter_mut()
            .chain(self.decoder.iter_mut())
            .flat_map(|layer| layer.parameters_mut())
            .collect()
    }
}
