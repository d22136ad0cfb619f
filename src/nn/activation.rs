/*
 * @Description  : 激活函数
 *
 * 反向传播时导数一律由前向的“输出”算出，
 * 因此前向缓存中只需保留每层激活后的结果。
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DynGeError;
use crate::tensor::Tensor;

/// LeakyReLU 负半轴的斜率
pub const LEAKY_RELU_SLOPE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Relu,
    LeakyRelu,
    Sigmoid,
    Tanh,
}

impl Activation {
    pub fn forward(&self, x: &Tensor) -> Tensor {
        match self {
            Activation::Relu => x.map(|v| v.max(0.0)),
            Activation::LeakyRelu => x.map(|v| if v > 0.0 { v } else { LEAKY_RELU_SLOPE * v }),
            Activation::Sigmoid => x.map(sigmoid),
            Activation::Tanh => x.map(f32::tanh),
        }
    }

    /// 由激活输出`output`求逐元素导数
    pub fn derivative(&self, output: &Tensor) -> Tensor {
        match self {
            Activation::Relu => output.map(|y| if y > 0.0 { 1.0 } else { 0.0 }),
            Activation::LeakyRelu => output.map(|y| if y > 0.0 { 1.0 } else { LEAKY_RELU_SLOPE }),
            Activation::Sigmoid => output.map(|y| y * (1.0 - y)),
            Activation::Tanh => output.map(|y| 1.0 - y * y),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activation::Relu => "relu",
            Activation::LeakyRelu => "leaky_relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
        }
    }
}

fn sigmoid(v: f32) -> f32 {
    if v >= 0.0 {
        1.0 / (1.0 + (-v).exp())
    } else {
        let e = v.exp();
        e / (1.0 + e)
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Activation {
    type Err = DynGeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relu" => Ok(Activation::Relu),
            "leaky_relu" | "leakyrelu" => Ok(Activation::LeakyRelu),
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            other => Err(DynGeError::Configuration(format!("未知的激活函数：{other}"))),
        }
    }
}
