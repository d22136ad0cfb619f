use ndarray::Array2;
use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

mod ops {
    pub mod add;
    pub mod div;
    pub mod eq;
    pub mod mat_mul;
    pub mod mul;
    pub mod others;
    pub mod sub;
}

mod print;
mod property;
mod save_load;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。本crate只处理2阶张量（即矩阵）：
/// 邻接矩阵、嵌入矩阵、权重、偏置都是按行存储的`[行数, 列数]`矩阵；
/// 偏置统一用`[1, n]`的行向量表示。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor {
    data: Array2<f32>,
}

impl Tensor {
    /// 创建一个张量，`shape`必须为`[行数, 列数]`，
    /// 且`data`的长度必须等于行数与列数的乘积，否则会panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        assert!(shape.len() == 2, "张量形状必须为[行数, 列数]，而非{shape:?}");
        assert!(
            data.len() == shape[0] * shape[1],
            "数据长度{}与形状{shape:?}不匹配",
            data.len()
        );
        let data = Array2::from_shape_vec((shape[0], shape[1]), data.to_vec())
            .expect("长度已校验，构造不会失败");
        Tensor { data }
    }

    /// 创建一个元素全为0的张量
    pub fn zeros(shape: &[usize]) -> Tensor {
        assert!(shape.len() == 2, "张量形状必须为[行数, 列数]，而非{shape:?}");
        Tensor {
            data: Array2::zeros((shape[0], shape[1])),
        }
    }

    /// 创建一个元素全为1的张量
    pub fn ones(shape: &[usize]) -> Tensor {
        assert!(shape.len() == 2, "张量形状必须为[行数, 列数]，而非{shape:?}");
        Tensor {
            data: Array2::ones((shape[0], shape[1])),
        }
    }

    /// 创建一个含`n`个对角元素的单位矩阵。
    pub fn eye(n: usize) -> Tensor {
        Tensor {
            data: Array2::eye(n),
        }
    }

    /// 用外部传入的随机数生成器创建一个随机张量，其值在[min, max]的闭区间。
    pub fn uniform_with_rng<R: Rng + ?Sized>(
        min: f32,
        max: f32,
        shape: &[usize],
        rng: &mut R,
    ) -> Tensor {
        let uniform = Uniform::from(min..=max);
        let data = (0..shape.iter().product::<usize>())
            .map(|_| uniform.sample(rng))
            .collect::<Vec<_>>();
        Tensor::new(&data, shape)
    }

    /// 用外部传入的随机数生成器创建一个服从正态分布的随机张量（Box-Muller变换）。
    /// 随机性完全由`rng`决定，因此同一种子总能得到同一张量。
    pub fn normal_with_rng<R: Rng + ?Sized>(
        mean: f32,
        std_dev: f32,
        shape: &[usize],
        rng: &mut R,
    ) -> Tensor {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.gen_range(f32::MIN_POSITIVE..1.0);
            let u2: f32 = rng.gen_range(0.0..1.0);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Tensor::new(&data, shape)
    }
}

// crate内部使用的构造方法
impl Tensor {
    pub(crate) fn from_array(data: Array2<f32>) -> Tensor {
        Tensor { data }
    }
}
