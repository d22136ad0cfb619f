use crate::tensor::Tensor;
use ndarray::{Array2, Axis, Zip};

impl From<Array2<f32>> for Tensor {
    fn from(data: Array2<f32>) -> Self {
        Tensor::from_array(data)
    }
}

impl Tensor {
    /// 对张量中的所有元素求和
    pub fn sum(&self) -> f32 {
        let mut value = 0.0;
        Zip::from(&self.data).for_each(|a| value += a);
        value
    }

    /// 所有元素绝对值之和（L1范数）
    pub fn abs_sum(&self) -> f32 {
        self.data.iter().map(|x| x.abs()).sum()
    }

    /// 所有元素平方之和（L2范数的平方）
    pub fn square_sum(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum()
    }

    /// 沿行方向求和，返回形状为`[1, 列数]`的行向量（即每一列的和）
    pub fn sum_rows(&self) -> Tensor {
        Tensor {
            data: self.data.sum_axis(Axis(0)).insert_axis(Axis(0)),
        }
    }

    /// 沿列方向求和，返回形状为`[行数, 1]`的列向量（即每一行的和）
    pub fn sum_cols(&self) -> Tensor {
        Tensor {
            data: self.data.sum_axis(Axis(1)).insert_axis(Axis(1)),
        }
    }

    /// 对每个元素应用`f`，返回新张量
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Tensor {
        Tensor {
            data: self.data.mapv(f),
        }
    }

    /// 逐元素组合两个同形状张量
    pub fn zip_map<F: Fn(f32, f32) -> f32>(&self, other: &Tensor, f: F) -> Tensor {
        assert!(
            self.is_same_shape(other),
            "形状不一致：{:?} vs {:?}",
            self.shape(),
            other.shape()
        );
        let mut data = self.data.clone();
        Zip::from(&mut data)
            .and(&other.data)
            .for_each(|a, &b| *a = f(*a, b));
        Tensor { data }
    }

    /// 逐元素取符号：正数为1，负数为-1，零为0
    pub fn sign(&self) -> Tensor {
        self.map(|x| {
            if x > 0.0 {
                1.0
            } else if x < 0.0 {
                -1.0
            } else {
                0.0
            }
        })
    }

    /// 按行缩放：第`i`行乘以`factors[i, 0]`，`factors`须为`[行数, 1]`的列向量
    pub fn scale_rows(&self, factors: &Tensor) -> Tensor {
        assert!(
            factors.rows() == self.rows() && factors.cols() == 1,
            "按行缩放的系数须为[{}, 1]，而非{:?}",
            self.rows(),
            factors.shape()
        );
        Tensor {
            data: &self.data * &factors.data,
        }
    }

    pub fn sqrt(&self) -> Tensor {
        self.map(f32::sqrt)
    }
}
