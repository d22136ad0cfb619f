use crate::errors::Operator;
use crate::tensor::Tensor;

impl Tensor {
    /// 实现矩阵乘法。
    /// 需要保证前一个张量的列数（col）等于后一个张量的行数（row），否则会触发panic。
    pub fn mat_mul(&self, other: &Tensor) -> Tensor {
        assert!(
            self.cols() == other.rows(),
            "前一个张量的列数必须等于后一个张量的行数，故无法{}：{:?} vs {:?}",
            Operator::MatMul,
            self.shape(),
            other.shape()
        );
        Tensor {
            data: self.data.dot(&other.data),
        }
    }

    /// `selfᵀ @ other`，反向传播里计算权重梯度时常用
    pub fn t_mat_mul(&self, other: &Tensor) -> Tensor {
        assert!(
            self.rows() == other.rows(),
            "两个张量的行数必须一致，故无法{}：{:?}ᵀ vs {:?}",
            Operator::MatMul,
            self.shape(),
            other.shape()
        );
        Tensor {
            data: self.data.t().dot(&other.data),
        }
    }

    /// `self @ otherᵀ`，反向传播里把梯度传回上一层时常用
    pub fn mat_mul_t(&self, other: &Tensor) -> Tensor {
        assert!(
            self.cols() == other.cols(),
            "两个张量的列数必须一致，故无法{}：{:?} vs {:?}ᵀ",
            Operator::MatMul,
            self.shape(),
            other.shape()
        );
        Tensor {
            data: self.data.dot(&other.data.t()),
        }
    }
}
