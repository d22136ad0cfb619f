/*
 * @Description  : 张量的逐元素除法（主要供优化器使用）
 */

use crate::errors::Operator;
use crate::tensor::Tensor;
use std::ops::Div;

impl Div<f32> for &Tensor {
    type Output = Tensor;

    fn div(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data / scalar,
        }
    }
}
impl Div<f32> for Tensor {
    type Output = Tensor;

    fn div(self, scalar: f32) -> Tensor {
        Tensor {
            data: self.data / scalar,
        }
    }
}

impl<'a> Div<&'a Tensor> for &'a Tensor {
    type Output = Tensor;

    fn div(self, other: &'a Tensor) -> Tensor {
        assert!(
            self.is_same_shape(other),
            "形状不一致，故无法{}：第一个张量的形状为{:?}，第二个张量的形状为{:?}",
            Operator::Div,
            self.shape(),
            other.shape()
        );
        Tensor {
            data: &self.data / &other.data,
        }
    }
}
