/*
 * @Description  : 张量的加法，实现了两个张量“逐元素”（或张量与纯数）相加的运算，并返回一个新的张量。
 *                 两个张量相加时，须形状一致，或右操作数为`[1, n]`的行向量（按行广播，用于偏置）。
 */

use crate::errors::Operator;
use crate::tensor::Tensor;
use std::ops::{Add, AddAssign};

pub(in crate::tensor) fn assert_broadcastable(lhs: &Tensor, rhs: &Tensor, operator: Operator) {
    let row_broadcast = rhs.rows() == 1 && rhs.cols() == lhs.cols();
    assert!(
        lhs.is_same_shape(rhs) || row_broadcast,
        "形状不一致，故无法{operator}：第一个张量的形状为{:?}，第二个张量的形状为{:?}",
        lhs.shape(),
        rhs.shape()
    );
}

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 + f32↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl Add<f32> for Tensor {
    type Output = Self;

    fn add(self, scalar: f32) -> Self {
        Self {
            data: self.data + scalar,
        }
    }
}
impl Add<f32> for &Tensor {
    type Output = Tensor;

    fn add(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data + scalar,
        }
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 + f32↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 + （不）带引用的张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl<'a> Add<&'a Tensor> for &'a Tensor {
    type Output = Tensor;

    fn add(self, other: &'a Tensor) -> Tensor {
        assert_broadcastable(self, other, Operator::Add);
        Tensor {
            data: &self.data + &other.data,
        }
    }
}
impl Add<&Tensor> for Tensor {
    type Output = Tensor;

    fn add(self, other: &Tensor) -> Tensor {
        &self + other
    }
}
impl Add for Tensor {
    type Output = Tensor;

    fn add(self, other: Tensor) -> Tensor {
        &self + &other
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 + （不）带引用的张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

impl AddAssign<&Tensor> for Tensor {
    fn add_assign(&mut self, other: &Tensor) {
        assert_broadcastable(self, other, Operator::Add);
        self.data += &other.data;
    }
}
