/*
 * @Description  : 张量的减法，规则同加法：形状一致，或右操作数为可按行广播的`[1, n]`行向量。
 */

use super::add::assert_broadcastable;
use crate::errors::Operator;
use crate::tensor::Tensor;
use std::ops::{Sub, SubAssign};

impl Sub<f32> for &Tensor {
    type Output = Tensor;

    fn sub(self, scalar: f32) -> Tensor {
        Tensor {
            data: &self.data - scalar,
        }
    }
}

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 - （不）带引用的张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
impl<'a> Sub<&'a Tensor> for &'a Tensor {
    type Output = Tensor;

    fn sub(self, other: &'a Tensor) -> Tensor {
        assert_broadcastable(self, other, Operator::Sub);
        Tensor {
            data: &self.data - &other.data,
        }
    }
}
impl Sub<&Tensor> for Tensor {
    type Output = Tensor;

    fn sub(self, other: &Tensor) -> Tensor {
        &self - other
    }
}
impl Sub for Tensor {
    type Output = Tensor;

    fn sub(self, other: Tensor) -> Tensor {
        &self - &other
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 - （不）带引用的张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

impl SubAssign<&Tensor> for Tensor {
    fn sub_assign(&mut self, other: &Tensor) {
        assert_broadcastable(self, other, Operator::Sub);
        self.data -= &other.data;
    }
}
