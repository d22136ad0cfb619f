use ndarray::{ArrayView2, ArrayViewMut2};

use super::Tensor;

impl Tensor {
    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }
    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, f32> {
        self.data.view_mut()
    }

    /// 张量的形状，恒为`[行数, 列数]`
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// 张量中元素的总个数
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 读取第`row`行第`col`列的元素，越界会panic
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[[row, col]]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[[row, col]] = value;
    }

    /// 按行优先的顺序把所有元素拷贝成一个向量
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// 是否所有元素都是有限值（非NaN、非无穷）
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}
