use ndarray::{Axis, concatenate, s};

use super::Tensor;

impl Tensor {
    /// 转置，返回一个新的（行优先存储的）张量
    pub fn transpose(&self) -> Self {
        Self {
            data: self.data.t().as_standard_layout().into_owned(),
        }
    }

    /// 取出第`row`行，返回形状为`[1, 列数]`的张量
    pub fn row(&self, row: usize) -> Self {
        self.slice_rows(row, row + 1)
    }

    /// 按给定下标依次取出若干行（下标可重复、可乱序）
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            data: self.data.select(Axis(0), indices),
        }
    }

    /// 按给定下标依次取出若干列（下标可重复、可乱序）
    pub fn select_cols(&self, indices: &[usize]) -> Self {
        Self {
            data: self.data.select(Axis(1), indices),
        }
    }

    /// 取出`[start, end)`范围内的行
    pub fn slice_rows(&self, start: usize, end: usize) -> Self {
        Self {
            data: self.data.slice(s![start..end, ..]).to_owned(),
        }
    }

    /// 取出`[start, end)`范围内的列
    pub fn slice_cols(&self, start: usize, end: usize) -> Self {
        Self {
            data: self.data.slice(s![.., start..end]).to_owned(),
        }
    }

    /// 在末尾追加若干行。`extra`的列数须与本张量一致，否则panic
    pub fn pad_rows(&self, extra: &Tensor) -> Self {
        assert_eq!(
            self.cols(),
            extra.cols(),
            "追加行时列数须一致：{:?} vs {:?}",
            self.shape(),
            extra.shape()
        );
        Self {
            data: concatenate(Axis(0), &[self.data.view(), extra.data.view()])
                .expect("列数已校验，拼接不会失败"),
        }
    }

    /// 在末尾追加若干列。`extra`的行数须与本张量一致，否则panic
    pub fn pad_cols(&self, extra: &Tensor) -> Self {
        assert_eq!(
            self.rows(),
            extra.rows(),
            "追加列时行数须一致：{:?} vs {:?}",
            self.shape(),
            extra.shape()
        );
        Self {
            data: concatenate(Axis(1), &[self.data.view(), extra.data.view()])
                .expect("行数已校验，拼接不会失败"),
        }
    }

    /// 用0把张量补齐到`cols`列（`cols`小于当前列数时panic）
    pub fn zero_pad_cols(&self, cols: usize) -> Self {
        assert!(cols >= self.cols(), "补齐后的列数不能小于当前列数");
        self.pad_cols(&Tensor::zeros(&[self.rows(), cols - self.cols()]))
    }
}
