use crate::tensor::Tensor;
use std::fmt;

impl Tensor {
    pub fn print(&self) {
        println!("{self}");
    }
}

// 行或列超过6个时只展示首尾各3个
impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn visible(n: usize) -> Vec<Option<usize>> {
            if n > 6 {
                (0..3)
                    .map(Some)
                    .chain(std::iter::once(None))
                    .chain((n - 3..n).map(Some))
                    .collect()
            } else {
                (0..n).map(Some).collect()
            }
        }

        let (rows, cols) = (self.rows(), self.cols());
        write!(f, "[")?;
        for (ri, r) in visible(rows).into_iter().enumerate() {
            if ri > 0 {
                write!(f, ",\n ")?;
            }
            let Some(r) = r else {
                write!(f, "  ..")?;
                continue;
            };
            write!(f, "[")?;
            for (ci, c) in visible(cols).into_iter().enumerate() {
                if ci > 0 {
                    write!(f, ", ")?;
                }
                match c {
                    Some(c) => write!(f, "{:8.4}", self.data[[r, c]])?,
                    None => write!(f, "   ..   ")?,
                }
            }
            write!(f, "]")?;
        }
        write!(f, "]")?;
        writeln!(f, "\n形状: {:?}", self.shape())
    }
}
