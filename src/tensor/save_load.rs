use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::Array2;
use ndarray_npy::{read_npy, write_npy};

use super::Tensor;
use crate::errors::DynGeError;

// 保存和加载张量
impl Tensor {
    /// 将单个Tensor以bincode格式写入本地文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DynGeError> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, &self.data)?;
        Ok(())
    }

    /// 从本地文件加载单个（bincode格式的）Tensor
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DynGeError> {
        let reader = BufReader::new(File::open(path)?);
        let data: Array2<f32> = bincode::deserialize_from(reader)?;
        Ok(Self { data })
    }

    /// 以`.npy`格式保存，便于其他工具（如numpy）直接读取
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), DynGeError> {
        write_npy(path, &self.data)?;
        Ok(())
    }

    /// 读取`.npy`格式的2阶f32数组
    pub fn load_npy<P: AsRef<Path>>(path: P) -> Result<Self, DynGeError> {
        let data: Array2<f32> = read_npy(path)?;
        Ok(Self { data })
    }
}
