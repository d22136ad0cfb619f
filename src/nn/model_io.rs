/*
 * @Author       : 老董
 * @Description  : 自编码器的模型 I/O
 *
 * 一个模型由两个文件组成：
 * - `{path}.json`: 模型描述（结构超参数 + 参数文件名，可读）
 * - `{path}.bin`: 参数数据（魔数 + 版本 + bincode 编码的参数张量列表）
 */

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Autoencoder, AutoencoderConfig, Module};
use crate::errors::DynGeError;
use crate::tensor::Tensor;

/// 参数文件魔数
pub const PARAMS_MAGIC: &[u8; 4] = b"DGPR";
/// 参数文件版本
pub const PARAMS_VERSION: u32 = 1;

/// 模型描述（对应`{path}.json`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub version: u32,
    pub config: AutoencoderConfig,
    pub params_file: Option<String>,
}

impl ModelDescriptor {
    pub fn to_json(&self) -> Result<String, DynGeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DynGeError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Autoencoder {
    /// 当前模型的描述
    pub fn describe(&self) -> ModelDescriptor {
        ModelDescriptor {
            version: PARAMS_VERSION,
            config: self.config.clone(),
            params_file: None,
        }
    }

    /// 拷贝出全部参数（与`parameters()`同序）
    pub fn export_params(&self) -> Vec<Tensor> {
        self.parameters().into_iter().cloned().collect()
    }

    /// 由配置与参数列表重建模型，参数个数或形状不符时报错
    pub fn from_params(config: AutoencoderConfig, params: Vec<Tensor>) -> Result<Self, DynGeError> {
        let mut model = Self::zeroed(config)?;
        model.import_params(params)?;
        Ok(model)
    }

    fn import_params(&mut self, params: Vec<Tensor>) -> Result<(), DynGeError> {
        let mut slots = self.parameters_mut();
        if slots.len() != params.len() {
            return Err(DynGeError::Serialization(format!(
                "参数数量不匹配：模型需要{}个，文件中有{}个",
                slots.len(),
                params.len()
            )));
        }
        for (idx, (slot, value)) in slots.iter_mut().zip(params).enumerate() {
            if !slot.is_same_shape(&value) {
                return Err(DynGeError::Serialization(format!(
                    "第{idx}个参数形状不匹配：模型为{:?}，文件中为{:?}",
                    slot.shape(),
                    value.shape()
                )));
            }
            **slot = value;
        }
        Ok(())
    }

    /// 保存所有参数到二进制文件
    pub fn save_params<P: AsRef<Path>>(&self, path: P) -> Result<(), DynGeError> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(PARAMS_MAGIC)?;
        writer.write_all(&PARAMS_VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut writer, &self.export_params())?;
        writer.flush()?;
        Ok(())
    }

    /// 从二进制文件加载参数（模型结构须与保存时一致）
    pub fn load_params<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DynGeError> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != PARAMS_MAGIC {
            return Err(DynGeError::Serialization(
                "无效的参数文件：这不是 dyn_ge 格式的参数文件".to_string(),
            ));
        }

        let mut version_bytes = [0u8; 4];
        reader.read_exact(&mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != PARAMS_VERSION {
            return Err(DynGeError::Serialization(format!(
                "不支持的参数文件版本: {version}"
            )));
        }

        let params: Vec<Tensor> = bincode::deserialize_from(&mut reader)?;
        self.import_params(params)
    }

    /// 保存完整模型（描述 JSON + 参数 bin）
    ///
    /// # 示例
    /// ```ignore
    /// model.save_model("models/graph_0")?;
    /// // 生成：models/graph_0.json + models/graph_0.bin
    /// ```
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), DynGeError> {
        let path = path.as_ref();
        let json_path = path.with_extension("json");
        let bin_path = path.with_extension("bin");

        self.save_params(&bin_path)?;

        let mut descriptor = self.describe();
        descriptor.params_file = bin_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string());
        std::fs::write(&json_path, descriptor.to_json()?)?;

        debug!("模型已保存：{}", json_path.display());
        Ok(())
    }

    /// 加载完整模型：由 JSON 重建结构，再加载参数
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, DynGeError> {
        let path = path.as_ref();
        let json_path = path.with_extension("json");
        if !json_path.is_file() {
            return Err(DynGeError::ModelNotFound(json_path));
        }

        let descriptor = ModelDescriptor::from_json(&std::fs::read_to_string(&json_path)?)?;
        let bin_path = match &descriptor.params_file {
            Some(params_file) => path
                .parent()
                .map_or_else(|| Path::new(params_file).to_path_buf(), |p| p.join(params_file)),
            None => path.with_extension("bin"),
        };

        let mut model = Self::zeroed(descriptor.config)?;
        model.load_params(&bin_path)?;
        debug!("模型已加载：{}", json_path.display());
        Ok(model)
    }
}
