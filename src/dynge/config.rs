/*
 * @Author       : 老董
 * @Description  : 动态图嵌入的强类型配置
 *
 * 所有结构体都带`#[serde(default)]`，JSON 中省略的字段取默认值；
 * 构造时调用`validate()`，非法配置在任何训练工作开始之前就报错。
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ComparisonOperator, DynGeError};
use crate::nn::{
    Activation, AutoencoderConfig, ExpandOptions, GraphReconstructionLoss, OptimizerType,
    hidden_layer_schedule,
};

/// 跨所有快照共享的模型超参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynGeConfig {
    pub embedding_dim: usize,
    /// 一阶邻近项的系数
    pub alpha: f32,
    /// 边处重构误差的放大倍数
    pub beta: f32,
    pub l1: f32,
    pub l2: f32,
    pub activation: Activation,
    /// 宽度表的收缩比例
    pub prop_size: f32,
    pub net2net_applied: bool,
    /// net2net 拆分比例的噪声标准差
    pub net2net_noise: f32,
    pub seed: u64,
}

impl Default for DynGeConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 128,
            alpha: 0.01,
            beta: 2.0,
            l1: 1e-3,
            l2: 1e-3,
            activation: Activation::Relu,
            prop_size: 0.4,
            net2net_applied: false,
            net2net_noise: 0.01,
            seed: 6,
        }
    }
}

impl DynGeConfig {
    pub fn validate(&self) -> Result<(), DynGeError> {
        if self.embedding_dim == 0 {
            return Err(DynGeError::must_satisfy(
                "embedding_dim",
                ComparisonOperator::GreaterThan,
                0,
            ));
        }
        if !(self.beta > 1.0) {
            return Err(DynGeError::must_satisfy(
                "beta",
                ComparisonOperator::GreaterThan,
                1,
            ));
        }
        for (name, value) in [
            ("alpha", self.alpha),
            ("l1", self.l1),
            ("l2", self.l2),
            ("net2net_noise", self.net2net_noise),
        ] {
            if !(value >= 0.0) {
                return Err(DynGeError::must_satisfy(
                    name,
                    ComparisonOperator::GreaterOrEqual,
                    0,
                ));
            }
        }
        if !(self.prop_size > 0.0 && self.prop_size < 1.0) {
            return Err(DynGeError::Configuration(format!(
                "prop_size须在(0, 1)之间，而非{}",
                self.prop_size
            )));
        }
        Ok(())
    }

    /// 输入维度为`input_dim`的新模型的配置
    pub fn autoencoder_config(&self, input_dim: usize) -> Result<AutoencoderConfig, DynGeError> {
        Ok(AutoencoderConfig {
            input_dim,
            embedding_dim: self.embedding_dim,
            hidden_dims: hidden_layer_schedule(self.prop_size, input_dim, self.embedding_dim)?,
            l1: self.l1,
            l2: self.l2,
            activation: self.activation,
        })
    }

    pub fn expand_options(&self) -> ExpandOptions {
        ExpandOptions {
            net2net_applied: self.net2net_applied,
            prop_size: self.prop_size,
            noise_std: self.net2net_noise,
        }
    }

    pub fn loss(&self) -> GraphReconstructionLoss {
        GraphReconstructionLoss::new(self.alpha, self.beta)
    }
}

/// 何时写检查点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointTrigger {
    /// 每隔固定个epoch
    EveryEpochs(usize),
    /// 每当epoch损失创新低
    #[default]
    OnImprovement,
}

/// 检查点策略：保存目录 + 每个快照最多保留的文件数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub folder: PathBuf,
    pub retention_count: usize,
    pub trigger: CheckpointTrigger,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("checkpoints"),
            retention_count: 10,
            trigger: CheckpointTrigger::default(),
        }
    }
}

impl CheckpointConfig {
    pub fn new<P: AsRef<Path>>(folder: P, retention_count: usize) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
            retention_count,
            trigger: CheckpointTrigger::default(),
        }
    }

    pub fn with_trigger(mut self, trigger: CheckpointTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn validate(&self) -> Result<(), DynGeError> {
        if self.retention_count == 0 {
            return Err(DynGeError::must_satisfy(
                "retention_count",
                ComparisonOperator::GreaterThan,
                0,
            ));
        }
        if self.trigger == CheckpointTrigger::EveryEpochs(0) {
            return Err(DynGeError::Configuration(
                "检查点间隔的epoch数须大于0".to_string(),
            ));
        }
        Ok(())
    }
}

/// 单个快照的训练参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    /// 依次使用的学习率；为空时只用`learning_rate`
    pub learning_rates: Vec<f32>,
    /// 连续多少个epoch无改进即提前停止；0表示不提前停止
    pub early_stop: usize,
    /// 损失至少下降这么多才算改进
    pub min_delta: f32,
    /// epoch损失不高于此值即视为收敛
    pub convergence_threshold: Option<f32>,
    pub shuffle: bool,
    /// 每隔多少个epoch输出一次进度；0表示不输出
    pub log_every: usize,
    pub optimizer: OptimizerType,
    pub checkpoint: Option<CheckpointConfig>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            epochs: 100,
            learning_rate: 1e-3,
            learning_rates: Vec::new(),
            early_stop: 50,
            min_delta: 0.0,
            convergence_threshold: None,
            shuffle: true,
            log_every: 5,
            optimizer: OptimizerType::Adam,
            checkpoint: None,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), DynGeError> {
        if self.batch_size == 0 {
            return Err(DynGeError::must_satisfy(
                "batch_size",
                ComparisonOperator::GreaterThan,
                0,
            ));
        }
        if self.epochs == 0 {
            return Err(DynGeError::must_satisfy(
                "epochs",
                ComparisonOperator::GreaterThan,
                0,
            ));
        }
        for lr in std::iter::once(self.learning_rate).chain(self.learning_rates.iter().copied()) {
            if !(lr > 0.0 && lr.is_finite()) {
                return Err(DynGeError::must_satisfy(
                    "learning_rate",
                    ComparisonOperator::GreaterThan,
                    0,
                ));
            }
        }
        if !(self.min_delta >= 0.0) {
            return Err(DynGeError::must_satisfy(
                "min_delta",
                ComparisonOperator::GreaterOrEqual,
                0,
            ));
        }
        if let Some(checkpoint) = &self.checkpoint {
            checkpoint.validate()?;
        }
        Ok(())
    }

    /// 实际使用的学习率序列
    pub fn learning_rate_schedule(&self) -> Vec<f32> {
        if self.learning_rates.is_empty() {
            vec![self.learning_rate]
        } else {
            self.learning_rates.clone()
        }
    }

    /// 换一个学习率的副本
    pub fn with_learning_rate(&self, learning_rate: f32) -> Self {
        Self {
            learning_rate,
            ..self.clone()
        }
    }
}

/// 一次完整运行的全部设置，可从 JSON 文件加载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dyn_ge: DynGeConfig,
    pub train: TrainConfig,
    pub model_folder: PathBuf,
    pub embedding_folder: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dyn_ge: DynGeConfig::default(),
            train: TrainConfig::default(),
            model_folder: PathBuf::from("models"),
            embedding_folder: PathBuf::from("embeddings"),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), DynGeError> {
        self.dyn_ge.validate()?;
        self.train.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self, DynGeError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DynGeError> {
        Self::from_json_str(&std::fs::read_to_string(path.as_ref())?)
    }

    pub fn to_json(&self) -> Result<String, DynGeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
