/*
 * @Author       : 老董
 * @Description  : 训练过程中的检查点与轮转
 *
 * 每个快照的检查点写到`{folder}/graph_{i}_ck_{counter}.ckpt`，
 * 文件数超过`retention_count`后按写入顺序删除最旧的（FIFO）。
 * 计数器从磁盘上已有的最大值之后继续，因此进程重启后轮转依然成立。
 */

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config::CheckpointConfig;
use super::persistence::indexed_files;
use crate::errors::DynGeError;
use crate::nn::{Autoencoder, AutoencoderConfig};
use crate::tensor::Tensor;

/// 一个自包含的检查点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub snapshot_index: usize,
    pub counter: usize,
    pub epoch: usize,
    pub loss: f32,
    pub config: AutoencoderConfig,
    pub params: Vec<Tensor>,
}

impl Checkpoint {
    /// 还原出模型
    pub fn into_model(self) -> Result<Autoencoder, DynGeError> {
        Autoencoder::from_params(self.config, self.params)
    }
}

/// 某个快照的检查点管理器
#[derive(Debug)]
pub struct CheckpointManager {
    folder: PathBuf,
    retention_count: usize,
    snapshot_index: usize,
    next_counter: usize,
    saved: VecDeque<PathBuf>,
}

impl CheckpointManager {
    /// 创建管理器：目录不存在时自动创建，并接管其中已有的该快照的检查点
    pub fn new(config: &CheckpointConfig, snapshot_index: usize) -> Result<Self, DynGeError> {
        config.validate()?;
        std::fs::create_dir_all(&config.folder)?;

        let counters = Self::counters(&config.folder, snapshot_index)?;
        let next_counter = counters.last().map_or(0, |&c| c + 1);
        let saved = counters
            .into_iter()
            .map(|c| Self::path_for(&config.folder, snapshot_index, c))
            .collect();

        let mut manager = Self {
            folder: config.folder.clone(),
            retention_count: config.retention_count,
            snapshot_index,
            next_counter,
            saved,
        };
        manager.evict()?;
        Ok(manager)
    }

    pub fn path_for<P: AsRef<Path>>(folder: P, snapshot_index: usize, counter: usize) -> PathBuf {
        folder
            .as_ref()
            .join(format!("graph_{snapshot_index}_ck_{counter}.ckpt"))
    }

    fn counters<P: AsRef<Path>>(folder: P, snapshot_index: usize) -> Result<Vec<usize>, DynGeError> {
        indexed_files(folder, &format!("graph_{snapshot_index}_ck_"), ".ckpt")
    }

    /// 保存当前模型，返回写入的文件路径
    pub fn save(&mut self, model: &Autoencoder, epoch: usize, loss: f32) -> Result<PathBuf, DynGeError> {
        let counter = self.next_counter;
        let path = Self::path_for(&self.folder, self.snapshot_index, counter);
        let checkpoint = Checkpoint {
            snapshot_index: self.snapshot_index,
            counter,
            epoch,
            loss,
            config: model.config().clone(),
            params: model.export_params(),
        };

        let mut writer = BufWriter::new(File::create(&path)?);
        bincode::serialize_into(&mut writer, &checkpoint)?;
        writer.flush()?;

        self.next_counter += 1;
        self.saved.push_back(path.clone());
        debug!(
            snapshot = self.snapshot_index,
            epoch, loss, "检查点已保存：{}", path.display()
        );
        self.evict()?;
        Ok(path)
    }

    fn evict(&mut self) -> Result<(), DynGeError> {
        while self.saved.len() > self.retention_count {
            let Some(oldest) = self.saved.pop_front() else {
                break;
            };
            match std::fs::remove_file(&oldest) {
                Ok(()) => debug!("检查点已轮转删除：{}", oldest.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("待删除的检查点已不存在：{}", oldest.display())
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// 当前保留的检查点（从旧到新）
    pub fn saved(&self) -> Vec<PathBuf> {
        self.saved.iter().cloned().collect()
    }

    /// 最新的检查点
    pub fn latest(&self) -> Option<&Path> {
        self.saved.back().map(PathBuf::as_path)
    }

    /// 不经管理器，直接在目录中查找某快照最新的检查点
    pub fn find_latest<P: AsRef<Path>>(folder: P, snapshot_index: usize) -> Result<Option<PathBuf>, DynGeError> {
        let folder = folder.as_ref();
        if !folder.is_dir() {
            return Ok(None);
        }
        Ok(Self::counters(folder, snapshot_index)?
            .last()
            .map(|&c| Self::path_for(folder, snapshot_index, c)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Checkpoint, DynGeError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DynGeError::ModelNotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    pub fn snapshot_index(&self) -> usize {
        self.snapshot_index
    }

    pub fn retention_count(&self) -> usize {
        self.retention_count
    }
}
