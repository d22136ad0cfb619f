/*
 * @Author       : 老董
 * @Description  : 单个快照的静态图嵌入训练器
 *
 * 状态机：`Untrained → Training → (Converged | EarlyStopped | EpochsExhausted)`；
 * 从磁盘恢复的模型处于`Loaded`。任何结束状态都可以再次进入`Training`（断点续训）。
 */

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info, warn};

use super::checkpoint::CheckpointManager;
use super::config::{CheckpointTrigger, TrainConfig};
use crate::data::{GraphSnapshot, RowLoader};
use crate::errors::DynGeError;
use crate::nn::{Autoencoder, GraphReconstructionLoss, LossTerms, Module, Optimizer, OptimizerKind};
use crate::tensor::Tensor;

/// 训练状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Untrained,
    Training,
    /// 损失降到了收敛阈值以下
    Converged,
    /// 连续若干个epoch无改进
    EarlyStopped,
    /// 跑满了全部epoch
    EpochsExhausted,
    /// 由已保存的模型恢复
    Loaded,
}

impl TrainingState {
    /// 是否已有可用的嵌入
    pub fn is_ready(&self) -> bool {
        !matches!(self, TrainingState::Untrained | TrainingState::Training)
    }
}

impl fmt::Display for TrainingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainingState::Untrained => "未训练",
            TrainingState::Training => "训练中",
            TrainingState::Converged => "已收敛",
            TrainingState::EarlyStopped => "提前停止",
            TrainingState::EpochsExhausted => "已跑满epoch",
            TrainingState::Loaded => "已加载",
        };
        write!(f, "{name}")
    }
}

/// 一次`train`调用的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub outcome: TrainingState,
    pub epochs_run: usize,
    pub best_loss: f32,
    pub final_loss: f32,
    pub learning_rate: f32,
    pub elapsed: Duration,
}

/// 单个快照的“模型 + 邻接矩阵”组合
#[derive(Debug, Clone)]
pub struct StaticGraphEmbedding {
    index: usize,
    adjacency: Tensor,
    model: Autoencoder,
    loss: GraphReconstructionLoss,
    state: TrainingState,
    embedding: Option<Tensor>,
    reconstruction: Option<Tensor>,
    loss_history: Vec<f32>,
}

impl StaticGraphEmbedding {
    /// `adjacency`须为方阵，且边长等于模型的输入维度
    pub fn new(
        index: usize,
        adjacency: Tensor,
        model: Autoencoder,
        loss: GraphReconstructionLoss,
    ) -> Result<Self, DynGeError> {
        if adjacency.rows() != adjacency.cols() {
            return Err(DynGeError::Value(format!(
                "邻接矩阵须为方阵，而非{:?}",
                adjacency.shape()
            )));
        }
        if adjacency.rows() != model.input_dim() {
            return Err(DynGeError::Value(format!(
                "快照{index}有{}个节点，但模型的输入维度为{}",
                adjacency.rows(),
                model.input_dim()
            )));
        }
        Ok(Self {
            index,
            adjacency,
            model,
            loss,
            state: TrainingState::Untrained,
            embedding: None,
            reconstruction: None,
            loss_history: Vec::new(),
        })
    }

    pub fn from_snapshot<S: GraphSnapshot + ?Sized>(
        index: usize,
        snapshot: &S,
        model: Autoencoder,
        loss: GraphReconstructionLoss,
    ) -> Result<Self, DynGeError> {
        Self::new(index, snapshot.adjacency(), model, loss)
    }

    /// 由已训练好的模型直接得到可查询的嵌入（状态为`Loaded`）
    pub fn loaded(
        index: usize,
        adjacency: Tensor,
        model: Autoencoder,
        loss: GraphReconstructionLoss,
    ) -> Result<Self, DynGeError> {
        let mut ge = Self::new(index, adjacency, model, loss)?;
        ge.refresh();
        ge.state = TrainingState::Loaded;
        Ok(ge)
    }

    /// 用当前模型重新计算整个快照的嵌入与重构
    fn refresh(&mut self) {
        let (embedding, reconstruction) = self.model.forward(&self.adjacency);
        self.embedding = Some(embedding);
        self.reconstruction = Some(reconstruction);
    }

    /// 在整个快照上计算（不更新参数的）损失
    pub fn evaluate_loss(&self) -> LossTerms {
        let (embedding, reconstruction) = self.model.forward(&self.adjacency);
        let (mut terms, _) = self
            .loss
            .compute(&self.adjacency, &reconstruction, &embedding, &self.adjacency);
        terms.regularization = self.model.regularization_loss();
        terms
    }

    /// 训练一个批次并更新参数，返回该批次的损失
    fn train_batch(&mut self, rows: &[usize], optimizer: &mut OptimizerKind) -> f32 {
        let x = self.adjacency.select_rows(rows);
        let batch_adjacency = x.select_cols(rows);

        let cache = self.model.forward_cached(&x);
        let (mut terms, grads) =
            self.loss
                .compute(&x, cache.reconstruction(), cache.embedding(), &batch_adjacency);
        terms.regularization = self.model.regularization_loss();
        let batch_loss = terms.total();
        if !batch_loss.is_finite() {
            return batch_loss;
        }

        let gradients = self
            .model
            .backward(&cache, &grads.reconstruction, &grads.embedding);
        optimizer.step(&mut self.model.parameters_mut(), gradients.as_slice());
        batch_loss
    }

    /// 训练，直至收敛、提前停止或跑满`config.epochs`个epoch
    ///
    /// 出现非有限的损失时中止并返回`Diverged`，模型回退到该epoch开始前的参数。
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        config: &TrainConfig,
        rng: &mut R,
    ) -> Result<TrainReport, DynGeError> {
        config.validate()?;
        let mut checkpoints = config
            .checkpoint
            .as_ref()
            .map(|c| CheckpointManager::new(c, self.index))
            .transpose()?;

        let start = Instant::now();
        let previous_state = self.state;
        self.state = TrainingState::Training;
        let mut optimizer = OptimizerKind::new(config.optimizer, config.learning_rate);
        let loader = RowLoader::new(self.adjacency.rows(), config.batch_size).shuffle(config.shuffle);

        let mut best_loss = f32::INFINITY;
        let mut final_loss = f32::NAN;
        let mut wait = 0;
        let mut epochs_run = 0;
        let mut outcome = TrainingState::EpochsExhausted;

        for epoch in 1..=config.epochs {
            let epoch_start = self.model.clone();
            let mut total = 0.0;
            let mut batches = 0;
            for rows in loader.iter(rng) {
                let batch_loss = self.train_batch(&rows, &mut optimizer);
                total += batch_loss;
                batches += 1;
                if !batch_loss.is_finite() {
                    break;
                }
            }
            let epoch_loss = total / batches.max(1) as f32;

            if !epoch_loss.is_finite() {
                warn!(snapshot = self.index, epoch, "训练发散，损失为{epoch_loss}");
                self.model = epoch_start;
                self.state = previous_state;
                if self.state.is_ready() {
                    self.refresh();
                }
                return Err(DynGeError::Diverged {
                    epoch,
                    loss: epoch_loss,
                });
            }

            epochs_run = epoch;
            final_loss = epoch_loss;
            self.loss_history.push(epoch_loss);

            let improved = epoch_loss < best_loss - config.min_delta;
            if improved {
                best_loss = epoch_loss;
                wait = 0;
            } else {
                wait += 1;
            }

            if let Some(manager) = checkpoints.as_mut() {
                let due = match config.checkpoint.as_ref().map(|c| c.trigger) {
                    Some(CheckpointTrigger::EveryEpochs(n)) => epoch % n == 0,
                    Some(CheckpointTrigger::OnImprovement) => improved,
                    None => false,
                };
                if due {
                    manager.save(&self.model, epoch, epoch_loss)?;
                }
            }

            if config.log_every > 0 && epoch % config.log_every == 0 {
                info!(
                    snapshot = self.index,
                    "Epoch {epoch}/{}: 损失 {epoch_loss:.6}（最佳 {best_loss:.6}）",
                    config.epochs
                );
            }

            if config
                .convergence_threshold
                .is_some_and(|threshold| epoch_loss <= threshold)
            {
                outcome = TrainingState::Converged;
                break;
            }
            if config.early_stop > 0 && wait >= config.early_stop {
                debug!(snapshot = self.index, epoch, "连续{wait}个epoch无改进，提前停止");
                outcome = TrainingState::EarlyStopped;
                break;
            }
        }

        self.refresh();
        self.state = outcome;
        let report = TrainReport {
            outcome,
            epochs_run,
            best_loss,
            final_loss,
            learning_rate: config.learning_rate,
            elapsed: start.elapsed(),
        };
        info!(
            snapshot = self.index,
            "训练结束（{outcome}）：{epochs_run}个epoch，最佳损失 {best_loss:.6}，用时 {:.2}s",
            report.elapsed.as_secs_f32()
        );
        Ok(report)
    }

    /// 回滚到某个检查点，嵌入随之更新
    pub fn restore_checkpoint<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DynGeError> {
        let checkpoint = CheckpointManager::load(path)?;
        if checkpoint.snapshot_index != self.index {
            return Err(DynGeError::Value(format!(
                "检查点属于快照{}，不能恢复到快照{}",
                checkpoint.snapshot_index, self.index
            )));
        }
        let model = checkpoint.into_model()?;
        if model.input_dim() != self.adjacency.rows() {
            return Err(DynGeError::Value(format!(
                "检查点的输入维度({})与快照节点数({})不一致",
                model.input_dim(),
                self.adjacency.rows()
            )));
        }
        self.model = model;
        self.refresh();
        self.state = TrainingState::Loaded;
        Ok(())
    }

    /// 最近一次训练/加载得到的嵌入`[节点数, embedding_dim]`
    pub fn get_embedding(&self) -> Result<&Tensor, DynGeError> {
        self.embedding.as_ref().ok_or_else(|| {
            DynGeError::State(format!("快照{}尚未训练或加载，没有嵌入", self.index))
        })
    }

    /// 最近一次训练/加载得到的重构`[节点数, 节点数]`
    pub fn get_reconstruction(&self) -> Result<&Tensor, DynGeError> {
        self.reconstruction.as_ref().ok_or_else(|| {
            DynGeError::State(format!("快照{}尚未训练或加载，没有重构", self.index))
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn model(&self) -> &Autoencoder {
        &self.model
    }

    pub fn into_model(self) -> Autoencoder {
        self.model
    }

    pub fn adjacency(&self) -> &Tensor {
        &self.adjacency
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.rows()
    }

    /// 历次训练的逐epoch损失
    pub fn loss_history(&self) -> &[f32] {
        &self.loss_history
    }
}
