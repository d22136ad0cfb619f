/*
 * @Author       : 老董
 * @Description  : 动态图嵌入的编排器
 *
 * 快照`i`的模型总是由快照`i-1`训练好的模型派生：
 * 节点数增加时经模型手术扩展，节点数不变时直接复制。
 * 因此快照必须按顺序训练；上一快照的模型通过`PreviousModel`显式传入。
 */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::config::{DynGeConfig, TrainConfig};
use super::persistence::{count_embeddings, count_models, embedding_path, ensure_folder, model_path};
use super::static_ge::{StaticGraphEmbedding, TrainReport};
use crate::data::GraphSnapshot;
use crate::errors::DynGeError;
use crate::nn::{Autoencoder, expand_model};
use crate::tensor::Tensor;

/// 构建快照`i`的模型时所依据的上一快照模型
#[derive(Debug, Clone)]
pub enum PreviousModel<'a> {
    /// 内存中的模型
    InMemory(&'a Autoencoder),
    /// 已保存模型的路径（不含扩展名，如`models/graph_0`）
    Path(PathBuf),
    /// 没有上一模型（仅快照0可用）
    None,
}

/// 动态图嵌入
///
/// # 使用示例
/// ```ignore
/// let mut dyn_ge = DynGraphEmbedding::new(&snapshots, DynGeConfig::default())?;
/// dyn_ge.train_all("models", &TrainConfig::default())?;
/// dyn_ge.save_embeddings("embeddings")?;
/// let embeddings = dyn_ge.get_all_embeddings()?;
/// ```
#[derive(Debug)]
pub struct DynGraphEmbedding {
    adjacencies: Vec<Tensor>,
    config: DynGeConfig,
    static_ges: BTreeMap<usize, StaticGraphEmbedding>,
    /// 仅从嵌入文件恢复、没有对应模型的嵌入
    restored_embeddings: BTreeMap<usize, Tensor>,
    rng: StdRng,
}

impl DynGraphEmbedding {
    pub fn new<S: GraphSnapshot>(snapshots: &[S], config: DynGeConfig) -> Result<Self, DynGeError> {
        Self::from_adjacencies(snapshots.iter().map(GraphSnapshot::adjacency).collect(), config)
    }

    /// 由邻接矩阵序列创建。序列不能为空，节点数不能减少
    pub fn from_adjacencies(adjacencies: Vec<Tensor>, config: DynGeConfig) -> Result<Self, DynGeError> {
        config.validate()?;
        if adjacencies.is_empty() {
            return Err(DynGeError::Configuration("快照序列不能为空".to_string()));
        }
        for (i, adjacency) in adjacencies.iter().enumerate() {
            if adjacency.rows() != adjacency.cols() || adjacency.rows() == 0 {
                return Err(DynGeError::Value(format!(
                    "快照{i}的邻接矩阵须为非空方阵，而非{:?}",
                    adjacency.shape()
                )));
            }
        }
        if let Some(i) = adjacencies
            .windows(2)
            .position(|w| w[1].rows() < w[0].rows())
        {
            return Err(DynGeError::Value(format!(
                "快照节点数不能减少：快照{}有{}个节点，快照{}只有{}个",
                i,
                adjacencies[i].rows(),
                i + 1,
                adjacencies[i + 1].rows()
            )));
        }

        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            adjacencies,
            config,
            static_ges: BTreeMap::new(),
            restored_embeddings: BTreeMap::new(),
            rng,
        })
    }

    pub fn len(&self) -> usize {
        self.adjacencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacencies.is_empty()
    }

    pub fn node_counts(&self) -> Vec<usize> {
        self.adjacencies.iter().map(Tensor::rows).collect()
    }

    pub fn config(&self) -> &DynGeConfig {
        &self.config
    }

    /// 第`index`个快照的训练器（尚未创建时为`None`）
    pub fn static_ge(&self, index: usize) -> Option<&StaticGraphEmbedding> {
        self.static_ges.get(&index)
    }

    fn check_index(&self, index: usize) -> Result<(), DynGeError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(DynGeError::Index {
                index,
                len: self.len(),
            })
        }
    }

    /// 依次训练全部快照，每个快照训练完即保存到`folder`
    pub fn train_all<P: AsRef<Path>>(
        &mut self,
        folder: P,
        config: &TrainConfig,
    ) -> Result<Vec<TrainReport>, DynGeError> {
        let folder = folder.as_ref();
        ensure_folder(folder)?;
        config.validate()?;

        let start = Instant::now();
        let mut reports = Vec::with_capacity(self.len());
        for index in 0..self.len() {
            reports.push(self.train_one(folder, index, true, config)?);
        }
        info!(
            "全部{}个快照训练完毕，用时 {:.2}s",
            self.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(reports)
    }

    /// 依次训练全部快照；每个快照按学习率序列各训练一次，只有第一次是从上一模型重新派生
    pub fn train_all_with_schedule<P: AsRef<Path>>(
        &mut self,
        folder: P,
        config: &TrainConfig,
    ) -> Result<Vec<Vec<TrainReport>>, DynGeError> {
        let folder = folder.as_ref();
        ensure_folder(folder)?;
        config.validate()?;

        let schedule = config.learning_rate_schedule();
        let mut reports = Vec::with_capacity(self.len());
        for index in 0..self.len() {
            let mut per_rate = Vec::with_capacity(schedule.len());
            for (k, &learning_rate) in schedule.iter().enumerate() {
                debug!(snapshot = index, "学习率 {learning_rate}");
                per_rate.push(self.train_one(
                    folder,
                    index,
                    k == 0,
                    &config.with_learning_rate(learning_rate),
                )?);
            }
            reports.push(per_rate);
        }
        Ok(reports)
    }

    /// 训练单个快照
    ///
    /// - `is_fresh_start = true`：由上一快照的模型重新派生（优先取内存中的，其次取`folder/graph_{i-1}`），
    ///   丢弃此快照已有的权重；快照0则新建模型
    /// - `is_fresh_start = false`：在此快照已有的模型上继续训练（内存中没有时从`folder/graph_{i}`加载）
    pub fn train_one<P: AsRef<Path>>(
        &mut self,
        folder: P,
        index: usize,
        is_fresh_start: bool,
        config: &TrainConfig,
    ) -> Result<TrainReport, DynGeError> {
        self.check_index(index)?;
        let folder = folder.as_ref();

        let in_memory = if is_fresh_start && index > 0 {
            self.static_ges
                .get(&(index - 1))
                .filter(|ge| ge.state().is_ready())
                .map(|ge| ge.model().clone())
        } else {
            None
        };
        let previous = match (&in_memory, is_fresh_start && index > 0) {
            (Some(model), _) => PreviousModel::InMemory(model),
            (None, true) => PreviousModel::Path(model_path(folder, index - 1)),
            (None, false) => PreviousModel::None,
        };
        self.train_at(folder, index, previous, is_fresh_start, config)
    }

    /// 以显式给出的上一快照模型训练快照`index`，训练后保存到`folder/graph_{index}`
    pub fn train_at<P: AsRef<Path>>(
        &mut self,
        folder: P,
        index: usize,
        previous: PreviousModel<'_>,
        is_fresh_start: bool,
        config: &TrainConfig,
    ) -> Result<TrainReport, DynGeError> {
        self.check_index(index)?;
        let folder = folder.as_ref();
        ensure_folder(folder)?;
        config.validate()?;

        // 续训时从内存取出的训练器，失败后要原样放回
        let mut taken_from_memory = false;
        let mut ge = if is_fresh_start {
            let model = self.build_model(index, previous)?;
            StaticGraphEmbedding::new(index, self.adjacencies[index].clone(), model, self.config.loss())?
        } else {
            match self.static_ges.remove(&index) {
                Some(ge) => {
                    taken_from_memory = true;
                    ge
                }
                None => {
                    let model = Autoencoder::load_model(model_path(folder, index))?;
                    StaticGraphEmbedding::loaded(
                        index,
                        self.adjacencies[index].clone(),
                        model,
                        self.config.loss(),
                    )?
                }
            }
        };

        info!(
            snapshot = index,
            "开始训练：{}个节点，隐藏层 {:?}",
            ge.node_count(),
            ge.model().hidden_dims()
        );
        match ge.train(config, &mut self.rng) {
            Ok(report) => {
                let saved = ge.model().save_model(model_path(folder, index));
                self.restored_embeddings.remove(&index);
                self.static_ges.insert(index, ge);
                saved?;
                Ok(report)
            }
            Err(e) => {
                // 训练失败的新模型不能作为下一快照的来源；此前的训练器保持不变
                if taken_from_memory {
                    self.static_ges.insert(index, ge);
                }
                Err(e)
            }
        }
    }

    /// 由上一模型派生快照`index`的模型
    fn build_model(&mut self, index: usize, previous: PreviousModel<'_>) -> Result<Autoencoder, DynGeError> {
        let input_dim = self.adjacencies[index].rows();
        if index == 0 {
            if !matches!(previous, PreviousModel::None) {
                debug!("快照0总是新建模型，忽略传入的上一模型");
            }
            let config = self.config.autoencoder_config(input_dim)?;
            return Autoencoder::new(config, &mut self.rng);
        }

        let previous = match previous {
            PreviousModel::InMemory(model) => model.clone(),
            PreviousModel::Path(path) => Autoencoder::load_model(path)?,
            PreviousModel::None => {
                return Err(DynGeError::ModelNotFound(PathBuf::from(format!(
                    "graph_{}",
                    index - 1
                ))));
            }
        };
        if previous.embedding_dim() != self.config.embedding_dim {
            return Err(DynGeError::Configuration(format!(
                "上一模型的嵌入维度({})与配置({})不一致",
                previous.embedding_dim(),
                self.config.embedding_dim
            )));
        }

        if input_dim == previous.input_dim() {
            Ok(previous)
        } else {
            expand_model(&previous, input_dim, &self.config.expand_options(), &mut self.rng)
        }
    }

    /// 从`folder`恢复全部快照的模型；已保存的模型数须等于快照数
    pub fn load_all<P: AsRef<Path>>(&mut self, folder: P) -> Result<(), DynGeError> {
        let folder = folder.as_ref();
        ensure_folder(folder)?;
        let found = count_models(folder)?;
        if found != self.len() {
            return Err(DynGeError::MissingModel {
                expected: self.len(),
                found,
            });
        }

        let start = Instant::now();
        for index in 0..self.len() {
            self.load_model(folder, index)?;
        }
        info!(
            "已加载{}个模型，用时 {:.2}s",
            self.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(())
    }

    /// 从`folder/graph_{index}`恢复单个快照的模型
    pub fn load_model<P: AsRef<Path>>(&mut self, folder: P, index: usize) -> Result<(), DynGeError> {
        self.check_index(index)?;
        let model = Autoencoder::load_model(model_path(folder, index))?;
        if model.embedding_dim() != self.config.embedding_dim {
            return Err(DynGeError::Configuration(format!(
                "模型{index}的嵌入维度({})与配置({})不一致",
                model.embedding_dim(),
                self.config.embedding_dim
            )));
        }
        let ge = StaticGraphEmbedding::loaded(
            index,
            self.adjacencies[index].clone(),
            model,
            self.config.loss(),
        )?;
        self.restored_embeddings.remove(&index);
        self.static_ges.insert(index, ge);
        Ok(())
    }

    pub fn get_embedding(&self, index: usize) -> Result<&Tensor, DynGeError> {
        self.check_index(index)?;
        match self.static_ges.get(&index) {
            Some(ge) => ge.get_embedding(),
            None => self.restored_embeddings.get(&index).ok_or_else(|| {
                DynGeError::State(format!("快照{index}尚未训练或加载，没有嵌入"))
            }),
        }
    }

    pub fn get_all_embeddings(&self) -> Result<Vec<&Tensor>, DynGeError> {
        (0..self.len()).map(|i| self.get_embedding(i)).collect()
    }

    pub fn get_reconstruction(&self, index: usize) -> Result<&Tensor, DynGeError> {
        self.check_index(index)?;
        self.static_ges
            .get(&index)
            .ok_or_else(|| DynGeError::State(format!("快照{index}没有模型，无法重构")))?
            .get_reconstruction()
    }

    /// 把每个快照的嵌入保存为`folder/embedding_{i}.npy`
    pub fn save_embeddings<P: AsRef<Path>>(&self, folder: P) -> Result<(), DynGeError> {
        let folder = folder.as_ref();
        ensure_folder(folder)?;
        let embeddings = self.get_all_embeddings()?;
        for (index, embedding) in embeddings.into_iter().enumerate() {
            embedding.save_npy(embedding_path(folder, index))?;
        }
        info!("已保存{}个嵌入到 {}", self.len(), folder.display());
        Ok(())
    }

    /// 从`folder`恢复全部嵌入（不需要模型），并返回它们
    pub fn load_embeddings<P: AsRef<Path>>(&mut self, folder: P) -> Result<Vec<Tensor>, DynGeError> {
        let folder = folder.as_ref();
        ensure_folder(folder)?;
        let found = count_embeddings(folder)?;
        if found != self.len() {
            return Err(DynGeError::MissingModel {
                expected: self.len(),
                found,
            });
        }

        let mut embeddings = Vec::with_capacity(self.len());
        for index in 0..self.len() {
            let path = embedding_path(folder, index);
            if !path.is_file() {
                return Err(DynGeError::ModelNotFound(path));
            }
            let embedding = Tensor::load_npy(&path)?;
            let expected = [self.adjacencies[index].rows(), self.config.embedding_dim];
            if embedding.shape() != expected.as_slice() {
                return Err(DynGeError::Value(format!(
                    "嵌入{index}的形状应为{expected:?}，而非{:?}",
                    embedding.shape()
                )));
            }
            embeddings.push(embedding);
        }

        for (index, embedding) in embeddings.iter().enumerate() {
            if !self.static_ges.contains_key(&index) {
                self.restored_embeddings.insert(index, embedding.clone());
            }
        }
        Ok(embeddings)
    }
}
