/*
 * @Description  : 节点标签 → 下标的映射，以及据此构建快照序列的构建器
 *
 * 原始数据里的节点往往是任意标签（字符串、论文编号等），
 * 而自编码器要求“第k行就是节点k”且跨快照下标稳定，
 * 因此映射只追加、不删除。
 */

use std::collections::HashMap;
use std::hash::Hash;

use super::Snapshot;
use crate::errors::DynGeError;

/// 只追加的节点标签下标表
#[derive(Debug, Clone)]
pub struct NodeIndexer<K> {
    index: HashMap<K, usize>,
    labels: Vec<K>,
}

impl<K: Eq + Hash + Clone> Default for NodeIndexer<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            labels: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> NodeIndexer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取标签对应的下标；首次出现的标签被追加到末尾
    pub fn get_or_insert(&mut self, label: K) -> usize {
        if let Some(&idx) = self.index.get(&label) {
            return idx;
        }
        let idx = self.labels.len();
        self.index.insert(label.clone(), idx);
        self.labels.push(label);
        idx
    }

    pub fn get(&self, label: &K) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// 下标 → 标签
    pub fn label(&self, idx: usize) -> Option<&K> {
        self.labels.get(idx)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// 由带标签的边表逐个构建快照序列
///
/// 每个新快照都包含此前见过的所有节点（节点不会被删除），
/// 因此快照的节点数单调不减，且同一标签在所有快照中下标相同。
#[derive(Debug, Clone)]
pub struct DynamicGraphBuilder<K> {
    indexer: NodeIndexer<K>,
    directed: bool,
    snapshots: Vec<Snapshot>,
}

impl<K: Eq + Hash + Clone> DynamicGraphBuilder<K> {
    pub fn new(directed: bool) -> Self {
        Self {
            indexer: NodeIndexer::new(),
            directed,
            snapshots: Vec::new(),
        }
    }

    /// 追加一个快照，返回其在序列中的序号
    pub fn push_snapshot<I>(&mut self, edges: I) -> Result<usize, DynGeError>
    where
        I: IntoIterator<Item = (K, K)>,
    {
        let indexed: Vec<(usize, usize)> = edges
            .into_iter()
            .map(|(u, v)| (self.indexer.get_or_insert(u), self.indexer.get_or_insert(v)))
            .collect();
        let snapshot = Snapshot::from_edges(self.indexer.len(), indexed, self.directed)?;
        self.snapshots.push(snapshot);
        Ok(self.snapshots.len() - 1)
    }

    /// 预先登记一批节点（例如在该时刻出现但暂无连边的节点）
    pub fn add_nodes<I: IntoIterator<Item = K>>(&mut self, labels: I) {
        for label in labels {
            self.indexer.get_or_insert(label);
        }
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn indexer(&self) -> &NodeIndexer<K> {
        &self.indexer
    }

    /// 结束构建，返回快照序列与标签下标表
    pub fn build(self) -> (Vec<Snapshot>, NodeIndexer<K>) {
        (self.snapshots, self.indexer)
    }
}
