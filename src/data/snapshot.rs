/*
 * @Description  : 图快照：动态图在某一离散时刻的静态图
 *
 * 节点用`[0, node_count)`的下标表示；相邻快照间同一节点须保持同一下标，
 * 新节点只能追加在末尾（见`DynamicGraphBuilder`）。
 */

use std::collections::{BTreeMap, HashSet};

use rand::Rng;

use crate::errors::DynGeError;
use crate::tensor::Tensor;

/// 训练所需的图快照接口
///
/// 任何能给出节点数与（带权）边列表的图结构都可以实现此trait，
/// 从而作为动态图嵌入的输入。
pub trait GraphSnapshot {
    /// 节点数（即自编码器的输入维度）
    fn node_count(&self) -> usize;

    /// 全部边，形如`(起点, 终点, 权重)`
    fn edges(&self) -> Vec<(usize, usize, f32)>;

    /// 是否为有向图。无向图的邻接矩阵是对称的
    fn is_directed(&self) -> bool {
        false
    }

    /// 构建`node_count × node_count`的稠密邻接矩阵，第`k`行即节点`k`的邻域向量
    fn adjacency(&self) -> Tensor {
        let n = self.node_count();
        let mut adjacency = Tensor::zeros(&[n, n]);
        let directed = self.is_directed();
        for (u, v, w) in self.edges() {
            adjacency.set(u, v, w);
            if !directed {
                adjacency.set(v, u, w);
            }
        }
        adjacency
    }
}

/// 基于边表的内存图快照
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    node_count: usize,
    directed: bool,
    // 无向图的键统一为(较小下标, 较大下标)
    edges: BTreeMap<(usize, usize), f32>,
}

impl Snapshot {
    /// 创建一个含`node_count`个孤立节点的空图
    pub fn new(node_count: usize, directed: bool) -> Self {
        Self {
            node_count,
            directed,
            edges: BTreeMap::new(),
        }
    }

    /// 由无权边表创建快照，边的权重均为1
    pub fn from_edges<I>(node_count: usize, edges: I, directed: bool) -> Result<Self, DynGeError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut snapshot = Self::new(node_count, directed);
        for (u, v) in edges {
            snapshot.add_edge(u, v)?;
        }
        Ok(snapshot)
    }

    /// 生成含`n`个节点、`m`条边的均匀随机简单无向图（G(n, m)模型）
    ///
    /// `m`不小于完全图边数时直接返回完全图。
    pub fn gnm_random<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> Self {
        let mut snapshot = Self::new(n, false);
        let max_edges = n * n.saturating_sub(1) / 2;
        if m >= max_edges {
            for u in 0..n {
                for v in u + 1..n {
                    snapshot.edges.insert((u, v), 1.0);
                }
            }
            return snapshot;
        }

        while snapshot.edges.len() < m {
            let u = rng.gen_range(0..n);
            let v = rng.gen_range(0..n);
            if u != v {
                snapshot.edges.insert(Self::key(u, v, false), 1.0);
            }
        }
        snapshot
    }

    /// 添加一条权重为1的边
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<(), DynGeError> {
        self.add_weighted_edge(u, v, 1.0)
    }

    /// 添加一条带权边。已存在的边会被覆盖权重
    pub fn add_weighted_edge(&mut self, u: usize, v: usize, weight: f32) -> Result<(), DynGeError> {
        for node in [u, v] {
            if node >= self.node_count {
                return Err(DynGeError::Index {
                    index: node,
                    len: self.node_count,
                });
            }
        }
        self.edges.insert(Self::key(u, v, self.directed), weight);
        Ok(())
    }

    /// 追加孤立节点直到节点数为`node_count`；不允许缩小
    pub fn grow_to(&mut self, node_count: usize) -> Result<(), DynGeError> {
        if node_count < self.node_count {
            return Err(DynGeError::Value(format!(
                "快照节点数只能增加：{} -> {node_count}",
                self.node_count
            )));
        }
        self.node_count = node_count;
        Ok(())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.edges.contains_key(&Self::key(u, v, self.directed))
    }

    /// 边集合；无向图中每条边只出现一次，形如(较小下标, 较大下标)
    pub fn edge_set(&self) -> HashSet<(usize, usize)> {
        self.edges.keys().copied().collect()
    }

    /// 各节点的度（无向图）或出度（有向图）
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.node_count];
        for &(u, v) in self.edges.keys() {
            degrees[u] += 1;
            if !self.directed && u != v {
                degrees[v] += 1;
            }
        }
        degrees
    }

    /// 孤立节点数量
    pub fn isolated_count(&self) -> usize {
        self.degrees().iter().filter(|&&d| d == 0).count()
    }

    fn key(u: usize, v: usize, directed: bool) -> (usize, usize) {
        if directed || u <= v { (u, v) } else { (v, u) }
    }
}

impl GraphSnapshot for Snapshot {
    fn node_count(&self) -> usize {
        self.node_count
    }

    fn edges(&self) -> Vec<(usize, usize, f32)> {
        self.edges.iter().map(|(&(u, v), &w)| (u, v, w)).collect()
    }

    fn is_directed(&self) -> bool {
        self.directed
    }
}
