//! 数据模块
//!
//! 提供动态图嵌入训练所需的输入数据结构。
//!
//! # 主要组件
//!
//! - [`GraphSnapshot`]: 图快照接口（节点数 + 边表 → 邻接矩阵）
//! - [`Snapshot`]: 基于边表的内存快照实现，含 G(n, m) 随机图生成
//! - [`NodeIndexer`] / [`DynamicGraphBuilder`]: 保证节点下标跨快照一致的构建工具
//! - [`RowLoader`]: 按行（节点）分批的下标加载器
//!
//! # 使用示例
//!
//! ```ignore
//! use dyn_ge::data::{DynamicGraphBuilder, GraphSnapshot};
//!
//! let mut builder = DynamicGraphBuilder::new(false);
//! builder.push_snapshot([("a", "b"), ("b", "c")])?;
//! builder.push_snapshot([("a", "b"), ("c", "d")])?;
//! let (snapshots, indexer) = builder.build();
//! let adjacency = snapshots[1].adjacency(); // 4 × 4
//! ```

mod dataloader;
mod indexer;
mod snapshot;

#[cfg(test)]
mod tests;

pub use dataloader::{RowLoader, RowLoaderIterator};
pub use indexer::{DynamicGraphBuilder, NodeIndexer};
pub use snapshot::{GraphSnapshot, Snapshot};
