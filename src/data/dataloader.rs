/*
 * @Description  : RowLoader - 按行（即按节点）分批的索引加载器
 *
 * 自编码器的每个样本就是邻接矩阵的一行，因此这里只产出行下标，
 * 由训练器自行从邻接矩阵中取出对应的行与子块。支持：
 * - 自动分批 (batch_size)
 * - 随机打乱 (shuffle，随机性来自调用方传入的rng)
 * - 丢弃不完整批次 (drop_last)
 */

use rand::Rng;
use rand::seq::SliceRandom;

/// RowLoader - 行下标批量加载器
///
/// # 示例
/// ```ignore
/// let loader = RowLoader::new(n_nodes, 64).shuffle(true);
/// for batch in loader.iter(&mut rng) {
///     let x = adjacency.select_rows(&batch);
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RowLoader {
    len: usize,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
}

impl RowLoader {
    /// 创建新的 RowLoader
    ///
    /// # 参数
    /// - `len`: 总行数（节点数）
    /// - `batch_size`: 批大小，须大于0（由配置校验保证）
    pub fn new(len: usize, batch_size: usize) -> Self {
        assert!(batch_size > 0, "RowLoader: batch_size 必须大于 0");
        Self {
            len,
            batch_size,
            shuffle: false,
            drop_last: false,
        }
    }

    /// 设置是否打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置是否丢弃最后一个不完整的批次
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        if self.drop_last {
            self.len / self.batch_size
        } else {
            self.len.div_ceil(self.batch_size)
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 创建迭代器。若开启了shuffle，则在此处用`rng`打乱一次下标
    pub fn iter<R: Rng + ?Sized>(&self, rng: &mut R) -> RowLoaderIterator {
        let mut indices: Vec<usize> = (0..self.len).collect();
        if self.shuffle {
            indices.shuffle(rng);
        }

        RowLoaderIterator {
            indices,
            batch_size: self.batch_size,
            drop_last: self.drop_last,
            current_batch: 0,
        }
    }
}

/// RowLoader 迭代器，每次产出一个批次的行下标
pub struct RowLoaderIterator {
    indices: Vec<usize>,
    batch_size: usize,
    drop_last: bool,
    current_batch: usize,
}

impl Iterator for RowLoaderIterator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.indices.len();
        let start = self.current_batch * self.batch_size;

        if start >= n {
            return None;
        }

        let end = (start + self.batch_size).min(n);

        // 如果 drop_last 且批次不完整，则跳过
        if self.drop_last && end - start < self.batch_size {
            return None;
        }

        self.current_batch += 1;
        Some(self.indices[start..end].to_vec())
    }
}
