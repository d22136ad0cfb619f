/*
 * @Author       : 老董
 * @Description  : 基于重构分数的链路预测指标
 *
 * `scores[i, j]`是模型对边`(i, j)`的打分（通常就是重构矩阵）。
 * 无向图中节点对`(i, j)`与`(j, i)`是同一条边，分数取两者的平均。
 * 这里只做排序类指标；外部分类器不在本模块范围内。
 */

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::data::{GraphSnapshot, Snapshot};
use crate::tensor::Tensor;

#[cfg(test)]
mod tests;

/// 所有候选节点对及其分数（不含自环）
fn scored_pairs(scores: &Tensor, directed: bool) -> Vec<(usize, usize, f32)> {
    let n = scores.rows().min(scores.cols());
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i == j || (!directed && j < i) {
                continue;
            }
            let score = if directed {
                scores.get(i, j)
            } else {
                0.5 * (scores.get(i, j) + scores.get(j, i))
            };
            pairs.push((i, j, score));
        }
    }
    pairs
}

fn by_score_desc(a: &(usize, usize, f32), b: &(usize, usize, f32)) -> Ordering {
    b.2.total_cmp(&a.2)
        .then_with(|| a.0.cmp(&b.0))
        .then_with(|| a.1.cmp(&b.1))
}

/// 分数最高的`k`个节点对，跳过`exclude`中的边
///
/// 无向图中`exclude`的元素须为`(较小下标, 较大下标)`，与`Snapshot::edge_set`一致。
pub fn top_k_edges(
    scores: &Tensor,
    k: usize,
    exclude: &HashSet<(usize, usize)>,
    directed: bool,
) -> Vec<(usize, usize, f32)> {
    let mut pairs: Vec<_> = scored_pairs(scores, directed)
        .into_iter()
        .filter(|(i, j, _)| !exclude.contains(&(*i, *j)))
        .collect();
    pairs.sort_by(by_score_desc);
    pairs.truncate(k);
    pairs
}

/// precision@k：排除训练图已有的边后，前`k`个预测中命中真实图新边的比例
///
/// 返回值与`ks`一一对应。
pub fn precision_at_k(scores: &Tensor, train_graph: &Snapshot, truth_graph: &Snapshot, ks: &[usize]) -> Vec<f32> {
    let directed = train_graph.is_directed();
    let max_k = ks.iter().copied().max().unwrap_or(0);
    let ranked = top_k_edges(scores, max_k, &train_graph.edge_set(), directed);
    let truth = truth_graph.edge_set();

    let mut hits = Vec::with_capacity(ranked.len());
    let mut count = 0usize;
    for (i, j, _) in &ranked {
        if truth.contains(&(*i, *j)) {
            count += 1;
        }
        hits.push(count);
    }

    ks.iter()
        .map(|&k| {
            if k == 0 {
                return 0.0;
            }
            let taken = k.min(hits.len());
            let hit = if taken == 0 { 0 } else { hits[taken - 1] };
            hit as f32 / k as f32
        })
        .collect()
}

/// 平均精度均值（MAP）
///
/// 对每个节点`i`，把所有不在训练图中的候选邻居按`scores[i, j]`降序排列，
/// 以真实图中的新邻居为相关项求平均精度，再对至少有一个相关项的节点取平均。
/// 没有任何相关项时返回0。
pub fn mean_average_precision(scores: &Tensor, train_graph: &Snapshot, truth_graph: &Snapshot) -> f32 {
    let directed = train_graph.is_directed();
    let key = |i: usize, j: usize| if directed || i <= j { (i, j) } else { (j, i) };
    let train = train_graph.edge_set();
    let truth = truth_graph.edge_set();
    let n = scores.rows().min(scores.cols());

    let mut total = 0.0;
    let mut nodes = 0usize;
    for i in 0..n {
        let mut candidates: Vec<(usize, f32)> = (0..n)
            .filter(|&j| j != i && !train.contains(&key(i, j)))
            .map(|j| (j, scores.get(i, j)))
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut relevant = 0usize;
        let mut precision_sum = 0.0;
        for (rank, (j, _)) in candidates.iter().enumerate() {
            if truth.contains(&key(i, *j)) {
                relevant += 1;
                precision_sum += relevant as f32 / (rank + 1) as f32;
            }
        }
        if relevant > 0 {
            total += precision_sum / relevant as f32;
            nodes += 1;
        }
    }

    if nodes == 0 { 0.0 } else { total / nodes as f32 }
}
