use std::collections::HashSet;

use approx::assert_abs_diff_eq;

use crate::data::Snapshot;
use crate::eval::{mean_average_precision, precision_at_k, top_k_edges};
use crate::tensor::Tensor;

// 4个节点的打分：(0,1) 0.9，(2,3) 0.8，(0,2) 0.7，其余很低
fn scores() -> Tensor {
    #[rustfmt::skip]
    let data = [
        0.0, 0.9, 0.7, 0.1,
        0.9, 0.0, 0.2, 0.1,
        0.7, 0.2, 0.0, 0.8,
        0.1, 0.1, 0.8, 0.0,
    ];
    Tensor::new(&data, &[4, 4])
}

#[test]
fn test_top_k_edges() {
    let top = top_k_edges(&scores(), 2, &HashSet::new(), false);
    assert_eq!(top.len(), 2);
    assert_eq!((top[0].0, top[0].1), (0, 1));
    assert_eq!((top[1].0, top[1].1), (2, 3));
    assert_abs_diff_eq!(top[0].2, 0.9);

    let exclude: HashSet<_> = [(0, 1)].into_iter().collect();
    let top = top_k_edges(&scores(), 2, &exclude, false);
    assert_eq!((top[0].0, top[0].1), (2, 3));
    assert_eq!((top[1].0, top[1].1), (0, 2));
}

#[test]
fn test_top_k_edges_directed_uses_ordered_pairs() {
    let mut s = scores();
    s.set(1, 0, 0.0);
    let top = top_k_edges(&s, 12, &HashSet::new(), true);
    // 4个节点共12个有序对
    assert_eq!(top.len(), 12);
    assert_eq!((top[0].0, top[0].1), (0, 1));
    assert!(top.iter().all(|(i, j, _)| i != j));
}

#[test]
fn test_precision_at_k() {
    let train = Snapshot::from_edges(4, [(0, 1)], false).unwrap();
    let truth = Snapshot::from_edges(4, [(0, 1), (2, 3), (1, 3)], false).unwrap();
    // 排除(0,1)后依次为 (2,3) 命中、(0,2) 未命中、(1,2) 未命中
    let precision = precision_at_k(&scores(), &train, &truth, &[1, 2, 3, 0]);
    assert_abs_diff_eq!(precision[0], 1.0);
    assert_abs_diff_eq!(precision[1], 0.5);
    assert_abs_diff_eq!(precision[2], 1.0 / 3.0);
    assert_abs_diff_eq!(precision[3], 0.0);
}

#[test]
fn test_mean_average_precision() {
    let train = Snapshot::from_edges(4, [(0, 1)], false).unwrap();
    let truth = Snapshot::from_edges(4, [(2, 3)], false).unwrap();
    // 节点2的候选：3(0.8) 0(0.7) 1(0.2)，相关项3排第1 → AP=1
    // 节点3的候选：2(0.8) 0(0.1) 1(0.1)，相关项2排第1 → AP=1
    assert_abs_diff_eq!(mean_average_precision(&scores(), &train, &truth), 1.0);

    let truth = Snapshot::from_edges(4, [(0, 3)], false).unwrap();
    // 节点0的候选：2(0.7) 3(0.1)，相关项3排第2 → AP=0.5
    // 节点3的候选：2(0.8) 0(0.1) 1(0.1)，相关项0排第2 → AP=0.5
    assert_abs_diff_eq!(mean_average_precision(&scores(), &train, &truth), 0.5);

    let empty = Snapshot::new(4, false);
    assert_abs_diff_eq!(mean_average_precision(&scores(), &train, &empty), 0.0);
}
