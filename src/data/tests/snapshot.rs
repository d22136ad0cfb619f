use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::{GraphSnapshot, Snapshot};
use crate::errors::DynGeError;
use crate::tensor::Tensor;

#[test]
fn test_undirected_adjacency_is_symmetric() {
    let g = Snapshot::from_edges(3, [(0, 1), (2, 1)], false).unwrap();
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 2);
    assert!(g.has_edge(1, 0));
    assert_eq!(
        g.adjacency(),
        Tensor::new(&[0., 1., 0., 1., 0., 1., 0., 1., 0.], &[3, 3])
    );
    assert_eq!(g.degrees(), vec![1, 2, 1]);
}

#[test]
fn test_directed_adjacency() {
    let mut g = Snapshot::new(2, true);
    g.add_weighted_edge(0, 1, 0.5).unwrap();
    assert!(g.has_edge(0, 1));
    assert!(!g.has_edge(1, 0));
    assert_eq!(g.adjacency(), Tensor::new(&[0., 0.5, 0., 0.], &[2, 2]));
}

#[test]
fn test_add_edge_out_of_range() {
    let mut g = Snapshot::new(2, false);
    let err = g.add_edge(0, 2).unwrap_err();
    assert!(matches!(err, DynGeError::Index { index: 2, len: 2 }));
}

#[test]
fn test_grow_to() {
    let mut g = Snapshot::from_edges(2, [(0, 1)], false).unwrap();
    g.grow_to(4).unwrap();
    assert_eq!(g.node_count(), 4);
    assert_eq!(g.isolated_count(), 2);
    assert!(g.grow_to(3).is_err());
}

#[test]
fn test_gnm_random() {
    let mut rng = StdRng::seed_from_u64(6);
    let g = Snapshot::gnm_random(13, 20, &mut rng);
    assert_eq!(g.node_count(), 13);
    assert_eq!(g.edge_count(), 20);
    // 无自环
    assert!(g.edge_set().iter().all(|&(u, v)| u < v));

    // 边数超过上限时退化为完全图
    let complete = Snapshot::gnm_random(4, 100, &mut rng);
    assert_eq!(complete.edge_count(), 6);
}
