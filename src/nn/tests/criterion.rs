use approx::assert_abs_diff_eq;

use crate::nn::GraphReconstructionLoss;
use crate::tensor::Tensor;

#[test]
fn test_weighted_reconstruction() {
    let loss = GraphReconstructionLoss::new(0.0, 5.0);
    // 两行：边处的误差乘β，非边处乘1
    let x = Tensor::new(&[0., 1., 1., 0.], &[2, 2]);
    let x_hat = Tensor::new(&[0.5, 0.5, 1., 0.], &[2, 2]);
    let y = Tensor::zeros(&[2, 1]);
    let (terms, grads) = loss.compute(&x, &x_hat, &y, &x);
    // ((0.5)² + (−0.5·5)²) / 2 = (0.25 + 6.25) / 2
    assert_abs_diff_eq!(terms.reconstruction, 3.25);
    assert_abs_diff_eq!(terms.proximity, 0.0);
    // 2/b · B² ⊙ (X̂−X)
    assert_abs_diff_eq!(
        grads.reconstruction,
        Tensor::new(&[0.5, -12.5, 0., 0.], &[2, 2]),
        epsilon = 1e-6
    );
}

#[test]
fn test_proximity_pulls_neighbours() {
    let loss = GraphReconstructionLoss::new(1.0, 1.0);
    // 0-1 相连，2 孤立
    let adjacency = Tensor::new(&[0., 1., 0., 1., 0., 0., 0., 0., 0.], &[3, 3]);
    let y = Tensor::new(&[0., 0., 3., 4., 10., 10.], &[3, 2]);
    let (terms, grads) = loss.compute(&adjacency, &adjacency, &y, &adjacency);
    // A_01·‖y0−y1‖² + A_10·‖y1−y0‖² = 2 · 25，再除以b=3
    assert_abs_diff_eq!(terms.proximity, 50.0 / 3.0, epsilon = 1e-5);
    assert_abs_diff_eq!(terms.reconstruction, 0.0);
    // 梯度使 y0 与 y1 互相靠近，孤立节点不受影响
    let expected = Tensor::new(&[-6., -8., 6., 8., 0., 0.], &[3, 2]) * (2.0 / 3.0);
    assert_abs_diff_eq!(grads.embedding, expected, epsilon = 1e-5);
}

// 有向邻接（非对称）下的邻近项
#[test]
fn test_proximity_directed() {
    let loss = GraphReconstructionLoss::new(0.5, 1.0);
    let adjacency = Tensor::new(&[0., 2., 0., 0.], &[2, 2]);
    let y = Tensor::new(&[1., 3.], &[2, 1]);
    let (terms, grads) = loss.compute(&adjacency, &adjacency, &y, &adjacency);
    // α/b · 2 · (1−3)² = 0.25 · 8
    assert_abs_diff_eq!(terms.proximity, 2.0, epsilon = 1e-6);
    // d/dy0 = α/b · 2 · 2 · (y0−y1) = −2，d/dy1 = 2
    assert_abs_diff_eq!(grads.embedding, Tensor::new(&[-2., 2.], &[2, 1]), epsilon = 1e-6);
    assert_abs_diff_eq!(terms.total(), 2.0, epsilon = 1e-6);
}
