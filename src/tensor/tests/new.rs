use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::tensor::Tensor;

#[test]
fn test_new_and_shape() {
    let t = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    assert_eq!(t.shape(), &[2, 3]);
    assert_eq!(t.rows(), 2);
    assert_eq!(t.cols(), 3);
    assert_eq!(t.get(1, 0), 4.);
    assert_eq!(t.to_vec(), vec![1., 2., 3., 4., 5., 6.]);
}

#[test]
#[should_panic(expected = "数据长度")]
fn test_new_with_wrong_len() {
    Tensor::new(&[1., 2., 3.], &[2, 2]);
}

#[test]
fn test_zeros_ones_eye() {
    assert_eq!(Tensor::zeros(&[2, 2]).sum(), 0.);
    assert_eq!(Tensor::ones(&[2, 3]).sum(), 6.);
    let eye = Tensor::eye(3);
    assert_eq!(eye.sum(), 3.);
    assert_eq!(eye.get(1, 1), 1.);
    assert_eq!(eye.get(0, 1), 0.);
}

#[test]
fn test_random_is_reproducible_with_same_seed() {
    let mut rng1 = StdRng::seed_from_u64(42);
    let mut rng2 = StdRng::seed_from_u64(42);
    let a = Tensor::normal_with_rng(0.0, 1.0, &[4, 5], &mut rng1);
    let b = Tensor::normal_with_rng(0.0, 1.0, &[4, 5], &mut rng2);
    assert_eq!(a, b);

    let c = Tensor::uniform_with_rng(-1.0, 1.0, &[3, 3], &mut rng1);
    assert!(c.to_vec().iter().all(|&x| (-1.0..=1.0).contains(&x)));
}

#[test]
fn test_normal_statistics() {
    let mut rng = StdRng::seed_from_u64(7);
    let t = Tensor::normal_with_rng(1.0, 0.5, &[100, 100], &mut rng);
    let mean = t.sum() / t.size() as f32;
    assert!((mean - 1.0).abs() < 0.05, "均值偏离过大: {mean}");
    assert!(t.is_finite());
}
