mod criterion;
mod schedule;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::{GraphSnapshot, Snapshot};
use crate::nn::{Activation, Autoencoder, AutoencoderConfig};
use crate::tensor::Tensor;

/// 测试用的小模型
fn small_model(input_dim: usize, hidden_dims: &[usize], activation: Activation, seed: u64) -> Autoencoder {
    let config = AutoencoderConfig {
        input_dim,
        embedding_dim: *hidden_dims.last().expect("至少一层"),
        hidden_dims: hidden_dims.to_vec(),
        l1: 1e-3,
        l2: 1e-3,
        activation,
    };
    Autoencoder::new(config, &mut StdRng::seed_from_u64(seed)).expect("合法配置")
}

/// 测试用的随机图邻接矩阵
fn random_adjacency(n: usize, m: usize, seed: u64) -> Tensor {
    Snapshot::gnm_random(n, m, &mut StdRng::seed_from_u64(seed)).adjacency()
}
