mod dyn_ge;
mod static_ge;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::data::Snapshot;
use crate::dynge::{DynGeConfig, TrainConfig};

/// 节点数为 5、8、13 的随机快照序列
fn snapshots() -> Vec<Snapshot> {
    let mut rng = StdRng::seed_from_u64(6);
    vec![
        Snapshot::gnm_random(5, 5, &mut rng),
        Snapshot::gnm_random(8, 12, &mut rng),
        Snapshot::gnm_random(13, 20, &mut rng),
    ]
}

fn quick_config() -> DynGeConfig {
    DynGeConfig {
        embedding_dim: 2,
        ..DynGeConfig::default()
    }
}

fn quick_train() -> TrainConfig {
    TrainConfig {
        batch_size: 4,
        epochs: 10,
        learning_rate: 0.01,
        log_every: 0,
        ..TrainConfig::default()
    }
}
