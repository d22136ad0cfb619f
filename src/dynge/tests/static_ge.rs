use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{quick_config, quick_train, snapshots};
use crate::data::{GraphSnapshot, Snapshot};
use crate::dynge::{
    CheckpointConfig, CheckpointManager, CheckpointTrigger, StaticGraphEmbedding, TrainConfig,
    TrainingState,
};
use crate::errors::DynGeError;
use crate::nn::{Autoencoder, OptimizerType};
use crate::tensor::Tensor;

fn trainer(seed: u64) -> StaticGraphEmbedding {
    let snapshot = Snapshot::gnm_random(12, 20, &mut StdRng::seed_from_u64(3));
    let config = quick_config();
    let model = Autoencoder::new(
        config.autoencoder_config(12).unwrap(),
        &mut StdRng::seed_from_u64(seed),
    )
    .unwrap();
    StaticGraphEmbedding::from_snapshot(0, &snapshot, model, config.loss()).unwrap()
}

#[test]
fn test_query_before_training() {
    let ge = trainer(0);
    assert_eq!(ge.state(), TrainingState::Untrained);
    assert!(matches!(ge.get_embedding(), Err(DynGeError::State(_))));
    assert!(matches!(ge.get_reconstruction(), Err(DynGeError::State(_))));
}

#[test]
fn test_rejects_mismatched_adjacency() {
    let config = quick_config();
    let model = Autoencoder::new(
        config.autoencoder_config(5).unwrap(),
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    let adjacency = snapshots()[1].adjacency();
    assert!(matches!(
        StaticGraphEmbedding::new(1, adjacency, model.clone(), config.loss()),
        Err(DynGeError::Value(_))
    ));
    assert!(matches!(
        StaticGraphEmbedding::new(0, Tensor::zeros(&[5, 4]), model, config.loss()),
        Err(DynGeError::Value(_))
    ));
}

#[test]
fn test_training_reduces_loss() {
    let mut ge = trainer(1);
    let before = ge.evaluate_loss().total();
    let config = TrainConfig {
        epochs: 60,
        early_stop: 0,
        ..quick_train()
    };
    let report = ge.train(&config, &mut StdRng::seed_from_u64(2)).unwrap();

    assert_eq!(report.outcome, TrainingState::EpochsExhausted);
    assert_eq!(ge.state(), TrainingState::EpochsExhausted);
    assert_eq!(report.epochs_run, 60);
    assert_eq!(ge.loss_history().len(), 60);
    assert!(report.best_loss <= report.final_loss);
    assert!(ge.evaluate_loss().total() < before);

    assert_eq!(ge.get_embedding().unwrap().shape(), &[12, 2]);
    assert_eq!(ge.get_reconstruction().unwrap().shape(), &[12, 12]);
    assert_eq!(ge.get_embedding().unwrap(), &ge.model().encode(ge.adjacency()));
}

#[test]
fn test_same_seed_same_embedding() {
    let config = quick_train();
    let mut a = trainer(4);
    let mut b = trainer(4);
    a.train(&config, &mut StdRng::seed_from_u64(5)).unwrap();
    b.train(&config, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a.get_embedding().unwrap(), b.get_embedding().unwrap());
}

#[test]
fn test_convergence_threshold() {
    let mut ge = trainer(0);
    let config = TrainConfig {
        convergence_threshold: Some(1e9),
        ..quick_train()
    };
    let report = ge.train(&config, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(report.outcome, TrainingState::Converged);
    assert_eq!(report.epochs_run, 1);
    assert!(ge.get_embedding().is_ok());
}

#[test]
fn test_early_stopping() {
    let mut ge = trainer(0);
    // min_delta 极大时只有第一个epoch算改进
    let config = TrainConfig {
        epochs: 100,
        early_stop: 3,
        min_delta: 1e9,
        ..quick_train()
    };
    let report = ge.train(&config, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(report.outcome, TrainingState::EarlyStopped);
    assert_eq!(report.epochs_run, 4);
    assert_eq!(ge.state(), TrainingState::EarlyStopped);
}

// 损失溢出时返回 Diverged，模型回到该epoch开始前的参数
#[test]
fn test_divergence_is_detected() {
    let mut ge = trainer(0);
    let initial = ge.model().clone();
    let config = TrainConfig {
        learning_rate: 1e30,
        optimizer: OptimizerType::Sgd,
        ..quick_train()
    };
    let result = ge.train(&config, &mut StdRng::seed_from_u64(0));
    assert!(matches!(result, Err(DynGeError::Diverged { epoch: 1, .. })));
    assert_eq!(ge.model(), &initial);
    assert_eq!(ge.state(), TrainingState::Untrained);
}

#[test]
fn test_resume_training() {
    let mut ge = trainer(0);
    let config = quick_train();
    ge.train(&config, &mut StdRng::seed_from_u64(0)).unwrap();
    let after_first = ge.model().clone();
    let report = ge.train(&config, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(report.epochs_run, config.epochs);
    assert_eq!(ge.loss_history().len(), 2 * config.epochs);
    assert_ne!(ge.model(), &after_first);
}

#[test]
fn test_checkpoints_during_training() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = trainer(0);
    let config = TrainConfig {
        epochs: 6,
        early_stop: 0,
        checkpoint: Some(
            CheckpointConfig::new(dir.path(), 2).with_trigger(CheckpointTrigger::EveryEpochs(2)),
        ),
        ..quick_train()
    };
    ge.train(&config, &mut StdRng::seed_from_u64(0)).unwrap();

    // 第2、4、6个epoch各写一次，只保留最后两个
    let latest = CheckpointManager::find_latest(dir.path(), 0).unwrap().unwrap();
    assert!(latest.ends_with("graph_0_ck_2.ckpt"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    let checkpoint = CheckpointManager::load(&latest).unwrap();
    assert_eq!(checkpoint.epoch, 6);

    // 回滚
    let trained = ge.get_embedding().unwrap().clone();
    ge.restore_checkpoint(&latest).unwrap();
    assert_eq!(ge.state(), TrainingState::Loaded);
    assert_abs_diff_eq!(ge.get_embedding().unwrap(), &trained, epsilon = 1e-6);
}

// 其他快照的检查点即使形状相同也不能恢复
#[test]
fn test_restore_rejects_foreign_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = trainer(0);
    let other = trainer(7);
    let mut manager = CheckpointManager::new(&CheckpointConfig::new(dir.path(), 1), 3).unwrap();
    let path = manager.save(other.model(), 1, 0.5).unwrap();

    let before = ge.model().clone();
    assert!(matches!(ge.restore_checkpoint(&path), Err(DynGeError::Value(_))));
    assert_eq!(ge.model(), &before);
    assert_eq!(ge.state(), TrainingState::Untrained);
}

#[test]
fn test_loaded_state() {
    let trained = {
        let mut ge = trainer(0);
        ge.train(&quick_train(), &mut StdRng::seed_from_u64(0)).unwrap();
        ge
    };
    let restored = StaticGraphEmbedding::loaded(
        0,
        trained.adjacency().clone(),
        trained.model().clone(),
        quick_config().loss(),
    )
    .unwrap();
    assert_eq!(restored.state(), TrainingState::Loaded);
    assert!(restored.state().is_ready());
    assert_eq!(restored.get_embedding().unwrap(), trained.get_embedding().unwrap());
    assert_eq!(restored.into_model(), trained.into_model());
}
