use approx::assert_abs_diff_eq;

use super::{quick_config, quick_train, snapshots};
use crate::data::Snapshot;
use crate::dynge::persistence::{count_embeddings, count_models, model_path};
use crate::dynge::{DynGraphEmbedding, PreviousModel, TrainConfig, TrainingState};
use crate::errors::DynGeError;
use crate::nn::{Autoencoder, OptimizerType};
use crate::tensor::Tensor;

fn dyn_ge() -> DynGraphEmbedding {
    DynGraphEmbedding::new(&snapshots(), quick_config()).unwrap()
}

#[test]
fn test_construction() {
    let ge = dyn_ge();
    assert_eq!(ge.len(), 3);
    assert!(!ge.is_empty());
    assert_eq!(ge.node_counts(), vec![5, 8, 13]);
    assert!(ge.static_ge(0).is_none());

    let empty: Vec<Snapshot> = Vec::new();
    assert!(matches!(
        DynGraphEmbedding::new(&empty, quick_config()),
        Err(DynGeError::Configuration(_))
    ));

    // 节点数减少
    let mut reversed = snapshots();
    reversed.reverse();
    assert!(matches!(
        DynGraphEmbedding::new(&reversed, quick_config()),
        Err(DynGeError::Value(_))
    ));

    assert!(matches!(
        DynGraphEmbedding::from_adjacencies(vec![Tensor::zeros(&[3, 4])], quick_config()),
        Err(DynGeError::Value(_))
    ));

    let mut config = quick_config();
    config.beta = 0.5;
    assert!(matches!(
        DynGraphEmbedding::new(&snapshots(), config),
        Err(DynGeError::ValueMustSatisfyComparison { .. })
    ));
}

#[test]
fn test_train_all() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = dyn_ge();
    let reports = ge.train_all(dir.path(), &quick_train()).unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(count_models(dir.path()).unwrap(), 3);
    for (i, n) in [5, 8, 13].into_iter().enumerate() {
        assert_eq!(ge.get_embedding(i).unwrap().shape(), &[n, 2]);
        assert_eq!(ge.get_reconstruction(i).unwrap().shape(), &[n, n]);
        assert!(ge.static_ge(i).unwrap().state().is_ready());
    }
    assert_eq!(ge.get_all_embeddings().unwrap().len(), 3);

    // 保存的模型与内存中的一致
    let saved = Autoencoder::load_model(model_path(dir.path(), 2)).unwrap();
    assert_eq!(&saved, ge.static_ge(2).unwrap().model());
}

#[test]
fn test_missing_folder_and_bad_index() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = dyn_ge();
    let missing = dir.path().join("missing");
    assert!(matches!(
        ge.train_all(&missing, &quick_train()),
        Err(DynGeError::InvalidPath(_))
    ));
    assert!(matches!(
        ge.train_one(dir.path(), 3, true, &quick_train()),
        Err(DynGeError::Index { index: 3, len: 3 })
    ));
    assert!(matches!(ge.get_embedding(7), Err(DynGeError::Index { .. })));
    assert!(matches!(ge.get_embedding(0), Err(DynGeError::State(_))));
    assert!(matches!(ge.get_reconstruction(0), Err(DynGeError::State(_))));
}

// 跳过快照1直接训练快照2：既不在内存也不在磁盘
#[test]
fn test_sequential_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = dyn_ge();
    ge.train_one(dir.path(), 0, true, &quick_train()).unwrap();
    let result = ge.train_one(dir.path(), 2, true, &quick_train());
    assert!(matches!(result, Err(DynGeError::ModelNotFound(p)) if p == model_path(dir.path(), 1).with_extension("json")));

    assert!(matches!(
        ge.train_at(dir.path(), 1, PreviousModel::None, true, &quick_train()),
        Err(DynGeError::ModelNotFound(_))
    ));
    // 快照1从未训练过，不能续训
    assert!(matches!(
        ge.train_one(dir.path(), 1, false, &quick_train()),
        Err(DynGeError::ModelNotFound(_))
    ));
}

fn diverging() -> TrainConfig {
    TrainConfig {
        learning_rate: 1e30,
        optimizer: OptimizerType::Sgd,
        ..quick_train()
    }
}

// 训练失败的快照既不保存也不留在内存，下一快照无从派生
#[test]
fn test_failed_snapshot_blocks_next() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = dyn_ge();
    assert!(matches!(
        ge.train_one(dir.path(), 0, true, &diverging()),
        Err(DynGeError::Diverged { .. })
    ));
    assert!(ge.static_ge(0).is_none());
    assert_eq!(count_models(dir.path()).unwrap(), 0);
    assert!(matches!(ge.get_embedding(0), Err(DynGeError::State(_))));

    let result = ge.train_one(dir.path(), 1, true, &quick_train());
    assert!(matches!(result, Err(DynGeError::ModelNotFound(_))));
    assert!(ge.static_ge(1).is_none());
}

// 重新训练失败时，此前训练好的模型保持不变
#[test]
fn test_failed_retrain_keeps_previous() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = dyn_ge();
    ge.train_one(dir.path(), 0, true, &quick_train()).unwrap();
    let trained = ge.static_ge(0).unwrap().model().clone();
    let embedding = ge.get_embedding(0).unwrap().clone();

    // 从头派生
    assert!(ge.train_one(dir.path(), 0, true, &diverging()).is_err());
    let kept = ge.static_ge(0).unwrap();
    assert_eq!(kept.model(), &trained);
    assert_eq!(kept.state(), TrainingState::EpochsExhausted);
    assert_eq!(ge.get_embedding(0).unwrap(), &embedding);

    // 续训
    assert!(ge.train_one(dir.path(), 0, false, &diverging()).is_err());
    let kept = ge.static_ge(0).unwrap();
    assert_eq!(kept.model(), &trained);
    assert!(kept.state().is_ready());

    // 下一快照仍由训练好的模型派生
    ge.train_one(dir.path(), 1, true, &quick_train()).unwrap();
    assert_eq!(ge.static_ge(1).unwrap().model().input_dim(), 8);
}

// 节点数不变时直接沿用上一模型
#[test]
fn test_equal_node_counts_reuse_model() {
    let dir = tempfile::tempdir().unwrap();
    let first = snapshots().remove(0);
    let mut second = first.clone();
    second.add_edge(0, 4).unwrap();
    let mut ge = DynGraphEmbedding::new(&[first, second], quick_config()).unwrap();

    ge.train_one(dir.path(), 0, true, &quick_train()).unwrap();
    let frozen = TrainConfig {
        epochs: 1,
        learning_rate: 1e-9,
        optimizer: OptimizerType::Sgd,
        ..quick_train()
    };
    ge.train_one(dir.path(), 1, true, &frozen).unwrap();

    let previous = ge.static_ge(0).unwrap().model();
    let current = ge.static_ge(1).unwrap().model();
    assert_eq!(current.hidden_dims(), previous.hidden_dims());
    let probe = ge.static_ge(1).unwrap().adjacency();
    assert_abs_diff_eq!(current.encode(probe), previous.encode(probe), epsilon = 1e-5);
}

// 从磁盘上的上一模型派生
#[test]
fn test_train_from_saved_previous() {
    let dir = tempfile::tempdir().unwrap();
    let mut trained = dyn_ge();
    trained.train_one(dir.path(), 0, true, &quick_train()).unwrap();

    let mut fresh = dyn_ge();
    let report = fresh
        .train_at(
            dir.path(),
            1,
            PreviousModel::Path(model_path(dir.path(), 0)),
            true,
            &quick_train(),
        )
        .unwrap();
    assert_eq!(report.epochs_run, quick_train().epochs);
    assert_eq!(fresh.static_ge(1).unwrap().model().input_dim(), 8);
    assert!(fresh.static_ge(0).is_none());

    // train_one 在内存中找不到上一模型时读取 folder/graph_{i-1}
    let mut other = dyn_ge();
    other.train_one(dir.path(), 1, true, &quick_train()).unwrap();
    assert_eq!(other.static_ge(1).unwrap().node_count(), 8);
}

#[test]
fn test_resume_training() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = dyn_ge();
    ge.train_one(dir.path(), 0, true, &quick_train()).unwrap();
    let before = ge.static_ge(0).unwrap().model().clone();

    ge.train_one(dir.path(), 0, false, &quick_train()).unwrap();
    let resumed = ge.static_ge(0).unwrap();
    assert_eq!(resumed.loss_history().len(), 2 * quick_train().epochs);
    assert_ne!(resumed.model(), &before);

    // 新的编排器从磁盘加载后续训
    let mut other = dyn_ge();
    other.train_one(dir.path(), 0, false, &quick_train()).unwrap();
    assert_eq!(other.static_ge(0).unwrap().loss_history().len(), quick_train().epochs);
}

#[test]
fn test_load_all() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = dyn_ge();
    ge.train_one(dir.path(), 0, true, &quick_train()).unwrap();
    ge.train_one(dir.path(), 1, true, &quick_train()).unwrap();

    let mut restored = dyn_ge();
    assert!(matches!(
        restored.load_all(dir.path()),
        Err(DynGeError::MissingModel { expected: 3, found: 2 })
    ));

    ge.train_one(dir.path(), 2, true, &quick_train()).unwrap();
    restored.load_all(dir.path()).unwrap();
    for i in 0..3 {
        assert_eq!(restored.static_ge(i).unwrap().state(), TrainingState::Loaded);
        assert_abs_diff_eq!(
            restored.get_embedding(i).unwrap(),
            ge.get_embedding(i).unwrap(),
            epsilon = 1e-6
        );
    }
}

#[test]
fn test_embedding_files() {
    let models = tempfile::tempdir().unwrap();
    let embeddings = tempfile::tempdir().unwrap();
    let mut ge = dyn_ge();
    assert!(matches!(
        ge.save_embeddings(embeddings.path()),
        Err(DynGeError::State(_))
    ));

    ge.train_all(models.path(), &quick_train()).unwrap();
    ge.save_embeddings(embeddings.path()).unwrap();
    assert_eq!(count_embeddings(embeddings.path()).unwrap(), 3);

    // 只有嵌入文件、没有模型时也能查询
    let mut restored = dyn_ge();
    let loaded = restored.load_embeddings(embeddings.path()).unwrap();
    assert_eq!(loaded.len(), 3);
    for i in 0..3 {
        assert_eq!(&loaded[i], ge.get_embedding(i).unwrap());
        assert_eq!(restored.get_embedding(i).unwrap(), ge.get_embedding(i).unwrap());
        assert!(restored.static_ge(i).is_none());
    }

    // 快照数不一致
    let mut two = DynGraphEmbedding::new(&snapshots()[..2], quick_config()).unwrap();
    assert!(matches!(
        two.load_embeddings(embeddings.path()),
        Err(DynGeError::MissingModel { expected: 2, found: 3 })
    ));
}

#[test]
fn test_train_with_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let mut ge = dyn_ge();
    let config = TrainConfig {
        epochs: 3,
        learning_rates: vec![0.05, 0.01],
        ..quick_train()
    };
    let reports = ge.train_all_with_schedule(dir.path(), &config).unwrap();
    assert_eq!(reports.len(), 3);
    for per_rate in &reports {
        assert_eq!(per_rate.len(), 2);
        assert_eq!(per_rate[0].learning_rate, 0.05);
        assert_eq!(per_rate[1].learning_rate, 0.01);
    }
    // 第二个学习率在第一个的基础上续训
    assert_eq!(ge.static_ge(1).unwrap().loss_history().len(), 6);
    assert_eq!(ge.get_embedding(2).unwrap().shape(), &[13, 2]);
}
