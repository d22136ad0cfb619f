use crate::errors::DynGeError;
use crate::nn::hidden_layer_schedule;

#[test]
fn test_schedule_example() {
    assert_eq!(hidden_layer_schedule(0.5, 100, 10).unwrap(), vec![50, 25, 12, 10]);
}

#[test]
fn test_schedule_narrow_input() {
    assert_eq!(hidden_layer_schedule(0.5, 5, 2).unwrap(), vec![2]);
    // 输入维度比嵌入维度还小时，仍然只剩嵌入层
    assert_eq!(hidden_layer_schedule(0.4, 3, 8).unwrap(), vec![8]);
}

// 任意合法的prop_size下，宽度表都严格递减并以embedding_dim结尾
#[test]
fn test_schedule_monotonic() {
    for &prop in &[0.1_f32, 0.25, 0.4, 0.5, 0.75, 0.9, 0.99] {
        for &input_dim in &[5_usize, 13, 100, 1000] {
            for &embedding_dim in &[1_usize, 2, 10] {
                let widths = hidden_layer_schedule(prop, input_dim, embedding_dim).unwrap();
                assert_eq!(*widths.last().unwrap(), embedding_dim);
                assert!(widths.windows(2).all(|w| w[0] > w[1]), "{widths:?}");
                assert!(widths[..widths.len() - 1].iter().all(|&w| w > embedding_dim));
            }
        }
    }
}

#[test]
fn test_schedule_rejects_bad_input() {
    for prop in [0.0, 1.0, -0.5, 1.5, f32::NAN] {
        assert!(matches!(
            hidden_layer_schedule(prop, 100, 10),
            Err(DynGeError::Configuration(_))
        ));
    }
    assert!(matches!(
        hidden_layer_schedule(0.5, 100, 0),
        Err(DynGeError::ValueMustSatisfyComparison { .. })
    ));
}
