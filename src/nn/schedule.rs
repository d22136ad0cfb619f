use crate::errors::{ComparisonOperator, DynGeError};

/// 计算自编码器编码端的宽度表
///
/// 从`input_dim`出发，每层宽度为上一层的`floor(prev * prop_size)`，
/// 只要严格大于`embedding_dim`就保留，最后追加`embedding_dim`。
/// 例如`(0.5, 100, 10)`得到`[50, 25, 12, 10]`；
/// 输入本身已很窄时（如`(0.5, 5, 2)`）只剩`[2]`。
pub fn hidden_layer_schedule(
    prop_size: f32,
    input_dim: usize,
    embedding_dim: usize,
) -> Result<Vec<usize>, DynGeError> {
    if !(prop_size > 0.0 && prop_size < 1.0) {
        return Err(DynGeError::Configuration(format!(
            "prop_size须在(0, 1)之间，而非{prop_size}"
        )));
    }
    if embedding_dim == 0 {
        return Err(DynGeError::must_satisfy(
            "embedding_dim",
            ComparisonOperator::GreaterThan,
            0,
        ));
    }

    let mut widths = Vec::new();
    let mut prev = input_dim;
    loop {
        let next = (prev as f32 * prop_size).floor() as usize;
        if next <= embedding_dim {
            break;
        }
        widths.push(next);
        prev = next;
    }
    widths.push(embedding_dim);
    Ok(widths)
}
