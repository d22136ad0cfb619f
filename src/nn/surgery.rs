/*
 * @Author       : 老董
 * @Description  : 模型手术：把上一快照训练好的自编码器扩展到新的（更大的）节点数
 *
 * 两种方式：
 * - 普通扩展：只在输入层追加新的输入行、在输出层追加新的输出列，其余权重原样保留；
 * - net2net：在普通扩展之外，按新节点数重新计算宽度表，把比新宽度窄的隐藏层加宽。
 *   新单元复制随机选取的已有单元，其出边权重在同组副本间按带噪比例拆分（比例之和为1），
 *   因此扩展后网络对原输入的函数保持不变。
 *
 * 两种方式都保持：对补零到新维度的旧输入，扩展前后的嵌入与前`old_input_dim`维重构完全一致。
 */

use rand::Rng;
use tracing::debug;

use super::{Autoencoder, hidden_layer_schedule};
use crate::errors::{ComparisonOperator, DynGeError};
use crate::tensor::Tensor;

/// 扩展选项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpandOptions {
    /// 是否按新节点数加宽隐藏层
    pub net2net_applied: bool,
    /// 重新计算宽度表所用的收缩比例
    pub prop_size: f32,
    /// 拆分比例的噪声标准差；为0时同组副本均分
    pub noise_std: f32,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            net2net_applied: false,
            prop_size: 0.4,
            noise_std: 0.01,
        }
    }
}

/// 把`model`扩展到`new_input_dim`个输入，返回新模型（原模型不变）
///
/// `new_input_dim`必须严格大于当前输入维度，相等也视为错误。
pub fn expand_model<R: Rng + ?Sized>(
    model: &Autoencoder,
    new_input_dim: usize,
    options: &ExpandOptions,
    rng: &mut R,
) -> Result<Autoencoder, DynGeError> {
    let old_input_dim = model.input_dim();
    if new_input_dim <= old_input_dim {
        return Err(DynGeError::Value(format!(
            "扩展后的输入维度({new_input_dim})须大于当前输入维度({old_input_dim})"
        )));
    }

    let mut expanded = model.clone();
    let extra = new_input_dim - old_input_dim;
    let last = expanded.decoder.len() - 1;
    expanded.encoder[0].grow_inputs(extra, rng);
    expanded.decoder[last].grow_outputs(extra, rng);
    expanded.config.input_dim = new_input_dim;

    if options.net2net_applied {
        let schedule = hidden_layer_schedule(options.prop_size, new_input_dim, model.embedding_dim())?;
        // 嵌入层宽度固定，只考虑其前面的隐藏层
        let inner_layers = expanded.hidden_dims().len() - 1;
        for k in 0..inner_layers {
            let current = expanded.hidden_dims()[k];
            let target = match schedule.get(k) {
                Some(&w) if k + 1 < schedule.len() => w.max(current),
                _ => current,
            };
            if target > current {
                net2wider(&mut expanded, k, target, options.noise_std, rng)?;
            }
        }
    }

    expanded.config.validate()?;
    debug!(
        "模型扩展：输入维度 {old_input_dim} -> {new_input_dim}，隐藏层 {:?} -> {:?}",
        model.hidden_dims(),
        expanded.hidden_dims()
    );
    Ok(expanded)
}

/// net2net 加宽：把第`layer`个隐藏层（不含嵌入层）加宽到`new_width`
///
/// 编码端：`encoder[layer]`产生该层，`encoder[layer+1]`消费它；
/// 解码端（共`L`层）：`decoder[L-layer-2]`产生镜像层，`decoder[L-layer-1]`消费它。
pub fn net2wider<R: Rng + ?Sized>(
    model: &mut Autoencoder,
    layer: usize,
    new_width: usize,
    noise_std: f32,
    rng: &mut R,
) -> Result<(), DynGeError> {
    let depth = model.hidden_dims().len();
    if layer + 1 >= depth {
        return Err(DynGeError::Index {
            index: layer,
            len: depth.saturating_sub(1),
        });
    }
    let old_width = model.hidden_dims()[layer];
    if new_width <= old_width {
        return Err(DynGeError::must_satisfy(
            "new_width",
            ComparisonOperator::GreaterThan,
            old_width,
        ));
    }

    // 编码端与解码端各自独立抽取源单元与拆分比例
    let (mapping, scales) = replication_plan(old_width, new_width, noise_std, rng);
    model.encoder[layer].replicate_outputs(&mapping);
    model.encoder[layer + 1].replicate_inputs(&mapping, &scales);

    let (mapping, scales) = replication_plan(old_width, new_width, noise_std, rng);
    model.decoder[depth - layer - 2].replicate_outputs(&mapping);
    model.decoder[depth - layer - 1].replicate_inputs(&mapping, &scales);

    model.config.hidden_dims[layer] = new_width;
    Ok(())
}

/// 生成复制映射与拆分比例
///
/// `mapping[j]`是新单元`j`的源单元（前`old_width`个为恒等映射）；
/// 同一源单元的所有副本的`scales`之和为1。
pub(super) fn replication_plan<R: Rng + ?Sized>(
    old_width: usize,
    new_width: usize,
    noise_std: f32,
    rng: &mut R,
) -> (Vec<usize>, Vec<f32>) {
    let mut mapping: Vec<usize> = (0..old_width).collect();
    mapping.extend((old_width..new_width).map(|_| rng.gen_range(0..old_width)));

    let noise = Tensor::normal_with_rng(0.0, noise_std.max(0.0), &[1, new_width], rng);
    let raw: Vec<f32> = noise
        .to_vec()
        .into_iter()
        .map(|e| (1.0 + e).max(0.1))
        .collect();

    let mut group_sums = vec![0.0_f32; old_width];
    for (&src, &r) in mapping.iter().zip(&raw) {
        group_sums[src] += r;
    }
    let scales = mapping
        .iter()
        .zip(&raw)
        .map(|(&src, &r)| r / group_sums[src])
        .collect();
    (mapping, scales)
}
