/*
 * @Description  : 按快照序号组织的磁盘布局
 *
 * - 模型：`{folder}/graph_{i}.json` + `{folder}/graph_{i}.bin`
 * - 嵌入：`{folder}/embedding_{i}.npy`
 */

use std::path::{Path, PathBuf};

use crate::errors::DynGeError;

/// 第`index`个快照的模型路径（不含扩展名）
pub fn model_path<P: AsRef<Path>>(folder: P, index: usize) -> PathBuf {
    folder.as_ref().join(format!("graph_{index}"))
}

pub fn embedding_path<P: AsRef<Path>>(folder: P, index: usize) -> PathBuf {
    folder.as_ref().join(format!("embedding_{index}.npy"))
}

/// 目录必须已存在，否则返回`InvalidPath`
pub fn ensure_folder<P: AsRef<Path>>(folder: P) -> Result<(), DynGeError> {
    let folder = folder.as_ref();
    if folder.is_dir() {
        Ok(())
    } else {
        Err(DynGeError::InvalidPath(folder.to_path_buf()))
    }
}

/// 统计目录中形如`{prefix}{数字}{suffix}`的文件，返回其中的数字（升序）
pub(crate) fn indexed_files<P: AsRef<Path>>(
    folder: P,
    prefix: &str,
    suffix: &str,
) -> Result<Vec<usize>, DynGeError> {
    let mut indices = Vec::new();
    for entry in std::fs::read_dir(folder.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let index = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(suffix))
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok());
        if let Some(index) = index {
            indices.push(index);
        }
    }
    indices.sort_unstable();
    Ok(indices)
}

/// 已保存的模型个数（按`graph_{i}.json`描述文件计数）
pub fn count_models<P: AsRef<Path>>(folder: P) -> Result<usize, DynGeError> {
    Ok(indexed_files(folder, "graph_", ".json")?.len())
}

/// 已保存的嵌入个数
pub fn count_embeddings<P: AsRef<Path>>(folder: P) -> Result<usize, DynGeError> {
    Ok(indexed_files(folder, "embedding_", ".npy")?.len())
}
