// crates/sp_io/src/discovery.rs

//! 河段发现
//!
//! 河段 ID 取自数据目录中文件名的前 `id_fields` 个 `_` 分隔字段，
//! 例如 `74230900181_1_SWOT.nc` → `74230900181_1`。

use crate::error::{IoError, IoResult};
use sp_config::FileLayout;
use std::collections::BTreeSet;
use std::path::Path;

/// 从文件名提取河段 ID
///
/// 文件名必须在 ID 之后还有至少一个字段（后缀），且 ID 字段非空。
pub fn reach_id_from_file_name(name: &str, id_fields: usize) -> Option<String> {
    if id_fields == 0 || name.starts_with('.') {
        return None;
    }

    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() <= id_fields {
        return None;
    }

    let id = &parts[..id_fields];
    if id.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(id.join("_"))
}

/// 扫描目录，返回去重排序的河段 ID
pub fn scan_reach_ids(dir: &Path, layout: &FileLayout) -> IoResult<BTreeSet<String>> {
    let scan_error = |source: std::io::Error| IoError::ScanFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut ids = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(scan_error)? {
        let entry = entry.map_err(scan_error)?;
        if !entry.file_type().map_err(scan_error)?.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        match file_name
            .to_str()
            .and_then(|name| reach_id_from_file_name(name, layout.id_fields))
        {
            Some(id) => {
                ids.insert(id);
            }
            None => log::warn!("skipping {:?}: not a reach file", file_name),
        }
    }

    log::debug!("found {} reaches in {}", ids.len(), dir.display());
    Ok(ids)
}
