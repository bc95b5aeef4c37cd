// crates/sp_core/src/reconcile.rs

//! 索引空间还原
//!
//! 外部引擎在裁剪后的节点空间上工作，返回的逐节点序列比原始节点数短。
//! 写出前需要把被删除的位置补回哨兵值，使序列回到原始索引空间；
//! 同时把引擎自身的缺测标记统一替换为哨兵值。

use sp_foundation::{is_engine_missing, SpError, SpResult, FILL_VALUE};

/// 索引还原器
#[derive(Debug, Clone, Copy)]
pub struct IndexReconciler {
    sentinel: f64,
}

impl Default for IndexReconciler {
    fn default() -> Self {
        Self::new(FILL_VALUE)
    }
}

impl IndexReconciler {
    /// 使用指定哨兵值创建
    pub fn new(sentinel: f64) -> Self {
        Self { sentinel }
    }

    /// 哨兵值
    pub fn sentinel(&self) -> f64 {
        self.sentinel
    }

    /// 还原到原始索引空间
    ///
    /// `dropped` 是原始索引空间中被删除的位置，顺序和重复不影响结果。
    /// 返回序列长度为 `trimmed.len() + dropped.len()`（去重后）。
    pub fn reconcile(&self, trimmed: &[f64], dropped: &[usize]) -> SpResult<Vec<f64>> {
        let mut dropped = dropped.to_vec();
        dropped.sort_unstable();
        dropped.dedup();

        let original_len = trimmed.len() + dropped.len();
        if let Some(&last) = dropped.last() {
            SpError::check_index("dropped", last, original_len)?;
        }

        let mut out: Vec<f64> = trimmed.iter().map(|&v| self.normalize(v)).collect();
        out.reserve(dropped.len());
        // 升序插入：每个索引都在已还原前缀的范围内
        for index in dropped {
            out.insert(index, self.sentinel);
        }

        debug_assert_eq!(out.len(), original_len);
        Ok(out)
    }

    /// 引擎缺测标记替换为哨兵值
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        if is_engine_missing(value) {
            self.sentinel
        } else {
            value
        }
    }
}

/// 使用默认哨兵值还原
pub fn reconcile(trimmed: &[f64], dropped: &[usize]) -> SpResult<Vec<f64>> {
    IndexReconciler::default().reconcile(trimmed, dropped)
}
