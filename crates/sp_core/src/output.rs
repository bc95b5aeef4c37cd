// crates/sp_core/src/output.rs

//! 写出记录构建
//!
//! 将引擎结果（或不可用判定）整理为最终写出的字段集合。
//! 存储层只负责提交，不再做任何数值替换。

use crate::priors::{PriorField, PriorRecord, SCALAR_FIELDS};
use crate::reconcile::IndexReconciler;
use sp_foundation::fill::or_sentinel;
use sp_foundation::{SpError, SpResult};

/// 待写出的河段记录
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedOutput {
    /// 河段是否可用
    pub valid: bool,
    /// 写入 `_FillValue` 属性的哨兵值
    pub sentinel: f64,
    /// 40 个标量（目录顺序）
    pub scalars: Vec<(&'static PriorField, f64)>,
    /// 原始节点空间的河流类型
    pub river_type: Vec<f64>,
    /// 是否用哨兵值覆盖流量估计 (`Qhat` / `Qsd`)
    pub mask_flow: bool,
}

impl PersistedOutput {
    /// 全局 `valid` 属性值
    pub fn valid_flag(&self) -> i32 {
        i32::from(self.valid)
    }

    /// 按名称查找标量
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.scalars
            .iter()
            .find(|(field, _)| field.name == name)
            .map(|&(_, value)| value)
    }
}

/// 写出记录构建器
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputWriter {
    reconciler: IndexReconciler,
}

impl OutputWriter {
    /// 使用指定哨兵值创建
    pub fn new(sentinel: f64) -> Self {
        Self {
            reconciler: IndexReconciler::new(sentinel),
        }
    }

    /// 哨兵值
    pub fn sentinel(&self) -> f64 {
        self.reconciler.sentinel()
    }

    /// 可用河段：还原河流类型，NaN 替换为哨兵值
    pub fn computed(
        &self,
        record: &PriorRecord,
        invalid_nodes: &[usize],
        original_nodes: usize,
    ) -> SpResult<PersistedOutput> {
        let sentinel = self.sentinel();

        let river_type: Vec<f64> = self
            .reconciler
            .reconcile(record.river_type(), invalid_nodes)?
            .into_iter()
            .map(|v| or_sentinel(v, sentinel))
            .collect();
        SpError::check_size("river_type", original_nodes, river_type.len())?;

        let scalars = record
            .scalars()
            .map(|(field, v)| (field, or_sentinel(self.reconciler.normalize(v), sentinel)))
            .collect();

        Ok(PersistedOutput {
            valid: true,
            sentinel,
            scalars,
            river_type,
            mask_flow: false,
        })
    }

    /// 不可用河段：所有字段取哨兵值，并覆盖流量估计
    pub fn abandoned(&self, original_nodes: usize) -> PersistedOutput {
        let sentinel = self.sentinel();
        PersistedOutput {
            valid: false,
            sentinel,
            scalars: SCALAR_FIELDS.iter().map(|f| (f, sentinel)).collect(),
            river_type: vec![sentinel; original_nodes],
            mask_flow: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_foundation::{engine_missing, FILL_VALUE};

    #[test]
    fn test_abandoned_is_all_sentinel() {
        let output = OutputWriter::default().abandoned(4);
        assert!(!output.valid);
        assert_eq!(output.valid_flag(), 0);
        assert!(output.mask_flow);
        assert_eq!(output.scalars.len(), 40);
        assert!(output.scalars.iter().all(|&(_, v)| v == FILL_VALUE));
        assert_eq!(output.river_type, vec![FILL_VALUE; 4]);
    }

    #[test]
    fn test_computed_replaces_missing_values() {
        let mut record = PriorRecord::uniform(0.25, vec![1.0, engine_missing(), 3.0]);
        record.set("logA0_hat", f64::NAN);
        record.set("b_sd", engine_missing());

        let output = OutputWriter::default().computed(&record, &[1], 4).unwrap();
        assert!(output.valid);
        assert_eq!(output.valid_flag(), 1);
        assert!(!output.mask_flow);
        assert_eq!(output.river_type, vec![1.0, FILL_VALUE, FILL_VALUE, 3.0]);
        assert_eq!(output.scalar("logA0_hat"), Some(FILL_VALUE));
        assert_eq!(output.scalar("b_sd"), Some(FILL_VALUE));
        assert_eq!(output.scalar("logn_hat"), Some(0.25));
        assert!(output.scalars.iter().all(|&(_, v)| !v.is_nan()));
    }

    #[test]
    fn test_computed_checks_node_count() {
        let record = PriorRecord::uniform(1.0, vec![1.0, 2.0]);
        let writer = OutputWriter::new(-1.0);
        assert!(writer.computed(&record, &[0], 4).is_err());

        let output = writer.computed(&record, &[0], 3).unwrap();
        assert_eq!(output.sentinel, -1.0);
        assert_eq!(output.river_type, vec![-1.0, 1.0, 2.0]);
    }
}
