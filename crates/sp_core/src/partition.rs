// crates/sp_core/src/partition.rs

//! 河段分配
//!
//! 将全部河段 ID 均衡、确定地分配给固定数量的工作者：
//! 先去重并按字典序排序，每个工作者连续分得 `n / k` 个，
//! 余数从 0 号工作者开始轮流补一个。

use serde::{Deserialize, Serialize};
use sp_foundation::{ensure, SpError, SpResult};
use std::collections::BTreeSet;

/// 工作者 → 河段 ID 列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachAssignment {
    workers: Vec<Vec<String>>,
}

impl ReachAssignment {
    /// 工作者数量
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// 指定工作者的河段（越界返回空）
    pub fn for_worker(&self, rank: usize) -> &[String] {
        self.workers.get(rank).map_or(&[], Vec::as_slice)
    }

    /// 河段总数
    pub fn total(&self) -> usize {
        self.workers.iter().map(Vec::len).sum()
    }

    /// 遍历 (工作者, 河段列表)
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.workers.iter().enumerate().map(|(i, r)| (i, r.as_slice()))
    }
}

/// 分配河段
pub fn partition<I, S>(reach_ids: I, worker_count: usize) -> SpResult<ReachAssignment>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ensure!(worker_count > 0, SpError::invalid_input("worker count must be positive"));

    let ordered: Vec<String> = reach_ids
        .into_iter()
        .map(Into::into)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    ensure!(!ordered.is_empty(), SpError::invalid_input("no reach ids to partition"));

    let total = ordered.len();
    let base = total / worker_count;

    let mut workers: Vec<Vec<String>> = ordered
        .chunks(base.max(1))
        .take(if base == 0 { 0 } else { worker_count })
        .map(<[String]>::to_vec)
        .collect();
    workers.resize_with(worker_count, Vec::new);

    // 余数轮流分配
    for (i, reach) in ordered[base * worker_count..].iter().enumerate() {
        workers[i % worker_count].push(reach.clone());
    }

    Ok(ReachAssignment { workers })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{:03}_1", i)).collect()
    }

    fn check_partition(assignment: &ReachAssignment, input: &[String]) {
        let mut seen: Vec<String> = assignment.iter().flat_map(|(_, r)| r.to_vec()).collect();
        seen.sort();
        let mut expected: Vec<String> = input.to_vec();
        expected.sort();
        expected.dedup();
        assert_eq!(seen, expected);

        let sizes: Vec<usize> = assignment.iter().map(|(_, r)| r.len()).collect();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        assert!(max - min <= 1, "unbalanced: {:?}", sizes);
    }

    #[test]
    fn test_even_split() {
        let input = ids(9);
        let assignment = partition(input.clone(), 3).unwrap();
        assert_eq!(assignment.worker_count(), 3);
        assert_eq!(assignment.for_worker(0), &input[0..3]);
        assert_eq!(assignment.for_worker(2), &input[6..9]);
        check_partition(&assignment, &input);
    }

    #[test]
    fn test_remainder_cycles_from_worker_zero() {
        let input = ids(11);
        let assignment = partition(input.clone(), 4).unwrap();
        // base = 2, 余数 3 → 工作者 0、1、2 各多一个
        assert_eq!(assignment.for_worker(0), &["000_1", "001_1", "008_1"]);
        assert_eq!(assignment.for_worker(1), &["002_1", "003_1", "009_1"]);
        assert_eq!(assignment.for_worker(2), &["004_1", "005_1", "010_1"]);
        assert_eq!(assignment.for_worker(3), &["006_1", "007_1"]);
        assert_eq!(assignment.total(), 11);
        check_partition(&assignment, &input);
    }

    #[test]
    fn test_more_workers_than_reaches() {
        let input = ids(3);
        let assignment = partition(input.clone(), 5).unwrap();
        assert_eq!(assignment.worker_count(), 5);
        assert_eq!(assignment.for_worker(0), &["000_1"]);
        assert_eq!(assignment.for_worker(2), &["002_1"]);
        assert!(assignment.for_worker(4).is_empty());
        check_partition(&assignment, &input);
    }

    #[test]
    fn test_deduplicates_and_orders() {
        let input = vec!["b_1", "a_1", "b_1", "c_1"];
        let assignment = partition(input, 2).unwrap();
        assert_eq!(assignment.for_worker(0), &["a_1", "c_1"]);
        assert_eq!(assignment.for_worker(1), &["b_1"]);
    }

    #[test]
    fn test_deterministic_regardless_of_input_order() {
        let mut input = ids(17);
        let a = partition(input.clone(), 4).unwrap();
        input.reverse();
        let b = partition(input, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_balance_over_many_shapes() {
        for n in 1..40 {
            for k in 1..9 {
                let input = ids(n);
                let assignment = partition(input.clone(), k).unwrap();
                assert_eq!(assignment.total(), n);
                check_partition(&assignment, &input);
            }
        }
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(partition(ids(3), 0).is_err());
        assert!(partition(Vec::<String>::new(), 2).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let assignment = partition(ids(5), 2).unwrap();
        let json = serde_json::to_string(&assignment).unwrap();
        let parsed: ReachAssignment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, assignment);
    }
}
