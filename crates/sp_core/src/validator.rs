// crates/sp_core/src/validator.rs

//! 观测有效性验证
//!
//! 判断一个河段的观测是否可用于先验估计；部分可用时给出需要删除的
//! 节点 (行) 与时间步 (列)。
//!
//! # 规则
//!
//! 1. 流量、坡度、宽度中的负值视为缺测（面积变化可以为负，不处理）
//! 2. 首个流量值缺测 → 整个河段不可用
//! 3. 每个矩阵至少 `min_valid` 个时间步拥有 `>= min_valid` 个有效节点，
//!    且至少 `min_valid` 个节点拥有 `>= min_valid` 个有效时间步
//! 4. 三个矩阵全部通过时，任一矩阵中不足的行 / 列在三个矩阵中一并删除
//!
//! 数据不可用是预期结果，通过 [`ValidityReport`] 表达，不会返回错误。

use crate::observation::{FlowEstimate, ObservationKind, ObservationMatrix, ReachObservations};

/// 验证器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// 有效观测数阈值
    pub min_valid: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { min_valid: 5 }
    }
}

/// 不可用原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusableReason {
    /// 首个流量值缺测或为负
    MissingFlow,
    /// 某个观测矩阵有效值不足
    Insufficient(ObservationKind),
}

impl std::fmt::Display for UnusableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFlow => write!(f, "missing flow estimate"),
            Self::Insufficient(kind) => write!(f, "insufficient {} observations", kind),
        }
    }
}

/// 验证报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidityReport {
    /// 可用，附带需删除的行 / 列（已排序、去重）
    Usable {
        /// 需删除的节点
        invalid_nodes: Vec<usize>,
        /// 需删除的时间步
        invalid_times: Vec<usize>,
    },
    /// 不可用，整个河段放弃
    Unusable(UnusableReason),
}

impl ValidityReport {
    /// 是否可用
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Usable { .. })
    }

    /// 需删除的节点
    pub fn invalid_nodes(&self) -> Option<&[usize]> {
        match self {
            Self::Usable { invalid_nodes, .. } => Some(invalid_nodes),
            Self::Unusable(_) => None,
        }
    }

    /// 需删除的时间步
    pub fn invalid_times(&self) -> Option<&[usize]> {
        match self {
            Self::Usable { invalid_times, .. } => Some(invalid_times),
            Self::Unusable(_) => None,
        }
    }
}

/// 单个矩阵的充分性检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sufficiency {
    /// 是否充分
    pub valid: bool,
    /// 有效时间步不足的节点
    pub invalid_nodes: Vec<usize>,
    /// 有效节点不足的时间步
    pub invalid_times: Vec<usize>,
}

/// 检查单个矩阵是否有足够的有效观测
pub fn sufficiency(matrix: &ObservationMatrix, min_valid: usize) -> Sufficiency {
    let per_time = matrix.valid_per_time();
    let per_node = matrix.valid_per_node();

    let good_times = per_time.iter().filter(|&&c| c >= min_valid).count();
    let good_nodes = per_node.iter().filter(|&&c| c >= min_valid).count();

    Sufficiency {
        valid: good_times >= min_valid && good_nodes >= min_valid,
        invalid_nodes: indices_below(&per_node, min_valid),
        invalid_times: indices_below(&per_time, min_valid),
    }
}

fn indices_below(counts: &[usize], min_valid: usize) -> Vec<usize> {
    counts
        .iter()
        .enumerate()
        .filter(|(_, &c)| c < min_valid)
        .map(|(i, _)| i)
        .collect()
}

/// 删除无效行 / 列后的观测，可直接交给外部引擎
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    /// 宽度
    pub width: ObservationMatrix,
    /// 过水断面面积变化
    pub d_x_area: ObservationMatrix,
    /// 坡度
    pub slope: ObservationMatrix,
    /// 流量估计
    pub flow: FlowEstimate,
    /// 已删除的节点（原始索引空间）
    pub invalid_nodes: Vec<usize>,
    /// 已删除的时间步（原始索引空间）
    pub invalid_times: Vec<usize>,
    /// 原始节点数
    pub original_nodes: usize,
    /// 原始时间步数
    pub original_times: usize,
}

impl ValidatedInput {
    /// 保留的节点数
    pub fn retained_nodes(&self) -> usize {
        self.width.n_nodes()
    }

    /// 保留的时间步数
    pub fn retained_times(&self) -> usize {
        self.width.n_times()
    }
}

/// 筛选结果
#[derive(Debug, Clone, PartialEq)]
pub enum Screening {
    /// 可用
    Usable(ValidatedInput),
    /// 不可用
    Unusable {
        /// 原因
        reason: UnusableReason,
        /// 原始节点数（用于写出全哨兵记录）
        original_nodes: usize,
    },
}

/// 观测验证器
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationValidator {
    config: ValidatorConfig,
}

impl ObservationValidator {
    /// 创建验证器
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// 配置
    pub fn config(&self) -> ValidatorConfig {
        self.config
    }

    /// 验证观测
    pub fn validate(&self, observations: &ReachObservations) -> ValidityReport {
        let sanitized = sanitize(observations.clone());
        self.validate_sanitized(&sanitized)
    }

    /// 清洗、验证并裁剪
    pub fn screen(&self, observations: ReachObservations) -> Screening {
        let original_nodes = observations.n_nodes();
        let original_times = observations.n_times();
        let sanitized = sanitize(observations);

        let (invalid_nodes, invalid_times) = match self.validate_sanitized(&sanitized) {
            ValidityReport::Usable {
                invalid_nodes,
                invalid_times,
            } => (invalid_nodes, invalid_times),
            ValidityReport::Unusable(reason) => {
                return Screening::Unusable {
                    reason,
                    original_nodes,
                }
            }
        };

        let (width, d_x_area, slope, flow) = sanitized.into_parts();
        Screening::Usable(ValidatedInput {
            width: width.without(&invalid_nodes, &invalid_times),
            d_x_area: d_x_area.without(&invalid_nodes, &invalid_times),
            slope: slope.without(&invalid_nodes, &invalid_times),
            flow: flow.without(&invalid_times),
            invalid_nodes,
            invalid_times,
            original_nodes,
            original_times,
        })
    }

    fn validate_sanitized(&self, observations: &ReachObservations) -> ValidityReport {
        if observations.flow().first().is_none() {
            return ValidityReport::Unusable(UnusableReason::MissingFlow);
        }

        let checks = [
            (ObservationKind::Slope, observations.slope()),
            (ObservationKind::Width, observations.width()),
            (ObservationKind::DxArea, observations.d_x_area()),
        ];

        let mut invalid_nodes = Vec::new();
        let mut invalid_times = Vec::new();
        for (kind, matrix) in checks {
            let result = sufficiency(matrix, self.config.min_valid);
            if !result.valid {
                return ValidityReport::Unusable(UnusableReason::Insufficient(kind));
            }
            invalid_nodes.extend(result.invalid_nodes);
            invalid_times.extend(result.invalid_times);
        }

        invalid_nodes.sort_unstable();
        invalid_nodes.dedup();
        invalid_times.sort_unstable();
        invalid_times.dedup();

        ValidityReport::Usable {
            invalid_nodes,
            invalid_times,
        }
    }
}

fn sanitize(mut observations: ReachObservations) -> ReachObservations {
    observations.mask_negative();
    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arange(n_nodes: usize, n_times: usize, start: f64) -> ObservationMatrix {
        let values: Vec<f64> = (0..n_nodes * n_times).map(|i| start + i as f64).collect();
        ObservationMatrix::from_values(n_nodes, n_times, &values).unwrap()
    }

    fn flow(n_times: usize, value: f64) -> FlowEstimate {
        FlowEstimate::new(vec![Some(value); n_times])
    }

    fn reach(
        width: ObservationMatrix,
        d_x_area: ObservationMatrix,
        slope: ObservationMatrix,
        flow: FlowEstimate,
    ) -> ReachObservations {
        ReachObservations::new(width, d_x_area, slope, flow).unwrap()
    }

    /// 8×10 矩阵，值 < 50 的位置缺测（前 5 个节点全部缺测）
    fn nan_below_fifty() -> ObservationMatrix {
        let mut m = arange(8, 10, 0.0);
        for n in 0..8 {
            for t in 0..10 {
                if m.get(n, t).is_some_and(|v| v < 50.0) {
                    m.set(n, t, None).unwrap();
                }
            }
        }
        m
    }

    /// 8×10 矩阵，前 6 个时间步缺测
    fn nan_first_six_times() -> ObservationMatrix {
        let mut m = arange(8, 10, 0.0);
        for n in 0..8 {
            for t in 0..6 {
                m.set(n, t, None).unwrap();
            }
        }
        m
    }

    #[test]
    fn test_valid_observations() {
        let validator = ObservationValidator::default();
        let obs = reach(arange(5, 10, 0.0), arange(5, 10, 0.0), arange(5, 10, 0.0), flow(10, 2.3));

        let report = validator.validate(&obs);
        assert_eq!(
            report,
            ValidityReport::Usable {
                invalid_nodes: vec![],
                invalid_times: vec![]
            }
        );

        match validator.screen(obs.clone()) {
            Screening::Usable(input) => {
                assert_eq!(&input.width, obs.width());
                assert_eq!(&input.d_x_area, obs.d_x_area());
                assert_eq!(&input.slope, obs.slope());
                assert_eq!(&input.flow, obs.flow());
            }
            other => panic!("expected usable, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_values_invalidate() {
        let validator = ObservationValidator::default();
        let valid = arange(5, 10, 0.0);
        let negative = arange(5, 10, -51.0);

        let obs = reach(valid.clone(), valid.clone(), negative.clone(), flow(10, 2.3));
        assert_eq!(
            validator.validate(&obs),
            ValidityReport::Unusable(UnusableReason::Insufficient(ObservationKind::Slope))
        );

        let obs = reach(negative.clone(), valid.clone(), valid.clone(), flow(10, 2.3));
        assert_eq!(
            validator.validate(&obs),
            ValidityReport::Unusable(UnusableReason::Insufficient(ObservationKind::Width))
        );

        let obs = reach(valid.clone(), valid.clone(), valid.clone(), flow(10, -1.0));
        assert_eq!(
            validator.validate(&obs),
            ValidityReport::Unusable(UnusableReason::MissingFlow)
        );
    }

    #[test]
    fn test_negative_d_x_area_is_valid() {
        let validator = ObservationValidator::default();
        let valid = arange(5, 10, 0.0);
        let obs = reach(valid.clone(), arange(5, 10, -51.0), valid, flow(10, 2.3));
        assert!(validator.validate(&obs).is_usable());
    }

    #[test]
    fn test_negative_equivalent_to_missing() {
        let validator = ObservationValidator::default();
        let mut negative = arange(8, 10, 1.0);
        let mut missing = arange(8, 10, 1.0);
        for (n, t) in [(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (3, 7)] {
            negative.set(n, t, Some(-2.0)).unwrap();
            missing.set(n, t, None).unwrap();
        }
        let other = arange(8, 10, 1.0);

        let a = reach(negative.clone(), other.clone(), negative, flow(10, 1.0));
        let b = reach(missing.clone(), other, missing, flow(10, 1.0));
        assert_eq!(validator.validate(&a), validator.validate(&b));
        assert_eq!(validator.validate(&a).invalid_nodes(), Some(&[0usize][..]));
    }

    #[test]
    fn test_missing_values_invalidate() {
        let validator = ObservationValidator::default();
        let valid = arange(8, 10, 0.0);

        // 坡度：只有 4 个时间步
        let obs = reach(valid.clone(), valid.clone(), nan_first_six_times(), flow(10, 2.3));
        assert!(!validator.validate(&obs).is_usable());

        // 宽度：只有 3 个节点
        let obs = reach(nan_below_fifty(), valid.clone(), valid.clone(), flow(10, 2.3));
        assert!(!validator.validate(&obs).is_usable());

        // 流量全缺测
        let obs = reach(
            valid.clone(),
            valid.clone(),
            valid.clone(),
            FlowEstimate::new(vec![None; 10]),
        );
        assert_eq!(
            validator.validate(&obs),
            ValidityReport::Unusable(UnusableReason::MissingFlow)
        );
    }

    #[test]
    fn test_partial_drop_sets_are_unioned() {
        let validator = ObservationValidator::default();
        let mut width = arange(8, 10, 1.0);
        let mut slope = arange(8, 10, 1.0);
        let mut d_x_area = arange(8, 10, 1.0);

        // 宽度：节点 2 只有 4 个有效值
        for t in 0..6 {
            width.set(2, t, None).unwrap();
        }
        // 坡度：时间步 9 只有 3 个有效节点
        for n in 0..5 {
            slope.set(n, 9, None).unwrap();
        }
        // 面积：节点 2 和 6 不足
        for t in 0..6 {
            d_x_area.set(2, t, None).unwrap();
            d_x_area.set(6, t, None).unwrap();
        }

        let obs = reach(width, d_x_area, slope, flow(10, 3.0));
        match validator.screen(obs) {
            Screening::Usable(input) => {
                assert_eq!(input.invalid_nodes, vec![2, 6]);
                assert_eq!(input.invalid_times, vec![9]);
                assert_eq!(input.width.shape(), (6, 9));
                assert_eq!(input.slope.shape(), (6, 9));
                assert_eq!(input.d_x_area.shape(), (6, 9));
                assert_eq!(input.flow.len(), 9);
                assert_eq!(input.original_nodes, 8);
                assert_eq!(input.original_times, 10);
            }
            other => panic!("expected usable, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_inputs_are_unusable() {
        let validator = ObservationValidator::default();

        let empty = ObservationMatrix::filled(0, 0, None);
        let obs = reach(empty.clone(), empty.clone(), empty, FlowEstimate::new(vec![]));
        assert_eq!(
            validator.validate(&obs),
            ValidityReport::Unusable(UnusableReason::MissingFlow)
        );

        let single_row = arange(1, 10, 1.0);
        let obs = reach(single_row.clone(), single_row.clone(), single_row, flow(10, 1.0));
        assert!(!validator.validate(&obs).is_usable());

        let single_col = arange(10, 1, 1.0);
        let obs = reach(single_col.clone(), single_col.clone(), single_col, flow(1, 1.0));
        assert!(!validator.validate(&obs).is_usable());
    }

    #[test]
    fn test_all_missing_matrix_fails_sufficiency() {
        let m = ObservationMatrix::filled(6, 6, None);
        let result = sufficiency(&m, 5);
        assert!(!result.valid);
        assert_eq!(result.invalid_nodes.len(), 6);
        assert_eq!(result.invalid_times.len(), 6);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let validator = ObservationValidator::new(ValidatorConfig { min_valid: 2 });
        let m = arange(3, 3, 1.0);
        let obs = reach(m.clone(), m.clone(), m, flow(3, 1.0));
        assert!(validator.validate(&obs).is_usable());
        assert!(!ObservationValidator::default().validate(&obs).is_usable());
    }

    #[test]
    fn test_validation_is_deterministic() {
        let validator = ObservationValidator::default();
        let mut width = arange(8, 10, 1.0);
        for t in 0..7 {
            width.set(5, t, None).unwrap();
            width.set(1, t, None).unwrap();
        }
        let m = arange(8, 10, 1.0);
        let obs = reach(width, m.clone(), m, flow(10, 1.0));
        let first = validator.validate(&obs);
        assert_eq!(first, validator.validate(&obs));
        assert_eq!(first.invalid_nodes(), Some(&[1usize, 5][..]));
    }
}
