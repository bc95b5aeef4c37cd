// crates/sp_core/src/priors.rs

//! 先验参数记录
//!
//! 引擎输出 40 个河段级标量和一个逐节点的河流类型序列。
//! 字段目录同时决定写出时的变量名、长名称和单位。

use std::collections::BTreeMap;

/// 先验字段描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorField {
    /// 变量名
    pub name: &'static str,
    /// 长名称
    pub long_name: &'static str,
    /// 单位
    pub units: &'static str,
}

const fn field(name: &'static str, long_name: &'static str, units: &'static str) -> PriorField {
    PriorField { name, long_name, units }
}

/// 逐节点河流类型字段
pub const RIVER_TYPE: PriorField = field("river_type", "geomorphic river type classification", "1");

/// 河段级标量字段（写出顺序）
pub const SCALAR_FIELDS: [PriorField; 40] = [
    field("lowerbound_A0", "lower bound of median cross-sectional area", "m^2"),
    field("upperbound_A0", "upper bound of median cross-sectional area", "m^2"),
    field("lowerbound_logn", "lower bound of log Manning's n", "log(s/m^(1/3))"),
    field("upperbound_logn", "upper bound of log Manning's n", "log(s/m^(1/3))"),
    field("lowerbound_b", "lower bound of AMHG width exponent", "1"),
    field("upperbound_b", "upper bound of AMHG width exponent", "1"),
    field("lowerbound_logWb", "lower bound of log bankfull width", "log(m)"),
    field("upperbound_logWb", "upper bound of log bankfull width", "log(m)"),
    field("lowerbound_logDb", "lower bound of log bankfull depth", "log(m)"),
    field("upperbound_logDb", "upper bound of log bankfull depth", "log(m)"),
    field("lowerbound_logr", "lower bound of log channel shape parameter", "1"),
    field("upperbound_logr", "upper bound of log channel shape parameter", "1"),
    field("logA0_hat", "prior mean of log median cross-sectional area", "log(m^2)"),
    field("logn_hat", "prior mean of log Manning's n", "log(s/m^(1/3))"),
    field("b_hat", "prior mean of AMHG width exponent", "1"),
    field("logWb_hat", "prior mean of log bankfull width", "log(m)"),
    field("logDb_hat", "prior mean of log bankfull depth", "log(m)"),
    field("logr_hat", "prior mean of log channel shape parameter", "1"),
    field("logA0_sd", "prior standard deviation of log median cross-sectional area", "log(m^2)"),
    field("logn_sd", "prior standard deviation of log Manning's n", "log(s/m^(1/3))"),
    field("b_sd", "prior standard deviation of AMHG width exponent", "1"),
    field("logWb_sd", "prior standard deviation of log bankfull width", "log(m)"),
    field("logDb_sd", "prior standard deviation of log bankfull depth", "log(m)"),
    field("logr_sd", "prior standard deviation of log channel shape parameter", "1"),
    field("lowerbound_logQ", "lower bound of log discharge", "log(m^3/s)"),
    field("upperbound_logQ", "upper bound of log discharge", "log(m^3/s)"),
    field("lowerbound_logWc", "lower bound of log AMHG critical width", "log(m)"),
    field("upperbound_logWc", "upper bound of log AMHG critical width", "log(m)"),
    field("lowerbound_logQc", "lower bound of log AMHG critical discharge", "log(m^3/s)"),
    field("upperbound_logQc", "upper bound of log AMHG critical discharge", "log(m^3/s)"),
    field("logWc_hat", "prior mean of log AMHG critical width", "log(m)"),
    field("logQc_hat", "prior mean of log AMHG critical discharge", "log(m^3/s)"),
    field("logQ_sd", "prior standard deviation of log discharge", "log(m^3/s)"),
    field("logWc_sd", "prior standard deviation of log AMHG critical width", "log(m)"),
    field("logQc_sd", "prior standard deviation of log AMHG critical discharge", "log(m^3/s)"),
    field("Werr_sd", "width measurement error standard deviation", "m"),
    field("Serr_sd", "slope measurement error standard deviation", "m/m"),
    field("dAerr_sd", "cross-sectional area change error standard deviation", "m^2"),
    field("sigma_man", "Manning structural error standard deviation", "1"),
    field("sigma_amhg", "AMHG structural error standard deviation", "1"),
];

/// 按名称查找标量字段
pub fn scalar_field(name: &str) -> Option<&'static PriorField> {
    SCALAR_FIELDS.iter().find(|f| f.name == name)
}

/// 先验记录
///
/// `river_type` 位于裁剪后的节点空间，长度等于保留的节点数。
#[derive(Debug, Clone, PartialEq)]
pub struct PriorRecord {
    scalars: BTreeMap<&'static str, f64>,
    river_type: Vec<f64>,
}

impl PriorRecord {
    /// 由完整的标量映射创建，缺少任何字段返回该字段名
    pub fn new(
        mut values: BTreeMap<String, f64>,
        river_type: Vec<f64>,
    ) -> Result<Self, &'static str> {
        let mut scalars = BTreeMap::new();
        for field in &SCALAR_FIELDS {
            let value = values.remove(field.name).ok_or(field.name)?;
            scalars.insert(field.name, value);
        }
        Ok(Self { scalars, river_type })
    }

    /// 所有标量都取同一值的记录
    pub fn uniform(value: f64, river_type: Vec<f64>) -> Self {
        Self {
            scalars: SCALAR_FIELDS.iter().map(|f| (f.name, value)).collect(),
            river_type,
        }
    }

    /// 标量值
    pub fn get(&self, name: &str) -> Option<f64> {
        self.scalars.get(name).copied()
    }

    /// 设置标量值（仅限目录中的字段）
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match scalar_field(name) {
            Some(field) => {
                self.scalars.insert(field.name, value);
                true
            }
            None => false,
        }
    }

    /// 按目录顺序遍历标量
    pub fn scalars(&self) -> impl Iterator<Item = (&'static PriorField, f64)> + '_ {
        SCALAR_FIELDS
            .iter()
            .map(move |f| (f, self.scalars.get(f.name).copied().unwrap_or(f64::NAN)))
    }

    /// 逐节点河流类型（裁剪空间）
    pub fn river_type(&self) -> &[f64] {
        &self.river_type
    }
}
