// crates/sp_core/src/observation.rs

//! 观测数据模型
//!
//! 节点 × 时间步的观测矩阵 (行 = 节点, 列 = 时间步)，
//! 缺测用 `None` 表示，而不是某个哨兵数字。

use sp_foundation::{SpError, SpResult};

/// 观测变量类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservationKind {
    /// 节点宽度
    Width,
    /// 过水断面面积变化
    DxArea,
    /// 坡度
    Slope,
    /// 河段流量估计
    Flow,
}

impl std::fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Width => "width",
            Self::DxArea => "d_x_area",
            Self::Slope => "slope",
            Self::Flow => "Qhat",
        };
        write!(f, "{}", s)
    }
}

/// 观测矩阵（行主序）
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationMatrix {
    n_nodes: usize,
    n_times: usize,
    data: Vec<Option<f64>>,
}

impl ObservationMatrix {
    /// 由行主序数据创建
    pub fn new(n_nodes: usize, n_times: usize, data: Vec<Option<f64>>) -> SpResult<Self> {
        SpError::check_size("observation matrix", n_nodes * n_times, data.len())?;
        Ok(Self { n_nodes, n_times, data })
    }

    /// 由原始浮点数据创建，NaN 视为缺测
    pub fn from_values(n_nodes: usize, n_times: usize, values: &[f64]) -> SpResult<Self> {
        let data = values
            .iter()
            .map(|&v| if v.is_nan() { None } else { Some(v) })
            .collect();
        Self::new(n_nodes, n_times, data)
    }

    /// 由行向量创建，所有行必须等长
    pub fn from_rows(rows: Vec<Vec<Option<f64>>>) -> SpResult<Self> {
        let n_nodes = rows.len();
        let n_times = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_nodes * n_times);
        for row in rows {
            SpError::check_size("observation row", n_times, row.len())?;
            data.extend(row);
        }
        Ok(Self { n_nodes, n_times, data })
    }

    /// 全部为同一值的矩阵
    pub fn filled(n_nodes: usize, n_times: usize, value: Option<f64>) -> Self {
        Self {
            n_nodes,
            n_times,
            data: vec![value; n_nodes * n_times],
        }
    }

    /// 节点数
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// 时间步数
    pub fn n_times(&self) -> usize {
        self.n_times
    }

    /// (节点数, 时间步数)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_nodes, self.n_times)
    }

    /// 获取元素
    pub fn get(&self, node: usize, time: usize) -> Option<f64> {
        if node >= self.n_nodes || time >= self.n_times {
            return None;
        }
        self.data[node * self.n_times + time]
    }

    /// 设置元素
    pub fn set(&mut self, node: usize, time: usize, value: Option<f64>) -> SpResult<()> {
        SpError::check_index("node", node, self.n_nodes)?;
        SpError::check_index("time", time, self.n_times)?;
        self.data[node * self.n_times + time] = value;
        Ok(())
    }

    /// 一行（一个节点的全部时间步）
    pub fn row(&self, node: usize) -> &[Option<f64>] {
        let start = node * self.n_times;
        &self.data[start..start + self.n_times]
    }

    /// 每个节点的有效时间步数（长度 = 节点数）
    pub fn valid_per_node(&self) -> Vec<usize> {
        (0..self.n_nodes)
            .map(|n| self.row(n).iter().filter(|v| v.is_some()).count())
            .collect()
    }

    /// 每个时间步的有效节点数（长度 = 时间步数）
    pub fn valid_per_time(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_times];
        for n in 0..self.n_nodes {
            for (t, value) in self.row(n).iter().enumerate() {
                if value.is_some() {
                    counts[t] += 1;
                }
            }
        }
        counts
    }

    /// 负值替换为缺测
    pub fn mask_negative(&mut self) {
        for value in &mut self.data {
            if matches!(*value, Some(v) if v < 0.0) {
                *value = None;
            }
        }
    }

    /// 删除指定的行和列
    ///
    /// 两个索引集合必须已排序；越界索引被忽略。
    pub fn without(&self, nodes: &[usize], times: &[usize]) -> Self {
        let kept_nodes: Vec<usize> = (0..self.n_nodes)
            .filter(|n| nodes.binary_search(n).is_err())
            .collect();
        let kept_times: Vec<usize> = (0..self.n_times)
            .filter(|t| times.binary_search(t).is_err())
            .collect();

        let mut data = Vec::with_capacity(kept_nodes.len() * kept_times.len());
        for &n in &kept_nodes {
            let row = self.row(n);
            data.extend(kept_times.iter().map(|&t| row[t]));
        }

        Self {
            n_nodes: kept_nodes.len(),
            n_times: kept_times.len(),
            data,
        }
    }

    /// 行主序浮点数据，缺测为 NaN
    pub fn to_row_major(&self) -> Vec<f64> {
        self.data.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    }

    /// 列主序浮点数据，缺测为 NaN
    pub fn to_column_major(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.data.len());
        for t in 0..self.n_times {
            for n in 0..self.n_nodes {
                out.push(self.data[n * self.n_times + t].unwrap_or(f64::NAN));
            }
        }
        out
    }
}

/// 河段流量估计（每个时间步一个值）
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEstimate(Vec<Option<f64>>);

impl FlowEstimate {
    /// 由逐时间步的值创建
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self(values)
    }

    /// 由存储中读出的值创建
    ///
    /// 标量（长度 1）被广播到 `n_times`；其他长度必须等于 `n_times`。
    pub fn from_stored(values: Vec<Option<f64>>, n_times: usize) -> SpResult<Self> {
        match values.len() {
            1 => Ok(Self(vec![values[0]; n_times])),
            len => {
                SpError::check_size("Qhat", n_times, len)?;
                Ok(Self(values))
            }
        }
    }

    /// 首个值
    pub fn first(&self) -> Option<f64> {
        self.0.first().copied().flatten()
    }

    /// 长度
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 全部值
    pub fn values(&self) -> &[Option<f64>] {
        &self.0
    }

    /// 负值替换为缺测
    pub fn mask_negative(&mut self) {
        for value in &mut self.0 {
            if matches!(*value, Some(v) if v < 0.0) {
                *value = None;
            }
        }
    }

    /// 删除指定时间步（已排序）
    pub fn without(&self, times: &[usize]) -> Self {
        Self(
            self.0
                .iter()
                .enumerate()
                .filter(|(t, _)| times.binary_search(t).is_err())
                .map(|(_, v)| *v)
                .collect(),
        )
    }

    /// 浮点数据，缺测为 NaN
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
    }
}

/// 一个河段的全部观测
#[derive(Debug, Clone, PartialEq)]
pub struct ReachObservations {
    width: ObservationMatrix,
    d_x_area: ObservationMatrix,
    slope: ObservationMatrix,
    flow: FlowEstimate,
}

impl ReachObservations {
    /// 创建并检查三个矩阵形状一致、流量长度等于时间步数
    pub fn new(
        width: ObservationMatrix,
        d_x_area: ObservationMatrix,
        slope: ObservationMatrix,
        flow: FlowEstimate,
    ) -> SpResult<Self> {
        let (n_nodes, n_times) = width.shape();
        SpError::check_size("d_x_area nodes", n_nodes, d_x_area.n_nodes())?;
        SpError::check_size("d_x_area times", n_times, d_x_area.n_times())?;
        SpError::check_size("slope nodes", n_nodes, slope.n_nodes())?;
        SpError::check_size("slope times", n_times, slope.n_times())?;
        SpError::check_size("Qhat", n_times, flow.len())?;
        Ok(Self { width, d_x_area, slope, flow })
    }

    /// 宽度
    pub fn width(&self) -> &ObservationMatrix {
        &self.width
    }

    /// 过水断面面积变化
    pub fn d_x_area(&self) -> &ObservationMatrix {
        &self.d_x_area
    }

    /// 坡度
    pub fn slope(&self) -> &ObservationMatrix {
        &self.slope
    }

    /// 流量估计
    pub fn flow(&self) -> &FlowEstimate {
        &self.flow
    }

    /// 节点数
    pub fn n_nodes(&self) -> usize {
        self.width.n_nodes()
    }

    /// 时间步数
    pub fn n_times(&self) -> usize {
        self.width.n_times()
    }

    /// 流量、坡度、宽度中的负值替换为缺测
    ///
    /// 面积变化保持不变：负的面积变化代表退水，是合法观测。
    pub fn mask_negative(&mut self) {
        self.width.mask_negative();
        self.slope.mask_negative();
        self.flow.mask_negative();
    }

    /// 拆分为各部分
    pub fn into_parts(self) -> (ObservationMatrix, ObservationMatrix, ObservationMatrix, FlowEstimate) {
        (self.width, self.d_x_area, self.slope, self.flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential(n_nodes: usize, n_times: usize) -> ObservationMatrix {
        let values: Vec<f64> = (0..n_nodes * n_times).map(|i| i as f64).collect();
        ObservationMatrix::from_values(n_nodes, n_times, &values).unwrap()
    }

    #[test]
    fn test_shape_check() {
        assert!(ObservationMatrix::new(2, 3, vec![None; 5]).is_err());
        assert!(ObservationMatrix::from_rows(vec![vec![Some(1.0)], vec![]]).is_err());
    }

    #[test]
    fn test_counts() {
        let mut m = sequential(3, 4);
        m.set(0, 0, None).unwrap();
        m.set(1, 0, None).unwrap();
        assert_eq!(m.valid_per_node(), vec![3, 3, 4]);
        assert_eq!(m.valid_per_time(), vec![1, 3, 3, 3]);
    }

    #[test]
    fn test_mask_negative() {
        let mut m = ObservationMatrix::from_values(1, 3, &[-1.0, 0.0, 2.0]).unwrap();
        m.mask_negative();
        assert_eq!(m.row(0), &[None, Some(0.0), Some(2.0)]);
    }

    #[test]
    fn test_without_rows_and_columns() {
        let m = sequential(3, 4);
        let trimmed = m.without(&[1], &[0, 3]);
        assert_eq!(trimmed.shape(), (2, 2));
        assert_eq!(trimmed.row(0), &[Some(1.0), Some(2.0)]);
        assert_eq!(trimmed.row(1), &[Some(9.0), Some(10.0)]);
    }

    #[test]
    fn test_column_major() {
        let m = sequential(2, 3);
        assert_eq!(m.to_row_major(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(m.to_column_major(), vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn test_flow_broadcast() {
        let flow = FlowEstimate::from_stored(vec![Some(2.3)], 4).unwrap();
        assert_eq!(flow.len(), 4);
        assert_eq!(flow.first(), Some(2.3));
        assert!(FlowEstimate::from_stored(vec![Some(1.0), Some(2.0)], 4).is_err());
    }

    #[test]
    fn test_reach_observations_shape_mismatch() {
        let flow = FlowEstimate::new(vec![Some(1.0); 4]);
        let err = ReachObservations::new(sequential(3, 4), sequential(3, 4), sequential(2, 4), flow);
        assert!(err.is_err());
    }
}
