// crates/sp_io/src/drivers/netcdf/driver.rs

//! NetCDF 驱动实现

use super::error::NetCdfError;
use sp_core::output::PersistedOutput;
use std::path::Path;

/// 逐节点输出变量使用的维度名
pub const NODE_DIMENSION: &str = "num_nodes";

/// 拆分 `group/variable` 路径
pub fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('/') {
        Some((group, name)) if !group.is_empty() => (Some(group), name),
        Some((_, name)) => (None, name),
        None => (None, path),
    }
}

/// 读取到内存的变量
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariable {
    /// 数据（行主序）
    pub data: Vec<f64>,
    /// 维度大小
    pub dims: Vec<usize>,
    /// `_FillValue` 属性
    pub fill_value: Option<f64>,
}

impl RawVariable {
    /// 解码：NaN 与 `_FillValue` 视为缺测
    pub fn decoded(&self) -> Vec<Option<f64>> {
        self.data
            .iter()
            .map(|&v| {
                if v.is_nan() || self.fill_value == Some(v) {
                    None
                } else {
                    Some(v)
                }
            })
            .collect()
    }

    /// 获取总元素数
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[cfg(feature = "netcdf")]
    fn read(var: &netcdf::Variable<'_>) -> Result<Self, NetCdfError> {
        let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let data: Vec<f64> = var
            .values::<f64, _>(..)
            .map_err(|e| NetCdfError::ReadFailed(e.to_string()))?;
        let fill_value = var
            .attribute("_FillValue")
            .and_then(|a| a.value().ok())
            .and_then(|v| match v {
                netcdf::AttrValue::Double(x) => Some(x),
                netcdf::AttrValue::Float(x) => Some(f64::from(x)),
                netcdf::AttrValue::Int(x) => Some(f64::from(x)),
                netcdf::AttrValue::Short(x) => Some(f64::from(x)),
                _ => None,
            });

        Ok(Self {
            data,
            dims,
            fill_value,
        })
    }
}

/// NetCDF 只读驱动
#[cfg(feature = "netcdf")]
pub struct NetCdfReader {
    file: netcdf::File,
}

#[cfg(feature = "netcdf")]
impl NetCdfReader {
    /// 打开 NetCDF 文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NetCdfError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NetCdfError::FileNotFound(path.display().to_string()));
        }

        let file = netcdf::open(path).map_err(|e| NetCdfError::OpenFailed(e.to_string()))?;
        Ok(Self { file })
    }

    /// 读取变量
    pub fn read(&self, path: &str) -> Result<RawVariable, NetCdfError> {
        let not_found = || NetCdfError::VariableNotFound(path.to_string());
        match split_path(path) {
            (Some(group_name), name) => {
                let group = self
                    .file
                    .group(group_name)?
                    .ok_or_else(|| NetCdfError::GroupNotFound(group_name.to_string()))?;
                let var = group.variable(name).ok_or_else(not_found)?;
                RawVariable::read(&var)
            }
            (None, name) => {
                let var = self.file.variable(name).ok_or_else(not_found)?;
                RawVariable::read(&var)
            }
        }
    }
}

/// NetCDF 追加写出驱动
#[cfg(feature = "netcdf")]
pub struct NetCdfWriter {
    file: netcdf::MutableFile,
}

#[cfg(feature = "netcdf")]
impl NetCdfWriter {
    /// 以追加模式打开
    pub fn append(path: impl AsRef<Path>) -> Result<Self, NetCdfError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NetCdfError::FileNotFound(path.display().to_string()));
        }

        let file = netcdf::append(path).map_err(|e| NetCdfError::OpenFailed(e.to_string()))?;
        Ok(Self { file })
    }

    /// 写出先验记录
    ///
    /// 已存在的变量直接覆盖数值；`mask_flow` 为真时 `flow_variables`
    /// 全部写为哨兵值。
    pub fn write_output(
        &mut self,
        output: &PersistedOutput,
        group_name: &str,
        flow_variables: &[&str],
    ) -> Result<(), NetCdfError> {
        if self.file.group(group_name)?.is_none() {
            self.file.add_group(group_name)?;
        }

        {
            let mut group = self
                .file
                .group_mut(group_name)?
                .ok_or_else(|| NetCdfError::GroupNotFound(group_name.to_string()))?;

            for &(field, value) in &output.scalars {
                if group.variable(field.name).is_none() {
                    let mut var = group.add_variable::<f64>(field.name, &[])?;
                    var.set_fill_value(output.sentinel)?;
                    var.put_attribute("long_name", field.long_name)?;
                    var.put_attribute("units", field.units)?;
                }
                let mut var = group
                    .variable_mut(field.name)
                    .ok_or_else(|| NetCdfError::VariableNotFound(field.name.to_string()))?;
                var.put_value(value, ..)
                    .map_err(|e| NetCdfError::WriteFailed(format!("{}: {e}", field.name)))?;
            }

            write_river_type(&mut group, &output.river_type, output.sentinel)?;
        }

        if output.mask_flow {
            for path in flow_variables {
                self.fill_variable(path, output.sentinel)?;
            }
        }

        self.file.add_attribute("valid", output.valid_flag())?;
        Ok(())
    }

    fn fill_variable(&mut self, path: &str, sentinel: f64) -> Result<(), NetCdfError> {
        let not_found = || NetCdfError::VariableNotFound(path.to_string());
        match split_path(path) {
            (Some(group_name), name) => {
                let mut group = self
                    .file
                    .group_mut(group_name)?
                    .ok_or_else(|| NetCdfError::GroupNotFound(group_name.to_string()))?;
                let var = group.variable_mut(name).ok_or_else(not_found)?;
                fill_with(var, sentinel, path)
            }
            (None, name) => {
                let var = self.file.variable_mut(name).ok_or_else(not_found)?;
                fill_with(var, sentinel, path)
            }
        }
    }
}

#[cfg(feature = "netcdf")]
fn fill_with(mut var: netcdf::VariableMut<'_>, sentinel: f64, path: &str) -> Result<(), NetCdfError> {
    let values = vec![sentinel; var.len()];
    var.put_values(&values, ..)
        .map_err(|e| NetCdfError::WriteFailed(format!("{path}: {e}")))?;
    Ok(())
}

#[cfg(feature = "netcdf")]
fn write_river_type(
    group: &mut netcdf::GroupMut<'_>,
    river_type: &[f64],
    sentinel: f64,
) -> Result<(), NetCdfError> {
    let field = sp_core::priors::RIVER_TYPE;

    match group.dimension(NODE_DIMENSION).map(|d| d.len()) {
        Some(len) if len != river_type.len() => {
            return Err(NetCdfError::DimensionMismatch(format!(
                "{NODE_DIMENSION} has length {len}, river_type has {}",
                river_type.len()
            )));
        }
        Some(_) => {}
        None => {
            group.add_dimension(NODE_DIMENSION, river_type.len())?;
        }
    }

    if group.variable(field.name).is_none() {
        let mut var = group.add_variable::<f64>(field.name, &[NODE_DIMENSION])?;
        var.set_fill_value(sentinel)?;
        var.put_attribute("long_name", field.long_name)?;
        var.put_attribute("units", field.units)?;
    }

    let mut var = group
        .variable_mut(field.name)
        .ok_or_else(|| NetCdfError::VariableNotFound(field.name.to_string()))?;
    var.put_values(river_type, ..)
        .map_err(|e| NetCdfError::WriteFailed(format!("{}: {e}", field.name)))?;
    Ok(())
}

/// 无 NetCDF 支持时的占位实现
#[cfg(not(feature = "netcdf"))]
pub struct NetCdfReader;

#[cfg(not(feature = "netcdf"))]
impl NetCdfReader {
    /// 打开 NetCDF 文件 (无 NetCDF 支持)
    pub fn open(_path: impl AsRef<Path>) -> Result<Self, NetCdfError> {
        Err(NetCdfError::NotAvailable)
    }

    /// 读取变量 (无 NetCDF 支持)
    pub fn read(&self, _path: &str) -> Result<RawVariable, NetCdfError> {
        Err(NetCdfError::NotAvailable)
    }
}

/// 无 NetCDF 支持时的占位实现
#[cfg(not(feature = "netcdf"))]
pub struct NetCdfWriter;

#[cfg(not(feature = "netcdf"))]
impl NetCdfWriter {
    /// 以追加模式打开 (无 NetCDF 支持)
    pub fn append(_path: impl AsRef<Path>) -> Result<Self, NetCdfError> {
        Err(NetCdfError::NotAvailable)
    }

    /// 写出先验记录 (无 NetCDF 支持)
    pub fn write_output(
        &mut self,
        _output: &PersistedOutput,
        _group_name: &str,
        _flow_variables: &[&str],
    ) -> Result<(), NetCdfError> {
        Err(NetCdfError::NotAvailable)
    }
}
