// crates/sp_foundation/src/fill.rs

//! 填充值约定
//!
//! 持久化数据中只允许一种"未知"表示：项目哨兵值 [`FILL_VALUE`]。
//! 外部统计引擎有自己的缺测标记 (R 的 `NA_real_`)，它是一个带特定
//! 负载的 NaN，与普通 NaN 的位模式不同，需要在写出前统一替换。

/// 项目哨兵值
pub const FILL_VALUE: f64 = -9999.0;

/// 外部引擎缺测标记的位模式 (NaN, 低位负载 1954)
pub const ENGINE_MISSING_BITS: u64 = 0x7FF0_0000_0000_07A2;

/// 外部引擎缺测标记
#[inline]
pub fn engine_missing() -> f64 {
    f64::from_bits(ENGINE_MISSING_BITS)
}

/// 是否为外部引擎缺测标记（按位比较，NaN 不能用 `==`）
#[inline]
pub fn is_engine_missing(value: f64) -> bool {
    value.to_bits() == ENGINE_MISSING_BITS
}

/// 将任意 NaN（含引擎缺测标记）替换为哨兵值
#[inline]
pub fn or_sentinel(value: f64, sentinel: f64) -> f64 {
    if value.is_nan() {
        sentinel
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_missing_is_distinct_nan() {
        let na = engine_missing();
        assert!(na.is_nan());
        assert!(is_engine_missing(na));
        assert!(!is_engine_missing(f64::NAN));
        assert!(!is_engine_missing(FILL_VALUE));
    }

    #[test]
    fn test_or_sentinel() {
        assert_eq!(or_sentinel(f64::NAN, FILL_VALUE), FILL_VALUE);
        assert_eq!(or_sentinel(engine_missing(), FILL_VALUE), FILL_VALUE);
        assert_eq!(or_sentinel(1.5, FILL_VALUE), 1.5);
    }
}
