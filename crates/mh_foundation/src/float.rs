// crates/mh_foundation/src/float.rs

//! 数值常量与安全浮点辅助函数
//!
//! 常量取值与有限体积界面计算中常用的量级一致：
//! `SMALL` 用于防止开方/除法的零参数，`VSMALL` 与 `ROOT_VSMALL` 用于分母下限。

// ============================================================================
// 数值常量
// ============================================================================

/// 小量，防止 `sqrt(α(1-α))` 等表达式的参数为零或负
pub const SMALL: f64 = 1.0e-15;

/// 极小量
pub const VSMALL: f64 = 1.0e-300;

/// 极小量的平方根，用作归一化分母的下限
pub const ROOT_VSMALL: f64 = 1.0e-150;

/// 安全除法的最小分母阈值
pub const SAFE_DIV_EPSILON: f64 = 1e-14;

/// 角度转弧度因子
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

// ============================================================================
// 辅助函数
// ============================================================================

/// 安全除法（直接操作 f64）
#[inline]
pub fn safe_div(a: f64, b: f64, fallback: f64) -> f64 {
    if b.abs() < SAFE_DIV_EPSILON {
        fallback
    } else {
        let result = a / b;
        if result.is_finite() {
            result
        } else {
            fallback
        }
    }
}

/// 安全平方根
#[inline]
pub fn safe_sqrt(x: f64) -> f64 {
    x.max(0.0).sqrt()
}

/// 以给定下限保护分母的符号
///
/// 返回与 `x` 同号、绝对值不小于 `floor` 的值（零视为正）。
#[inline]
pub fn stabilise(x: f64, floor: f64) -> f64 {
    if x >= 0.0 {
        x.max(floor)
    } else {
        x.min(-floor)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(1.0, 2.0, 0.0), 0.5);
        assert_eq!(safe_div(1.0, 0.0, -1.0), -1.0);
        assert_eq!(safe_div(1.0, 1e-20, 7.0), 7.0);
    }

    #[test]
    fn test_safe_sqrt() {
        assert_eq!(safe_sqrt(4.0), 2.0);
        assert_eq!(safe_sqrt(-1.0), 0.0);
    }

    #[test]
    fn test_stabilise() {
        assert_eq!(stabilise(0.0, 1e-10), 1e-10);
        assert_eq!(stabilise(-1e-20, 1e-10), -1e-10);
        assert_eq!(stabilise(2.0, 1e-10), 2.0);
    }

    #[test]
    fn test_constants_ordering() {
        assert!(VSMALL < ROOT_VSMALL);
        assert!(ROOT_VSMALL < SMALL);
        assert!((DEG_TO_RAD * 180.0 - std::f64::consts::PI).abs() < 1e-15);
    }
}
