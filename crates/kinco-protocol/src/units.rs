//! 强类型单位
//!
//! 使用 NewType 模式区分转速与角度，防止把 RPM 当作弧度写入位置寄存器。
//!
//! # 示例
//!
//! ```rust
//! use kinco_protocol::units::{Rad, Rpm};
//!
//! let speed = Rpm(500.0);
//! let angle = Rad(3.14);
//! assert_eq!(speed.value(), 500.0);
//! assert_eq!(angle.to_string(), "3.1400 rad");
//! ```

use std::fmt;

/// 转速（转/分钟）
///
/// 加速度寄存器与速度寄存器使用相同的比例，因此加速度也以 `Rpm` 表示。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rpm(pub f64);

impl Rpm {
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Rpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} rpm", self.0)
    }
}

/// 弧度
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rad(pub f64);

impl Rad {
    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Rad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} rad", self.0)
    }
}
