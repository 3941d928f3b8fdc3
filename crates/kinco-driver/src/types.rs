//! 位置值与单位

use kinco_protocol::Rad;
use std::fmt;

/// 位置单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionUnit {
    /// 弧度（按编码器分辨率换算）
    #[default]
    Radians,
    /// 原始编码器计数
    Raw,
}

/// 位置值
///
/// 原始计数直接用 `i32` 表示，超出 32 位的值在类型层面就无法构造。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    Radians(Rad),
    Raw(i32),
}

impl Position {
    pub fn unit(&self) -> PositionUnit {
        match self {
            Position::Radians(_) => PositionUnit::Radians,
            Position::Raw(_) => PositionUnit::Raw,
        }
    }

    pub fn as_radians(&self) -> Option<Rad> {
        match self {
            Position::Radians(rad) => Some(*rad),
            Position::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<i32> {
        match self {
            Position::Raw(counts) => Some(*counts),
            Position::Radians(_) => None,
        }
    }
}

impl From<Rad> for Position {
    fn from(rad: Rad) -> Self {
        Position::Radians(rad)
    }
}

impl From<i32> for Position {
    fn from(counts: i32) -> Self {
        Position::Raw(counts)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Radians(rad) => write!(f, "{}", rad),
            Position::Raw(counts) => write!(f, "{} counts", counts),
        }
    }
}
