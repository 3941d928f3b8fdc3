//! 物理量编解码
//!
//! 在有符号 32 位物理量与两个 16 位寄存器之间转换，并在 RPM / 弧度与
//! 原始计数之间换算。
//!
//! # 精度
//!
//! 物理单位到原始计数的换算使用截断（向零取整），与驱动器固件的定点格式一致：
//!
//! - `decode_rpm(encode_rpm(r, s), s)` 与 `r` 最多相差 `1 / s`，
//!   小于 `1 / s` 的 RPM 小数部分会丢失
//! - 弧度换算使用固定的 π 近似值 [`FIRMWARE_PI`]，而非 `std::f64::consts::PI`
//!
//! 超出 `i32` 范围的乘积按 Rust 浮点转整数语义饱和到边界值，NaN 编码为 0。
//!
//! # 示例
//!
//! ```rust
//! use kinco_protocol::codec::{decode_value, encode_value};
//!
//! let pair = encode_value(-1);
//! assert_eq!(pair.words(), [0xFFFF, 0xFFFF]);
//! assert_eq!(decode_value(&pair.words()).unwrap(), -1);
//! ```

use crate::ProtocolError;

/// 默认速度比例（原始速度单位 / RPM）
pub const DEFAULT_RPM_SCALE: f64 = 2730.665;

/// 默认编码器分辨率（每转计数）
pub const DEFAULT_ENCODER_RESOLUTION: i32 = 10_000;

/// 驱动器换算使用的 π 近似值
///
/// **注意**：这不是真正的 π。保留此低精度常量，使弧度换算结果与
/// 设备侧工具逐位一致。
#[allow(clippy::approx_constant)]
pub const FIRMWARE_PI: f64 = 3.14159;

/// 寄存器对（32 位量的低字 / 高字）
///
/// 由一个 `i32` 的小端 4 字节表示拆分而来，低字在前。
/// 对所有 `i32`，`RegisterPair::from_value(v).to_value() == v`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterPair {
    /// 低 16 位（先发送）
    pub low: u16,
    /// 高 16 位
    pub high: u16,
}

impl RegisterPair {
    /// 零值
    pub const ZERO: Self = RegisterPair { low: 0, high: 0 };

    /// 寄存器对包含的寄存器数量
    pub const LEN: usize = 2;

    pub const fn new(low: u16, high: u16) -> Self {
        Self { low, high }
    }

    /// 从 32 位有符号量拆分
    pub const fn from_value(value: i32) -> Self {
        let bytes = value.to_le_bytes();
        Self {
            low: u16::from_le_bytes([bytes[0], bytes[1]]),
            high: u16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }

    /// 合并为 32 位有符号量
    pub const fn to_value(self) -> i32 {
        let low = self.low.to_le_bytes();
        let high = self.high.to_le_bytes();
        i32::from_le_bytes([low[0], low[1], high[0], high[1]])
    }

    /// 按发送顺序返回寄存器（低字在前）
    pub const fn words(self) -> [u16; 2] {
        [self.low, self.high]
    }
}

impl From<[u16; 2]> for RegisterPair {
    fn from(words: [u16; 2]) -> Self {
        RegisterPair::new(words[0], words[1])
    }
}

impl From<RegisterPair> for [u16; 2] {
    fn from(pair: RegisterPair) -> Self {
        pair.words()
    }
}

impl TryFrom<&[u16]> for RegisterPair {
    type Error = ProtocolError;

    fn try_from(registers: &[u16]) -> Result<Self, Self::Error> {
        match registers {
            [low, high] => Ok(RegisterPair::new(*low, *high)),
            _ => Err(ProtocolError::InvalidRegisterCount {
                expected: RegisterPair::LEN,
                actual: registers.len(),
            }),
        }
    }
}

/// 32 位有符号量 → 寄存器对
#[inline]
pub fn encode_value(value: i32) -> RegisterPair {
    RegisterPair::from_value(value)
}

/// 寄存器 → 32 位有符号量
///
/// # 错误
///
/// 输入不是恰好 2 个寄存器时返回 `ProtocolError::InvalidRegisterCount`。
pub fn decode_value(registers: &[u16]) -> Result<i32, ProtocolError> {
    RegisterPair::try_from(registers).map(RegisterPair::to_value)
}

/// RPM → 寄存器对
///
/// `rpm * scale` 向零截断为原始速度单位。加速度使用同样的换算。
pub fn encode_rpm(rpm: f64, scale: f64) -> RegisterPair {
    encode_value((rpm * scale) as i32)
}

/// 寄存器 → RPM
pub fn decode_rpm(registers: &[u16], scale: f64) -> Result<f64, ProtocolError> {
    Ok(f64::from(decode_value(registers)?) / scale)
}

/// 弧度 → 寄存器对（编码器计数）
///
/// `rad * encoder_resolution / (2 * FIRMWARE_PI)` 向零截断。
pub fn encode_radians(rad: f64, encoder_resolution: i32) -> RegisterPair {
    encode_value((rad * f64::from(encoder_resolution) / (2.0 * FIRMWARE_PI)) as i32)
}

/// 寄存器（编码器计数）→ 弧度
pub fn decode_radians(registers: &[u16], encoder_resolution: i32) -> Result<f64, ProtocolError> {
    let counts = decode_value(registers)?;
    Ok(f64::from(counts) * (2.0 * FIRMWARE_PI) / f64::from(encoder_resolution))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_value_zero() {
        assert_eq!(encode_value(0), RegisterPair::ZERO);
        assert_eq!(decode_value(&[0, 0]).unwrap(), 0);
    }

    #[test]
    fn test_encode_value_fixed_inputs() {
        assert_eq!(encode_value(1000).words(), [1000, 0]);
        assert_eq!(encode_value(-1).words(), [0xFFFF, 0xFFFF]);
        assert_eq!(encode_value(0x0001_0002).words(), [0x0002, 0x0001]);
        assert_eq!(encode_value(i32::MIN).words(), [0x0000, 0x8000]);
        assert_eq!(encode_value(i32::MAX).words(), [0xFFFF, 0x7FFF]);
    }

    #[test]
    fn test_decode_value_negative() {
        // -250 * 21 * 10000，来自实际现场的相对移动量
        let value = -52_500_000;
        let pair = encode_value(value);
        assert_eq!(decode_value(&pair.words()).unwrap(), value);
    }

    #[test]
    fn test_decode_value_wrong_length() {
        assert_eq!(
            decode_value(&[1]),
            Err(ProtocolError::InvalidRegisterCount {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            decode_value(&[1, 2, 3]),
            Err(ProtocolError::InvalidRegisterCount {
                expected: 2,
                actual: 3
            })
        );
        assert!(decode_value(&[]).is_err());
    }

    #[test]
    fn test_encode_rpm_truncates() {
        // 1 rpm * 2730.665 = 2730.665 → 2730
        assert_eq!(encode_rpm(1.0, DEFAULT_RPM_SCALE).to_value(), 2730);
        // 负数向零截断，而不是向下取整
        assert_eq!(encode_rpm(-1.0, DEFAULT_RPM_SCALE).to_value(), -2730);
        // 100 rpm → 273066.5 → 273066
        assert_eq!(encode_rpm(100.0, DEFAULT_RPM_SCALE).to_value(), 273_066);
        assert_eq!(encode_rpm(0.0, DEFAULT_RPM_SCALE), RegisterPair::ZERO);
    }

    #[test]
    fn test_encode_rpm_below_resolution_is_lost() {
        let tiny = 0.5 / DEFAULT_RPM_SCALE;
        assert_eq!(encode_rpm(tiny, DEFAULT_RPM_SCALE), RegisterPair::ZERO);
    }

    #[test]
    fn test_encode_rpm_saturates() {
        assert_eq!(encode_rpm(1e12, DEFAULT_RPM_SCALE).to_value(), i32::MAX);
        assert_eq!(encode_rpm(-1e12, DEFAULT_RPM_SCALE).to_value(), i32::MIN);
        assert_eq!(encode_rpm(f64::NAN, DEFAULT_RPM_SCALE), RegisterPair::ZERO);
    }

    #[test]
    fn test_decode_rpm() {
        let rpm = decode_rpm(&[2730, 0], DEFAULT_RPM_SCALE).unwrap();
        assert!((rpm - 2730.0 / 2730.665).abs() < 1e-12);
        assert!(decode_rpm(&[0], DEFAULT_RPM_SCALE).is_err());
    }

    #[test]
    fn test_encode_radians_uses_firmware_pi() {
        // 2 * 3.14159 rad 恰好一圈
        let pair = encode_radians(2.0 * FIRMWARE_PI, DEFAULT_ENCODER_RESOLUTION);
        assert_eq!(pair.to_value(), 10_000);

        // 输入使用真正的 π 时误差随圈数累积，一千圈后多出 8 个计数
        let pair = encode_radians(std::f64::consts::TAU, DEFAULT_ENCODER_RESOLUTION);
        assert_eq!(pair.to_value(), 10_000);
        let pair = encode_radians(std::f64::consts::TAU * 1000.0, DEFAULT_ENCODER_RESOLUTION);
        assert_eq!(pair.to_value(), 10_000_008);
    }

    #[test]
    fn test_decode_radians() {
        let rad = decode_radians(&encode_value(10_000).words(), DEFAULT_ENCODER_RESOLUTION).unwrap();
        assert!((rad - 2.0 * FIRMWARE_PI).abs() < 1e-12);

        let rad = decode_radians(&encode_value(-5_000).words(), DEFAULT_ENCODER_RESOLUTION).unwrap();
        assert!((rad + FIRMWARE_PI).abs() < 1e-12);
    }

    #[test]
    fn test_register_pair_conversions() {
        let pair: RegisterPair = [0x1234, 0x5678].into();
        assert_eq!(pair.to_value(), 0x5678_1234);
        let words: [u16; 2] = pair.into();
        assert_eq!(words, [0x1234, 0x5678]);
    }
}
