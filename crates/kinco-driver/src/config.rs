//! 控制器配置
//!
//! 单位换算常数与各握手序列使用的固定速度。默认值对应 FD1X3 出厂参数，
//! 可以从 TOML 加载（缺省字段取默认值）：
//!
//! ```toml
//! rpm_scale = 2730.665
//! encoder_resolution = 10000
//! position_mode_speed_rpm = 100.0
//! homing_speed_switch_rpm = 50.0
//! homing_speed_zero_rpm = 25.0
//! ```

use crate::error::DriverError;
use kinco_protocol::{DEFAULT_ENCODER_RESOLUTION, DEFAULT_RPM_SCALE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 控制器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// RPM 到原始速度单位的比例
    pub rpm_scale: f64,
    /// 编码器每转计数
    pub encoder_resolution: i32,
    /// 进入位置模式时写入的轮廓速度 (rpm)
    pub position_mode_speed_rpm: f64,
    /// 回零时寻找开关的速度 (rpm)
    pub homing_speed_switch_rpm: f64,
    /// 回零时寻找零点的速度 (rpm)
    pub homing_speed_zero_rpm: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            rpm_scale: DEFAULT_RPM_SCALE,
            encoder_resolution: DEFAULT_ENCODER_RESOLUTION,
            position_mode_speed_rpm: 100.0,
            homing_speed_switch_rpm: 50.0,
            homing_speed_zero_rpm: 25.0,
        }
    }
}

impl ControllerConfig {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DriverError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, DriverError> {
        toml::to_string(self).map_err(|e| DriverError::Config(e.to_string()))
    }

    /// 校验换算常数
    ///
    /// 比例为 0 或非有限值时，编解码结果没有意义。
    pub fn validate(&self) -> Result<(), DriverError> {
        if !(self.rpm_scale.is_finite() && self.rpm_scale > 0.0) {
            return Err(DriverError::Config(format!(
                "rpm_scale must be a positive finite number, got {}",
                self.rpm_scale
            )));
        }
        if self.encoder_resolution <= 0 {
            return Err(DriverError::Config(format!(
                "encoder_resolution must be positive, got {}",
                self.encoder_resolution
            )));
        }
        for (name, value) in [
            ("position_mode_speed_rpm", self.position_mode_speed_rpm),
            ("homing_speed_switch_rpm", self.homing_speed_switch_rpm),
            ("homing_speed_zero_rpm", self.homing_speed_zero_rpm),
        ] {
            if !value.is_finite() {
                return Err(DriverError::Config(format!("{} must be finite, got {}", name, value)));
            }
        }
        Ok(())
    }
}
