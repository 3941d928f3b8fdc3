//! 配置管理命令
//!
//! 用于管理 CLI 配置（串口、从站地址等）。配置文件为
//! `<config_dir>/kinco/config.toml`：
//!
//! ```toml
//! port = "/dev/ttyUSB0"
//! slave = 1
//! baud_rate = 115200
//! timeout_ms = 500
//!
//! [controller]
//! encoder_resolution = 10000
//! ```

use anyhow::{Context, Result};
use clap::Subcommand;
use kinco_driver::ControllerConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// 配置文件路径
fn config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;

    path.push("kinco");
    Ok(path)
}

pub fn config_file() -> Result<PathBuf> {
    let mut path = config_dir()?;
    path.push("config.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// 默认串口
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// 从站地址
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slave: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baud_rate: Option<u32>,

    /// 单次调用超时（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// 单位换算与握手速度
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<ControllerConfig>,
}

impl CliConfig {
    /// 加载默认位置的配置，文件不存在时返回默认配置
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("读取配置文件失败")?;
        toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("创建配置目录失败")?;
        }

        let content = toml::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path, format!("# Kinco CLI Configuration\n\n{}", content))
            .context("写入配置文件失败")?;

        Ok(())
    }

    /// 控制器配置（未设置时为默认值）
    pub fn controller_config(&self) -> ControllerConfig {
        self.controller.clone().unwrap_or_default()
    }

    fn print(&self) {
        println!("  串口: {}", display_opt(&self.port));
        println!("  从站地址: {}", display_opt(&self.slave));
        println!("  波特率: {}", display_opt(&self.baud_rate));
        println!("  超时 (ms): {}", display_opt(&self.timeout_ms));
        let controller = self.controller_config();
        println!("  RPM 比例: {}", controller.rpm_scale);
        println!("  编码器分辨率: {}", controller.encoder_resolution);
    }
}

fn display_opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "(未设置)".to_string(),
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 串口路径（如 /dev/ttyUSB0, COM1）
        #[arg(short, long)]
        port: Option<String>,

        /// 从站地址
        #[arg(short, long)]
        slave: Option<u8>,

        /// 波特率
        #[arg(short, long)]
        baud_rate: Option<u32>,

        /// 单次调用超时（毫秒）
        #[arg(short, long)]
        timeout_ms: Option<u64>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称（port / slave / baud_rate / timeout_ms / all）
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        let path = config_file()?;
        self.execute_at(&path)
    }

    pub fn execute_at(self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Set {
                port,
                slave,
                baud_rate,
                timeout_ms,
            } => Self::set_(path, port, slave, baud_rate, timeout_ms),

            ConfigCommand::Get { key } => Self::get_(path, &key),

            ConfigCommand::Check => Self::check_(path),
        }
    }

    fn set_(
        path: &Path,
        port: Option<String>,
        slave: Option<u8>,
        baud_rate: Option<u32>,
        timeout_ms: Option<u64>,
    ) -> Result<()> {
        let mut config = CliConfig::load_from(path)?;

        if let Some(port) = port {
            println!("✅ 设置默认串口: {}", port);
            config.port = Some(port);
        }
        if let Some(slave) = slave {
            println!("✅ 设置从站地址: {}", slave);
            config.slave = Some(slave);
        }
        if let Some(baud_rate) = baud_rate {
            println!("✅ 设置波特率: {}", baud_rate);
            config.baud_rate = Some(baud_rate);
        }
        if let Some(timeout_ms) = timeout_ms {
            println!("✅ 设置超时: {} ms", timeout_ms);
            config.timeout_ms = Some(timeout_ms);
        }

        config.save_to(path)
    }

    fn get_(path: &Path, key: &str) -> Result<()> {
        let config = CliConfig::load_from(path)?;

        match key {
            "port" => println!("{}", display_opt(&config.port)),
            "slave" => println!("{}", display_opt(&config.slave)),
            "baud_rate" => println!("{}", display_opt(&config.baud_rate)),
            "timeout_ms" => println!("{}", display_opt(&config.timeout_ms)),
            _ => {
                println!("Kinco CLI 配置:");
                config.print();
            },
        }

        Ok(())
    }

    fn check_(path: &Path) -> Result<()> {
        println!("配置文件: {}", path.display());
        if !path.exists() {
            println!("  (文件不存在，使用默认配置)");
        }

        let config = CliConfig::load_from(path)?;
        config.controller_config().validate()?;
        config.print();
        println!("✅ 配置有效");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = CliConfig {
            port: Some("/dev/ttyUSB0".to_string()),
            slave: Some(3),
            timeout_ms: Some(250),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(CliConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_set_merges_into_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        ConfigCommand::Set {
            port: Some("COM1".to_string()),
            slave: None,
            baud_rate: None,
            timeout_ms: None,
        }
        .execute_at(&path)
        .unwrap();
        ConfigCommand::Set {
            port: None,
            slave: Some(2),
            baud_rate: None,
            timeout_ms: None,
        }
        .execute_at(&path)
        .unwrap();

        let config = CliConfig::load_from(&path).unwrap();
        assert_eq!(config.port.as_deref(), Some("COM1"));
        assert_eq!(config.slave, Some(2));
    }

    #[test]
    fn test_controller_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = \"COM1\"\n\n[controller]\nencoder_resolution = 4096\n").unwrap();

        let config = CliConfig::load_from(&path).unwrap();
        assert_eq!(config.controller_config().encoder_resolution, 4096);
        assert!(ConfigCommand::Check.execute_at(&path).is_ok());
    }

    #[test]
    fn test_check_rejects_invalid_controller_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[controller]\nrpm_scale = -1.0\n").unwrap();
        assert!(ConfigCommand::Check.execute_at(&path).is_err());
    }

    #[test]
    fn test_unknown_key_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "interface = \"can0\"\n").unwrap();
        assert!(CliConfig::load_from(&path).is_err());
    }
}
