//! 连接参数
//!
//! 每个命令独立执行：读取配置 → 打开串口 → 执行操作 → 关闭串口。
//! 命令行参数优先于配置文件。

use anyhow::{Context, Result};
use clap::Args;
use kinco_driver::{EventCollector, MotionController, RtuTransport, ServoBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::commands::config::CliConfig;

/// 串口连接参数（覆盖配置文件）
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// 串口路径（如 /dev/ttyUSB0, COM1）
    #[arg(short, long)]
    pub port: Option<String>,

    /// 从站地址
    #[arg(short, long)]
    pub slave: Option<u8>,

    /// 波特率
    #[arg(long)]
    pub baud_rate: Option<u32>,

    /// 单次调用超时（毫秒）
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ConnectionArgs {
    /// 合并命令行参数与配置文件
    pub fn builder(&self, config: &CliConfig) -> Result<ServoBuilder> {
        let port = self
            .port
            .clone()
            .or_else(|| config.port.clone())
            .context("未指定串口：使用 --port 或 `kinco-cli config set --port`")?;

        let mut builder = ServoBuilder::new()
            .port(port)
            .controller_config(config.controller_config());
        if let Some(slave) = self.slave.or(config.slave) {
            builder = builder.slave(slave);
        }
        if let Some(baud_rate) = self.baud_rate.or(config.baud_rate) {
            builder = builder.baud_rate(baud_rate);
        }
        if let Some(timeout_ms) = self.timeout_ms.or(config.timeout_ms) {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        Ok(builder)
    }
}

/// 一次性会话：控制器 + 诊断事件收集
pub struct Session {
    pub servo: MotionController<RtuTransport>,
    events: Arc<EventCollector>,
    verbose: bool,
}

impl Session {
    pub fn open(args: &ConnectionArgs, verbose: bool) -> Result<Self> {
        let config = CliConfig::load()?;
        let builder = args.builder(&config)?;
        let rtu = builder.rtu_config()?;
        debug!("Resolved connection: {:?}", rtu);

        println!("🔌 连接到 {} (从站 {})...", rtu.port, rtu.slave);
        let mut servo = builder.build().context("打开串口失败")?;

        let events = Arc::new(EventCollector::new());
        servo.add_callback(events.clone());

        Ok(Self {
            servo,
            events,
            verbose,
        })
    }

    /// 输出本次会话中的诊断事件（--verbose）
    pub fn finish(self) {
        if self.verbose {
            for event in self.events.take() {
                println!("ℹ️  {}", event);
            }
        }
    }
}
