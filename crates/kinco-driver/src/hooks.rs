//! 诊断钩子系统
//!
//! 控制器在两类时刻触发诊断事件：
//!
//! - 运动指令发现当前模式不匹配，自动切换模式之前（[`DiagnosticEvent::ModeCorrection`]）
//! - 模式切换序列全部写成功之后（[`DiagnosticEvent::ModeChanged`]）
//!
//! 所有事件同时通过 `tracing` 输出；回调用于需要程序化处理的场景（测试断言、CLI 输出）。
//!
//! # 使用示例
//!
//! ```rust
//! use kinco_driver::hooks::{DiagnosticEvent, EventCollector, HookManager};
//! use kinco_driver::OperatingMode;
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let collector = Arc::new(EventCollector::new());
//! hooks.add_callback(collector.clone());
//!
//! hooks.trigger_all(&DiagnosticEvent::ModeChanged {
//!     from: OperatingMode::Uninitialized,
//!     to: OperatingMode::Velocity,
//! });
//! assert_eq!(collector.len(), 1);
//! ```

use crate::mode::OperatingMode;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// 诊断事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// 运动指令在错误模式下被调用，控制器即将自动切换模式
    ModeCorrection {
        /// 触发切换的操作名（如 "set_velocity"）
        operation: &'static str,
        from: OperatingMode,
        to: OperatingMode,
    },
    /// 模式已切换
    ModeChanged {
        from: OperatingMode,
        to: OperatingMode,
    },
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticEvent::ModeCorrection {
                operation,
                from,
                to,
            } => write!(
                f,
                "{} called in {} mode, switching to {} mode",
                operation, from, to
            ),
            DiagnosticEvent::ModeChanged { from, to } => {
                write!(f, "mode changed: {} -> {}", from, to)
            },
        }
    }
}

/// 诊断回调 Trait
///
/// 回调在调用控制器方法的线程上同步执行，应尽快返回。
pub trait DiagnosticCallback: Send + Sync {
    fn on_event(&self, event: &DiagnosticEvent);
}

/// 钩子管理器
///
/// 由控制器独占持有，随控制器一起被 `&mut self` 保护，因此不需要内部同步。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn DiagnosticCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Arc<dyn DiagnosticCallback>) {
        self.callbacks.push(callback);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// 按注册顺序触发所有回调
    pub fn trigger_all(&self, event: &DiagnosticEvent) {
        for callback in self.callbacks.iter() {
            callback.on_event(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for HookManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookManager")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// 收集所有事件的回调
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收集事件的快照
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().clone()
    }

    /// 取走并清空已收集的事件
    pub fn take(&self) -> Vec<DiagnosticEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// 只返回模式纠正事件
    pub fn corrections(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, DiagnosticEvent::ModeCorrection { .. }))
            .copied()
            .collect()
    }
}

impl DiagnosticCallback for EventCollector {
    fn on_event(&self, event: &DiagnosticEvent) {
        self.events.lock().push(*event);
    }
}
