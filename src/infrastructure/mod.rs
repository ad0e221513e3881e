//! 基础设施层：持有稀缺资源（Page），只暴露能力

pub mod chromium_session;
pub mod js_executor;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use chromium_session::ChromiumSession;
pub use js_executor::JsExecutor;
pub use session::InteractiveSession;
