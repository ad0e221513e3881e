pub mod order_ctx;
pub mod order_flow;
pub mod retry_policy;

pub use order_ctx::{OrderCtx, OrderStage};
pub use order_flow::OrderFlow;
pub use retry_policy::RetryPolicy;
