//! 弹窗处理 - 业务能力层
//!
//! 尽力关闭遮罩弹窗。弹窗不存在是常态，任何失败都当作"无事可做"。

use tracing::{debug, info};

use crate::config::FormSelectors;
use crate::infrastructure::InteractiveSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupOutcome {
    Dismissed,
    NotPresent,
}

/// 幂等，可以重复调用
pub async fn dismiss_popup(
    session: &mut dyn InteractiveSession,
    selectors: &FormSelectors,
) -> PopupOutcome {
    match session.is_present(&selectors.popup).await {
        Ok(true) => {}
        Ok(false) => return PopupOutcome::NotPresent,
        Err(e) => {
            debug!("检测弹窗失败，忽略: {}", e);
            return PopupOutcome::NotPresent;
        }
    }

    match session.click(&selectors.popup_close).await {
        Ok(()) => {
            info!("✓ 已关闭弹窗");
            PopupOutcome::Dismissed
        }
        Err(e) => {
            debug!("关闭弹窗失败，忽略: {}", e);
            PopupOutcome::NotPresent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::test_support::ScriptedSession;

    #[tokio::test]
    async fn test_no_popup_is_noop() {
        let selectors = FormSelectors::default();
        let mut session = ScriptedSession::new();

        let outcome = dismiss_popup(&mut session, &selectors).await;

        assert_eq!(outcome, PopupOutcome::NotPresent);
        assert_eq!(session.calls, vec!["query .modal-content"]);
    }

    #[tokio::test]
    async fn test_visible_popup_is_closed_once() {
        let selectors = FormSelectors::default();
        let mut session = ScriptedSession::new().with_popup();

        assert_eq!(
            dismiss_popup(&mut session, &selectors).await,
            PopupOutcome::Dismissed
        );
        assert!(!session.popup_visible);
        assert_eq!(
            dismiss_popup(&mut session, &selectors).await,
            PopupOutcome::NotPresent
        );
    }

    #[tokio::test]
    async fn test_close_failure_is_swallowed() {
        let selectors = FormSelectors::default();
        let mut session = ScriptedSession::new()
            .with_popup()
            .missing(".modal-content button");

        let outcome = dismiss_popup(&mut session, &selectors).await;

        assert_eq!(outcome, PopupOutcome::NotPresent);
        assert!(session.popup_visible);
    }
}
