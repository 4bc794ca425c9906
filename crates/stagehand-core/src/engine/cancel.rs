//! Cancel - 実行中の `apply_apps` のキャンセル
//!
//! `watch` チャネルで「キャンセル済み」フラグを1つだけ運ぶ。
//! キャンセルせずに全 [`CancelHandle`] を drop した場合はキャンセル不能になるだけで、
//! キャンセル扱いにはならない。
//!
//! # 学習ポイント
//! - `watch::Sender<bool>` による停止シグナル
//! - 送信側がいなくなった後は `pending` で永遠に待つ

use tokio::sync::watch;

/// Create a connected handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Request cancellation. The running hook is dropped at its next await
    /// point and no further app starts.
    pub fn cancel(&self) {
        // ignore send error: the run may already be finished
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested; pends forever otherwise.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // every handle is gone without cancelling
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_wakes_waiting_token() {
        let (handle, mut token) = cancel_pair();
        assert!(!token.is_cancelled());

        let waiter = tokio::spawn(async move {
            token.cancelled().await;
            token.is_cancelled()
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn never_token_does_not_resolve() {
        let mut token = CancelToken::never();
        let waited = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(waited.is_err());
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn dropped_handle_without_cancel_does_not_cancel() {
        let (handle, mut token) = cancel_pair();
        drop(handle);
        let waited = tokio::time::timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(waited.is_err());
    }
}
