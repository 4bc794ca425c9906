//! StatusSink port - app ごとの status record の送り先
//!
//! 表示（記号、色、ログ形式）は sink の責務で、orchestrator は status を決めるだけ。

use crate::domain::StatusRecord;

pub trait StatusSink: Send + Sync {
    fn report(&self, record: &StatusRecord);
}
