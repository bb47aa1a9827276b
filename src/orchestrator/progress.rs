use std::time::Duration;

use crate::models::SubmissionResult;

/// 批量处理进度回调
///
/// 所有方法都有空的默认实现，按需覆盖。`index` 从 1 开始
pub trait BatchObserver: Send + Sync {
    /// 开始处理前调用一次
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// 开始处理某个文件
    fn on_file_start(&self, index: usize, total: usize, file_name: &str) {
        let _ = (index, total, file_name);
    }

    /// 某个文件处理完成（无论结果如何）
    fn on_file_complete(&self, index: usize, total: usize, result: &SubmissionResult) {
        let _ = (index, total, result);
    }

    /// 进入两次提交之间的等待
    fn on_delay(&self, delay: Duration) {
        let _ = delay;
    }

    /// 列表模式中因已处理而跳过的标识
    fn on_skip(&self, identifier: &str) {
        let _ = identifier;
    }

    /// 全部处理完成
    fn on_batch_complete(&self, results: &[SubmissionResult]) {
        let _ = results;
    }
}

/// 不做任何事的回调
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}
