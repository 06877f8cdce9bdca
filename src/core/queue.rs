use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// 等待处理的图集页
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasTask {
    pub id: Uuid,
    pub url: String,
}

impl AtlasTask {
    pub fn new(url: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), url: url.into() }
    }
}

/// 无界 FIFO 任务队列，多生产者多消费者
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<AtlasTask>>,
    enqueued: AtomicUsize,
    dequeued: AtomicUsize,
    completed: AtomicUsize,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, task: AtlasTask) {
        self.lock().push_back(task);
        self.enqueued.fetch_add(1, Ordering::SeqCst);
    }

    /// 取出即移除，同一个任务只会被取出一次
    pub fn pop(&self) -> Option<AtlasTask> {
        let task = self.lock().pop_front();
        if task.is_some() {
            self.dequeued.fetch_add(1, Ordering::SeqCst);
        }
        task
    }

    pub fn task_done(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn enqueued(&self) -> usize {
        self.enqueued.load(Ordering::SeqCst)
    }

    pub fn dequeued(&self) -> usize {
        self.dequeued.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<AtlasTask>> {
        // 持锁期间不会 panic，中毒时直接沿用内部数据
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
