use crate::catalog::{CategoryTree, FetchError, Product, ProductPage};
use crate::feed::FetchTicket;
use crate::{Error, Result};

/// A product page for the detail route together with its related products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DetailPayload {
    pub(crate) product: Product,
    pub(crate) related: Vec<Product>,
}

/// Work that resumes after a suspension point. Requests are issued when the task is queued;
/// the task carries the response that the continuation sees once it is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TaskKind {
    Listing {
        ticket: FetchTicket,
        categories: Option<std::result::Result<CategoryTree, FetchError>>,
        response: std::result::Result<ProductPage, FetchError>,
    },
    Detail {
        route_generation: u64,
        product_id: String,
        response: std::result::Result<DetailPayload, FetchError>,
    },
    ToastDismiss {
        toast_id: u64,
    },
}

impl TaskKind {
    fn label(&self) -> String {
        match self {
            Self::Listing { ticket, .. } => format!(
                "listing generation={} page={} mode={:?}",
                ticket.generation, ticket.page, ticket.mode
            ),
            Self::Detail { product_id, .. } => format!("detail product={product_id}"),
            Self::ToastDismiss { toast_id } => format!("toast-dismiss toast={toast_id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    order: i64,
    pub(crate) kind: TaskKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub label: String,
}

#[derive(Debug)]
pub(crate) struct Scheduler {
    task_queue: Vec<ScheduledTask>,
    now_ms: i64,
    step_limit: usize,
    next_task_id: i64,
    next_task_order: i64,
}

impl Scheduler {
    pub(crate) fn new(step_limit: usize) -> Result<Self> {
        if step_limit == 0 {
            return Err(Error::Config(
                "task step limit requires at least 1 step".into(),
            ));
        }
        Ok(Self {
            task_queue: Vec::new(),
            now_ms: 0,
            step_limit,
            next_task_id: 1,
            next_task_order: 0,
        })
    }

    pub(crate) fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn step_limit(&self) -> usize {
        self.step_limit
    }

    pub(crate) fn schedule(&mut self, delay_ms: i64, kind: TaskKind) -> i64 {
        let id = self.next_task_id;
        self.next_task_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.task_queue.push(ScheduledTask {
            id,
            due_at: self.now_ms.saturating_add(delay_ms.max(0)),
            order,
            kind,
        });
        id
    }

    pub(crate) fn cancel(&mut self, task_id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != task_id);
        before != self.task_queue.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.task_queue.len()
    }

    /// Removes the earliest task, optionally only if it is due by `due_limit`.
    /// With `advance_clock`, the clock jumps forward to the task's due time.
    pub(crate) fn take_next(
        &mut self,
        due_limit: Option<i64>,
        advance_clock: bool,
    ) -> Option<ScheduledTask> {
        let next_idx = self
            .task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)?;
        let task = self.task_queue.remove(next_idx);
        if advance_clock && task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        Some(task)
    }

    pub(crate) fn set_now(&mut self, now_ms: i64) {
        self.now_ms = now_ms;
    }

    pub(crate) fn pending(&self) -> Vec<PendingTask> {
        let mut tasks = self
            .task_queue
            .iter()
            .map(|task| PendingTask {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                label: task.kind.label(),
            })
            .collect::<Vec<_>>();
        tasks.sort_by_key(|task| (task.due_at, task.order));
        tasks
    }

    pub(crate) fn step_limit_error(&self, steps: usize) -> Error {
        Error::Scheduler(format!(
            "task queue exceeded max steps (possible runaway task): limit={}, steps={steps}, now_ms={}, pending={}",
            self.step_limit,
            self.now_ms,
            self.task_queue.len()
        ))
    }
}
