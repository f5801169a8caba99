#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Single-slot notification. A new toast replaces the visible one and takes over the dismiss
/// timer; the caller cancels whatever timer id [`show`](Self::show) or [`close`](Self::close)
/// hands back.
#[derive(Debug, Default)]
pub(crate) struct ToastController {
    current: Option<Toast>,
    timer_id: Option<i64>,
    next_id: u64,
}

impl ToastController {
    pub(crate) fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Installs a new toast and returns it together with the timer of the toast it replaced.
    pub(crate) fn show(&mut self, kind: ToastKind, message: &str) -> (Toast, Option<i64>) {
        self.next_id += 1;
        let toast = Toast {
            id: self.next_id,
            kind,
            message: message.to_string(),
        };
        self.current = Some(toast.clone());
        (toast, self.timer_id.take())
    }

    pub(crate) fn attach_timer(&mut self, timer_id: i64) {
        self.timer_id = Some(timer_id);
    }

    /// Manual close. Returns the pending dismiss timer that must be cancelled.
    pub(crate) fn close(&mut self) -> Option<i64> {
        self.current = None;
        self.timer_id.take()
    }

    /// Auto-dismiss. Only the toast the timer was started for may be dismissed.
    pub(crate) fn dismiss(&mut self, toast_id: u64) -> bool {
        if self.current.as_ref().is_some_and(|toast| toast.id == toast_id) {
            self.current = None;
            self.timer_id = None;
            return true;
        }
        false
    }
}
