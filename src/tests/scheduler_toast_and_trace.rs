use super::*;

use crate::dom::NodeId;
use crate::events::{Delegate, ListenerStore};
use crate::scheduler::{Scheduler, TaskKind};
use crate::toast::ToastController;
use crate::trace::{TraceCategory, TraceState};

fn dismiss(toast_id: u64) -> TaskKind {
    TaskKind::ToastDismiss { toast_id }
}

#[test]
fn scheduler_runs_tasks_by_due_time_then_insertion_order() -> Result<()> {
    let mut scheduler = Scheduler::new(100)?;
    let late = scheduler.schedule(300, dismiss(1));
    let early_a = scheduler.schedule(100, dismiss(2));
    let early_b = scheduler.schedule(100, dismiss(3));
    let immediate = scheduler.schedule(-5, dismiss(4));

    let pending = scheduler.pending();
    assert_eq!(
        pending.iter().map(|task| task.id).collect::<Vec<_>>(),
        vec![immediate, early_a, early_b, late]
    );
    assert_eq!(pending[0].due_at, 0);
    assert_eq!(pending[0].label, "toast-dismiss toast=4");

    let due_now = scheduler
        .take_next(Some(0), true)
        .ok_or_else(|| Error::Scheduler("immediate task missing".into()))?;
    assert_eq!(due_now.id, immediate);
    assert!(scheduler.take_next(Some(50), true).is_none());

    let next = scheduler
        .take_next(None, true)
        .ok_or_else(|| Error::Scheduler("task missing".into()))?;
    assert_eq!(next.id, early_a);
    assert_eq!(scheduler.now_ms(), 100);
    Ok(())
}

#[test]
fn cancel_removes_only_the_named_task() -> Result<()> {
    let mut scheduler = Scheduler::new(10)?;
    let kept = scheduler.schedule(3000, dismiss(1));
    let cancelled = scheduler.schedule(3000, dismiss(2));
    assert!(scheduler.cancel(cancelled));
    assert!(!scheduler.cancel(cancelled));
    assert_eq!(scheduler.len(), 1);
    assert_eq!(scheduler.pending()[0].id, kept);
    Ok(())
}

#[test]
fn zero_step_limit_is_a_config_error() {
    assert!(matches!(Scheduler::new(0), Err(Error::Config(_))));
    let Ok(scheduler) = Scheduler::new(5) else {
        panic!("valid step limit rejected");
    };
    let message = scheduler.step_limit_error(6).to_string();
    assert!(message.contains("limit=5"));
    assert!(message.contains("steps=6"));
}

#[test]
fn toast_replacement_hands_back_the_old_timer() {
    let mut toasts = ToastController::default();
    let (first, replaced) = toasts.show(ToastKind::Success, "장바구니에 추가되었습니다");
    assert_eq!(replaced, None);
    toasts.attach_timer(11);

    let (second, replaced) = toasts.show(ToastKind::Info, "구매 기능은 준비 중입니다.");
    assert_eq!(replaced, Some(11));
    assert_ne!(first.id, second.id);

    // The first toast's timer can no longer dismiss anything.
    assert!(!toasts.dismiss(first.id));
    assert_eq!(toasts.current().map(|toast| toast.kind), Some(ToastKind::Info));

    toasts.attach_timer(12);
    assert_eq!(toasts.close(), Some(12));
    assert!(toasts.current().is_none());
    assert_eq!(toasts.close(), None);
}

#[test]
fn toast_dismiss_clears_the_matching_toast() {
    let mut toasts = ToastController::default();
    let (toast, _) = toasts.show(ToastKind::Error, "장바구니 변경에 실패했습니다.");
    toasts.attach_timer(1);
    assert!(toasts.dismiss(toast.id));
    assert!(toasts.current().is_none());
    assert_eq!(toasts.close(), None);
}

#[test]
fn trace_lines_are_prefixed_filtered_and_bounded() -> Result<()> {
    let mut trace = TraceState::default();
    trace.enabled = true;
    trace.to_stderr = false;
    trace.line(TraceCategory::Fetch, "replaced count=20");
    trace.fetch = false;
    trace.line(TraceCategory::Fetch, "hidden");
    trace.line(TraceCategory::Cart, "add p001");
    assert_eq!(
        trace.take_logs(),
        vec!["[fetch] replaced count=20", "[cart] add p001"]
    );

    for idx in 0..5 {
        trace.line(TraceCategory::Timer, format!("tick {idx}"));
    }
    trace.set_log_limit(2)?;
    assert_eq!(trace.take_logs(), vec!["[timer] tick 3", "[timer] tick 4"]);
    assert!(matches!(trace.set_log_limit(0), Err(Error::Config(_))));

    trace.enabled = false;
    trace.line(TraceCategory::Route, "ignored");
    assert!(trace.take_logs().is_empty());
    Ok(())
}

#[test]
fn rebinding_a_delegate_never_duplicates_it() {
    let mut listeners = ListenerStore::default();
    let body = NodeId(1);
    let document = NodeId(0);

    assert!(!listeners.rebind(body, "click", Delegate::BodyClick));
    assert!(listeners.rebind(body, "click", Delegate::BodyClick));
    listeners.rebind(document, "scroll", Delegate::InfiniteScroll);
    assert_eq!(listeners.count("click"), 1);
    assert_eq!(listeners.get(document, "scroll"), vec![Delegate::InfiniteScroll]);

    assert!(listeners.remove(document, "scroll", Delegate::InfiniteScroll));
    assert!(!listeners.remove(document, "scroll", Delegate::InfiniteScroll));
    assert!(listeners.get(document, "scroll").is_empty());
    assert_eq!(Delegate::ModalEscape.label(), "modal-escape");
}
