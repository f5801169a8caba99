use super::*;

use crate::catalog::ProductPage;
use crate::feed::{FeedOutcome, FetchMode, FetchTicket};
use crate::scheduler::{PendingTask, ScheduledTask};

impl<C: Catalog, S: Storage> Storefront<C, S> {
    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms()
    }

    pub fn pending_tasks(&self) -> Vec<PendingTask> {
        self.scheduler.pending()
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Scheduler(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.scheduler.now_ms();
        let target = from.saturating_add(delta_ms);
        let ran = self.run_task_queue(Some(target))?;
        self.scheduler.set_now(target);
        self.trace.line(
            TraceCategory::Timer,
            format!("advance delta_ms={delta_ms} from={from} to={target} ran_due={ran}"),
        );
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        let from = self.scheduler.now_ms();
        if target_ms < from {
            return Err(Error::Scheduler(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={from})"
            )));
        }
        let ran = self.run_task_queue(Some(target_ms))?;
        self.scheduler.set_now(target_ms);
        self.trace.line(
            TraceCategory::Timer,
            format!("advance_to from={from} to={target_ms} ran_due={ran}"),
        );
        Ok(())
    }

    /// Runs every queued task, jumping the clock forward as needed.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.scheduler.now_ms();
        let ran = self.run_task_queue(None)?;
        self.trace.line(
            TraceCategory::Timer,
            format!(
                "flush from={from} to={} ran={ran} pending={}",
                self.scheduler.now_ms(),
                self.scheduler.len()
            ),
        );
        Ok(())
    }

    pub fn run_next_task(&mut self) -> Result<bool> {
        let Some(task) = self.scheduler.take_next(None, true) else {
            self.trace.line(TraceCategory::Timer, "run_next none");
            return Ok(false);
        };
        self.execute_task(task)?;
        Ok(true)
    }

    pub(crate) fn run_due_tasks(&mut self) -> Result<()> {
        let now = self.scheduler.now_ms();
        self.run_task_queue(Some(now))?;
        Ok(())
    }

    fn run_task_queue(&mut self, due_limit: Option<i64>) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(task) = self.scheduler.take_next(due_limit, true) {
            steps += 1;
            if steps > self.scheduler.step_limit() {
                return Err(self.scheduler.step_limit_error(steps));
            }
            self.execute_task(task)?;
        }
        Ok(steps)
    }

    fn execute_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace.line(
            TraceCategory::Timer,
            format!(
                "run id={} due_at={} now_ms={}",
                task.id,
                task.due_at,
                self.scheduler.now_ms()
            ),
        );
        match task.kind {
            TaskKind::Listing {
                ticket,
                categories,
                response,
            } => self.complete_listing(ticket, categories, response),
            TaskKind::Detail {
                route_generation,
                product_id,
                response,
            } => self.complete_detail(route_generation, product_id, response),
            TaskKind::ToastDismiss { toast_id } => {
                if self.toasts.dismiss(toast_id) {
                    self.trace
                        .line(TraceCategory::Timer, format!("toast dismissed id={toast_id}"));
                    self.paint_toast()?;
                }
                Ok(())
            }
        }
    }

    fn complete_listing(
        &mut self,
        ticket: FetchTicket,
        categories: Option<std::result::Result<CategoryTree, FetchError>>,
        response: std::result::Result<ProductPage, FetchError>,
    ) -> Result<()> {
        let mut categories_changed = false;
        match categories {
            Some(Ok(tree)) => {
                self.categories = Some(tree);
                categories_changed = true;
            }
            Some(Err(err)) => {
                self.categories_requested = false;
                self.trace
                    .line(TraceCategory::Fetch, format!("categories failed: {err}"));
            }
            None => {}
        }

        let failure = response.as_ref().err().map(ToString::to_string);
        let outcome = self.feed.complete(ticket, response);
        match &outcome {
            FeedOutcome::Stale { generation } => {
                self.trace.line(
                    TraceCategory::Fetch,
                    format!(
                        "stale response generation={generation} current={}",
                        self.feed.generation()
                    ),
                );
                if categories_changed && self.route == Route::Listing {
                    self.paint()?;
                }
                return Ok(());
            }
            FeedOutcome::Failed { mode } => {
                if *mode == FetchMode::Append {
                    self.filters.rewind_page(ticket.page);
                }
                self.trace.line(
                    TraceCategory::Fetch,
                    format!(
                        "failed mode={mode:?} page={}: {}",
                        ticket.page,
                        failure.unwrap_or_default()
                    ),
                );
            }
            FeedOutcome::Replaced { count, has_more } => self.trace.line(
                TraceCategory::Fetch,
                format!("replaced count={count} has_more={has_more}"),
            ),
            FeedOutcome::Appended { added, has_more } => self.trace.line(
                TraceCategory::Fetch,
                format!(
                    "appended added={added} total_items={} has_more={has_more}",
                    self.feed.items().len()
                ),
            ),
        }

        if self.route == Route::Listing {
            self.paint()?;
        }
        Ok(())
    }

    fn complete_detail(
        &mut self,
        route_generation: u64,
        product_id: String,
        response: std::result::Result<DetailPayload, FetchError>,
    ) -> Result<()> {
        let current = Route::Detail(product_id.clone());
        if route_generation != self.route_generation || self.route != current {
            self.trace.line(
                TraceCategory::Fetch,
                format!(
                    "stale detail product={product_id} route_generation={route_generation} current={}",
                    self.route_generation
                ),
            );
            return Ok(());
        }

        self.detail = match response {
            Ok(payload) => {
                self.trace.line(
                    TraceCategory::Fetch,
                    format!(
                        "detail product={product_id} related={}",
                        payload.related.len()
                    ),
                );
                DetailState::Loaded {
                    product: payload.product,
                    related: payload.related,
                    quantity: 1,
                }
            }
            Err(err) => {
                self.trace
                    .line(TraceCategory::Fetch, format!("detail failed: {err}"));
                DetailState::Missing
            }
        };
        self.paint()
    }
}
