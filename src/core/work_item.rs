//! Work item trait and related types

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// A unit of work executed by the pool, followed by a completion notification.
///
/// The pool calls [`execute`](WorkItem::execute) and then
/// [`on_complete`](WorkItem::on_complete) on the same worker thread, exactly
/// once each. Nothing is returned to the submitter; results are reported from
/// `on_complete` or read back through shared state.
///
/// A panic raised by either method is not caught unless the pool was built
/// with [`PanicPolicy::Isolate`](crate::pool::PanicPolicy::Isolate).
pub trait WorkItem: Send {
    /// Perform the work. May block for as long as it needs.
    fn execute(&mut self);

    /// Called once after `execute` returns.
    fn on_complete(&mut self) {}

    /// Label used in logs and tracing spans
    fn name(&self) -> &str {
        "WorkItem"
    }
}

impl fmt::Debug for dyn WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkItem({})", self.name())
    }
}

/// A boxed work item that can be sent across threads
pub type BoxedWorkItem = Box<dyn WorkItem>;

impl<W: WorkItem + ?Sized> WorkItem for Box<W> {
    fn execute(&mut self) {
        (**self).execute();
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Shared work item: the submitter keeps a clone of the `Arc` and can inspect
/// the item once its completion callback has fired.
///
/// The lock is held for the duration of each call, so a caller polling the
/// item blocks while it executes.
impl<T: WorkItem> WorkItem for Arc<Mutex<T>> {
    fn execute(&mut self) {
        self.lock().execute();
    }

    fn on_complete(&mut self) {
        self.lock().on_complete();
    }

    fn name(&self) -> &str {
        "SharedWorkItem"
    }
}

type CompletionFn = Box<dyn FnOnce() + Send>;

/// Helper to create a work item from closures
pub struct FnWorkItem<F>
where
    F: FnOnce() + Send,
{
    work: Option<F>,
    completion: Option<CompletionFn>,
    name: String,
}

impl<F> FnWorkItem<F>
where
    F: FnOnce() + Send,
{
    /// Create a new closure work item
    pub fn new(work: F) -> Self {
        Self {
            work: Some(work),
            completion: None,
            name: "FnWorkItem".to_string(),
        }
    }

    /// Create a new closure work item with a custom name
    pub fn with_name<S: Into<String>>(work: F, name: S) -> Self {
        Self {
            work: Some(work),
            completion: None,
            name: name.into(),
        }
    }

    /// Attach a completion callback
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_completion<C>(mut self, completion: C) -> Self
    where
        C: FnOnce() + Send + 'static,
    {
        self.completion = Some(Box::new(completion));
        self
    }
}

impl<F> WorkItem for FnWorkItem<F>
where
    F: FnOnce() + Send,
{
    fn execute(&mut self) {
        if let Some(work) = self.work.take() {
            work();
        } else {
            log::warn!("{} executed twice; ignoring second run", self.name);
        }
    }

    fn on_complete(&mut self) {
        if let Some(completion) = self.completion.take() {
            completion();
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnWorkItem<F>
where
    F: FnOnce() + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnWorkItem")
            .field("name", &self.name)
            .field("pending", &self.work.is_some())
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}
