//! Test utilities: a scripted search backend and worker fixtures.

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::api::{FilterOptions, SearchBackend, SearchResponse};
use crate::error::ApiError;
use crate::query::{FilterSet, QueryKey};
use crate::Worker;

type Reply = Result<SearchResponse, ApiError>;

enum Scripted {
    Ready(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

/// Backend that answers from a script and counts calls.
///
/// With an empty script every search succeeds with `default_workers`.
#[derive(Default)]
pub struct MockBackend {
    calls: Cell<usize>,
    queries: RefCell<Vec<QueryKey>>,
    script: RefCell<VecDeque<Scripted>>,
    default_workers: Vec<Worker>,
    options: FilterOptions,
}

impl MockBackend {
    pub fn returning(workers: Vec<Worker>) -> Self {
        Self {
            default_workers: workers,
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    /// Queue the reply for the next search.
    pub fn push_reply(&self, reply: Reply) {
        self.script.borrow_mut().push_back(Scripted::Ready(reply));
    }

    /// Queue a reply that arrives when the returned sender fires.
    pub fn push_deferred(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.script.borrow_mut().push_back(Scripted::Deferred(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Keys of every search that reached the backend, in call order.
    pub fn queries(&self) -> Vec<QueryKey> {
        self.queries.borrow().clone()
    }
}

impl SearchBackend for MockBackend {
    fn search<'a>(&'a self, filters: &'a FilterSet) -> LocalBoxFuture<'a, Reply> {
        self.calls.set(self.calls.get() + 1);
        self.queries.borrow_mut().push(filters.encode());
        let next = self.script.borrow_mut().pop_front();
        let default_reply = response(self.default_workers.clone());
        async move {
            match next {
                Some(Scripted::Ready(reply)) => reply,
                Some(Scripted::Deferred(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err(ApiError::Network("request dropped".into()))),
                None => Ok(default_reply),
            }
        }
        .boxed_local()
    }

    fn filter_options(&self) -> LocalBoxFuture<'_, Result<FilterOptions, ApiError>> {
        let options = self.options.clone();
        async move { Ok(options) }.boxed_local()
    }
}

pub fn response(workers: Vec<Worker>) -> SearchResponse {
    SearchResponse {
        total_count: workers.len(),
        page: 1,
        total_pages: 1,
        workers,
    }
}

pub fn worker(id: u64, full_name: &str) -> Worker {
    Worker {
        id,
        full_name: full_name.to_string(),
        region_of_origin: "Addis Ababa".to_string(),
        skills: vec!["Cooking".to_string()],
        ..Worker::default()
    }
}

pub fn workers(count: u64) -> Vec<Worker> {
    (1..=count)
        .map(|i| worker(i, &format!("Worker {}", i)))
        .collect()
}
