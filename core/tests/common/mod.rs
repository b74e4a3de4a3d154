//! Test host shared by the controller and integration suites.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use crud_core::{Host, Severity};
use futures::future::LocalBoxFuture;

/// Records notifications and prompts; answers every confirmation with
/// `answer`.
pub struct RecordingHost {
    pub busy: Cell<bool>,
    pub loading_calls: Cell<usize>,
    pub messages: RefCell<Vec<(String, Severity)>>,
    pub prompts: RefCell<Vec<String>>,
    pub answer: Cell<bool>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            busy: Cell::new(false),
            loading_calls: Cell::new(0),
            messages: RefCell::new(Vec::new()),
            prompts: RefCell::new(Vec::new()),
            answer: Cell::new(true),
        }
    }

    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.borrow().clone()
    }

    pub fn last_message(&self) -> Option<(String, Severity)> {
        self.messages.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl Host for RecordingHost {
    async fn with_loading<'a>(&'a self, operation: LocalBoxFuture<'a, ()>) {
        let previous = self.busy.replace(true);
        self.loading_calls.set(self.loading_calls.get() + 1);
        operation.await;
        self.busy.set(previous);
    }

    fn show_message(&self, text: &str, severity: Severity) {
        self.messages.borrow_mut().push((text.to_string(), severity));
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answer.get()
    }
}
