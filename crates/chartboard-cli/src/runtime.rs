// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use chartboard_app::{Completion, OutboundRequest};
use chartboard_remote::{Client, Dispatcher};
use std::sync::mpsc::{self, Receiver};

/// Connects the board to a live store: requests go out on worker threads and
/// completions come back over a channel drained on the UI thread.
pub struct RemoteRuntime {
    dispatcher: Dispatcher,
    completions: Receiver<Completion>,
}

impl RemoteRuntime {
    pub fn new(client: Client) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            dispatcher: Dispatcher::new(client, tx),
            completions: rx,
        }
    }
}

impl chartboard_tui::BoardRuntime for RemoteRuntime {
    fn issue(&mut self, request: OutboundRequest) -> Result<()> {
        tracing::debug!(
            request = %request.id,
            endpoint = %self.dispatcher.client().endpoint(),
            "handing request to worker"
        );
        // Workers are detached; a failure is reported from the worker itself.
        let _worker = self.dispatcher.issue(request);
        Ok(())
    }

    fn drain_completions(&mut self) -> Vec<Completion> {
        self.completions.try_iter().collect()
    }
}
