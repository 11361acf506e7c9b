// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use chartboard_app::{Completion, OutboundRequest, RemoteAction, RequestId};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use crate::{Client, RemoteError};

/// A request that failed. Handed to the error side channel and nowhere else.
#[derive(Debug)]
pub struct RemoteFailure {
    pub id: RequestId,
    pub action: RemoteAction,
    pub error: RemoteError,
}

pub trait ErrorReporter: Send + Sync {
    fn report(&self, failure: &RemoteFailure);
}

impl<F> ErrorReporter for F
where
    F: Fn(&RemoteFailure) + Send + Sync,
{
    fn report(&self, failure: &RemoteFailure) {
        self(failure);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, failure: &RemoteFailure) {
        tracing::error!(
            request = failure.id.get(),
            action = failure.action.as_str(),
            error = %failure.error,
            "remote request failed"
        );
    }
}

/// Runs store requests off the calling thread.
///
/// `issue` returns immediately. A successful request sends exactly one
/// `Completion` on the channel; a failed one is reported exactly once and
/// sends nothing.
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    completions: Sender<Completion>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Dispatcher {
    pub fn new(client: Client, completions: Sender<Completion>) -> Self {
        Self::with_reporter(client, completions, Arc::new(TracingReporter))
    }

    pub fn with_reporter(
        client: Client,
        completions: Sender<Completion>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            client,
            completions,
            reporter,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn issue(&self, outbound: OutboundRequest) -> JoinHandle<()> {
        let client = self.client.clone();
        let completions = self.completions.clone();
        let reporter = Arc::clone(&self.reporter);
        tracing::debug!(
            request = outbound.id.get(),
            action = outbound.request.action().as_str(),
            "issuing remote request"
        );

        thread::spawn(move || {
            let OutboundRequest { id, request } = outbound;
            match client.execute(&request) {
                Ok(reply) => {
                    // The board may already be gone; nobody is waiting then.
                    let _ = completions.send(Completion { id, reply });
                }
                Err(error) => reporter.report(&RemoteFailure {
                    id,
                    action: request.action(),
                    error,
                }),
            }
        })
    }
}
