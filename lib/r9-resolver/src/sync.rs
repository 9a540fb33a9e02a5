/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::io;
use std::thread::JoinHandle;

use log::warn;
use tokio::sync::mpsc;

type ContextTask = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone, Debug)]
enum ContextCommand {
    Quit,
}

/// A serialized single-flight task queue.
///
/// Tasks submitted through a [`SyncHandle`] run one at a time, in submission
/// order, on a dedicated worker thread. Tasks must not block; blocking work
/// goes to an offload runtime and re-enters the context as a new task.
pub struct SyncContext {
    name: String,
    handle: SyncHandle,
    ctl_sender: mpsc::UnboundedSender<ContextCommand>,
    thread_handle: Option<JoinHandle<()>>,
}

/// The submission side of a [`SyncContext`], safe to clone and to call from
/// any thread, including from inside a running task.
#[derive(Clone, Debug)]
pub struct SyncHandle {
    task_sender: mpsc::UnboundedSender<ContextTask>,
}

impl PartialEq for SyncHandle {
    fn eq(&self, other: &Self) -> bool {
        self.task_sender.same_channel(&other.task_sender)
    }
}

impl SyncHandle {
    /// Queue `task` behind all previously queued tasks. Submissions to a
    /// context that has shut down are dropped silently.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let _ = self.task_sender.send(Box::new(task));
    }

    pub fn is_closed(&self) -> bool {
        self.task_sender.is_closed()
    }
}

impl SyncContext {
    pub fn spawn(name: &str) -> io::Result<SyncContext> {
        let (task_sender, task_receiver) = mpsc::unbounded_channel();
        let (ctl_sender, ctl_receiver) = mpsc::unbounded_channel();

        let thread_handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let basic_rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        warn!("failed to build sync context runtime: {e}");
                        return;
                    }
                };
                basic_rt.block_on(drain(task_receiver, ctl_receiver));
            })?;

        Ok(SyncContext {
            name: name.to_string(),
            handle: SyncHandle { task_sender },
            ctl_sender,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> SyncHandle {
        self.handle.clone()
    }

    fn stop(&self) {
        let _ = self.ctl_sender.send(ContextCommand::Quit);
    }

    /// Stop the worker after the tasks already queued have run, then join it.
    pub fn shutdown(&mut self) {
        if let Some(join) = self.thread_handle.take() {
            self.stop();
            let thread_id = join.thread().id();
            if let Err(e) = join.join() {
                warn!(
                    "error while waiting thread {thread_id:?} for sync context {}: {e:?}",
                    self.name
                );
            }
        }
    }
}

impl Drop for SyncContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn drain(
    mut task_receiver: mpsc::UnboundedReceiver<ContextTask>,
    mut ctl_receiver: mpsc::UnboundedReceiver<ContextCommand>,
) {
    loop {
        tokio::select! {
            r = ctl_receiver.recv() => match r {
                Some(ContextCommand::Quit) | None => {
                    // run what was queued before the quit command, then stop
                    while let Ok(task) = task_receiver.try_recv() {
                        task();
                    }
                    break;
                }
            },
            r = task_receiver.recv() => match r {
                Some(task) => task(),
                None => break,
            },
        }
    }
}
