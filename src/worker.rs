//! Native sampling worker: runs the pipeline off the caller's thread.
//!
//! The caller submits one `SamplingConfig` at a time and receives one
//! reply carrying all four series. At most one request is honored at a
//! time: submitting again supersedes the run in flight. Requests carry
//! a generation number; the worker abandons a batch as soon as a newer
//! request is queued, and the client drops any reply whose generation
//! is stale, so overlapping plot/audio updates cannot occur.
//!
//! The worker thread owns the evaluation loop exclusively and the
//! caller owns everything downstream, so the two sides share no mutable
//! state, only copied messages.

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use std::thread;

use crate::config::SamplingConfig;
use crate::error::ConfigError;
use crate::sampler::{SampleBatch, generate_samples_cancellable};

/// One sampling request. The generation tags the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRequest {
    pub generation: u64,
    pub config: SamplingConfig,
}

/// The worker's atomic reply to one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleReply {
    pub generation: u64,
    pub batch: SampleBatch,
}

/// Handle to a background sampling thread. Dropping the handle closes
/// the request channel and the thread exits on its own.
pub struct SamplerWorker {
    request_tx: Sender<SampleRequest>,
    reply_rx: Receiver<SampleReply>,
    generation: u64,
}

impl SamplerWorker {
    /// Spawn the worker thread.
    pub fn spawn() -> Self {
        let (request_tx, request_rx) = unbounded::<SampleRequest>();
        let (reply_tx, reply_rx) = unbounded();

        thread::spawn(move || worker_loop(request_rx, reply_tx));

        SamplerWorker {
            request_tx,
            reply_rx,
            generation: 0,
        }
    }

    /// Validate and submit a config, superseding any run in flight.
    /// Returns the request's generation. A degenerate config is
    /// rejected here, before the worker ever sees it.
    pub fn submit(&mut self, config: SamplingConfig) -> Result<u64, ConfigError> {
        config.validate()?;
        self.generation += 1;
        let generation = self.generation;
        // A send can only fail if the worker thread is gone; the
        // recv side reports that as a missing reply.
        let _ = self.request_tx.send(SampleRequest { generation, config });
        Ok(generation)
    }

    /// Block until the reply for the latest submitted request arrives.
    /// Replies for superseded generations are dropped on the way.
    /// Returns `None` if the worker thread has died.
    pub fn recv_latest(&self) -> Option<SampleBatch> {
        while let Ok(reply) = self.reply_rx.recv() {
            if reply.generation == self.generation {
                return Some(reply.batch);
            }
            log::debug!("dropping stale reply for generation {}", reply.generation);
        }
        None
    }

    /// Non-blocking poll for the latest reply.
    pub fn try_recv(&self) -> Option<SampleBatch> {
        while let Ok(reply) = self.reply_rx.try_recv() {
            if reply.generation == self.generation {
                return Some(reply.batch);
            }
            log::debug!("dropping stale reply for generation {}", reply.generation);
        }
        None
    }
}

fn worker_loop(request_rx: Receiver<SampleRequest>, reply_tx: Sender<SampleReply>) {
    while let Ok(request) = request_rx.recv() {
        // A newer request already queued supersedes this one outright.
        if !request_rx.is_empty() {
            log::debug!("skipping superseded request {}", request.generation);
            continue;
        }

        match generate_samples_cancellable(&request.config, || !request_rx.is_empty()) {
            Ok(Some(batch)) => {
                let reply = SampleReply {
                    generation: request.generation,
                    batch,
                };
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
            Ok(None) => {
                log::debug!("request {} cancelled mid-run", request.generation);
            }
            Err(e) => {
                log::warn!("request {} carried an invalid config: {e}", request.generation);
            }
        }
    }
}
