//! Build, send and decode, one request at a time.
//!
//! # Design
//! Planning (turning tasks into envelopes) is pure and shared with dry runs.
//! Sending goes through the `Transport` trait so the core never owns a socket.
//! A failed submission is recorded against its task(s) and the run carries
//! on with the next envelope; nothing is retried.

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use crate::builder::CommandBuilder;
use crate::client::SyncClient;
use crate::config::{ApiToken, Settings};
use crate::error::{ApiError, TransportError};
use crate::http::Transport;
use crate::ids::IdGenerator;
use crate::types::{RequestEnvelope, ResponseEnvelope, TaskDescriptor};

/// How commands are grouped into requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// One request per task.
    #[default]
    PerTask,
    /// One request carrying every task's commands, in task order.
    Batch,
}

/// One request's worth of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub task_names: Vec<String>,
    pub envelope: RequestEnvelope,
}

/// Turn tasks into request envelopes without sending anything.
pub fn plan<G: IdGenerator>(
    builder: &mut CommandBuilder<G>,
    tasks: &[TaskDescriptor],
    now: &DateTime<Tz>,
    delivery: Delivery,
) -> Vec<Batch> {
    let per_task = tasks.iter().map(|task| {
        let commands = builder.build(task, now);
        for command in &commands {
            debug!(task = %task.name, command = %command.command_type, temp_id = %command.temp_id, "built");
        }
        (task.name.clone(), commands)
    });

    match delivery {
        Delivery::PerTask => per_task
            .map(|(name, commands)| Batch {
                task_names: vec![name],
                envelope: RequestEnvelope::full_sync(commands),
            })
            .collect(),
        Delivery::Batch => {
            let mut task_names = Vec::new();
            let mut commands = Vec::new();
            for (name, task_commands) in per_task {
                task_names.push(name);
                commands.extend(task_commands);
            }
            if task_names.is_empty() {
                return Vec::new();
            }
            vec![Batch {
                task_names,
                envelope: RequestEnvelope::full_sync(commands),
            }]
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Submitted(ResponseEnvelope),
    /// The service accepted the request but its reply could not be decoded.
    SubmittedUnreadable(ApiError),
    Failed(SubmitError),
    /// Planned but deliberately not sent.
    DryRun,
}

impl TaskOutcome {
    pub fn was_submitted(&self) -> bool {
        matches!(
            self,
            TaskOutcome::Submitted(_) | TaskOutcome::SubmittedUnreadable(_)
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct TaskReport {
    pub name: String,
    pub outcome: TaskOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub tasks: Vec<TaskReport>,
    /// Commands the service acknowledged with an error status.
    pub rejected_commands: usize,
}

impl RunReport {
    /// Report for batches that were planned but not sent.
    pub fn dry_run(batches: &[Batch]) -> Self {
        let tasks = batches
            .iter()
            .flat_map(|batch| &batch.task_names)
            .map(|name| TaskReport {
                name: name.clone(),
                outcome: TaskOutcome::DryRun,
            })
            .collect();
        Self {
            tasks,
            rejected_commands: 0,
        }
    }

    pub fn submitted(&self) -> usize {
        self.tasks.iter().filter(|t| t.outcome.was_submitted()).count()
    }

    pub fn failed(&self) -> usize {
        self.tasks.iter().filter(|t| t.outcome.is_failure()).count()
    }

    pub fn planned_only(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(t.outcome, TaskOutcome::DryRun))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

pub struct Dispatcher<G, T> {
    builder: CommandBuilder<G>,
    client: SyncClient,
    transport: T,
    delivery: Delivery,
}

impl<G: IdGenerator, T: Transport> Dispatcher<G, T> {
    /// Requiring an `ApiToken` here means no request can be sent until the
    /// token has been validated.
    pub fn new(settings: &Settings, token: ApiToken, ids: G, transport: T, delivery: Delivery) -> Self {
        Self {
            builder: CommandBuilder::new(ids, &settings.lang, settings.priority),
            client: SyncClient::new(&settings.endpoint, token),
            transport,
            delivery,
        }
    }

    pub fn run(&mut self, tasks: &[TaskDescriptor], now: &DateTime<Tz>) -> RunReport {
        let batches = plan(&mut self.builder, tasks, now, self.delivery);
        let mut report = RunReport::default();
        for batch in batches {
            info!(
                endpoint = self.client.endpoint(),
                tasks = ?batch.task_names,
                commands = batch.envelope.commands.len(),
                "submitting"
            );
            let outcome = self.submit(&batch.envelope);
            if let TaskOutcome::Submitted(ack) = &outcome {
                report.rejected_commands += ack.failed_commands().count();
            }
            for name in batch.task_names {
                report.tasks.push(TaskReport {
                    name,
                    outcome: outcome.clone(),
                });
            }
        }
        report
    }

    fn submit(&mut self, envelope: &RequestEnvelope) -> TaskOutcome {
        let request = match self.client.build_sync(envelope) {
            Ok(request) => request,
            Err(e) => return TaskOutcome::Failed(e.into()),
        };
        debug!(url = %request.url, body = %request.body, "sync request");

        let response = match self.transport.execute(request) {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "request failed");
                return TaskOutcome::Failed(e.into());
            }
        };

        match self.client.parse_sync(response) {
            Ok(ack) => {
                for (temp_id, real_id) in &ack.temp_id_mapping {
                    info!(%temp_id, %real_id, "created");
                }
                for (uuid, status) in ack.failed_commands() {
                    warn!(command = %uuid, ?status, "command rejected");
                }
                debug!(sync_token = ?ack.sync_token, "sync token not retained");
                TaskOutcome::Submitted(ack)
            }
            Err(e @ ApiError::DeserializationError(_)) => {
                warn!(error = %e, "submitted, but the response could not be read");
                TaskOutcome::SubmittedUnreadable(e)
            }
            Err(e) => {
                error!(error = %e, "request rejected");
                TaskOutcome::Failed(e.into())
            }
        }
    }
}
