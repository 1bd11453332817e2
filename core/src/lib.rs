//! Core of the Todoist task sync.
//!
//! # Overview
//! Turns task descriptors into Todoist sync commands, wraps them in request
//! envelopes and decodes the service's acknowledgment. Network I/O stays
//! with the caller (host-does-IO pattern): the core builds `HttpRequest`
//! values and parses `HttpResponse` values, and the `Transport` trait is the
//! seam where a real client plugs in.
//!
//! # Design
//! - `CommandBuilder` emits `item_add`, then `reminder_add` when the task has
//!   a due time, with the reminder pointing at the item's temp ID.
//! - `SyncClient` is stateless; it holds only the endpoint and the token.
//! - `Dispatcher` sends one envelope per task (or one per run in batch mode)
//!   and records a per-task outcome instead of stopping at the first failure.
//! - The sync token is always `"*"`; returned tokens are not kept.

pub mod builder;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod due;
pub mod error;
pub mod http;
pub mod ids;
pub mod tasks;
pub mod types;

pub use builder::CommandBuilder;
pub use client::SyncClient;
pub use config::{ApiToken, Settings};
pub use dispatch::{plan, Batch, Delivery, Dispatcher, RunReport, SubmitError, TaskOutcome, TaskReport};
pub use error::{ApiError, ConfigError, InputError, TransportError};
pub use http::{HttpRequest, HttpResponse, Transport};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use tasks::{load_tasks, parse_tasks};
pub use types::{
    Command, CommandArgs, CommandStatus, CommandType, DueExpression, ItemAddArgs, RealId, ReminderAddArgs,
    ReminderType, RequestEnvelope, ResponseEnvelope, TaskDescriptor, TimeOfDay,
};
