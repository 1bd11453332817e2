//! Wire types for the Todoist sync API and the task file.
//!
//! # Design
//! These mirror the service's JSON shapes field for field. The mock server
//! defines its own copies; integration tests catch drift between the two.
//! A command's `type` tag and its `args` are stored side by side, as the
//! service expects, and only the constructors in `builder` pair them up.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::InputError;

/// The sync token that requests a full resync. Returned tokens are never
/// stored, so every request carries this marker.
pub const FULL_SYNC: &str = "*";

/// One to-do item to create, as read from the task file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub name: String,
    /// An empty string or `null` in the file means "no reminder".
    #[serde(default, deserialize_with = "deserialize_due_time")]
    pub due_time: Option<TimeOfDay>,
}

fn deserialize_due_time<'de, D>(deserializer: D) -> Result<Option<TimeOfDay>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// A 24-hour `HH:MM` time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }
}

impl FromStr for TimeOfDay {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let digits_at = |idx: [usize; 4]| idx.iter().all(|&i| bytes[i].is_ascii_digit());
        if bytes.len() != 5 || bytes[2] != b':' || !digits_at([0, 1, 3, 4]) {
            return Err(InputError::InvalidTimeOfDay(s.to_string()));
        }
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| InputError::InvalidTimeOfDay(s.to_string()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The service's structured "when is this due" value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueExpression {
    pub lang: String,
    pub is_recurring: bool,
    /// Human-readable echo of `date`; the service keys off `date`.
    pub string: String,
    pub date: String,
    pub timezone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    ItemAdd,
    ReminderAdd,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandType::ItemAdd => write!(f, "item_add"),
            CommandType::ReminderAdd => write!(f, "reminder_add"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAddArgs {
    /// Same value as the owning command's `temp_id`.
    pub id: Uuid,
    pub content: String,
    pub due: DueExpression,
    /// RFC 3339 with offset, whole seconds.
    pub date_added: String,
    pub priority: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    Absolute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderAddArgs {
    pub id: Uuid,
    /// The parent item's temp ID, resolved by the service within the batch.
    pub item_id: Uuid,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub due: DueExpression,
}

/// Item args are tried first: reminder payloads lack `content`, and item
/// payloads lack `item_id`, so the two never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandArgs {
    Item(ItemAddArgs),
    Reminder(ReminderAddArgs),
}

/// One operation inside a sync request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub command_type: CommandType,
    /// Operation identifier used by the service to detect replays.
    pub uuid: Uuid,
    pub temp_id: Uuid,
    pub args: CommandArgs,
}

impl Command {
    pub fn item_add(uuid: Uuid, args: ItemAddArgs) -> Self {
        Self {
            command_type: CommandType::ItemAdd,
            uuid,
            temp_id: args.id,
            args: CommandArgs::Item(args),
        }
    }

    pub fn reminder_add(uuid: Uuid, temp_id: Uuid, args: ReminderAddArgs) -> Self {
        Self {
            command_type: CommandType::ReminderAdd,
            uuid,
            temp_id,
            args: CommandArgs::Reminder(args),
        }
    }

    pub fn as_item(&self) -> Option<&ItemAddArgs> {
        match &self.args {
            CommandArgs::Item(args) => Some(args),
            CommandArgs::Reminder(_) => None,
        }
    }

    pub fn as_reminder(&self) -> Option<&ReminderAddArgs> {
        match &self.args {
            CommandArgs::Reminder(args) => Some(args),
            CommandArgs::Item(_) => None,
        }
    }
}

/// Body of a `POST` to the sync endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub sync_token: String,
    pub commands: Vec<Command>,
}

impl RequestEnvelope {
    pub fn full_sync(commands: Vec<Command>) -> Self {
        Self {
            sync_token: FULL_SYNC.to_string(),
            commands,
        }
    }
}

/// Per-command result in `sync_status`: the string `"ok"` or an error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandStatus {
    Ack(String),
    Failed {
        error_code: i64,
        error: String,
    },
}

impl CommandStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandStatus::Ack(s) if s == "ok")
    }
}

/// Permanent identifier assigned by the service. Older API versions return
/// integers, newer ones strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RealId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RealId::Number(n) => write!(f, "{n}"),
            RealId::Text(s) => f.write_str(s),
        }
    }
}

/// The service's acknowledgment of a sync request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseEnvelope {
    pub full_sync: bool,
    pub sync_status: BTreeMap<Uuid, CommandStatus>,
    pub sync_token: Option<String>,
    pub temp_id_mapping: BTreeMap<Uuid, RealId>,
}

impl ResponseEnvelope {
    /// Commands the service reported as not applied.
    pub fn failed_commands(&self) -> impl Iterator<Item = (&Uuid, &CommandStatus)> {
        self.sync_status.iter().filter(|(_, status)| !status.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn due(date: &str) -> DueExpression {
        DueExpression {
            lang: "en".to_string(),
            is_recurring: false,
            string: "every day".to_string(),
            date: date.to_string(),
            timezone: "Asia/Singapore".to_string(),
        }
    }

    #[test]
    fn task_descriptor_with_due_time() {
        let task: TaskDescriptor =
            serde_json::from_str(r#"{"name":"Buy milk","due_time":"09:30"}"#).unwrap();
        assert_eq!(task.name, "Buy milk");
        assert_eq!(task.due_time, TimeOfDay::new(9, 30));
    }

    #[test]
    fn task_descriptor_blank_or_missing_due_time_is_none() {
        for raw in [
            r#"{"name":"a"}"#,
            r#"{"name":"a","due_time":""}"#,
            r#"{"name":"a","due_time":null}"#,
        ] {
            let task: TaskDescriptor = serde_json::from_str(raw).unwrap();
            assert!(task.due_time.is_none(), "{raw}");
        }
    }

    #[test]
    fn task_descriptor_rejects_bad_time() {
        let result: Result<TaskDescriptor, _> =
            serde_json::from_str(r#"{"name":"a","due_time":"25:00"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn time_of_day_requires_two_digit_fields() {
        assert!("9:30".parse::<TimeOfDay>().is_err());
        assert!("09:3".parse::<TimeOfDay>().is_err());
        assert!("0930".parse::<TimeOfDay>().is_err());
        assert!("09:60".parse::<TimeOfDay>().is_err());
        assert!("09: 5".parse::<TimeOfDay>().is_err());
        assert!(" 9:30".parse::<TimeOfDay>().is_err());
        assert!("+9:30".parse::<TimeOfDay>().is_err());
        assert_eq!("23:59".parse::<TimeOfDay>().unwrap().to_string(), "23:59");
    }

    #[test]
    fn command_serializes_type_tag_and_args() {
        let id = Uuid::from_u128(1);
        let cmd = Command::item_add(
            Uuid::from_u128(2),
            ItemAddArgs {
                id,
                content: "Buy milk".to_string(),
                due: due("2024-01-01"),
                date_added: "2024-01-01T08:00:00+08:00".to_string(),
                priority: 1,
            },
        );
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "item_add");
        assert_eq!(json["temp_id"], id.to_string());
        assert_eq!(json["args"]["id"], id.to_string());
        assert_eq!(json["args"]["content"], "Buy milk");
        assert_eq!(json["args"]["due"]["is_recurring"], false);
    }

    #[test]
    fn command_type_display_matches_wire_tag() {
        for kind in [CommandType::ItemAdd, CommandType::ReminderAdd] {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, kind.to_string());
        }
    }

    #[test]
    fn reminder_args_deserialize_as_reminder() {
        let cmd = Command::reminder_add(
            Uuid::from_u128(3),
            Uuid::from_u128(4),
            ReminderAddArgs {
                id: Uuid::from_u128(5),
                item_id: Uuid::from_u128(1),
                reminder_type: ReminderType::Absolute,
                due: due("2024-01-01T09:30:00"),
            },
        );
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains(r#""type":"absolute""#));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
        assert!(back.as_reminder().is_some());
        assert!(back.as_item().is_none());
    }

    #[test]
    fn response_with_numeric_and_string_ids() {
        let body = r#"{
            "full_sync": true,
            "sync_status": {"00000000-0000-0000-0000-000000000002": "ok"},
            "sync_token": "abc",
            "temp_id_mapping": {
                "00000000-0000-0000-0000-000000000001": 2995104339,
                "00000000-0000-0000-0000-000000000003": "6X7rM8997g3RQmvh"
            }
        }"#;
        let resp: ResponseEnvelope = serde_json::from_str(body).unwrap();
        assert!(resp.full_sync);
        assert_eq!(resp.sync_token.as_deref(), Some("abc"));
        assert_eq!(
            resp.temp_id_mapping[&Uuid::from_u128(1)],
            RealId::Number(2995104339)
        );
        assert_eq!(resp.temp_id_mapping[&Uuid::from_u128(3)].to_string(), "6X7rM8997g3RQmvh");
        assert_eq!(resp.failed_commands().count(), 0);
    }

    #[test]
    fn response_reports_failed_commands() {
        let body = r#"{"sync_status": {
            "00000000-0000-0000-0000-000000000002": "ok",
            "00000000-0000-0000-0000-000000000004": {"error_code": 15, "error": "Invalid temporary id"}
        }}"#;
        let resp: ResponseEnvelope = serde_json::from_str(body).unwrap();
        let failed: Vec<_> = resp.failed_commands().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(*failed[0].0, Uuid::from_u128(4));
        assert!(matches!(failed[0].1, CommandStatus::Failed { error_code: 15, .. }));
    }
}
