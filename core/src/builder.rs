//! Translation of a task descriptor into sync commands.
//!
//! # Design
//! `build` returns freshly allocated commands on every call and keeps no
//! per-task state; the only thing carried between calls is the identifier
//! source. The item's temp ID is drawn once and threaded into the reminder's
//! `item_id`, which is how the service links the two inside one request.

use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;

use crate::due::{reminder_due, task_due};
use crate::ids::IdGenerator;
use crate::types::{Command, ItemAddArgs, ReminderAddArgs, ReminderType, TaskDescriptor};

pub const DEFAULT_PRIORITY: u8 = 1;

#[derive(Debug, Clone)]
pub struct CommandBuilder<G> {
    ids: G,
    lang: String,
    priority: u8,
}

impl<G: IdGenerator> CommandBuilder<G> {
    pub fn new(ids: G, lang: &str, priority: u8) -> Self {
        Self {
            ids,
            lang: lang.to_string(),
            priority,
        }
    }

    /// `[item_add]`, or `[item_add, reminder_add]` when the task has a due
    /// time. The order matters: the reminder refers to the item's temp ID.
    pub fn build(&mut self, task: &TaskDescriptor, now: &DateTime<Tz>) -> Vec<Command> {
        let item_temp_id = self.ids.next_id();
        let item = Command::item_add(
            self.ids.next_id(),
            ItemAddArgs {
                id: item_temp_id,
                content: task.name.clone(),
                due: task_due(now, &self.lang),
                date_added: now.to_rfc3339_opts(SecondsFormat::Secs, false),
                priority: self.priority,
            },
        );

        let Some(at) = task.due_time else {
            return vec![item];
        };

        let reminder = Command::reminder_add(
            self.ids.next_id(),
            self.ids.next_id(),
            ReminderAddArgs {
                id: self.ids.next_id(),
                item_id: item_temp_id,
                reminder_type: ReminderType::Absolute,
                due: reminder_due(now, at, &self.lang),
            },
        );
        vec![item, reminder]
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Asia::Singapore;
    use uuid::Uuid;

    use super::*;
    use crate::ids::{RandomIds, SequentialIds};
    use crate::types::{CommandType, TimeOfDay};

    fn now() -> DateTime<Tz> {
        Singapore.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    fn task(name: &str, due_time: Option<TimeOfDay>) -> TaskDescriptor {
        TaskDescriptor {
            name: name.to_string(),
            due_time,
        }
    }

    #[test]
    fn task_without_due_time_yields_one_item_add() {
        let mut builder = CommandBuilder::new(RandomIds, "en", DEFAULT_PRIORITY);
        let cmds = builder.build(&task("Water plants", None), &now());
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].command_type, CommandType::ItemAdd);
        let args = cmds[0].as_item().unwrap();
        assert_eq!(args.content, "Water plants");
        assert_eq!(args.priority, 1);
        assert_eq!(args.date_added, "2024-01-01T08:00:00+08:00");
        assert_eq!(args.due.date, "2024-01-01");
    }

    #[test]
    fn task_with_due_time_yields_item_then_reminder() {
        let mut builder = CommandBuilder::new(RandomIds, "en", DEFAULT_PRIORITY);
        let cmds = builder.build(&task("Buy milk", TimeOfDay::new(9, 30)), &now());
        let kinds: Vec<CommandType> = cmds.iter().map(|c| c.command_type).collect();
        assert_eq!(kinds, vec![CommandType::ItemAdd, CommandType::ReminderAdd]);

        let reminder = cmds[1].as_reminder().unwrap();
        assert_eq!(reminder.item_id, cmds[0].temp_id);
        assert_eq!(reminder.reminder_type, ReminderType::Absolute);
        assert_eq!(reminder.due.date, "2024-01-01T09:30:00");
        assert_eq!(reminder.due.string, "01 Jan 09:30");
    }

    #[test]
    fn item_args_id_matches_temp_id() {
        let mut builder = CommandBuilder::new(RandomIds, "en", DEFAULT_PRIORITY);
        let cmds = builder.build(&task("a", TimeOfDay::new(10, 0)), &now());
        assert_eq!(cmds[0].as_item().unwrap().id, cmds[0].temp_id);
    }

    #[test]
    fn every_identifier_in_a_pair_is_distinct() {
        let mut builder = CommandBuilder::new(RandomIds, "en", DEFAULT_PRIORITY);
        let cmds = builder.build(&task("a", TimeOfDay::new(10, 0)), &now());
        let reminder = cmds[1].as_reminder().unwrap();
        let ids = [cmds[0].uuid, cmds[0].temp_id, cmds[1].uuid, cmds[1].temp_id, reminder.id];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn successive_tasks_do_not_share_identifiers() {
        let mut builder = CommandBuilder::new(RandomIds, "en", DEFAULT_PRIORITY);
        let first = builder.build(&task("a", TimeOfDay::new(10, 0)), &now());
        let second = builder.build(&task("b", TimeOfDay::new(11, 0)), &now());
        assert_ne!(first[0].temp_id, second[0].temp_id);
        assert_eq!(second[1].as_reminder().unwrap().item_id, second[0].temp_id);
        assert_eq!(first[1].as_reminder().unwrap().item_id, first[0].temp_id);
    }

    #[test]
    fn sequential_ids_give_a_fixed_layout() {
        let mut builder = CommandBuilder::new(SequentialIds::starting_at(1), "en", 4);
        let cmds = builder.build(&task("a", TimeOfDay::new(10, 0)), &now());
        assert_eq!(cmds[0].temp_id, Uuid::from_u128(1));
        assert_eq!(cmds[0].uuid, Uuid::from_u128(2));
        assert_eq!(cmds[1].uuid, Uuid::from_u128(3));
        assert_eq!(cmds[1].temp_id, Uuid::from_u128(4));
        assert_eq!(cmds[1].as_reminder().unwrap().id, Uuid::from_u128(5));
        assert_eq!(cmds[0].as_item().unwrap().priority, 4);
    }
}
