//! Agenda view over a task snapshot
//!
//! Groups open tasks into overdue / today / tomorrow relative to the clock's
//! local date, the way the deck's task screen lists them. Each section is
//! capped so a small display does not have to deal with long lists.

use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;
use crate::task::{Task, TaskSet};

/// Default number of tasks kept per section
pub const DEFAULT_SECTION_LIMIT: usize = 5;

/// One agenda section
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaSection {
    pub tasks: Vec<Task>,
    /// Tasks that matched the section but were cut off by the limit
    pub hidden: usize,
}

impl AgendaSection {
    fn push(&mut self, task: &Task, limit: usize) {
        if self.tasks.len() < limit {
            self.tasks.push(task.clone());
        } else {
            self.hidden += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agenda {
    pub overdue: AgendaSection,
    pub today: AgendaSection,
    pub tomorrow: AgendaSection,
}

impl Agenda {
    /// Build the agenda for `set`, keeping the snapshot's order within sections
    pub fn build(set: &TaskSet, clock: &dyn Clock, limit: usize) -> Self {
        let mut agenda = Self::default();

        for task in set.iter().filter(|t| !t.completed) {
            if task.is_overdue(clock) {
                agenda.overdue.push(task, limit);
            } else if task.is_due_today(clock) {
                agenda.today.push(task, limit);
            } else if task.is_due_tomorrow(clock) {
                agenda.tomorrow.push(task, limit);
            }
        }

        for (name, section) in [
            ("overdue", &agenda.overdue),
            ("today", &agenda.today),
            ("tomorrow", &agenda.tomorrow),
        ] {
            if section.hidden > 0 {
                debug!("Limiting {} section to {} tasks ({} hidden)", name, limit, section.hidden);
            }
        }

        agenda
    }

    /// True when there is nothing due up to and including tomorrow
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.today.is_empty() && self.tomorrow.is_empty()
    }
}
