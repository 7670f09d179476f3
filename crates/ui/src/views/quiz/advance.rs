use dioxus::dioxus_core::Task;
use quiz_core::model::AdvanceTicket;

/// The delayed move from a revealed answer to the next prompt.
///
/// Cancelling stops the timer; a timer that fires anyway is still rejected by
/// the controller unless its ticket is the one the session is waiting for.
#[derive(Debug)]
pub struct PendingAdvance {
    ticket: AdvanceTicket,
    task: Task,
}

impl PendingAdvance {
    #[must_use]
    pub fn new(ticket: AdvanceTicket, task: Task) -> Self {
        Self { ticket, task }
    }

    #[must_use]
    pub fn ticket(&self) -> AdvanceTicket {
        self.ticket
    }

    pub fn cancel(self) {
        self.task.cancel();
    }
}
