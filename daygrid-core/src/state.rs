//! Application state owned by the sync controller.

use crate::calendar_id::CalendarId;
use crate::events::EventsByDate;

/// In-memory view of one calendar plus the coarse online/offline signal.
///
/// Mutated only through the sync controller; the render layer takes
/// snapshots and never writes back. Which month or day is being looked at
/// is a concern of the command invoking the renderer, not of this state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub calendar_id: CalendarId,
    pub events: EventsByDate,
    pub online: bool,
}

impl AppState {
    pub fn new(calendar_id: CalendarId) -> Self {
        AppState {
            calendar_id,
            events: EventsByDate::default(),
            online: true,
        }
    }
}
