use crate::state::{ClientState, Connectivity, WaterStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoModeTicket {
    pub generation: u64,
    pub previous: bool,
    pub requested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollback {
    Restored(bool),
    /// A newer request owns the pending flag; nothing was changed.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterRequest {
    Accepted,
    CoolingDown,
    Disconnected,
}

impl ClientState {
    pub fn request_auto_mode(&mut self, enabled: bool) -> AutoModeTicket {
        self.auto_generation = self.auto_generation.wrapping_add(1);
        let ticket = AutoModeTicket {
            generation: self.auto_generation,
            previous: self.auto_enabled,
            requested: enabled,
        };
        self.auto_enabled = enabled;
        self.auto_pending = true;
        ticket
    }

    /// Undoes a failed request, unless a later toggle already replaced it.
    pub fn rollback_auto_mode(&mut self, ticket: AutoModeTicket) -> Rollback {
        if ticket.generation != self.auto_generation {
            return Rollback::Superseded;
        }
        self.auto_enabled = ticket.previous;
        self.auto_pending = false;
        Rollback::Restored(ticket.previous)
    }

    pub fn begin_watering(&mut self) -> WaterRequest {
        if self.connectivity == Connectivity::Disconnected {
            return WaterRequest::Disconnected;
        }
        if !self.water.enabled {
            return WaterRequest::CoolingDown;
        }
        self.water.enabled = false;
        self.water.status = Some(WaterStatus::Sending);
        WaterRequest::Accepted
    }

    pub fn finish_watering(&mut self, delivered: bool) {
        if self.water.enabled {
            return;
        }
        self.water.status = Some(if delivered {
            WaterStatus::Sent
        } else {
            WaterStatus::Failed
        });
    }

    pub fn reenable_watering(&mut self) {
        self.water.enabled = true;
        self.water.status = None;
    }
}
