use latexocr_config::{Config, SessionOverrides};

/// Where the capture pipeline currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selecting,
    Capturing,
    Transcribing,
}

/// Controller-owned state. Only the event loop touches it.
#[derive(Debug)]
pub struct AppState {
    /// Effective settings: the file values with session overrides on top
    pub config: Config,
    /// Settings as stored on disk
    pub file_config: Config,
    pub overrides: SessionOverrides,
    /// Formula as last set by OCR or edited by the user
    pub formula: String,
    pub phase: Phase,
    next_request_id: u64,
    latest_request_id: Option<u64>,
}

impl AppState {
    pub fn new(file_config: Config, overrides: SessionOverrides) -> Self {
        Self {
            config: overrides.apply(file_config.clone()),
            file_config,
            overrides,
            formula: String::new(),
            phase: Phase::Idle,
            next_request_id: 1,
            latest_request_id: None,
        }
    }

    /// Allocate the id for a new OCR request and mark it as the one to keep
    pub fn begin_request(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.latest_request_id = Some(id);
        self.phase = Phase::Transcribing;
        id
    }

    /// True when `request_id` is the latest dispatched request. Settles it.
    pub fn finish_request(&mut self, request_id: u64) -> bool {
        if self.latest_request_id != Some(request_id) {
            return false;
        }
        self.latest_request_id = None;
        if self.phase == Phase::Transcribing {
            self.phase = Phase::Idle;
        }
        true
    }

    pub fn has_pending_request(&self) -> bool {
        self.latest_request_id.is_some()
    }

    /// Leave selection or capture, falling back to a request still in flight
    pub fn settle_phase(&mut self) {
        self.phase = if self.has_pending_request() {
            Phase::Transcribing
        } else {
            Phase::Idle
        };
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.phase, Phase::Selecting | Phase::Capturing)
    }
}
