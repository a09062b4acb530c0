//! Test double: a job whose fields are set directly by the test.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{JobError, Operation};
use crate::events::{Callback, JobEvent, Property, Subscription};
use crate::jobs::{ChangeNotifier, Job, JobId, JobSignals};
use crate::status::JobStatus;

struct Fields {
    status: JobStatus,
    progress: f64,
    supports_progress: bool,
    title: String,
}

pub(crate) struct StubJob {
    signals: JobSignals,
    fields: Mutex<Fields>,
    notifies: bool,
}

impl StubJob {
    pub(crate) fn new(status: JobStatus, progress: Option<f64>) -> Arc<Self> {
        Arc::new(Self {
            signals: JobSignals::new(),
            fields: Mutex::new(Fields {
                status,
                progress: progress.unwrap_or(0.0),
                supports_progress: progress.is_some(),
                title: String::from("stub"),
            }),
            notifies: true,
        })
    }

    /// A job without the change-notification capability.
    pub(crate) fn silent(status: JobStatus) -> Arc<Self> {
        Arc::new(Self {
            signals: JobSignals::new(),
            fields: Mutex::new(Fields {
                status,
                progress: 0.0,
                supports_progress: false,
                title: String::from("silent"),
            }),
            notifies: false,
        })
    }

    /// Sets the status, emits `Changed(Status)` and, if terminal, finished.
    pub(crate) fn set_status(&self, status: JobStatus) {
        self.fields.lock().status = status;
        self.signals.notify_changed(Property::Status);
        if status.is_terminal() {
            self.signals.notify_finished(status);
        }
    }

    pub(crate) fn set_progress(&self, progress: f64) {
        self.fields.lock().progress = progress;
        self.signals.notify_changed(Property::Progress);
    }

    pub(crate) fn set_supports_progress(&self, supported: bool) {
        self.fields.lock().supports_progress = supported;
        self.signals.notify_changed(Property::SupportsProgress);
    }

    pub(crate) fn set_title(&self, title: &str) {
        self.fields.lock().title = title.to_string();
        self.signals.notify_changed(Property::Title);
    }
}

impl Job for StubJob {
    fn id(&self) -> JobId {
        self.signals.id()
    }

    fn supports_cancellation(&self) -> bool {
        false
    }

    fn supports_pausing(&self) -> bool {
        false
    }

    fn supports_progress(&self) -> bool {
        self.fields.lock().supports_progress
    }

    fn progress(&self) -> f64 {
        self.fields.lock().progress
    }

    fn status(&self) -> JobStatus {
        self.fields.lock().status
    }

    fn title(&self) -> String {
        self.fields.lock().title.clone()
    }

    fn description(&self) -> String {
        String::new()
    }

    fn can_cancel(&self) -> bool {
        false
    }

    fn can_pause(&self) -> bool {
        false
    }

    fn can_resume(&self) -> bool {
        false
    }

    fn cancel(&self) -> Result<(), JobError> {
        Err(JobError::Unsupported {
            operation: Operation::Cancel,
        })
    }

    fn pause(&self) -> Result<(), JobError> {
        Err(JobError::Unsupported {
            operation: Operation::Pause,
        })
    }

    fn resume(&self) -> Result<(), JobError> {
        Err(JobError::Unsupported {
            operation: Operation::Resume,
        })
    }

    fn subscribe_finished(&self, callback: Callback<JobEvent>) -> Subscription {
        self.signals.subscribe_finished(callback)
    }

    fn has_finished(&self) -> bool {
        self.signals.has_finished()
    }

    fn change_notifier(&self) -> Option<&dyn ChangeNotifier> {
        if self.notifies {
            Some(&self.signals)
        } else {
            None
        }
    }
}
