use log::info;

use crate::{
    BatchError,
    core::item::{ContactSink, Profile},
};

/// Sink that only logs the profiles it receives. Every commit succeeds.
#[derive(Default)]
pub struct LoggerContactSink {}

impl ContactSink for LoggerContactSink {
    fn commit(&self, profile: &Profile) -> Result<bool, BatchError> {
        info!(
            "Creating contact: {}, {}, {}, {}",
            profile.full_name(),
            profile.phone_number(),
            profile.company(),
            profile.job_title()
        );
        Ok(true)
    }
}
