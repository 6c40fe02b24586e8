use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// One synthetic contact record.
///
/// A profile is immutable once produced: it is created fresh for every unit
/// of work and handed to a [`ContactSink`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    full_name: String,
    phone_number: String,
    company: String,
    job_title: String,
}

impl Profile {
    pub fn new(
        full_name: impl Into<String>,
        phone_number: impl Into<String>,
        company: impl Into<String>,
        job_title: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            phone_number: phone_number.into(),
            company: company.into(),
            job_title: job_title.into(),
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "full_name:{}, phone_number:{}, company:{}, job_title:{}",
            self.full_name, self.phone_number, self.company, self.job_title
        )
    }
}

/// Produces one profile per call.
///
/// Implementations must be callable from several threads at once without
/// sharing mutable state between calls.
pub trait ProfileGenerator: Send + Sync {
    /// Generates the next profile.
    ///
    /// # Errors
    ///
    /// An error is an unexpected fault: it aborts the run that asked for the
    /// profile.
    fn next_profile(&self) -> Result<Profile, BatchError>;
}

/// Destination capable of storing one profile per commit.
pub trait ContactSink: Send + Sync {
    /// Stores one profile.
    ///
    /// # Returns
    /// - `Ok(true)` when the profile was durably stored
    /// - `Ok(false)` when storing this profile failed and the run may go on
    /// - `Err(BatchError)` on a fault that must abort the run
    fn commit(&self, profile: &Profile) -> Result<bool, BatchError>;

    /// Called once before the first commit of a run.
    fn open(&self) -> Result<(), BatchError> {
        Ok(())
    }

    /// Called once after the last commit of a run, cancelled runs included.
    fn close(&self) -> Result<(), BatchError> {
        Ok(())
    }
}
