//! Mock versions of the generator and sink traits.
use mockall::mock;

use contact_avalanche::{
    BatchError,
    core::item::{ContactSink, Profile, ProfileGenerator},
};

mock! {
    pub Sink {}
    impl ContactSink for Sink {
        fn commit(&self, profile: &Profile) -> Result<bool, BatchError>;
        fn open(&self) -> Result<(), BatchError>;
        fn close(&self) -> Result<(), BatchError>;
    }
}

mock! {
    pub Generator {}
    impl ProfileGenerator for Generator {
        fn next_profile(&self) -> Result<Profile, BatchError>;
    }
}
