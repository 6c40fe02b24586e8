use fake::Fake;
use fake::faker::company::raw::{CompanyName, Profession};
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;

use crate::{
    BatchError,
    core::item::{Profile, ProfileGenerator},
    item::random_generator::phone_number,
};

/// Profile generator using the `fake` crate's English data sets for names,
/// companies and job titles.
///
/// Phone numbers keep the `+1-AAA-PPP-LLLL` format of
/// [`RandomProfileGenerator`](crate::item::random_generator::RandomProfileGenerator).
#[derive(Default)]
pub struct FakerProfileGenerator {}

impl ProfileGenerator for FakerProfileGenerator {
    fn next_profile(&self) -> Result<Profile, BatchError> {
        let first_name: String = FirstName(EN).fake();
        let last_name: String = LastName(EN).fake();
        let company: String = CompanyName(EN).fake();
        let job_title: String = Profession(EN).fake();

        Ok(Profile::new(
            format!("{first_name} {last_name}"),
            phone_number(&mut rand::rng()),
            company,
            job_title,
        ))
    }
}
