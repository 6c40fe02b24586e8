/// CSV output for generated contacts.
///
/// [`CsvContactSink`] serializes each committed [`Profile`](crate::core::item::Profile)
/// as one record, with the columns `full_name`, `phone_number`, `company` and
/// `job_title`. It can write to a file or to any `Write + Send` destination and
/// is configured through [`CsvContactSinkBuilder`].
///
/// # Example
///
/// ```
/// use contact_avalanche::core::item::{ContactSink, Profile};
/// use contact_avalanche::item::csv::CsvContactSinkBuilder;
///
/// let sink = CsvContactSinkBuilder::new()
///     .has_headers(false)
///     .from_writer(vec![]);
///
/// let profile = Profile::new("Mary Smith", "+1-202-555-1234", "TechCorp", "Accountant");
/// assert!(sink.commit(&profile).unwrap());
///
/// let data = String::from_utf8(sink.into_inner().unwrap()).unwrap();
/// assert_eq!(data, "Mary Smith,+1-202-555-1234,TechCorp,Accountant\n");
/// ```
pub mod csv_sink;

pub use csv_sink::{CsvContactSink, CsvContactSinkBuilder};
