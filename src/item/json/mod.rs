/// JSON output for generated contacts.
///
/// [`JsonContactSink`] writes the profiles of a run as a single JSON array,
/// serialized with `serde_json`. The array is opened by the first `open` and
/// closed by `finish`, `into_inner` or dropping the sink, so several runs
/// (cancelled ones included) share one well-formed document. Output can be
/// compact or pretty-printed.
///
/// # Example
///
/// ```
/// use contact_avalanche::core::item::{ContactSink, Profile};
/// use contact_avalanche::item::json::JsonContactSinkBuilder;
///
/// let sink = JsonContactSinkBuilder::new().from_writer(vec![]);
///
/// sink.open().unwrap();
/// sink.commit(&Profile::new("Mary Smith", "+1-202-555-1234", "TechCorp", "Accountant"))
///     .unwrap();
/// sink.close().unwrap();
///
/// let parsed: Vec<Profile> = serde_json::from_slice(&sink.into_inner().unwrap()).unwrap();
/// assert_eq!(parsed[0].full_name(), "Mary Smith");
/// ```
pub mod json_sink;

pub use json_sink::{JsonContactSink, JsonContactSinkBuilder};
