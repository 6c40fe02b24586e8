use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};

use contact_avalanche::{
    core::job::{CancellationToken, GenerationRequest, JobBuilder},
    item::{memory::InMemoryContactSink, random_generator::RandomProfileGeneratorBuilder},
};

/// Keeps every formatted log line so a test can count them.
struct CapturingLogger {
    lines: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.lines
            .lock()
            .unwrap()
            .push(format!("{} {}", record.level(), record.args()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    lines: Mutex::new(Vec::new()),
};

#[test]
fn each_profile_should_be_logged_once() -> anyhow::Result<()> {
    log::set_logger(&LOGGER).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    log::set_max_level(LevelFilter::Debug);

    let generator = RandomProfileGeneratorBuilder::new()
        .first_names(vec!["Zebulon".to_string()])
        .last_names(vec!["Quillfeather".to_string()])
        .build()?;
    let sink = InMemoryContactSink::new();

    let job = JobBuilder::new()
        .name("logged".to_string())
        .generator(&generator)
        .sink(&sink)
        .build()?;
    job.run(
        &GenerationRequest::new(3)?,
        &CancellationToken::new(),
        &mut |_| {},
    )?;

    let lines = LOGGER.lines.lock().unwrap();
    let profile_lines = lines
        .iter()
        .filter(|line| line.contains("Zebulon Quillfeather"))
        .count();
    assert_eq!(profile_lines, 3);
    Ok(())
}
