//! Generates fake contacts into a CSV file while logging progress.
//!
//! ```text
//! cargo run --example generate_contacts --features csv,logger -- 250 contacts.csv
//! ```

use std::{env, env::temp_dir, sync::Arc};

use contact_avalanche::{
    core::{state::GenerationState, workflow::WorkflowBuilder},
    error::BatchError,
    item::csv::CsvContactSinkBuilder,
};
use log::info;

fn main() -> Result<(), BatchError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let count = args
        .next()
        .map(|arg| {
            arg.parse::<i64>()
                .map_err(|err| BatchError::UnexpectedFault(format!("invalid count {arg}: {err}")))
        })
        .transpose()?
        .unwrap_or(100);
    let path = args
        .next()
        .map(Into::into)
        .unwrap_or_else(|| temp_dir().join("contacts.csv"));

    let sink = CsvContactSinkBuilder::new()
        .has_headers(true)
        .from_path(&path)?;

    let workflow = WorkflowBuilder::new()
        .name("generate-contacts".to_string())
        .sink(Arc::new(sink))
        .build()?;

    workflow.subscribe(Box::new(|state| {
        if let GenerationState::Loading(progress) = state {
            if progress.current % 50 == 0 || progress.current == progress.total {
                info!("{}", state);
            }
        } else {
            info!("{}", state);
        }
    }));

    workflow.start_generation(count)?;
    workflow.wait_until_settled();

    info!("Contacts written to {}", path.display());
    Ok(())
}
