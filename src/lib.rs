#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # Contact Avalanche

 Generate any quantity of synthetic ("fake") contact records and commit them
 to a contacts store, one after the other, with observable progress and
 cooperative cancellation.

 ## Core Concepts

- **Profile:** one synthetic contact: full name, phone number, company and job title.
- **ProfileGenerator:** produces one `Profile` per call. `RandomProfileGenerator` draws from
  built-in sample pools; `FakerProfileGenerator` uses the `fake` crate.
- **ContactSink:** stores one profile per commit and reports whether it was stored.
- **GenerationJob:** executes one validated `GenerationRequest`, publishes `Loading`
  progress and returns the outcome. Runs on the caller's thread.
- **BatchGenerationWorkflow:** the caller-facing surface. Validates the requested count,
  runs jobs in the background (at most one at a time) and exposes the current
  `GenerationState`.

 ## Generation states

| **State**                  | **Meaning**                                              |
|----------------------------|----------------------------------------------------------|
| `Idle`                     | Nothing running, or the last run was cancelled           |
| `Loading(progress)`        | A run is in progress, `progress.percentage()` is 0..=100 |
| `Success(count)`           | Every requested contact was stored                       |
| `Warning(success, total)`  | Some contacts could not be stored                        |
| `Error(reason)`            | The request was invalid or a fault aborted the run       |

 ## Features

| **Feature**   | **Description**                                               |
|---------------|---------------------------------------------------------------|
| csv           | Enables a CSV `ContactSink`                                   |
| json          | Enables a JSON `ContactSink`                                  |
| fake          | Enables a `ProfileGenerator` backed by the `fake` crate       |
| logger        | Enables a `ContactSink` that logs every contact               |
| full          | Enables all available features                                |

 ## Getting Started

```rust
use std::sync::Arc;

use contact_avalanche::{
    core::{state::GenerationState, workflow::WorkflowBuilder},
    error::BatchError,
    item::memory::InMemoryContactSink,
};

fn main() -> Result<(), BatchError> {
    let sink = Arc::new(InMemoryContactSink::new());

    let workflow = WorkflowBuilder::new()
        .name("seed-contacts".to_string())
        .sink(sink.clone())
        .build()?;

    workflow.start_generation(25)?;
    workflow.wait_until_settled();

    assert_eq!(workflow.state(), GenerationState::Success(25));
    assert_eq!(sink.len(), 25);

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module for batch generation
pub mod core;

/// Error types for batch generation
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of profile generators and contact sinks
pub mod item;
