/// Profile generator backed by the `fake` crate.
pub mod faker_generator;
