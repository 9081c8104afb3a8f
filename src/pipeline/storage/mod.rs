// Output storage used by the pipeline stages

pub mod in_memory;

pub use in_memory::InMemorySink;
