pub mod gold_output_adapter;
pub mod ndjson_output_adapter;
