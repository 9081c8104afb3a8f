// Pipeline processing: field coercion, Silver contract validation, and Gold aggregation

pub mod aggregate;
pub mod fields;
pub mod quality_gate;
pub mod timestamp;
