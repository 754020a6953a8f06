// Conversion pipeline — scratch buffers, transform stages, and the
// per-session driver.

pub mod converter;
pub mod pipeline;
pub mod scratch;
pub mod stages;
