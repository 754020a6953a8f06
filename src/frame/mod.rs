// Frame domain — pixel formats, buffers, capture sources, and the slot
// that hands converted frames to consumers.

pub mod buffer;
pub mod format;
pub mod pattern;
pub mod slot;
pub mod source;
