pub mod line_source;
pub mod ring_buffer;

pub use line_source::{LineEvent, LineSource, LINE_QUEUE_DEPTH};
pub use ring_buffer::RingBuffer;
