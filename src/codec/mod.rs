//! Frame-level encoding and decoding over async streams.
//!
//! The socket splits its stream and gives each half its own codec: a
//! [`FrameReader`] owned by the read loop and a [`FrameWriter`] shared by
//! every writer behind a lock.

mod reader;
mod writer;

pub use reader::FrameReader;
pub use writer::FrameWriter;
