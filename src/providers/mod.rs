//! Provider implementations

pub mod makehub;
