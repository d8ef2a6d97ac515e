pub mod writer;

pub use writer::AuditWriter;
