//! Block to record mapping.

mod mapper;

pub use mapper::map_record;
