pub mod host;
pub mod traits;

pub use host::{DefaultHostContext, HostContext};
pub use traits::{
    AdminSession, Backend, BulkRecordStore, Connect, ListOptions, ListResult, Record, RecordStore, record_id,
};
