mod command_id;
mod command_status;
mod param;
pub mod tlv;
mod value;

pub use command_id::CommandId;
pub use command_status::CommandStatus;
pub use param::ParamName;
pub use value::{FieldValue, Value};
