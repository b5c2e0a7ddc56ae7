//! 事件信封（Envelope）
//!
//! 定义宿主与插件之间传递的数据形态：事件名 `EventType`、事件 `Event`
//! 与插件响应 `EventResponse`，以及它们的 JSON 编解码约定。

mod event;
mod event_type;
mod response;

pub use event::{Event, RESULTS_SUFFIX};
pub use event_type::EventType;
pub use response::EventResponse;
