pub mod classify;
pub mod error;
pub mod header;
pub mod hls;
pub mod load;
pub mod observer;
pub mod player;
pub mod request;
pub mod session;
pub mod status;
pub mod util;

pub use error::*;
pub use header::{HeaderSet, HeaderStore};
pub use load::{intercept_load, CustomData, LoadRequest, StreamType};
pub use observer::{PlaybackState, PlayerEvent, ResumePolicy};
pub use player::HeadlessPlayer;
pub use request::{augment, NetworkRequest, RequestKind};
pub use session::{Host, ReceiverHooks, SessionContext};
pub use util::http::HttpClient;
