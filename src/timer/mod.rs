pub mod clock;
pub mod controller;
pub mod display;
pub mod duration;
pub mod export;
pub mod policy;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{TimerController, TimerSnapshot};
pub use display::{Display, Frame, SharedDisplay};
pub use duration::format_duration;
pub use export::{DirectorySink, ExportSink, MemorySink};
pub use policy::MarkerPolicy;
pub use state::{Marker, TimerField, TimerPatch, TimerPhase, TimerState, Timestamp};
