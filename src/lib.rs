#![forbid(unsafe_code)]

pub mod amplitude;
pub mod assets;
pub mod blur;
pub mod captions;
pub mod compose;
pub mod composite;
pub mod encode;
pub mod error;
pub mod header;
pub mod layout;
pub mod media;
pub mod model;
pub mod render;
pub mod srt;
pub mod subtitle;
pub mod text;
pub mod waveform;

pub use compose::{FrameComposer, FrameRgba};
pub use error::{AudiogramError, AudiogramResult};
pub use model::{ColorSet, Format, HeaderTitleSource, RenderRequest, TranscriptChunk};
pub use render::{compose_single_frame, render_audiogram};
