//! External collaborators of the render pipeline.
//!
//! - [`VerseSource`]: ordered verse text and per-verse commentary
//! - [`AudioSource`]: narration asset URLs per verse key
//! - [`BackgroundSource`]: a background video URL for a theme
//!
//! HTTP implementations retry transient failures with exponential backoff.

pub mod error;
pub mod pixabay;
pub mod quran;
pub mod retry;
pub mod traits;

pub use error::{SourceError, SourceResult};
pub use pixabay::{PixabayClient, PixabayConfig};
pub use quran::{QuranComClient, QuranComConfig};
pub use retry::RetryPolicy;
pub use traits::{AudioSource, BackgroundSource, VerseRecord, VerseSource};
