//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between the backup use cases and the outside world:
//! the database dump process, the chat API and the user's crontab. Adapters
//! implement them; tests swap in recording fakes.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              └─────────────────────────┘              │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │  Dump   │            │    Chat     │              │  Crontab  │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```

pub mod outbound;

pub use outbound::chat::ChatApi;
pub use outbound::crontab::CrontabStore;
pub use outbound::dump::DumpSource;
