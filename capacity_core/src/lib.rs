//! # capacity_core - Structural Design Capacity Engine
//!
//! `capacity_core` lets an operator interrogate and update named structural
//! elements (beams, columns) and compute design capacities from their stored
//! properties. All inputs and outputs are JSON-serializable, making it easy to
//! drive from an AI assistant.
//!
//! ## Design Philosophy
//!
//! - **Pure formulas**: the formula engine never touches the store
//! - **Table-driven**: the formula catalog is a lookup table, not a branch per formula
//! - **Rich Errors**: structured error types, rendered to text at the router boundary
//! - **Sequential**: one command runs to completion before the next is read
//!
//! ## Quick Start
//!
//! ```rust
//! use capacity_core::chat::OfflineChat;
//! use capacity_core::elements::{Element, ElementProperty};
//! use capacity_core::router::Session;
//! use capacity_core::store::MemoryStore;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryStore::with_elements(vec![
//!     Element::new("Beam1", vec![ElementProperty::new("h", "mm", 500.0)]),
//! ]);
//! let mut session = Session::new(Box::new(store), Box::new(OfflineChat));
//!
//! session.handle_line("!mode design").await.unwrap();
//! let reply = session.handle_line("check element Beam1 h").await.unwrap();
//! assert_eq!(reply, "Beam1 - h: 500 mm");
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`elements`] - Element and property types, name-prefix classification
//! - [`store`] - Property store trait and backends
//! - [`formulas`] - Formula catalog and evaluation engine
//! - [`chat`] - Conversation log and chat service boundary
//! - [`router`] - Command grammar and the two-mode session
//! - [`errors`] - Structured error types

pub mod chat;
pub mod elements;
pub mod errors;
pub mod formulas;
pub mod router;
pub mod store;

// Re-export commonly used types at crate root for convenience
pub use chat::{ChatService, ConversationLog, OfflineChat};
pub use elements::{classify, Element, ElementProperty, Partition};
pub use errors::{DesignError, DesignResult};
pub use formulas::{calculate, Formula, FormulaResult, StepTrace};
pub use router::{Command, Mode, Session};
pub use store::{DocumentStore, MemoryStore, PropertyStore};
