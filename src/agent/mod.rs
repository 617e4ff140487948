//! Agent module - the computer-use capability workflows drive
//!
//! Contains the `ComputerAgent` trait and its two backends: the process
//! bridge used in production and the scripted agent used for dry runs.

pub mod bridge;
pub mod scripted;
pub mod traits;

pub use bridge::BridgeAgent;
pub use scripted::{AgentCall, Script, ScriptedAgent};
pub use traits::ComputerAgent;
