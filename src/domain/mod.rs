//! Domain layer: marketplace entities and chat widget state.

pub mod compose_state;
pub mod conversation;
pub mod conversation_list_state;
pub mod events;
pub mod identity;
pub mod listing;
pub mod message;
pub mod message_input_state;
pub mod profile;
pub mod serde_compat;
pub mod thread_state;
pub mod widget_state;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
