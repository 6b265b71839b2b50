mod catalog;
pub(crate) mod conversation;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use catalog::CatalogView;
pub use conversation::ConversationView;
pub use state::{ViewError, ViewState, view_state_from_resource};
