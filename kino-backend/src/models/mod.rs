mod note;
mod oauth;

pub use note::Note;
pub use oauth::{AuthorizationServerMetadata, ProtectedResourceMetadata};
