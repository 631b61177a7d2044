mod clipboard;
pub mod export;
mod metadata;

pub use clipboard::{Clipboard, SystemClipboard};
pub use metadata::{MetadataResolver, NoembedResolver};
