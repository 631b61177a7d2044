/// Where copied summaries go.
pub trait Clipboard: Send {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// The system clipboard via arboard.
#[derive(Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_owned())?;
        Ok(())
    }
}
