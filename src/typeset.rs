use anyhow::Result;

/// Turns inline-math markup into visible glyphs.
///
/// `initialize` is called once when the session starts; `render` receives the
/// complete markup list after load and after every overlay append.
pub trait Typesetter {
    fn initialize(&mut self) -> Result<()>;
    fn render(&mut self, markup: &[String]) -> Result<()>;
}

/// Typesetter for headless runs: records what would be rendered in the log.
#[derive(Debug, Default)]
pub struct LogTypesetter {
    renders: usize,
}

impl LogTypesetter {
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl Typesetter for LogTypesetter {
    fn initialize(&mut self) -> Result<()> {
        tracing::debug!("typesetter initialised");
        Ok(())
    }

    fn render(&mut self, markup: &[String]) -> Result<()> {
        self.renders += 1;
        tracing::info!(entries = markup.len(), latest = ?markup.last(), "typeset overlay");
        Ok(())
    }
}
