//! Operator confirmation gates.
//!
//! The workflow pauses before each destructive step until the operator
//! presses Enter. The line read is discarded.

use crate::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::debug;

/// Blocks until the operator allows the workflow to continue.
#[async_trait]
pub trait ConfirmationGate: Send {
    /// Waits for confirmation. There is no timeout.
    async fn wait(&mut self) -> Result<()>;
}

/// Gate that reads one line per confirmation from an async reader.
///
/// End of input counts as confirmation, so a closed stdin does not hang
/// the workflow.
#[derive(Debug)]
pub struct LineGate<R> {
    reader: R,
}

/// Gate reading from standard input.
pub type StdinGate = LineGate<BufReader<Stdin>>;

impl StdinGate {
    /// Creates a gate reading from standard input.
    pub fn stdin() -> Self {
        LineGate::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> LineGate<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Creates a gate reading from `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl<R> ConfirmationGate for LineGate<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn wait(&mut self) -> Result<()> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            debug!("input closed, continuing");
        }
        Ok(())
    }
}
