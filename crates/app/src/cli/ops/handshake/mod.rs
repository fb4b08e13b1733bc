use clap::{Args, Subcommand};

pub mod accept;
pub mod initiate;

use crate::cli::op::Op;

crate::command_enum! {
    (Initiate, initiate::Initiate),
    (Accept, accept::Accept),
}

// Rename the generated Command to HandshakeCommand for clarity
pub type HandshakeCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Handshake {
    #[command(subcommand)]
    pub command: HandshakeCommand,
}

#[async_trait::async_trait]
impl Op for Handshake {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
