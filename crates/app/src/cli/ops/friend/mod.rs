use clap::{Args, Subcommand};

pub mod add;
pub mod remove;

use crate::cli::op::Op;

crate::command_enum! {
    (Add, add::Add),
    (Remove, remove::Remove),
}

// Rename the generated Command to FriendCommand for clarity
pub type FriendCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Friend {
    #[command(subcommand)]
    pub command: FriendCommand,
}

#[async_trait::async_trait]
impl Op for Friend {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
