use {
    crate::{Application, Dependencies, input::Command},
    feemarket_shared::error::Result,
    std::ops::DerefMut,
    tokio::sync::mpsc::Receiver,
    tracing::{error, warn},
};

pub struct CommandActor<'a, D: Dependencies> {
    rx: Receiver<Command>,
    app: &'a mut Application<D>,
}

impl<'a, D: Dependencies> CommandActor<'a, D> {
    pub fn new(rx: Receiver<Command>, app: &'a mut Application<D>) -> Self {
        Self { rx, app }
    }

    /// Handles commands until the channel closes.
    ///
    /// Rejected commands are logged and skipped. A fatal error stops the actor and is returned.
    pub async fn run(mut self) -> Result<()> {
        while let Some(msg) = self.rx.recv().await {
            if let Err(e) = Self::handle_command(&mut *self.app, msg) {
                if e.is_fatal() {
                    error!(reason = %e, "Fee market halted");
                    return Err(e);
                }
                warn!(reason = %e, kind = ?e.kind(), "Command rejected");
            }
        }

        Ok(())
    }

    pub fn handle_command(
        mut app: impl DerefMut<Target = Application<D>>,
        msg: Command,
    ) -> Result<()> {
        match msg {
            Command::BeginBlock { height } => {
                app.begin_block(height);
                Ok(())
            }
            Command::EndBlock { height } => app.end_block(height).map(|_| ()),
            Command::UpdateParams { authority, params } => app.update_params(authority, params),
        }
    }
}
