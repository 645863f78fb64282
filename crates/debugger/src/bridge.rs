use server::ControlServer;
use transport::{Command, Message};

use crate::evaluator::NoEvaluator;
use crate::{Breakpoint, Breakpoints, Evaluator};

/// Value reported for variables the evaluator cannot resolve
pub const UNDEFINED: &str = "undefined";

/// Execution side of the debugger
///
/// The scripting host calls [`on_line`](Bridge::on_line) before executing
/// each line. The bridge applies any commands the client has sent and, when
/// the line carries a breakpoint, blocks the calling thread until the client
/// continues or the server shuts down.
pub struct Bridge {
    server: ControlServer,
    breakpoints: Breakpoints,
    evaluator: Box<dyn Evaluator>,
}

impl Bridge {
    pub fn new(server: ControlServer) -> Self {
        Self {
            server,
            breakpoints: Breakpoints::new(),
            evaluator: Box::new(NoEvaluator),
        }
    }

    pub fn server(&self) -> &ControlServer {
        &self.server
    }

    pub fn set_evaluator<E>(&mut self, evaluator: E)
    where
        E: Evaluator + 'static,
    {
        self.evaluator = Box::new(evaluator);
    }

    pub fn add_breakpoint(&mut self, breakpoint: Breakpoint) -> bool {
        self.breakpoints.add(breakpoint)
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// Hook called by the host before executing `file:line`
    #[tracing::instrument(skip(self), level = "trace")]
    pub fn on_line(&mut self, file: &str, line: u32) {
        let paused = self.breakpoints.contains(file, line);
        let mut blocked = paused;
        if paused {
            tracing::info!(file, line, "paused at breakpoint");
            self.send(Message::BreakHit {
                file: file.to_string(),
                line,
            });
        }

        self.drain(&mut blocked);
        while blocked && self.server.is_running() {
            if !self.server.queue().wait() {
                break;
            }
            self.drain(&mut blocked);
        }

        if paused {
            tracing::info!(file, line, "resumed");
        }
    }

    fn drain(&mut self, blocked: &mut bool) {
        loop {
            let Some(command) = self.server.queue().pop() else {
                break;
            };
            self.apply(command, blocked);
        }
    }

    fn apply(&mut self, command: Command, blocked: &mut bool) {
        match command {
            Command::SetBreakpoint { file, line } => {
                let breakpoint = Breakpoint { file, line };
                if self.breakpoints.add(breakpoint.clone()) {
                    tracing::debug!(%breakpoint, "breakpoint added");
                }
            }
            Command::ReadVariable { name } => {
                let value = self
                    .evaluator
                    .evaluate(&name)
                    .unwrap_or_else(|| UNDEFINED.to_string());
                self.send(Message::Variable { name, value });
            }
            Command::Continue => *blocked = false,
            // handled by the network thread
            Command::Stop => {}
        }
    }

    fn send(&self, message: Message) {
        if let Err(e) = self.server.send(&message) {
            tracing::debug!(error = %e, "message not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use server::ServerConfig;

    use super::*;

    fn bridge() -> Bridge {
        Bridge::new(ControlServer::new(ServerConfig::default()))
    }

    #[test]
    fn queued_commands_apply_without_breakpoint() {
        let mut bridge = bridge();
        bridge.server().queue().push(Command::SetBreakpoint {
            file: "a.js".to_string(),
            line: 4,
        });
        bridge.server().queue().push(Command::Continue);

        bridge.on_line("a.js", 1);

        assert!(bridge.breakpoints().contains("a.js", 4));
        assert!(!bridge.server().queue().has_pending());
    }

    #[test]
    fn continue_queued_before_hit_releases_it() {
        let mut bridge = bridge();
        bridge.add_breakpoint(Breakpoint::new("a.js", 2));
        bridge.server().queue().push(Command::Continue);

        bridge.on_line("a.js", 2);
        assert!(!bridge.server().queue().has_pending());
    }

    #[test]
    fn stopped_server_never_blocks() {
        let mut bridge = bridge();
        bridge.add_breakpoint(Breakpoint::new("a.js", 2));
        bridge.server().shutdown();

        bridge.on_line("a.js", 2);
    }

    #[test]
    fn reads_without_client_are_dropped() {
        let mut bridge = bridge();
        bridge.set_evaluator(|_: &str| Some("1".to_string()));
        bridge.server().queue().push(Command::ReadVariable {
            name: "x".to_string(),
        });

        bridge.on_line("a.js", 1);
        assert!(!bridge.server().queue().has_pending());
    }
}
