//! Handing the process over to the resolved target.

use crate::error::LaunchError;
use crate::resolver::LaunchPlan;
use std::process::Command;

impl LaunchPlan {
    /// The command this plan describes, with a cleared and fully specified
    /// environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.target);
        cmd.args(&self.args).env_clear().envs(self.env.iter());
        cmd
    }

    /// Replace the current process with the target.
    ///
    /// On Unix this only returns if `execve` fails. Elsewhere the target is
    /// run as a child and the launcher exits with its status.
    pub fn launch(&self) -> LaunchError {
        tracing::info!(
            "Launching {} ({} target, {} args)",
            self.target.display(),
            self.kind,
            self.args.len()
        );
        let mut cmd = self.command();
        self.run(&mut cmd)
    }

    #[cfg(unix)]
    fn run(&self, cmd: &mut Command) -> LaunchError {
        use std::os::unix::process::CommandExt;

        let source = cmd.exec();
        LaunchError::ExecFailed {
            path: self.target.clone(),
            source,
        }
    }

    #[cfg(not(unix))]
    fn run(&self, cmd: &mut Command) -> LaunchError {
        match cmd.status() {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(source) => LaunchError::ExecFailed {
                path: self.target.clone(),
                source,
            },
        }
    }
}
