//! Fire-and-forget launching of host commands

use std::io;
use std::process::{Command as Process, Stdio};

pub trait HostLauncher {
    /// Start `argv` without waiting for it to finish
    fn launch(&mut self, argv: &[String]) -> io::Result<()>;
}

/// Spawns real processes; children are reaped on a background thread
#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl HostLauncher for ProcessLauncher {
    fn launch(&mut self, argv: &[String]) -> io::Result<()> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty host command"))?;

        let mut child = Process::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        tracing::info!("Launched host command {:?} (pid {})", argv, child.id());

        let name = program.clone();
        std::thread::spawn(move || match child.wait() {
            Ok(status) => tracing::debug!("host command {} exited: {}", name, status),
            Err(e) => tracing::warn!("Failed to wait for host command {}: {}", name, e),
        });
        Ok(())
    }
}

/// Records launches instead of running anything
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    pub launched: Vec<Vec<String>>,
    /// Make every launch fail
    pub fail: bool,
}

impl HostLauncher for RecordingLauncher {
    fn launch(&mut self, argv: &[String]) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "launch refused"));
        }
        self.launched.push(argv.to_vec());
        Ok(())
    }
}
