use crate::{config::device, secrets::SecretValue};
use std::{
    io::Read,
    net::{TcpStream, ToSocketAddrs},
    path::Path,
    time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to resolve address '{0}'")]
    AddressResolutionFailed(String, #[source] std::io::Error),
    #[error("no usable address for '{0}'")]
    NoUsableAddress(String),
    #[error("failed to connect to {0}")]
    ConnectFailed(String, #[source] std::io::Error),
    #[error("failed to set up ssh session")]
    SessionSetupFailed(#[source] ssh2::Error),
    #[error("ssh handshake failed")]
    HandshakeFailed(#[source] ssh2::Error),
    #[error("authentication failed for user '{0}'")]
    AuthenticationFailed(String, #[source] ssh2::Error),
    #[error("failed to run command '{0}'")]
    CommandFailed(String, #[source] ssh2::Error),
    #[error("error reading output of command '{0}'")]
    CommandIoError(String, #[source] std::io::Error),
    #[error("command '{command}' exited with status {status}")]
    CommandExitStatus { command: String, status: i32 },
    #[error("failed to open sftp channel")]
    SftpFailed(#[source] ssh2::Error),
    #[error("failed to open remote file '{0}'")]
    RemoteOpenFailed(String, #[source] ssh2::Error),
    #[error("failed to download remote file '{0}'")]
    DownloadFailed(String, #[source] std::io::Error),
    #[error("failed to close session")]
    DisconnectFailed(#[source] ssh2::Error),
}

/// A blocking management session to one device. Commands run on their own
/// exec channel; file retrieval goes over an SFTP sub-channel of the same
/// session.
pub struct Session {
    session: ssh2::Session,
}

impl Session {
    pub fn connect(device: &device::Definition, password: &SecretValue) -> Result<Session, Error> {
        let addr = (device.host.as_str(), device.port)
            .to_socket_addrs()
            .map_err(|e| Error::AddressResolutionFailed(device.host.clone(), e))?
            .next()
            .ok_or_else(|| Error::NoUsableAddress(device.host.clone()))?;
        let tcp = TcpStream::connect_timeout(&addr, device.connect_timeout)
            .map_err(|e| Error::ConnectFailed(device.host.clone(), e))?;

        let mut session = ssh2::Session::new().map_err(Error::SessionSetupFailed)?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(Error::HandshakeFailed)?;
        session
            .userauth_password(&device.username, &password.0)
            .map_err(|e| Error::AuthenticationFailed(device.username.clone(), e))?;

        Ok(Session { session })
    }

    /// Runs one command and waits for it to finish, with `timeout` applied
    /// to every blocking operation on the underlying session.
    pub fn exec(&self, command: &str, timeout: Duration) -> Result<String, Error> {
        self.session.set_timeout(timeout_ms(timeout));

        let command_error = |e| Error::CommandFailed(command.to_owned(), e);
        let mut channel = self.session.channel_session().map_err(command_error)?;
        channel.exec(command).map_err(command_error)?;

        let mut output = String::new();
        channel
            .read_to_string(&mut output)
            .map_err(|e| Error::CommandIoError(command.to_owned(), e))?;
        channel.wait_close().map_err(command_error)?;

        let status = channel.exit_status().map_err(command_error)?;
        if status != 0 {
            return Err(Error::CommandExitStatus {
                command: command.to_owned(),
                status,
            });
        }
        Ok(output)
    }

    pub fn download(&self, remote: &str, local: &Path) -> Result<(), Error> {
        let sftp = self.session.sftp().map_err(Error::SftpFailed)?;
        let mut remote_file = sftp
            .open(Path::new(remote))
            .map_err(|e| Error::RemoteOpenFailed(remote.to_owned(), e))?;
        let mut local_file = std::fs::File::create(local)
            .map_err(|e| Error::DownloadFailed(remote.to_owned(), e))?;
        std::io::copy(&mut remote_file, &mut local_file)
            .map_err(|e| Error::DownloadFailed(remote.to_owned(), e))?;
        Ok(())
    }

    pub fn disconnect(self) -> Result<(), Error> {
        self.session
            .disconnect(None, "backup finished", None)
            .map_err(Error::DisconnectFailed)
    }
}

// libssh2 takes milliseconds as u32; clamp instead of truncating absurdly
// large configured timeouts
fn timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_timeout_to_milliseconds() {
        assert_eq!(timeout_ms(Duration::from_secs(10)), 10_000);
    }

    #[test]
    fn should_clamp_oversized_timeout_instead_of_truncating() {
        assert_eq!(timeout_ms(Duration::from_secs(60 * 24 * 60 * 60)), u32::MAX);
    }
}
