//! Finding and opening the serial ports the receivers are attached to.

use log::{debug, info};
use serial2::SerialPort;
use std::{
    error::Error,
    fmt::Display,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

/// Failure to get at the receivers. Always fatal, nothing is started.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The ports on this machine could not be listed.
    Enumerate(io::Error),
    /// A receiver's port could not be opened or configured.
    Open(PathBuf, io::Error),
}

impl Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::Enumerate(e) => write!(f, "failed to list serial ports: {e}"),
            DiscoveryError::Open(path, e) => write!(f, "failed to open {}: {e}", path.display()),
        }
    }
}

impl Error for DiscoveryError {}

/// Keeps the ports whose file name contains `filter`, sorted so receiver
/// indices come out the same on every run.
pub fn filter_ports(ports: impl IntoIterator<Item = PathBuf>, filter: &str) -> Vec<PathBuf> {
    let mut ports: Vec<PathBuf> = ports
        .into_iter()
        .filter(|p| {
            p.file_name()
                .map(|name| name.to_string_lossy().contains(filter))
                .unwrap_or(false)
        })
        .collect();
    ports.sort();
    ports
}

/// Lists the serial ports on this machine that look like receivers.
pub fn discover_ports(filter: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let available = SerialPort::available_ports().map_err(DiscoveryError::Enumerate)?;
    debug!("Available ports: {:?}", available);
    Ok(filter_ports(available, filter))
}

/// Opens one port with a bounded read timeout, so an idle reader still
/// wakes up to check whether it should stop.
pub fn open_port(path: &Path, baud_rate: u32, timeout: Duration) -> Result<SerialPort, DiscoveryError> {
    let open = || -> io::Result<SerialPort> {
        let mut port = SerialPort::open(path, baud_rate)?;
        port.set_read_timeout(timeout)?;
        Ok(port)
    };
    let port = open().map_err(|e| DiscoveryError::Open(path.to_owned(), e))?;
    info!("Opened {} at {} baud", path.display(), baud_rate);
    Ok(port)
}

/// Opens every port, in order. Any failure aborts and closes the ports
/// opened so far.
pub fn open_all(
    paths: &[PathBuf],
    baud_rate: u32,
    timeout: Duration,
) -> Result<Vec<SerialPort>, DiscoveryError> {
    paths
        .iter()
        .map(|path| open_port(path, baud_rate, timeout))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_ports() {
        let ports = [
            "/dev/cu.usbserial-0002",
            "/dev/ttyS0",
            "/dev/cu.usbserial-0001",
            "/dev/cu.Bluetooth-Incoming-Port",
        ]
        .map(PathBuf::from);

        assert_eq!(
            filter_ports(ports, "usbserial"),
            vec![
                PathBuf::from("/dev/cu.usbserial-0001"),
                PathBuf::from("/dev/cu.usbserial-0002"),
            ]
        );
    }

    #[test]
    fn test_open_missing_port() {
        let path = Path::new("/definitely/not/a/serial/port");
        let res = open_all(&[path.to_owned()], 460800, Duration::from_secs(1));

        assert!(matches!(res, Err(DiscoveryError::Open(p, _)) if p == path));
    }
}
