use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use log::debug;

use super::{DatagramTransport, TransportError};

/// Unicast UDP sender bound to an ephemeral local port.
pub struct UdpTransport {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl UdpTransport {
    pub fn new(destination: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))?;
        socket.set_broadcast(false)?;
        debug!(
            "UDP transport bound to {} sending to {}",
            socket.local_addr()?,
            destination
        );

        Ok(Self {
            socket,
            destination,
        })
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }
}

impl DatagramTransport for UdpTransport {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.socket.send_to(payload, self.destination)?;
        Ok(())
    }
}
