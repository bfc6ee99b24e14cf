//! Destination dialing, possibly through further proxy hops.
//!
//! [`Chain`] is the seam between the handler and however the destination is
//! reached: [`DirectChain`] dials it straight over TCP, [`ProxyChain`]
//! tunnels through one or more upstream HTTP proxies by issuing a CONNECT
//! per hop. The handler only ever sees the `dial` operation.

use std::future::Future;
use std::io;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncWrite};

use gost_auth::Credential;
use gost_client::{Connector, HttpConnector};

use crate::error::ServerError;
use crate::util::{connect_to, TcpOptions};

/// Marker trait for streams a chain can produce.
pub trait ChainStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> ChainStream for T {}

/// Dials a destination `host:port` on behalf of the handler.
///
/// Implementations must be safe for concurrent use; one chain instance is
/// shared by every connection the server handles.
pub trait Chain: Send + Sync {
    fn dial<'a>(
        &'a self,
        addr: &'a str,
    ) -> Pin<Box<dyn Future<Output = io::Result<Box<dyn ChainStream>>> + Send + 'a>>;
}

/// Zero-hop chain: dial the destination directly.
#[derive(Debug, Clone, Default)]
pub struct DirectChain {
    options: TcpOptions,
}

impl DirectChain {
    pub fn new(options: TcpOptions) -> Self {
        Self { options }
    }
}

impl Chain for DirectChain {
    fn dial<'a>(
        &'a self,
        addr: &'a str,
    ) -> Pin<Box<dyn Future<Output = io::Result<Box<dyn ChainStream>>> + Send + 'a>> {
        Box::pin(async move {
            let tcp = connect_to(addr, &self.options).await?;
            Ok(Box::new(tcp) as Box<dyn ChainStream>)
        })
    }
}

/// One upstream proxy hop.
#[derive(Debug, Clone)]
struct ChainNode {
    addr: String,
    credential: Option<Credential>,
}

impl ChainNode {
    /// Parse `host:port` or `user:pass@host:port`.
    fn from_spec(spec: &str) -> Result<Self, ServerError> {
        let (credential, addr) = match spec.rsplit_once('@') {
            Some((cred, addr)) => (Some(Credential::from_spec(cred)), addr),
            None => (None, spec),
        };
        if addr.trim().is_empty() {
            return Err(ServerError::Config(format!("invalid chain node: {spec:?}")));
        }
        Ok(Self {
            addr: addr.to_string(),
            credential,
        })
    }

    fn connector(&self) -> HttpConnector {
        match &self.credential {
            Some(credential) => HttpConnector::with_credential(credential.clone()),
            None => HttpConnector::new(),
        }
    }
}

/// Multi-hop chain through upstream HTTP proxies.
///
/// The first node is dialed over TCP; every hop then receives a CONNECT for
/// the next hop's address (authenticated with that hop's own credential),
/// and the last hop receives a CONNECT for the destination.
#[derive(Debug, Clone)]
pub struct ProxyChain {
    nodes: Vec<ChainNode>,
    options: TcpOptions,
}

impl ProxyChain {
    /// Build a chain from node specs; must be non-empty.
    pub fn from_specs(specs: &[String], options: TcpOptions) -> Result<Self, ServerError> {
        if specs.is_empty() {
            return Err(ServerError::Config("proxy chain has no nodes".into()));
        }
        let nodes = specs
            .iter()
            .map(|s| ChainNode::from_spec(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { nodes, options })
    }
}

impl Chain for ProxyChain {
    fn dial<'a>(
        &'a self,
        addr: &'a str,
    ) -> Pin<Box<dyn Future<Output = io::Result<Box<dyn ChainStream>>> + Send + 'a>> {
        Box::pin(async move {
            let first = &self.nodes[0];
            let mut tcp = connect_to(&first.addr, &self.options).await?;

            for (i, node) in self.nodes.iter().enumerate() {
                let next = match self.nodes.get(i + 1) {
                    Some(n) => n.addr.as_str(),
                    None => addr,
                };
                node.connector()
                    .connect(&mut tcp, next)
                    .await
                    .map_err(io::Error::other)?;
            }

            Ok(Box::new(tcp) as Box<dyn ChainStream>)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_spec_without_credential() {
        let node = ChainNode::from_spec("hop.example.com:8080").unwrap();
        assert_eq!(node.addr, "hop.example.com:8080");
        assert!(node.credential.is_none());
    }

    #[test]
    fn node_spec_with_credential() {
        let node = ChainNode::from_spec("alice:secret@hop.example.com:8080").unwrap();
        assert_eq!(node.addr, "hop.example.com:8080");
        let cred = node.credential.unwrap();
        assert_eq!(cred.username, "alice");
        assert_eq!(cred.password.as_deref(), Some("secret"));
    }

    #[test]
    fn rejects_empty_nodes() {
        assert!(ChainNode::from_spec("alice:secret@").is_err());
        assert!(ProxyChain::from_specs(&[], TcpOptions::default()).is_err());
    }

    #[tokio::test]
    async fn direct_chain_surfaces_dial_errors() {
        let chain = DirectChain::new(TcpOptions::default());
        assert!(chain.dial("127.0.0.1:1").await.is_err());
    }
}
