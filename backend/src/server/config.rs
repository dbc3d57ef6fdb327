//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use mockable::Clock;

use crate::domain::TokenKey;
use crate::domain::ports::IdGenerator;
use crate::outbound::persistence::Store;

/// Everything `create_server` needs besides the health flags.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: Store,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) key: TokenKey,
}

impl ServerConfig {
    /// Serve `store` on `bind_addr`, keying token digests with `key`.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        store: Store,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        key: TokenKey,
    ) -> Self {
        Self {
            bind_addr,
            store,
            ids,
            clock,
            key,
        }
    }

    /// Socket address the server binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
