use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("reading system resolver configuration failed: {0}")]
    SystemConf(String),
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("MX lookup for {domain} failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
}

impl MxError {
    pub(crate) fn system_conf<T: std::fmt::Display>(err: T) -> Self {
        Self::SystemConf(err.to_string())
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub fn lookup(domain: impl Into<String>, source: ResolveError) -> Self {
        Self::Lookup {
            domain: domain.into(),
            source,
        }
    }
}
