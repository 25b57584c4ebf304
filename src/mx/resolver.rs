use std::time::Duration;

use trust_dns_resolver::{
    Resolver,
    config::{ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    system_conf::read_system_conf,
};

use super::{MxError, MxRecord, MxStatus};

pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(10);

/// Lookup MX records for `domain` using the system resolver.
///
/// The resulting [`MxStatus`] contains the sorted list of records (ascending preference).
/// A non-existent domain and a domain without MX records both yield
/// [`MxStatus::NoRecords`]; resolver failures surface as [`MxError::Lookup`].
pub fn check_mx(domain: &str) -> Result<MxStatus, MxError> {
    let resolver = SystemResolver::new(DEFAULT_DNS_TIMEOUT)?;
    resolve_with(&resolver, domain)
}

pub fn resolve_with<R>(resolver: &R, domain: &str) -> Result<MxStatus, MxError>
where
    R: LookupMx + ?Sized,
{
    let domain = normalize_domain(domain)?;
    let mut records = resolver.lookup_mx(&domain)?;

    // null MX ("." exchange) means the domain accepts no mail
    for record in &mut records {
        record.exchange = normalize_exchange(&record.exchange);
    }
    records.retain(|record| !record.exchange.is_empty());
    records.sort();
    records.dedup();

    if records.is_empty() {
        Ok(MxStatus::NoRecords)
    } else {
        Ok(MxStatus::Records(records))
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, MxError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(MxError::EmptyDomain);
    }
    Ok(trimmed.to_ascii_lowercase())
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

/// Source of MX records. Implemented for the blocking trust-dns [`Resolver`]
/// and for [`SystemResolver`]; tests plug in stubs.
pub trait LookupMx {
    /// Returns the raw records for `domain`; an empty vector means the domain
    /// has no mail route.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, MxError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, MxError> {
        // rooted name: never expand through resolv.conf search domains
        let fqdn = format!("{domain}.");
        match Resolver::mx_lookup(self, fqdn.as_str()) {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8())))
                .collect()),
            Err(err) => lookup_failure(domain, err),
        }
    }
}

/// System-configured resolver that builds a fresh blocking [`Resolver`] per
/// lookup, so concurrent workers never queue behind one shared runtime.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    config: ResolverConfig,
    opts: ResolverOpts,
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Result<Self, MxError> {
        let (config, mut opts) = read_system_conf().map_err(MxError::system_conf)?;
        opts.timeout = timeout;
        Ok(Self { config, opts })
    }
}

impl LookupMx for SystemResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, MxError> {
        let resolver =
            Resolver::new(self.config.clone(), self.opts.clone()).map_err(MxError::resolver_init)?;
        resolver.lookup_mx(domain)
    }
}

/// NXDOMAIN and empty answers mean "no mail route"; anything else is a lookup failure.
pub(crate) fn lookup_failure(domain: &str, err: ResolveError) -> Result<Vec<MxRecord>, MxError> {
    if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) {
        Ok(Vec::new())
    } else {
        Err(MxError::lookup(domain, err))
    }
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, MxError> {
        (self.on_lookup)(domain)
    }
}
