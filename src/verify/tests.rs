use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;
use trust_dns_resolver::error::ResolveError;

use super::{VerificationStatus, Verifier, VerifierOptions};
use crate::mx::tests::StubResolver;
use crate::mx::{MxError, MxRecord};
use crate::smtp::{ConnectProbe, ProbeError, RecipientProbe, SmtpReply, Stage};

type RcptFn = dyn Fn(&str) -> Result<SmtpReply, ProbeError> + Send + Sync;

struct Script {
    connect_failures: Mutex<VecDeque<ProbeError>>,
    on_rcpt: Box<RcptFn>,
    connects: AtomicUsize,
    hosts: Mutex<Vec<String>>,
    rcpts: Mutex<Vec<String>>,
}

#[derive(Clone)]
struct StubConnector(Arc<Script>);

struct StubSession(Arc<Script>);

impl StubConnector {
    fn replying<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<SmtpReply, ProbeError> + Send + Sync + 'static,
    {
        Self(Arc::new(Script {
            connect_failures: Mutex::new(VecDeque::new()),
            on_rcpt: Box::new(f),
            connects: AtomicUsize::new(0),
            hosts: Mutex::new(Vec::new()),
            rcpts: Mutex::new(Vec::new()),
        }))
    }

    /// Accepts `accepted` and rejects every other recipient with 550.
    fn accepting_only(accepted: &'static str) -> Self {
        Self::replying(move |address| {
            if address == accepted {
                Ok(SmtpReply::new(250, "2.1.5 Ok"))
            } else {
                Ok(SmtpReply::new(550, "5.1.1 User unknown"))
            }
        })
    }

    fn failing_connects(self, errors: impl IntoIterator<Item = ProbeError>) -> Self {
        self.0
            .connect_failures
            .lock()
            .expect("lock")
            .extend(errors);
        self
    }

    fn connects(&self) -> usize {
        self.0.connects.load(Ordering::SeqCst)
    }

    fn hosts(&self) -> Vec<String> {
        self.0.hosts.lock().expect("lock").clone()
    }

    fn rcpts(&self) -> Vec<String> {
        self.0.rcpts.lock().expect("lock").clone()
    }
}

impl ConnectProbe for StubConnector {
    type Session = StubSession;

    fn connect(&self, host: &str) -> Result<StubSession, ProbeError> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        self.0.hosts.lock().expect("lock").push(host.to_string());
        if let Some(err) = self.0.connect_failures.lock().expect("lock").pop_front() {
            return Err(err);
        }
        Ok(StubSession(Arc::clone(&self.0)))
    }
}

impl RecipientProbe for StubSession {
    fn check_recipient(&mut self, address: &str) -> Result<SmtpReply, ProbeError> {
        self.0.rcpts.lock().expect("lock").push(address.to_string());
        (self.0.on_rcpt)(address)
    }
}

fn counting_resolver(calls: Arc<AtomicUsize>, records: Vec<MxRecord>) -> StubResolver {
    StubResolver::new(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(records.clone())
    })
}

fn example_mx() -> Vec<MxRecord> {
    vec![
        MxRecord::new(20, "mx2.example.com"),
        MxRecord::new(10, "mx1.example.com"),
    ]
}

fn fast_options() -> VerifierOptions {
    VerifierOptions::new().with_retry_backoff(vec![Duration::ZERO])
}

fn io_failure(kind: io::ErrorKind) -> ProbeError {
    ProbeError::from_io(
        "mx1.example.com",
        Stage::Connect,
        io::Error::new(kind, "simulated"),
    )
}

fn verifier(
    connector: &StubConnector,
    records: Vec<MxRecord>,
) -> Verifier<StubResolver, StubConnector> {
    let calls = Arc::new(AtomicUsize::new(0));
    Verifier::new(
        counting_resolver(calls, records),
        connector.clone(),
        fast_options(),
    )
}

#[test]
fn bad_syntax_is_invalid_without_network() {
    let calls = Arc::new(AtomicUsize::new(0));
    let connector = StubConnector::accepting_only("user@example.com");
    let verifier = Verifier::new(
        counting_resolver(Arc::clone(&calls), example_mx()),
        connector.clone(),
        fast_options(),
    );

    let result = verifier.verify("not-an-email");
    assert_eq!(result.status, VerificationStatus::Invalid);
    assert_eq!(result.reason, "Invalid email syntax");
    assert!(!result.is_disposable);
    assert!(!result.is_role_account);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(connector.connects(), 0);
}

#[test]
fn domain_without_mx_is_invalid() {
    let connector = StubConnector::accepting_only("user@no-such-domain-xyz123.invalid");
    let verifier = verifier(&connector, Vec::new());

    let result = verifier.verify("user@no-such-domain-xyz123.invalid");
    assert_eq!(result.status, VerificationStatus::Invalid);
    assert_eq!(result.reason, "No MX records found for domain");
    assert_eq!(connector.connects(), 0);
}

#[test]
fn resolver_failure_is_reported_as_no_mx() {
    let connector = StubConnector::accepting_only("user@example.com");
    let resolver = StubResolver::new(|domain| {
        Err(MxError::lookup(domain, ResolveError::from("servfail")))
    });
    let verifier = Verifier::new(resolver, connector.clone(), fast_options());

    let result = verifier.verify("user@example.com");
    assert_eq!(result.status, VerificationStatus::Invalid);
    assert!(result.reason.contains("No MX records"), "{}", result.reason);
    assert!(result.reason.contains("lookup failed"), "{}", result.reason);
    assert_eq!(connector.connects(), 0);
}

#[test]
fn accepted_address_with_rejected_decoy_is_valid() {
    let connector = StubConnector::accepting_only("user@example.com");
    let verifier = verifier(&connector, example_mx());

    let result = verifier.verify("user@example.com");
    assert_eq!(result.status, VerificationStatus::Valid);
    assert_eq!(result.reason, "SMTP server confirmed address exists");
    assert!(result.permits_sending());

    assert_eq!(connector.hosts(), vec!["mx1.example.com".to_string()]);
    let rcpts = connector.rcpts();
    assert_eq!(rcpts.len(), 2);
    assert_eq!(rcpts[0], "user@example.com");
    let (decoy_local, decoy_domain) = rcpts[1].split_once('@').expect("decoy address");
    assert_eq!(decoy_domain, "example.com");
    assert_eq!(decoy_local.len(), 20);
    assert!(decoy_local.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
}

#[test]
fn accepting_every_recipient_is_catch_all() {
    let connector = StubConnector::replying(|_| Ok(SmtpReply::new(250, "Ok")));
    let verifier = verifier(&connector, example_mx());

    let result = verifier.verify("anyone@example.com");
    assert_eq!(result.status, VerificationStatus::CatchAll);
    assert_eq!(result.reason, "Domain accepts all emails");
    assert!(result.permits_sending());
}

#[test]
fn permanent_rejection_is_invalid_with_server_text() {
    let connector = StubConnector::accepting_only("someone-else@example.com");
    let verifier = verifier(&connector, example_mx());

    let result = verifier.verify("user@example.com");
    assert_eq!(result.status, VerificationStatus::Invalid);
    assert_eq!(result.reason, "SMTP rejected address: 5.1.1 User unknown");
    assert_eq!(connector.rcpts().len(), 1, "no catch-all probe after rejection");
    assert!(!result.permits_sending());
}

#[test]
fn temporary_reply_is_unknown() {
    let connector = StubConnector::replying(|_| Ok(SmtpReply::new(451, "4.7.1 Greylisted")));
    let verifier = verifier(&connector, example_mx());

    let result = verifier.verify("user@example.com");
    assert_eq!(result.status, VerificationStatus::Unknown);
    assert_eq!(result.reason, "SMTP Error (Code: 451): 4.7.1 Greylisted");
}

#[test]
fn resource_exhaustion_is_retried_until_success() {
    let connector = StubConnector::accepting_only("user@example.com").failing_connects([
        io_failure(io::ErrorKind::AddrNotAvailable),
        io_failure(io::ErrorKind::AddrNotAvailable),
    ]);
    let verifier = verifier(&connector, example_mx());

    let result = verifier.verify("user@example.com");
    assert_eq!(result.status, VerificationStatus::Valid);
    assert_eq!(connector.connects(), 3);
}

#[test]
fn resource_exhaustion_gives_up_after_three_attempts() {
    let connector = StubConnector::accepting_only("user@example.com").failing_connects(
        (0..5).map(|_| io_failure(io::ErrorKind::AddrNotAvailable)),
    );
    let verifier = verifier(&connector, example_mx());

    let result = verifier.verify("user@example.com");
    assert_eq!(result.status, VerificationStatus::Unknown);
    assert!(
        result.reason.starts_with("SMTP connection failed after 3 attempts"),
        "{}",
        result.reason
    );
    assert_eq!(connector.connects(), 3);
}

#[test]
fn other_connection_errors_are_not_retried() {
    for kind in [
        io::ErrorKind::TimedOut,
        io::ErrorKind::ConnectionRefused,
        io::ErrorKind::UnexpectedEof,
    ] {
        let connector =
            StubConnector::accepting_only("user@example.com").failing_connects([io_failure(kind)]);
        let verifier = verifier(&connector, example_mx());

        let result = verifier.verify("user@example.com");
        assert_eq!(result.status, VerificationStatus::Unknown, "{kind:?}");
        assert!(result.reason.starts_with("SMTP connection failed: "), "{}", result.reason);
        assert_eq!(connector.connects(), 1, "{kind:?} must not retry");
    }
}

#[test]
fn failure_during_catch_all_probe_is_unknown() {
    let connector = StubConnector::replying(|address| {
        if address == "user@example.com" {
            Ok(SmtpReply::new(250, "Ok"))
        } else {
            Err(ProbeError::Disconnected {
                host: "mx1.example.com".to_string(),
                stage: Stage::RcptTo,
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "closed"),
            })
        }
    });
    let verifier = verifier(&connector, example_mx());

    let result = verifier.verify("user@example.com");
    assert_eq!(result.status, VerificationStatus::Unknown);
    assert!(result.reason.contains("closed the connection"), "{}", result.reason);
}

#[test]
fn classification_flags_are_independent_of_status() {
    let connector = StubConnector::accepting_only("info@mailinator.com");
    let no_route = verifier(&connector, Vec::new()).verify("Info@MAILINATOR.com");
    assert_eq!(no_route.status, VerificationStatus::Invalid);
    assert!(no_route.is_disposable);
    assert!(no_route.is_role_account);

    let routed = verifier(&connector, example_mx()).verify("info@mailinator.com");
    assert_eq!(routed.status, VerificationStatus::Valid);
    assert!(routed.is_disposable);
    assert!(routed.is_role_account);

    let plain = verifier(&connector, example_mx()).verify("jane@example.com");
    assert!(!plain.is_disposable);
    assert!(!plain.is_role_account);
}

#[test]
fn repeated_verification_yields_same_status() {
    let connector = StubConnector::accepting_only("user@example.com");
    let verifier = verifier(&connector, example_mx());

    let first = verifier.verify("user@example.com");
    let second = verifier.verify("user@example.com");
    assert_eq!(first.status, second.status);
}

proptest! {
    #[test]
    fn malformed_input_never_touches_network(s in "[a-z ]{0,12}(@[a-z]{0,6})?") {
        prop_assume!(crate::validator::parse_address(&s).is_none());
        let calls = Arc::new(AtomicUsize::new(0));
        let connector = StubConnector::replying(|_| Ok(SmtpReply::new(250, "Ok")));
        let verifier = Verifier::new(
            counting_resolver(Arc::clone(&calls), example_mx()),
            connector.clone(),
            fast_options(),
        );

        let result = verifier.verify(&s);
        prop_assert_eq!(result.status, VerificationStatus::Invalid);
        prop_assert_eq!(result.reason.as_str(), "Invalid email syntax");
        prop_assert_eq!(calls.load(Ordering::SeqCst), 0);
        prop_assert_eq!(connector.connects(), 0);
    }
}
