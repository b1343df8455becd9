//! Client layer: runs the operation, composes the notification and submits it.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AppPassword, CarrierTable, CompletedAt, Delivery, Notification, NotificationRequest, Outcome,
    ValidationError,
};
use crate::invoker::invoke;

const DEFAULT_RELAY_HOST: &str = "smtp.gmail.com";
const DEFAULT_RELAY_PORT: u16 = 587;

type BoxError = Box<dyn StdError + Send + Sync>;

trait MailTransport: Send + Sync {
    fn send(
        &self,
        username: &str,
        password: &AppPassword,
        message: &Message,
    ) -> Result<(), BoxError>;
}

/// Blocking STARTTLS submission. No connection pool: every call connects,
/// authenticates, submits and closes; the connection is dropped on error too.
#[derive(Debug, Clone)]
struct LettreTransport {
    relay: SmtpRelay,
    timeout: Option<Duration>,
}

impl MailTransport for LettreTransport {
    fn send(
        &self,
        username: &str,
        password: &AppPassword,
        message: &Message,
    ) -> Result<(), BoxError> {
        let credentials = Credentials::new(username.to_owned(), password.expose().to_owned());
        let mut builder = SmtpTransport::starttls_relay(&self.relay.host)?
            .port(self.relay.port)
            .credentials(credentials);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(Some(timeout));
        }

        builder.build().send(message)?;
        Ok(())
    }
}

/// Outbound mail relay accepting authenticated submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpRelay {
    pub host: String,
    #[serde(default = "default_relay_port")]
    pub port: u16,
}

fn default_relay_port() -> u16 {
    DEFAULT_RELAY_PORT
}

impl Default for SmtpRelay {
    fn default() -> Self {
        Self {
            host: DEFAULT_RELAY_HOST.to_owned(),
            port: DEFAULT_RELAY_PORT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`Notifier`].
///
/// These are delivery errors only. A failure of the watched operation is
/// reported inside the notification, never through this type.
pub enum NotifyError {
    /// The request was rejected before anything ran (e.g. unknown carrier).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The notification could not be encoded as a mail message.
    #[error("encode error: {0}")]
    Encode(#[source] BoxError),

    /// Connection, TLS, authentication or relay rejection.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

#[derive(Debug, Clone)]
/// Builder for [`Notifier`].
pub struct NotifierBuilder {
    relay: SmtpRelay,
    timeout: Option<Duration>,
    carriers: CarrierTable,
}

impl NotifierBuilder {
    /// Create a builder for `smtp.gmail.com:587` and the builtin carriers.
    pub fn new() -> Self {
        Self {
            relay: SmtpRelay::default(),
            timeout: None,
            carriers: CarrierTable::shared().clone(),
        }
    }

    /// Override the relay host and port at once.
    pub fn relay(mut self, relay: SmtpRelay) -> Self {
        self.relay = relay;
        self
    }

    pub fn relay_host(mut self, host: impl Into<String>) -> Self {
        self.relay.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.relay.port = port;
        self
    }

    /// Set the SMTP socket timeout. Without it the mail transport default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the carrier table, e.g. with one carrying extra carriers.
    pub fn carriers(mut self, carriers: CarrierTable) -> Self {
        self.carriers = carriers;
        self
    }

    pub fn build(self) -> Notifier {
        Notifier {
            carriers: self.carriers,
            mail: Arc::new(LettreTransport {
                relay: self.relay,
                timeout: self.timeout,
            }),
        }
    }
}

impl Default for NotifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
/// Sends SUCCESS/FAILURE notifications to the sender's mailbox and SMS gateway.
///
/// By default it submits through `smtp.gmail.com:587` with STARTTLS, logging
/// in as the sender with its app password.
pub struct Notifier {
    carriers: CarrierTable,
    mail: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new() -> Self {
        NotifierBuilder::new().build()
    }

    pub fn builder() -> NotifierBuilder {
        NotifierBuilder::new()
    }

    pub fn carriers(&self) -> &CarrierTable {
        &self.carriers
    }

    /// Resolve the carrier and check both addresses before anything runs.
    ///
    /// Errors:
    /// - [`NotifyError::Validation`] with [`ValidationError::UnknownCarrier`]
    ///   when the carrier is not in the table,
    /// - [`NotifyError::Encode`] when the sender or the gateway address cannot
    ///   be parsed as a mailbox.
    pub fn prepare(&self, request: NotificationRequest) -> Result<Prepared<'_>, NotifyError> {
        let gateway = self
            .carriers
            .gateway_address(request.carrier(), request.phone())?;
        crate::transport::check_addresses(request.sender().as_str(), &gateway)
            .map_err(|err| NotifyError::Encode(Box::new(err)))?;
        Ok(Prepared {
            notifier: self,
            request,
            gateway,
        })
    }

    /// Notify about an already known `outcome`.
    pub fn notify(
        &self,
        request: &NotificationRequest,
        outcome: Outcome,
    ) -> Result<Delivery, NotifyError> {
        let gateway = self
            .carriers
            .gateway_address(request.carrier(), request.phone())?;
        let notification =
            Notification::compose(request.sender(), gateway, &outcome, CompletedAt::now());
        self.submit(request, notification, outcome)
    }

    fn submit(
        &self,
        request: &NotificationRequest,
        notification: Notification,
        outcome: Outcome,
    ) -> Result<Delivery, NotifyError> {
        let message = crate::transport::encode_message(&notification)
            .map_err(|err| NotifyError::Encode(Box::new(err)))?;

        self.mail
            .send(request.sender().as_str(), request.password(), &message)
            .map_err(NotifyError::Transport)?;

        log::info!(
            "sent {} notification to {}",
            notification.subject(),
            notification.recipients().join(", ")
        );

        Ok(Delivery {
            outcome,
            subject: notification.subject().to_owned(),
            recipients: notification.recipients().to_vec(),
        })
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// A request whose carrier and addresses have been checked, ready to watch an
/// operation.
pub struct Prepared<'a> {
    notifier: &'a Notifier,
    request: NotificationRequest,
    gateway: String,
}

impl Prepared<'_> {
    /// SMS-gateway address the notification will be sent to.
    pub fn gateway_address(&self) -> &str {
        &self.gateway
    }

    /// Run `operation`, then notify about how it ended.
    ///
    /// Errors from `operation` are reported in the message and swallowed;
    /// only delivery errors are returned.
    pub fn run<T, E, F>(self, operation: F) -> Result<Delivery, NotifyError>
    where
        F: FnOnce() -> Result<T, E>,
        E: StdError + 'static,
    {
        let outcome = invoke(operation);
        self.send(outcome)
    }

    /// Notify about an outcome produced elsewhere, e.g. by
    /// [`invoke_with`](crate::invoke_with).
    pub fn send(self, outcome: Outcome) -> Result<Delivery, NotifyError> {
        let notification = Notification::compose(
            self.request.sender(),
            self.gateway,
            &outcome,
            CompletedAt::now(),
        );
        self.notifier.submit(&self.request, notification, outcome)
    }
}

/// Run `operation` and text the result to `request`'s phone and mailbox
/// through the default relay.
///
/// The carrier is checked before `operation` starts, so a misconfigured
/// request fails immediately instead of after a long run.
pub fn text_me_when_done<T, E, F>(
    request: NotificationRequest,
    operation: F,
) -> Result<Delivery, NotifyError>
where
    F: FnOnce() -> Result<T, E>,
    E: StdError + 'static,
{
    Notifier::new().prepare(request)?.run(operation)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fmt;
    use std::sync::Mutex;

    use crate::domain::Failure;

    use super::*;

    #[derive(Debug, Clone)]
    struct Submission {
        username: String,
        password: String,
        envelope_from: Option<String>,
        envelope_to: Vec<String>,
        raw: String,
    }

    #[derive(Clone, Default)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Default)]
    struct FakeTransportState {
        submissions: Vec<Submission>,
        reject_with: Option<String>,
    }

    impl FakeTransport {
        fn rejecting(reason: impl Into<String>) -> Self {
            let transport = Self::default();
            transport.state.lock().unwrap().reject_with = Some(reason.into());
            transport
        }

        fn submissions(&self) -> Vec<Submission> {
            self.state.lock().unwrap().submissions.clone()
        }
    }

    impl MailTransport for FakeTransport {
        fn send(
            &self,
            username: &str,
            password: &AppPassword,
            message: &Message,
        ) -> Result<(), BoxError> {
            let mut state = self.state.lock().unwrap();
            if let Some(reason) = state.reject_with.clone() {
                return Err(reason.into());
            }
            let envelope = message.envelope();
            state.submissions.push(Submission {
                username: username.to_owned(),
                password: password.expose().to_owned(),
                envelope_from: envelope.from().map(ToString::to_string),
                envelope_to: envelope.to().iter().map(ToString::to_string).collect(),
                raw: String::from_utf8_lossy(&message.formatted()).into_owned(),
            });
            Ok(())
        }
    }

    #[derive(Debug)]
    struct RuntimeError(&'static str);

    impl fmt::Display for RuntimeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for RuntimeError {}

    fn make_notifier(transport: FakeTransport) -> Notifier {
        Notifier {
            carriers: CarrierTable::builtin(),
            mail: Arc::new(transport),
        }
    }

    fn request(carrier: &str, phone: &str) -> NotificationRequest {
        NotificationRequest::new(carrier, phone, "me@gmail.com", "abcdabcdabcdabcd").unwrap()
    }

    #[test]
    fn successful_operation_sends_success_to_sender_and_gateway() {
        let transport = FakeTransport::default();
        let notifier = make_notifier(transport.clone());

        let delivery = notifier
            .prepare(request("Verizon", "5551234567"))
            .unwrap()
            .run(|| {
                std::thread::sleep(Duration::from_millis(10));
                Ok::<_, RuntimeError>(())
            })
            .unwrap();

        assert_eq!(delivery.outcome, Outcome::Success);
        assert_eq!(delivery.subject, "SUCCESS");
        assert_eq!(delivery.recipients, ["me@gmail.com", "5551234567@vtext.com"]);

        let submissions = transport.submissions();
        assert_eq!(submissions.len(), 1);
        let sent = &submissions[0];
        assert_eq!(sent.username, "me@gmail.com");
        assert_eq!(sent.password, "abcdabcdabcdabcd");
        assert_eq!(sent.envelope_from.as_deref(), Some("me@gmail.com"));
        assert_eq!(sent.envelope_to, ["me@gmail.com", "5551234567@vtext.com"]);
        assert!(sent.raw.contains("Subject: SUCCESS"));
        assert!(sent.raw.contains("Process completed successfully @ "));
    }

    #[test]
    fn failing_operation_sends_failure_with_error_detail() {
        let transport = FakeTransport::default();
        let notifier = make_notifier(transport.clone());

        let delivery = notifier
            .prepare(request("AT&T", "4155551234"))
            .unwrap()
            .run(|| Err::<(), _>(RuntimeError("boom")))
            .unwrap();

        assert_eq!(delivery.outcome, Outcome::failure("RuntimeError", "boom"));
        assert_eq!(delivery.subject, "FAILURE");

        let submissions = transport.submissions();
        assert_eq!(submissions.len(), 1);
        assert!(submissions[0].raw.contains("Subject: FAILURE"));
        assert!(submissions[0].raw.contains("Process failed @ "));
        assert!(submissions[0].raw.contains("RuntimeError: boom"));
        assert!(
            submissions[0]
                .envelope_to
                .contains(&"4155551234@txt.att.net".to_owned())
        );
    }

    #[test]
    fn unknown_carrier_fails_before_operation_runs() {
        let transport = FakeTransport::default();
        let notifier = make_notifier(transport.clone());
        let ran = Cell::new(false);

        let result = notifier.prepare(request("Foo", "4155551234")).map(|prepared| {
            prepared.run(|| {
                ran.set(true);
                Ok::<_, RuntimeError>(())
            })
        });

        let Err(err) = result else {
            panic!("expected unknown carrier error");
        };
        assert!(matches!(
            err,
            NotifyError::Validation(ValidationError::UnknownCarrier { ref carrier }) if carrier == "Foo"
        ));
        assert!(!ran.get());
        assert!(transport.submissions().is_empty());
    }

    #[test]
    fn unparsable_gateway_address_fails_before_operation_runs() {
        let transport = FakeTransport::default();
        let notifier = make_notifier(transport.clone());
        let ran = Cell::new(false);

        let result = notifier
            .prepare(request("AT&T", "(415) 555 1234"))
            .map(|prepared| {
                prepared.run(|| {
                    ran.set(true);
                    Ok::<_, RuntimeError>(())
                })
            });

        assert!(matches!(result, Err(NotifyError::Encode(_))));
        assert!(!ran.get());
        assert!(transport.submissions().is_empty());
    }

    #[test]
    fn unparsable_sender_fails_before_operation_runs() {
        let transport = FakeTransport::default();
        let notifier = make_notifier(transport.clone());
        let ran = Cell::new(false);
        let request =
            NotificationRequest::new("AT&T", "4155551234", "not an address", "pw").unwrap();

        let result = notifier.prepare(request).map(|prepared| {
            prepared.run(|| {
                ran.set(true);
                Ok::<_, RuntimeError>(())
            })
        });

        let Err(NotifyError::Encode(source)) = result else {
            panic!("expected encode error");
        };
        assert!(source.to_string().contains("not an address"));
        assert!(!ran.get());
        assert!(transport.submissions().is_empty());
    }

    #[test]
    fn notify_rejects_unknown_carrier_without_submitting() {
        let transport = FakeTransport::default();
        let notifier = make_notifier(transport.clone());

        let err = notifier
            .notify(&request("Foo", "4155551234"), Outcome::Success)
            .unwrap_err();
        assert!(matches!(err, NotifyError::Validation(_)));
        assert!(transport.submissions().is_empty());
    }

    #[test]
    fn relay_rejection_surfaces_as_transport_error() {
        let notifier = make_notifier(FakeTransport::rejecting("535 bad credentials"));

        let err = notifier
            .prepare(request("Virgin", "4155551234"))
            .unwrap()
            .run(|| Ok::<_, RuntimeError>(()))
            .unwrap_err();
        match err {
            NotifyError::Transport(source) => {
                assert_eq!(source.to_string(), "535 bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparsable_sender_surfaces_as_encode_error() {
        let transport = FakeTransport::default();
        let notifier = make_notifier(transport.clone());
        let request =
            NotificationRequest::new("AT&T", "4155551234", "not an address", "pw").unwrap();

        let err = notifier.notify(&request, Outcome::Success).unwrap_err();
        assert!(matches!(err, NotifyError::Encode(_)));
        assert!(transport.submissions().is_empty());
    }

    #[test]
    fn prepared_send_accepts_externally_classified_outcome() {
        let transport = FakeTransport::default();
        let notifier = make_notifier(transport.clone());
        let prepared = notifier.prepare(request("T-Mobile", "4155551234")).unwrap();
        assert_eq!(prepared.gateway_address(), "4155551234@tmomail.net");

        let outcome = Outcome::Failure(Failure::new("Timeout", "took too long"));
        let delivery = prepared.send(outcome).unwrap();
        assert_eq!(delivery.subject, "FAILURE");
        assert!(transport.submissions()[0].raw.contains("Timeout: took too long"));
    }

    #[test]
    fn notifying_twice_produces_two_equivalent_submissions() {
        let transport = FakeTransport::default();
        let notifier = make_notifier(transport.clone());
        let request = request("Verizon", "5551234567");

        let first = notifier.notify(&request, Outcome::Success).unwrap();
        let second = notifier.notify(&request, Outcome::Success).unwrap();
        assert_eq!(first, second);

        let submissions = transport.submissions();
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].envelope_to, submissions[1].envelope_to);
    }

    #[test]
    fn extra_carriers_are_resolved() {
        let transport = FakeTransport::default();
        let notifier = Notifier {
            carriers: CarrierTable::builtin().with_carrier("Cricket", "sms.cricketwireless.net"),
            mail: Arc::new(transport.clone()),
        };

        let delivery = notifier
            .notify(&request("Cricket", "4155551234"), Outcome::Success)
            .unwrap();
        assert_eq!(delivery.recipients[1], "4155551234@sms.cricketwireless.net");
    }

    #[test]
    fn builder_defaults_to_gmail_submission_port() {
        let relay = SmtpRelay::default();
        assert_eq!(relay.host, "smtp.gmail.com");
        assert_eq!(relay.port, 587);

        let notifier = Notifier::builder()
            .relay_host("smtp.example.invalid")
            .port(2525)
            .timeout(Duration::from_secs(5))
            .carriers(CarrierTable::empty())
            .build();
        assert_eq!(notifier.carriers().carriers().count(), 0);
    }

    #[test]
    fn unreachable_relay_surfaces_as_transport_error() {
        let notifier = Notifier::builder()
            .relay_host("127.0.0.1")
            .port(1)
            .timeout(Duration::from_secs(2))
            .build();
        let ran = Cell::new(false);

        let err = notifier
            .prepare(request("AT&T", "4155551234"))
            .unwrap()
            .run(|| {
                ran.set(true);
                Ok::<_, RuntimeError>(())
            })
            .unwrap_err();

        assert!(ran.get());
        assert!(
            matches!(err, NotifyError::Transport(_)),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn relay_deserializes_with_default_port() {
        let relay: SmtpRelay = serde_json::from_str(r#"{ "host": "smtp.example.invalid" }"#).unwrap();
        assert_eq!(
            relay,
            SmtpRelay {
                host: "smtp.example.invalid".to_owned(),
                port: 587,
            }
        );
    }
}
