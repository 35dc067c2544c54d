//! Subscription mail rendering and the delivery boundary.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Datelike;
use chrono::Timelike;
use chrono::Utc;
use minijinja::Environment;
use serde::Serialize;

use crate::event::SubscriptionCreatedEvent;

/// A rendered mail ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to_name: String,
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

/// Delivery boundary. Transport internals (SMTP, queue persistence) live
/// behind this trait; the crate only guarantees that exactly one message is
/// handed over per successful subscription.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()>;
}

/// Development transport that writes the mail to the log instead of a wire.
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, message: MailMessage) -> anyhow::Result<()> {
        log::info!(
            "Mail to {} <{}>: {} | {}",
            message.to_name,
            message.to_email,
            message.subject,
            message.body.replace('\n', " ")
        );
        Ok(())
    }
}

/// Data handed to the subscription mail template.
#[derive(Serialize)]
struct SubscriptionMailData {
    organizer_name: String,
    meetup_title: String,
    meetup_date: String,
    subscriber_name: String,
    subscriber_email: String,
}

/// Renders notification mails from embedded minijinja templates.
pub struct Mailer {
    jinja_env: Environment<'static>,
}

impl Mailer {
    pub fn new() -> Self {
        let mut jinja_env = Environment::new();
        jinja_env
            .add_template(
                "subscription",
                include_str!("../../templates/subscription_mail.txt"),
            )
            .expect("Invalid subscription mail template");

        Self { jinja_env }
    }

    /// Renders the new-subscriber mail addressed to the meetup organizer.
    pub fn render_subscription_mail(
        &self,
        event: &SubscriptionCreatedEvent,
    ) -> anyhow::Result<MailMessage> {
        let data = SubscriptionMailData {
            organizer_name: event.organizer.name.clone(),
            meetup_title: event.meetup.title.clone(),
            meetup_date: format_date_pt(&event.meetup.date),
            subscriber_name: event.subscriber.name.clone(),
            subscriber_email: event.subscriber.email.clone(),
        };

        let body = self.jinja_env.get_template("subscription")?.render(&data)?;

        Ok(MailMessage {
            to_name: event.organizer.name.clone(),
            to_email: event.organizer.email.clone(),
            subject: "Nova inscrição".to_string(),
            body,
        })
    }
}

impl Default for Mailer {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a date the way organizers expect it: "7 de agosto, às 14:30h".
pub fn format_date_pt(date: &DateTime<Utc>) -> String {
    const MONTHS: [&str; 12] = [
        "janeiro",
        "fevereiro",
        "março",
        "abril",
        "maio",
        "junho",
        "julho",
        "agosto",
        "setembro",
        "outubro",
        "novembro",
        "dezembro",
    ];

    let month = MONTHS[date.month0() as usize];
    format!(
        "{} de {}, às {}:{:02}h",
        date.day(),
        month,
        date.hour(),
        date.minute()
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::model::MeetupModel;
    use crate::model::UserModel;

    fn sample_event() -> SubscriptionCreatedEvent {
        SubscriptionCreatedEvent {
            meetup: Arc::new(MeetupModel {
                id: 1,
                title: "Rust Meetup".to_string(),
                date: Utc.with_ymd_and_hms(2026, 8, 7, 19, 30, 0).unwrap(),
                ..Default::default()
            }),
            organizer: Arc::new(UserModel {
                id: 1,
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                ..Default::default()
            }),
            subscriber: Arc::new(UserModel {
                id: 2,
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn formats_date_in_portuguese() {
        let date = Utc.with_ymd_and_hms(2026, 8, 7, 19, 5, 0).unwrap();
        assert_eq!(format_date_pt(&date), "7 de agosto, às 19:05h");

        let new_year = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_date_pt(&new_year), "1 de janeiro, às 0:00h");
    }

    #[test]
    fn renders_subscription_mail() {
        let mailer = Mailer::new();
        let mail = mailer.render_subscription_mail(&sample_event()).unwrap();

        assert_eq!(mail.to_email, "alice@example.com");
        assert_eq!(mail.subject, "Nova inscrição");
        assert!(mail.body.contains("Alice"));
        assert!(mail.body.contains("Rust Meetup"));
        assert!(mail.body.contains("Bob"));
        assert!(mail.body.contains("bob@example.com"));
        assert!(mail.body.contains("7 de agosto"));
    }
}
