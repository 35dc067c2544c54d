//! Mails the organizer when someone subscribes to their meetup.

use std::sync::Arc;

use anyhow::Result;
use log::debug;

use crate::event::SubscriptionCreatedEvent;
use crate::mail::MailTransport;
use crate::mail::Mailer;
use crate::subscriber::Subscriber;

pub struct SubscriptionMailSubscriber {
    mailer: Arc<Mailer>,
    transport: Arc<dyn MailTransport>,
}

impl SubscriptionMailSubscriber {
    pub fn new(mailer: Arc<Mailer>, transport: Arc<dyn MailTransport>) -> Self {
        Self { mailer, transport }
    }
}

#[async_trait::async_trait]
impl Subscriber<SubscriptionCreatedEvent> for SubscriptionMailSubscriber {
    async fn callback(&self, event: SubscriptionCreatedEvent) -> Result<()> {
        debug!(
            "Sending subscription mail for meetup id `{}` to organizer id `{}`",
            event.meetup.id, event.organizer.id
        );

        let message = self.mailer.render_subscription_mail(&event)?;
        self.transport.send(message).await?;

        Ok(())
    }
}
