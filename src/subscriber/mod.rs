use anyhow::Result;

pub mod subscription_mail_subscriber;

#[async_trait::async_trait]
pub trait Subscriber<E> {
    async fn callback(&self, event: E) -> Result<()>;
}
