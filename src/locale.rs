//! Per-request locale negotiation and the error message catalog.
//!
//! The error taxonomy is keyed by [`MessageKey`]; only the display text varies
//! between locales, so callers (and tests) match on the key, never on the
//! translated string.

use serde::Deserialize;
use serde::Serialize;

/// Supported display languages. Portuguese is the default, matching the
/// deployment the message set was written for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Pt,
    En,
}

impl Locale {
    /// Picks a locale from an `Accept-Language` header value.
    ///
    /// Only the primary subtag of each entry is inspected; anything that is
    /// not English falls back to Portuguese.
    pub fn negotiate(accept_language: Option<&str>) -> Self {
        let Some(header) = accept_language else {
            return Self::default();
        };

        for entry in header.split(',') {
            let tag = entry.split(';').next().unwrap_or("").trim();
            let primary = tag.split('-').next().unwrap_or("");
            match primary.to_ascii_lowercase().as_str() {
                "en" => return Self::En,
                "pt" => return Self::Pt,
                _ => continue,
            }
        }

        Self::default()
    }
}

/// Stable identifiers for every user-facing error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    TokenMissing,
    TokenInvalid,
    ValidationFailed,
    UserAlreadyExists,
    UserNotFound,
    PasswordMismatch,
    PastDateNotAllowed,
    InvalidBanner,
    MeetupNotFound,
    MeetupEditForbidden,
    MeetupEditPast,
    MeetupCancelForbidden,
    MeetupCancelPast,
    OwnMeetupSubscription,
    MeetupEnded,
    AlreadySubscribed,
    SameTimeSubscription,
    SubscriptionNotFound,
    SubscriptionCancelForbidden,
    SubscriptionCancelPast,
}

impl MessageKey {
    /// Returns the display text for this key in the given locale.
    pub fn text(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.text_en(),
            Locale::Pt => self.text_pt(),
        }
    }

    fn text_en(&self) -> &'static str {
        match self {
            Self::TokenMissing => "Token not provided.",
            Self::TokenInvalid => "Invalid token.",
            Self::ValidationFailed => "Invalid data entered.",
            Self::UserAlreadyExists => "User already exists.",
            Self::UserNotFound => "User not found.",
            Self::PasswordMismatch => "Password does not match.",
            Self::PastDateNotAllowed => "Past dates are not allowed.",
            Self::InvalidBanner => "Invalid banner.",
            Self::MeetupNotFound => "Meetup not found.",
            Self::MeetupEditForbidden => "You don't have permission to edit this meetup.",
            Self::MeetupEditPast => "You can't edit meetups that have already happened.",
            Self::MeetupCancelForbidden => "You don't have permission to cancel this meetup.",
            Self::MeetupCancelPast => "You can't cancel meetups that have already happened.",
            Self::OwnMeetupSubscription => "Can't subscribe to your own meetup.",
            Self::MeetupEnded => "This meetup has already ended.",
            Self::AlreadySubscribed => "Already subscribed for this meetup.",
            Self::SameTimeSubscription => "Can't subscribe to two meetups at the same time.",
            Self::SubscriptionNotFound => "Subscription not found.",
            Self::SubscriptionCancelForbidden => {
                "You don't have permission to cancel this subscription."
            }
            Self::SubscriptionCancelPast => {
                "You can't cancel subscriptions to meetups that have already happened."
            }
        }
    }

    fn text_pt(&self) -> &'static str {
        match self {
            Self::TokenMissing => "Token não informado.",
            Self::TokenInvalid => "Token inválido.",
            Self::ValidationFailed => "Dados informados inválidos.",
            Self::UserAlreadyExists => "Usuário já existe.",
            Self::UserNotFound => "Usuário não encontrado.",
            Self::PasswordMismatch => "Senha inválida.",
            Self::PastDateNotAllowed => "Datas passadas não são permitidas.",
            Self::InvalidBanner => "Imagem inválida.",
            Self::MeetupNotFound => "Meetup não encontrado.",
            Self::MeetupEditForbidden => "Você não possui permissão para alterar este meetup.",
            Self::MeetupEditPast => "Você não pode alterar meetups que já aconteceram.",
            Self::MeetupCancelForbidden => "Você não possui permissão para cancelar este meetup.",
            Self::MeetupCancelPast => "Você não pode cancelar meetups que já aconteceram.",
            Self::OwnMeetupSubscription => "Você não pode se inscrever no próprio meetup.",
            Self::MeetupEnded => "Este meetup já encerrou.",
            Self::AlreadySubscribed => "Inscrição já realizada.",
            Self::SameTimeSubscription => {
                "Não é possível se inscrever em dois meetups no mesmo horário."
            }
            Self::SubscriptionNotFound => "Inscrição não encontrada.",
            Self::SubscriptionCancelForbidden => {
                "Você não possui permissão para cancelar esta inscrição."
            }
            Self::SubscriptionCancelPast => {
                "Você não pode cancelar inscrições de eventos que já aconteceram."
            }
        }
    }
}
