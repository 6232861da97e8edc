//! Override resolution across the channel and locale axes.
//!
//! Candidate keys are searched most specific first:
//!
//! 1. channel + locale
//! 2. channel, any locale
//! 3. locale, any channel
//! 4. global default
//!
//! A tier that needs a channel or locale the request does not carry is skipped.

use std::collections::HashSet;

use scoped_settings_sdk::{PrecedenceTier, SettingScope};

use super::error::DomainError;
use super::record::SettingRecord;

/// Candidate (channel, locale) keys for `request`, in search order.
#[must_use]
pub fn search_order(request: &SettingScope) -> Vec<(PrecedenceTier, Option<&str>, Option<&str>)> {
    let channel = request.channel.as_deref();
    let locale = request.locale.as_deref();

    let mut order = Vec::with_capacity(4);
    if let (Some(c), Some(l)) = (channel, locale) {
        order.push((PrecedenceTier::ChannelLocale, Some(c), Some(l)));
    }
    if let Some(c) = channel {
        order.push((PrecedenceTier::Channel, Some(c), None));
    }
    if let Some(l) = locale {
        order.push((PrecedenceTier::Locale, None, Some(l)));
    }
    order.push((PrecedenceTier::Default, None, None));
    order
}

/// Pick the effective record among `candidates`, which must all share one scope key.
///
/// Returns `Ok(None)` when no tier matches; that is "unset", not an error.
///
/// # Errors
/// `DuplicateScope` when two candidates carry the same (channel, locale) pair.
pub fn resolve<'a>(
    request: &SettingScope,
    candidates: &'a [SettingRecord],
) -> Result<Option<(&'a SettingRecord, PrecedenceTier)>, DomainError> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for record in candidates {
        if !seen.insert(record.scope()) {
            tracing::error!(
                key = %record.key(),
                scope = %record.scope(),
                "duplicate scope among stored settings"
            );
            return Err(DomainError::duplicate_scope(record.key(), record.scope()));
        }
    }

    for (tier, channel, locale) in search_order(request) {
        let hit = candidates.iter().find(|r| {
            r.scope().channel.as_deref() == channel && r.scope().locale.as_deref() == locale
        });
        if let Some(record) = hit {
            tracing::debug!(key = %record.key(), %tier, "setting resolved");
            return Ok(Some((record, tier)));
        }
    }

    Ok(None)
}
