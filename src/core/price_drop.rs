use crate::models::{PriceDropEvent, TrackedItem};

/// Percent off when `new_price` is a drop that has not been alerted yet.
///
/// A drop qualifies when the price is below the original baseline and either
/// no alert was ever sent or the price fell strictly below the last alerted
/// price. Repeated refreshes at an already-alerted price do not qualify.
pub fn evaluate(original: Option<i64>, last_notified: Option<i64>, new_price: i64) -> Option<i64> {
    let original = original?;
    if original <= 0 || new_price >= original {
        return None;
    }
    if let Some(notified) = last_notified {
        if new_price >= notified {
            return None;
        }
    }
    Some(percent_off(original, new_price))
}

/// `round((1 - new / original) * 100)` in integer arithmetic, half rounding up.
pub fn percent_off(original: i64, new_price: i64) -> i64 {
    let (original, new_price) = (i128::from(original), i128::from(new_price));
    let numerator = (original - new_price) * 200 + original;
    let percent = numerator.div_euclid(original * 2);
    i64::try_from(percent).unwrap_or(i64::MAX)
}

/// Run the detector against an item's stored state.
pub fn detect(item: &TrackedItem, new_price: i64) -> Option<PriceDropEvent> {
    let percent_off = evaluate(item.original_price, item.notified_price, new_price)?;
    Some(PriceDropEvent {
        item_id: item.id.clone(),
        title: item.display_title().to_string(),
        old_price: item.original_price?,
        new_price,
        url: item.url.clone(),
        store_domain: item.store_domain.clone(),
        percent_off,
    })
}
